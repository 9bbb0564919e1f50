use serde::{Deserialize, Serialize};

use crate::modules::models::overall::Position;

pub const DEFAULT_POINTS: [u32; 20] = [32, 28, 25, 22, 20, 18, 16, 14, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1];

/// points per finishing position, index 0 is first place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsTable(Vec<u32>);

impl Default for PointsTable {
    fn default() -> Self {
        PointsTable(DEFAULT_POINTS.to_vec())
    }
}

impl PointsTable {
    /// an empty table falls back to the default one
    pub fn new(points: Vec<u32>) -> PointsTable {
        if points.is_empty() {
            PointsTable::default()
        } else {
            PointsTable(points)
        }
    }

    /// # points for a position
    /// look up the points for a 1 based position. positions past the end of
    /// the table score nothing.
    pub fn points_for(&self, position: u32) -> u32 {
        if position == 0 {
            return 0;
        }
        self.0.get(position as usize - 1).copied().unwrap_or(0)
    }

    pub fn points_for_position(&self, position: Position) -> u32 {
        position.finished().map_or(0, |position| self.points_for(position))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_boundaries() {
        let table = PointsTable::new(vec![32, 28, 25]);
        assert_eq!(table.points_for(1), 32);
        assert_eq!(table.points_for(3), 25);
        assert_eq!(table.points_for(4), 0);
        assert_eq!(table.points_for(100), 0);
        assert_eq!(table.points_for(0), 0);
    }

    #[test]
    fn empty_table_uses_default() {
        let table = PointsTable::new(vec![]);
        assert_eq!(table, PointsTable::default());
        assert_eq!(table.len(), 20);
        assert_eq!(table.points_for(20), 1);
        assert_eq!(table.points_for(21), 0);
    }

    #[test]
    fn not_finished_scores_nothing() {
        let table = PointsTable::default();
        assert_eq!(table.points_for_position(Position::Finished(2)), 28);
        assert_eq!(table.points_for_position(Position::NotFinished), 0);
    }
}
