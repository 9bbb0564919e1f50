use std::fmt;

use chrono::Duration;
use diesel::prelude::*;
use diesel::SqliteConnection;
use serde::{Serialize, Serializer};

use crate::models::NewRallyOverall;
use crate::modules::helpers::general::Helpers;
use crate::schema::rally_overalls;

/// finishing position of a driver in a rally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Finished(u32),
    NotFinished,
}

impl Position {
    /// # decide position
    /// a driver only has a position when they set a time and the export
    /// gives a numeric position of at least 1.
    ///
    /// ## Arguments
    /// * `raw` - the position field of the export, e.g. `"3"` or `"DNF"`
    /// * `time3` - the total time of the driver
    pub fn decide(raw: &str, time3: Duration) -> Position {
        if time3 <= Duration::zero() {
            return Position::NotFinished;
        }

        match raw.trim().parse::<u32>() {
            Ok(position) if position >= 1 => Position::Finished(position),
            _ => Position::NotFinished,
        }
    }

    pub fn from_stored(stored: Option<i32>) -> Position {
        match stored {
            Some(position) if position >= 1 => Position::Finished(position as u32),
            _ => Position::NotFinished,
        }
    }

    pub fn to_stored(self) -> Option<i32> {
        match self {
            Position::Finished(position) => i32::try_from(position).ok(),
            Position::NotFinished => None,
        }
    }

    pub fn finished(self) -> Option<u32> {
        match self {
            Position::Finished(position) => Some(position),
            Position::NotFinished => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Finished(position) => write!(f, "{position}"),
            Position::NotFinished => write!(f, "DNF"),
        }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Queryable, Serialize, Identifiable, PartialEq, Debug, Clone)]
#[diesel(table_name = rally_overalls)]
pub struct RallyOverall {
    pub id: i32,
    pub rally_id: i64,
    pub user_id: i64,
    pub position: Option<i32>,
    pub user_name: String,
    pub real_name: String,
    pub nationality: String,
    pub car: String,
    pub car_id: i32,
    pub time3_ns: i64,
    pub super_rally: i64,
    pub penalty: f64,
}

impl RallyOverall {
    pub fn position(&self) -> Position {
        Position::from_stored(self.position)
    }

    pub fn time3(&self) -> Duration {
        Duration::nanoseconds(self.time3_ns)
    }

    /// a driver finished when a total time was recorded
    pub fn finished(&self) -> bool {
        self.time3_ns > 0
    }

    pub fn insert_batch(conn: &mut SqliteConnection, rows: &[NewRallyOverall]) -> QueryResult<usize> {
        diesel::insert_into(rally_overalls::table)
            .values(rows)
            .execute(conn)
    }

    /// overall rows of one rally in insertion order
    pub fn from_rally(conn: &mut SqliteConnection, rally_id_in: i64) -> QueryResult<Vec<RallyOverall>> {
        use crate::schema::rally_overalls::dsl::*;

        rally_overalls
            .filter(rally_id.eq(rally_id_in))
            .order(id)
            .load::<RallyOverall>(conn)
    }

    /// overall rows of the whole season, ordered by rally and then insertion order
    pub fn get_all(conn: &mut SqliteConnection) -> QueryResult<Vec<RallyOverall>> {
        use crate::schema::rally_overalls::dsl::*;

        rally_overalls
            .order((rally_id, id))
            .load::<RallyOverall>(conn)
    }

    /// user names of a rally in the order they appear in the results
    pub fn user_names_in_rally(conn: &mut SqliteConnection, rally_id_in: i64) -> QueryResult<Vec<String>> {
        let rows = RallyOverall::from_rally(conn, rally_id_in)?;
        Ok(Helpers::unique_in_order(rows.into_iter().map(|row| row.user_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_needs_a_time() {
        assert_eq!(Position::decide("1", Duration::seconds(3600)), Position::Finished(1));
        assert_eq!(Position::decide("1", Duration::zero()), Position::NotFinished);
        assert_eq!(Position::decide("DNF", Duration::seconds(3600)), Position::NotFinished);
        assert_eq!(Position::decide("0", Duration::seconds(3600)), Position::NotFinished);
    }

    #[test]
    fn position_storage() {
        assert_eq!(Position::from_stored(Some(4)), Position::Finished(4));
        assert_eq!(Position::from_stored(None), Position::NotFinished);
        assert_eq!(Position::Finished(2).to_stored(), Some(2));
        assert_eq!(Position::NotFinished.to_stored(), None);
        assert_eq!(Position::NotFinished.to_string(), "DNF");
        assert_eq!(Position::Finished(12).to_string(), "12");
    }
}
