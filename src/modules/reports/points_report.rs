use std::path::PathBuf;

use diesel::SqliteConnection;
use serde::Serialize;

use crate::errors::CustomResult;
use crate::modules::config::Config;
use crate::modules::helpers::duration::format_duration;
use crate::modules::models::overall::{Position, RallyOverall};
use crate::modules::reports::{stored_rally, ReportWriter};
use crate::modules::standings::points::PointsTable;
use crate::modules::standings::season::{season_standings, SeasonStanding};

/// an overall result with the points it scored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub position: Position,
    pub user_id: i64,
    pub user_name: String,
    pub nationality: String,
    pub car: String,
    pub time3_ns: Option<i64>,
    pub penalty: f64,
    pub super_rally: i64,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointsReport {
    pub rally_id: i64,
    pub rally_name: String,
    pub rally: Vec<ScoreRecord>,
    pub championship: Vec<SeasonStanding>,
}

/// # score a rally
/// finishers ordered by position with their points, followed by the
/// drivers that did not finish in result order
pub fn score_rally(rows: &[RallyOverall], points: &PointsTable) -> Vec<ScoreRecord> {
    let mut finishers: Vec<&RallyOverall> = rows.iter().filter(|row| row.position().finished().is_some()).collect();
    finishers.sort_by_key(|row| row.position().finished());
    let others = rows.iter().filter(|row| row.position().finished().is_none());

    finishers
        .into_iter()
        .chain(others)
        .map(|row| ScoreRecord {
            position: row.position(),
            user_id: row.user_id,
            user_name: row.user_name.clone(),
            nationality: row.nationality.clone(),
            car: row.car.clone(),
            time3_ns: row.finished().then_some(row.time3_ns),
            penalty: row.penalty,
            super_rally: row.super_rally,
            points: points.points_for_position(row.position()),
        })
        .collect()
}

pub fn build(conn: &mut SqliteConnection, config: &Config, rally_id: i64) -> CustomResult<PointsReport> {
    let rally = stored_rally(conn, rally_id)?;
    let points = config.points();

    let rows = RallyOverall::from_rally(conn, rally_id)?;
    let season = RallyOverall::get_all(conn)?;

    Ok(PointsReport {
        rally_id,
        rally_name: rally.name,
        rally: score_rally(&rows, &points),
        championship: season_standings(&season, &points),
    })
}

fn records(report: &PointsReport) -> Vec<Vec<String>> {
    let mut records = vec![vec![
        "Position".to_string(),
        "Driver".to_string(),
        "Nationality".to_string(),
        "Car".to_string(),
        "Time".to_string(),
        "Penalty".to_string(),
        "Super Rally".to_string(),
        "Points".to_string(),
    ]];

    records.extend(report.rally.iter().map(|record| {
        vec![
            record.position.to_string(),
            record.user_name.clone(),
            record.nationality.clone(),
            record.car.clone(),
            record
                .time3_ns
                .map_or_else(|| "DNF".to_string(), |nanos| format_duration(chrono::Duration::nanoseconds(nanos))),
            format!("{:.1}", record.penalty),
            record.super_rally.to_string(),
            record.points.to_string(),
        ]
    }));

    records
}

/// championship standings as csv rows
fn standings_records(report: &PointsReport) -> Vec<Vec<String>> {
    let mut records = vec![vec![
        "Position".to_string(),
        "Driver".to_string(),
        "Nationality".to_string(),
        "Rallies".to_string(),
        "Points".to_string(),
    ]];

    records.extend(report.championship.iter().map(|standing| {
        vec![
            standing.position.to_string(),
            standing.user_name.clone(),
            standing.nationality.clone(),
            standing.rallies.to_string(),
            standing.points.to_string(),
        ]
    }));

    records
}

/// # export points report
/// the rally results with points and the championship standings
pub fn export(conn: &mut SqliteConnection, config: &Config, rally_id: i64) -> CustomResult<Vec<PathBuf>> {
    let report = build(conn, config, rally_id)?;
    let writer = ReportWriter::new(config)?;
    let file_name = format!("{}_{rally_id}", config.report.points.summary_file_name);

    let mut written = writer.write("points_report", &file_name, &report, || records(&report))?;
    if config.report.format.csv() {
        let path = config.csv_dir().join(format!("{file_name}_championship.csv"));
        crate::modules::reports::write_csv(&path, config.report_delimiter(), &standings_records(&report))?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: i64, position: Option<i32>, seconds: i64) -> RallyOverall {
        RallyOverall {
            id: user_id as i32,
            rally_id: 1,
            user_id,
            position,
            user_name: format!("driver{user_id}"),
            real_name: String::new(),
            nationality: "NL".to_string(),
            car: "Skoda Fabia Rally2 evo".to_string(),
            car_id: 1,
            time3_ns: seconds * 1_000_000_000,
            super_rally: 0,
            penalty: 0.0,
        }
    }

    #[test]
    fn dnfs_last_with_zero_points() {
        let rows = vec![row(1, None, 0), row(2, Some(2), 3650), row(3, Some(1), 3600)];
        let scored = score_rally(&rows, &PointsTable::default());

        let summary: Vec<(Position, i64, u32, Option<i64>)> = scored
            .iter()
            .map(|record| (record.position, record.user_id, record.points, record.time3_ns))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Position::Finished(1), 3, 32, Some(3_600_000_000_000)),
                (Position::Finished(2), 2, 28, Some(3_650_000_000_000)),
                (Position::NotFinished, 1, 0, None),
            ]
        );
    }
}
