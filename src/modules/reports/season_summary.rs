use std::path::PathBuf;

use diesel::SqliteConnection;
use serde::Serialize;

use crate::errors::CustomResult;
use crate::modules::config::Config;
use crate::modules::models::overall::RallyOverall;
use crate::modules::models::stage::RallyStage;
use crate::modules::reports::{optional, ReportWriter};
use crate::modules::standings::season::{driver_summaries, DriverSummary};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonSummary {
    pub drivers: Vec<DriverSummary>,
}

/// every driver of the season, an empty store gives an empty summary
pub fn build(conn: &mut SqliteConnection, config: &Config) -> CustomResult<SeasonSummary> {
    let overall = RallyOverall::get_all(conn)?;
    let stages = RallyStage::get_all(conn)?;

    Ok(SeasonSummary {
        drivers: driver_summaries(&overall, &stages, &config.points()),
    })
}

pub fn records(summary: &SeasonSummary) -> Vec<Vec<String>> {
    let header = [
        "Driver",
        "Nationality",
        "Rallies Started",
        "Rally Wins",
        "Podiums",
        "Stage Wins",
        "Best Position",
        "Average Position",
        "Total Super Rallied Stages",
        "Total Championship Points",
    ];

    let mut records = vec![header.iter().map(|column| column.to_string()).collect()];
    records.extend(summary.drivers.iter().map(|driver| {
        vec![
            driver.user_name.clone(),
            driver.nationality.clone(),
            driver.rallies_started.to_string(),
            driver.rally_wins.to_string(),
            driver.podiums.to_string(),
            driver.stage_wins.to_string(),
            optional(driver.best_position),
            optional(driver.average_position.map(|average| format!("{average:.2}"))),
            driver.super_rallied_stages.to_string(),
            driver.points.to_string(),
        ]
    }));

    records
}

pub fn export(conn: &mut SqliteConnection, config: &Config) -> CustomResult<Vec<PathBuf>> {
    let summary = build(conn, config)?;
    let writer = ReportWriter::new(config)?;

    writer.write(
        "season_summary",
        &config.report.drivers.season_summary_filename,
        &summary,
        || records(&summary),
    )
}
