use std::path::PathBuf;

use chrono::Duration;
use diesel::SqliteConnection;
use serde::Serialize;

use crate::errors::CustomResult;
use crate::modules::config::Config;
use crate::modules::helpers::duration::format_duration;
use crate::modules::models::overall::RallyOverall;
use crate::modules::models::stage::RallyStage;
use crate::modules::reports::{stored_rally, ReportWriter};
use crate::modules::standings::stats::{stage_summaries, DriverRallySummary, RallyContext, StageSummary};

const DNF: &str = "DNF";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub name: String,
    pub driver: String,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageLine {
    pub stage_num: i32,
    pub stage_name: String,
    pub position: String,
    pub time: String,
    pub delta: String,
    pub penalty: f64,
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverSection {
    pub user_name: String,
    pub metrics: Vec<Metric>,
    pub stages: Vec<StageLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverReport {
    pub rally_id: i64,
    pub rally_name: String,
    pub drivers: Vec<DriverSection>,
}

fn format_delta(delta: Duration) -> String {
    format!("+{}", format_duration(delta))
}

fn metric(name: &str, driver: String, field: String) -> Metric {
    Metric {
        name: name.to_string(),
        driver,
        field,
    }
}

/// # driver metrics
/// the driver's rally next to the field average
pub fn metrics(context: &RallyContext, summary: &DriverRallySummary) -> Vec<Metric> {
    let time_or_dnf = |time: Option<Duration>, format: fn(Duration) -> String| time.map_or_else(|| DNF.to_string(), format);

    vec![
        metric(
            "Finishing Position",
            summary.position.to_string(),
            format!("{:.2}", context.average_position),
        ),
        metric(
            "Total Time",
            time_or_dnf(summary.total_time, format_duration),
            format_duration(context.average_time),
        ),
        metric(
            "Delta to Winner",
            time_or_dnf(summary.delta_to_winner, format_delta),
            format_delta(context.average_time - context.winner_time),
        ),
        metric(
            "Total Penalty",
            format!("{:.1}", summary.penalty),
            format!("{:.1}", context.average_penalty),
        ),
        metric(
            "Super Rallies",
            summary.super_rally.to_string(),
            format!("{:.2}", context.average_super_rally),
        ),
    ]
}

fn stage_line(stage: StageSummary) -> StageLine {
    StageLine {
        stage_num: stage.stage_num,
        stage_name: stage.stage_name,
        position: stage.position.map_or_else(|| DNF.to_string(), |position| position.to_string()),
        time: stage.time.map_or_else(|| DNF.to_string(), format_duration),
        delta: stage.delta.map_or_else(|| DNF.to_string(), format_delta),
        penalty: stage.penalty,
        comments: stage.comments,
    }
}

/// # build driver report
/// one section per driver, in the order drivers appear in the results
pub fn build(conn: &mut SqliteConnection, rally_id: i64) -> CustomResult<DriverReport> {
    let rally = stored_rally(conn, rally_id)?;
    let overall = RallyOverall::from_rally(conn, rally_id)?;
    let stages = RallyStage::from_rally(conn, rally_id)?;
    let context = RallyContext::from_overall(rally_id, &overall)?;

    let drivers = RallyOverall::user_names_in_rally(conn, rally_id)?
        .into_iter()
        .filter_map(|user_name| {
            let row = overall.iter().find(|row| row.user_name == user_name)?;
            Some(DriverSection {
                metrics: metrics(&context, &context.driver_summary(row)),
                stages: stage_summaries(&stages, &user_name).into_iter().map(stage_line).collect(),
                user_name,
            })
        })
        .collect();

    Ok(DriverReport {
        rally_id,
        rally_name: rally.name,
        drivers,
    })
}

pub fn records(report: &DriverReport) -> Vec<Vec<String>> {
    let mut records = vec![[
        "Driver", "Stage", "Stage Name", "Position", "Time", "Delta", "Penalty", "Comments",
    ]
    .iter()
    .map(|column| column.to_string())
    .collect()];

    for driver in &report.drivers {
        records.extend(driver.stages.iter().map(|stage| {
            vec![
                driver.user_name.clone(),
                stage.stage_num.to_string(),
                stage.stage_name.clone(),
                stage.position.clone(),
                stage.time.clone(),
                stage.delta.clone(),
                format!("{:.1}", stage.penalty),
                stage.comments.clone(),
            ]
        }));
    }

    records
}

fn metric_records(report: &DriverReport) -> Vec<Vec<String>> {
    let mut records = vec![vec![
        "Driver".to_string(),
        "Metric".to_string(),
        "Driver Value".to_string(),
        "Field Average".to_string(),
    ]];

    for driver in &report.drivers {
        records.extend(driver.metrics.iter().map(|metric| {
            vec![
                driver.user_name.clone(),
                metric.name.clone(),
                metric.driver.clone(),
                metric.field.clone(),
            ]
        }));
    }

    records
}

pub fn export(conn: &mut SqliteConnection, config: &Config, rally_id: i64) -> CustomResult<Vec<PathBuf>> {
    let report = build(conn, rally_id)?;
    let writer = ReportWriter::new(config)?;
    let file_name = format!("{}_{rally_id}", config.report.drivers.rally_summary_filename);

    let mut written = writer.write("driver_report", &file_name, &report, || records(&report))?;
    if config.report.format.csv() {
        let path = config.csv_dir().join(format!("{file_name}_metrics.csv"));
        crate::modules::reports::write_csv(&path, config.report_delimiter(), &metric_records(&report))?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::models::overall::Position;

    #[test]
    fn dnf_metrics() {
        let context = RallyContext {
            rally_id: 1,
            winner_time: Duration::seconds(3600),
            average_time: Duration::seconds(3650),
            average_position: 1.5,
            average_penalty: 10.0,
            average_super_rally: 2.0,
            finishers: 2,
            entrants: 3,
        };
        let summary = DriverRallySummary {
            user_name: "carl".to_string(),
            position: Position::NotFinished,
            total_time: None,
            delta_to_winner: None,
            penalty: 20.0,
            super_rally: 4,
        };

        let metrics = metrics(&context, &summary);
        let values: Vec<(&str, &str, &str)> = metrics
            .iter()
            .map(|metric| (metric.name.as_str(), metric.driver.as_str(), metric.field.as_str()))
            .collect();

        assert_eq!(
            values,
            vec![
                ("Finishing Position", "DNF", "1.50"),
                ("Total Time", "DNF", "1:00:50.00"),
                ("Delta to Winner", "DNF", "+0:50.00"),
                ("Total Penalty", "20.0", "10.0"),
                ("Super Rallies", "4", "2.00"),
            ]
        );
    }

    #[test]
    fn stage_lines() {
        let driven = StageSummary {
            stage_num: 2,
            stage_name: "Kakaristo".to_string(),
            position: Some(2),
            time: Some(Duration::milliseconds(155_500)),
            delta: Some(Duration::milliseconds(5_500)),
            penalty: 10.0,
            comments: "jump".to_string(),
        };
        let retired = StageSummary {
            position: None,
            time: None,
            delta: None,
            penalty: 0.0,
            comments: "engine".to_string(),
            ..driven.clone()
        };

        assert_eq!(
            stage_line(driven),
            StageLine {
                stage_num: 2,
                stage_name: "Kakaristo".to_string(),
                position: "2".to_string(),
                time: "2:35.50".to_string(),
                delta: "+0:05.50".to_string(),
                penalty: 10.0,
                comments: "jump".to_string(),
            }
        );

        let line = stage_line(retired);
        assert_eq!((line.position.as_str(), line.time.as_str(), line.delta.as_str()), ("DNF", "DNF", "DNF"));
    }
}
