use std::collections::BTreeMap;
use std::path::PathBuf;

use diesel::SqliteConnection;
use serde::Serialize;

use crate::errors::CustomResult;
use crate::modules::config::{ClassAxis, Config};
use crate::modules::helpers::duration::format_duration;
use crate::modules::models::class::Class;
use crate::modules::models::overall::RallyOverall;
use crate::modules::reports::{stored_rally, ReportWriter};
use crate::modules::standings::points::PointsTable;
use crate::modules::standings::ranking::{classify, rank, ClassMembership, RankedRow};
use crate::modules::standings::season::{class_championship, ClassStanding};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassRallyRow {
    pub position: u32,
    pub user_name: String,
    pub time3_ns: i64,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSection {
    pub class_id: i32,
    pub name: String,
    pub description: String,
    pub rally: Vec<ClassRallyRow>,
    pub championship: Vec<ClassStanding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassReport {
    pub rally_id: i64,
    pub rally_name: String,
    pub classes: Vec<ClassSection>,
}

/// # class sections
/// rank the rally and the season per class. classes without any result
/// are left out.
///
/// ## Arguments
/// * `classes` - every known class
/// * `rally_id` - the rally of the rally tables
/// * `season` - every overall row of the season
/// * `membership` - the class memberships
/// * `axis` - whether classes group cars or drivers
/// * `points` - the class points table
pub fn class_sections(
    classes: &[Class],
    rally_id: i64,
    season: &[RallyOverall],
    membership: &ClassMembership,
    axis: ClassAxis,
    points: &PointsTable,
) -> Vec<ClassSection> {
    let ranked = rank(classify(season, membership, axis));
    let mut championship = class_championship(&ranked, points);

    let mut rally_rows: BTreeMap<i32, Vec<&RankedRow>> = BTreeMap::new();
    for row in ranked.iter().filter(|row| row.rally_id == rally_id) {
        rally_rows.entry(row.class_id).or_default().push(row);
    }

    classes
        .iter()
        .filter_map(|class| {
            let rally: Vec<ClassRallyRow> = rally_rows
                .get(&class.id)
                .map(|rows| {
                    rows.iter()
                        .map(|row| ClassRallyRow {
                            position: row.position,
                            user_name: row.user_name.clone(),
                            time3_ns: row.time3.num_nanoseconds().unwrap_or(0),
                            points: points.points_for(row.position),
                        })
                        .collect()
                })
                .unwrap_or_default();
            let standings = championship.remove(&class.id).unwrap_or_default();

            if rally.is_empty() && standings.is_empty() {
                return None;
            }

            Some(ClassSection {
                class_id: class.id,
                name: class.name.clone(),
                description: class.description.clone(),
                rally,
                championship: standings,
            })
        })
        .collect()
}

pub fn build(conn: &mut SqliteConnection, config: &Config, rally_id: i64) -> CustomResult<ClassReport> {
    let rally = stored_rally(conn, rally_id)?;

    let classes = Class::get_all(conn)?;
    let membership = ClassMembership::new(&Class::car_memberships(conn)?, &Class::driver_memberships(conn)?);
    let season = RallyOverall::get_all(conn)?;

    Ok(ClassReport {
        rally_id,
        rally_name: rally.name,
        classes: class_sections(
            &classes,
            rally_id,
            &season,
            &membership,
            config.general.classes_type,
            &config.class_points(),
        ),
    })
}

pub fn records(report: &ClassReport) -> Vec<Vec<String>> {
    let mut records = vec![["Class", "Table", "Position", "Driver", "Time", "Points"]
        .iter()
        .map(|column| column.to_string())
        .collect()];

    for class in &report.classes {
        records.extend(class.rally.iter().map(|row| {
            vec![
                class.name.clone(),
                "Rally".to_string(),
                row.position.to_string(),
                row.user_name.clone(),
                format_duration(chrono::Duration::nanoseconds(row.time3_ns)),
                row.points.to_string(),
            ]
        }));
        records.extend(class.championship.iter().map(|standing| {
            vec![
                class.name.clone(),
                "Championship".to_string(),
                standing.position.to_string(),
                standing.user_name.clone(),
                String::new(),
                standing.points.to_string(),
            ]
        }));
    }

    records
}

pub fn export(conn: &mut SqliteConnection, config: &Config, rally_id: i64) -> CustomResult<Vec<PathBuf>> {
    let report = build(conn, config, rally_id)?;
    let writer = ReportWriter::new(config)?;
    let file_name = format!("{}_{rally_id}", config.report.class.summary_filename);

    writer.write("class_report", &file_name, &report, || records(&report))
}
