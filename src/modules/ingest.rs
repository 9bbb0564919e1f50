use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::Duration;
use csv::{ReaderBuilder, StringRecord};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{info, warn};
use snafu::ResultExt;

use crate::errors::{
    AlreadyExistsSnafu, CsvSnafu, CustomResult, Error, FileSnafu, InvalidRallySnafu, MissingColumnsSnafu,
    UnknownCarSnafu,
};
use crate::models::{NewRally, NewRallyOverall, NewRallyStage};
use crate::modules::config::{Config, RallyDescription};
use crate::modules::helpers::duration::try_parse_duration;
use crate::modules::helpers::general::Helpers;
use crate::modules::helpers::parse::{parse_flag, parse_float, parse_int, parse_real_time};
use crate::modules::models::car::Car;
use crate::modules::models::overall::{Position, RallyOverall};
use crate::modules::models::rally::Rally;
use crate::modules::models::stage::RallyStage;

pub const OVERALL_COLUMNS: usize = 9;
pub const STAGE_COLUMNS: usize = 16;

/// a data row with its line number, for diagnostics
#[derive(Debug, Clone)]
pub struct Row {
    pub line: u64,
    pub record: StringRecord,
}

struct Field<'a> {
    file: &'a str,
    line: u64,
    column: &'a str,
    value: &'a str,
}

impl Field<'_> {
    fn invalid(&self) {
        if !self.value.trim().is_empty() {
            warn!(
                target: "ingest:field",
                "{} line {}: invalid {} {:?}, using zero",
                self.file, self.line, self.column, self.value
            );
        }
    }

    fn int(&self) -> i64 {
        parse_int(self.value).unwrap_or_else(|| {
            self.invalid();
            0
        })
    }

    fn float(&self) -> f64 {
        parse_float(self.value).unwrap_or_else(|| {
            self.invalid();
            0.0
        })
    }

    fn flag(&self) -> bool {
        parse_flag(self.value).unwrap_or_else(|| {
            self.invalid();
            false
        })
    }

    fn duration(&self) -> Duration {
        try_parse_duration(self.value).unwrap_or_else(|| {
            self.invalid();
            Duration::zero()
        })
    }
}

/// # read rows
/// read a delimited export. the first row is a header and skipped, every
/// other row needs at least `expected` columns.
///
/// ## Arguments
/// * `reader` - the raw file content
/// * `delimiter` - the column separator
/// * `file` - name of the file, used in errors and logs
/// * `expected` - minimum number of columns per row
pub fn read_rows<R: Read>(reader: R, delimiter: u8, file: &str, expected: usize) -> CustomResult<Vec<Row>> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.context(CsvSnafu { file })?;
        let line = record.position().map_or(index as u64 + 2, |position| position.line());

        if record.len() < expected {
            return MissingColumnsSnafu {
                file,
                row: line as usize,
                found: record.len(),
                expected,
            }
            .fail();
        }

        rows.push(Row { line, record });
    }

    Ok(rows)
}

fn field<'a>(row: &'a Row, file: &'a str, index: usize, column: &'a str) -> Field<'a> {
    Field {
        file,
        line: row.line,
        column,
        value: row.record.get(index).unwrap_or(""),
    }
}

fn text(row: &Row, index: usize) -> String {
    row.record.get(index).unwrap_or("").trim().to_string()
}

/// # parse overall rows
/// map `position; userId; userName; realName; nationality; carName; time3; superRally; penalty`
/// rows to insertable records. the car must be in the catalog.
///
/// ## Arguments
/// * `rows` - rows from [`read_rows`]
/// * `rally_id` - the rally the rows belong to
/// * `cars` - car id per catalog slug
/// * `file` - name of the file, used in errors and logs
pub fn parse_overall(
    rows: &[Row],
    rally_id: i64,
    cars: &HashMap<String, i32>,
    file: &str,
) -> CustomResult<Vec<NewRallyOverall>> {
    rows.iter()
        .map(|row| {
            let car = text(row, 5);
            let slug = Helpers::slugify(&car);
            let car_id = match cars.get(&slug) {
                Some(car_id) => *car_id,
                None => return UnknownCarSnafu { name: car, slug }.fail(),
            };

            let time3 = field(row, file, 6, "time3").duration();
            let raw_position = text(row, 0);
            let position = Position::decide(&raw_position, time3);
            if position == Position::NotFinished && time3 > Duration::zero() {
                warn!(
                    target: "ingest:parse_overall",
                    "{} line {}: driver has a time but position {:?}, treating as not finished",
                    file, row.line, raw_position
                );
            }

            Ok(NewRallyOverall {
                rally_id,
                user_id: field(row, file, 1, "userId").int(),
                position: position.to_stored(),
                user_name: text(row, 2),
                real_name: text(row, 3),
                nationality: text(row, 4),
                car,
                car_id,
                time3_ns: time3.num_nanoseconds().unwrap_or(0),
                super_rally: field(row, file, 7, "superRally").int(),
                penalty: field(row, file, 8, "penalty").float(),
            })
        })
        .collect()
}

/// # parse stage rows
/// map the 16 column stage export to insertable records
pub fn parse_stages(rows: &[Row], rally_id: i64, file: &str) -> Vec<NewRallyStage> {
    rows.iter()
        .map(|row| {
            let finish = field(row, file, 10, "finishRealTime");
            let finish_real_time = parse_real_time(finish.value);
            if finish_real_time.is_none() {
                finish.invalid();
            }

            NewRallyStage {
                rally_id,
                stage_num: i32::try_from(field(row, file, 0, "stageNum").int()).unwrap_or(0),
                stage_name: text(row, 1),
                nationality: text(row, 2),
                user_name: text(row, 3),
                real_name: text(row, 4),
                car_group: text(row, 5),
                car_name: text(row, 6),
                time1: field(row, file, 7, "time1").float(),
                time2: field(row, file, 8, "time2").float(),
                time3: field(row, file, 9, "time3").float(),
                finish_real_time,
                penalty: field(row, file, 11, "penalty").float(),
                service_penalty: field(row, file, 12, "servicePenalty").float(),
                super_rally: field(row, file, 13, "superRally").flag(),
                progress: text(row, 14),
                comments: text(row, 15),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub stages: usize,
    pub overall: usize,
    pub replaced: bool,
}

/// # store a rally
/// write the rally with all its rows in one transaction. an existing rally
/// is an error unless `replace` is set, then it is deleted first.
pub fn store_rally(
    conn: &mut SqliteConnection,
    rally: &NewRally,
    stages: &[NewRallyStage],
    overall: &[NewRallyOverall],
    replace: bool,
) -> CustomResult<IngestSummary> {
    conn.transaction::<_, Error, _>(|conn| {
        let exists = Rally::exists(conn, rally.rally_id)?;
        if exists {
            if !replace {
                return AlreadyExistsSnafu { rally_id: rally.rally_id }.fail();
            }
            Rally::delete_with_results(conn, rally.rally_id)?;
        }

        Rally::new(conn, rally)?;
        let stages = RallyStage::insert_batch(conn, stages)?;
        let overall = RallyOverall::insert_batch(conn, overall)?;

        Ok(IngestSummary {
            stages,
            overall,
            replaced: exists,
        })
    })
}

fn open(path: &Path) -> CustomResult<File> {
    File::open(path).context(FileSnafu { path })
}

/// # ingest a downloaded rally
/// read the description and both exports of a rally from the download
/// directory and store them
pub fn ingest_from_dir(
    conn: &mut SqliteConnection,
    config: &Config,
    rally_id: i64,
    replace: bool,
) -> CustomResult<IngestSummary> {
    let description = RallyDescription::load(&config.rally_description_path(rally_id))?;
    if description.rally.rally_id != 0 && description.rally.rally_id != rally_id {
        return InvalidRallySnafu {
            message: format!(
                "description is for rally {} but rally {} was requested",
                description.rally.rally_id, rally_id
            ),
        }
        .fail();
    }
    let rally = description.to_new_rally(rally_id)?;

    let delimiter = config.download_delimiter();

    let stage_path = config.stage_file_path(rally_id);
    let stage_file = stage_path.display().to_string();
    let stage_rows = read_rows(open(&stage_path)?, delimiter, &stage_file, STAGE_COLUMNS)?;
    let stages = parse_stages(&stage_rows, rally_id, &stage_file);

    let overall_path = config.overall_file_path(rally_id);
    let overall_file = overall_path.display().to_string();
    let overall_rows = read_rows(open(&overall_path)?, delimiter, &overall_file, OVERALL_COLUMNS)?;
    let cars: HashMap<String, i32> = Car::get_all(conn)?
        .into_iter()
        .map(|car| (car.slug, car.id))
        .collect();
    let overall = parse_overall(&overall_rows, rally_id, &cars, &overall_file)?;

    let summary = store_rally(conn, &rally, &stages, &overall, replace)?;
    info!(
        target: "ingest:ingest_from_dir",
        "stored rally {} with {} stage rows and {} overall rows",
        rally_id, summary.stages, summary.overall
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const OVERALL: &str = "\
#;userid;user_name;real_name;nationality;car;time3;super_rally;penalty
1;501;anna;Anna A;FI;Skoda Fabia Rally2 evo;1:00:00.000;0;
2;502;bert;Bert B;SE;Skoda Fabia Rally2 evo;1:00:50.000;1;10.5
DNF;503;carl;Carl C;EE;Citroen C3 Rally2;;0;abc
";

    const STAGES: &str = "\
stage;name;nat;user;real;group;car;t1;t2;t3;finish;pen;service;sr;progress;comments
1;Ouninpohja;FI;anna;Anna A;Rally2;Skoda Fabia Rally2 evo;60.1;120.2;185.3;2025-06-24 18:03:09;0;0;0;F;
1;Ouninpohja;SE;bert;Bert B;Rally2;Skoda Fabia Rally2 evo;61;;abc;;5;0;1;F;spin
";

    fn cars() -> HashMap<String, i32> {
        HashMap::from([
            ("skoda-fabia-rally2-evo".to_string(), 1),
            ("citroen-c3-rally2".to_string(), 2),
        ])
    }

    #[test]
    fn overall_rows() {
        let rows = read_rows(OVERALL.as_bytes(), b';', "All_table.csv", OVERALL_COLUMNS).unwrap();
        let overall = parse_overall(&rows, 9, &cars(), "All_table.csv").unwrap();

        assert_eq!(overall.len(), 3);
        assert_eq!(overall[0].position, Some(1));
        assert_eq!(overall[0].time3_ns, 3_600_000_000_000);
        assert_eq!(overall[0].penalty, 0.0);
        assert_eq!(overall[1].position, Some(2));
        assert_eq!(overall[1].super_rally, 1);
        assert_eq!(overall[1].penalty, 10.5);
        assert_eq!(overall[2].position, None);
        assert_eq!(overall[2].time3_ns, 0);
        assert_eq!(overall[2].car_id, 2);
        assert_eq!(overall[2].penalty, 0.0);
    }

    #[test]
    fn unknown_car_fails() {
        let rows = read_rows(OVERALL.as_bytes(), b';', "All_table.csv", OVERALL_COLUMNS).unwrap();
        let only_skoda = HashMap::from([("skoda-fabia-rally2-evo".to_string(), 1)]);

        let error = parse_overall(&rows, 9, &only_skoda, "All_table.csv").unwrap_err();
        assert!(matches!(error, Error::UnknownCarError { .. }));
    }

    #[test]
    fn stage_rows_fail_soft() {
        let rows = read_rows(STAGES.as_bytes(), b';', "table.csv", STAGE_COLUMNS).unwrap();
        let stages = parse_stages(&rows, 9, "table.csv");

        assert_eq!(stages[0].stage_num, 1);
        assert_eq!(stages[0].time3, 185.3);
        assert!(stages[0].finish_real_time.is_some());
        assert!(!stages[0].super_rally);

        assert_eq!(stages[1].time2, 0.0);
        assert_eq!(stages[1].time3, 0.0);
        assert_eq!(stages[1].finish_real_time, None);
        assert_eq!(stages[1].penalty, 5.0);
        assert!(stages[1].super_rally);
        assert_eq!(stages[1].comments, "spin");
    }

    #[test]
    fn short_rows_are_fatal() {
        let short = "header\n1;2;3\n";
        let error = read_rows(short.as_bytes(), b';', "table.csv", STAGE_COLUMNS).unwrap_err();
        assert!(matches!(error, Error::MissingColumnsError { found: 3, expected: 16, .. }));
    }
}
