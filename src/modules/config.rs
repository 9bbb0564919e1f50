use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::errors::{CustomResult, FileSnafu, InvalidConfigSnafu, InvalidRallySnafu, TomlParseSnafu, TomlWriteSnafu};
use crate::models::NewRally;
use crate::modules::helpers::general::Helpers;
use crate::modules::standings::points::PointsTable;

pub const RALLY_ID_PLACEHOLDER: &str = "{rally_id}";
pub const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// what a class groups on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassAxis {
    #[default]
    Car,
    Driver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Csv,
    Both,
}

impl ReportFormat {
    pub fn markdown(self) -> bool {
        matches!(self, ReportFormat::Markdown | ReportFormat::Both)
    }

    pub fn csv(self) -> bool {
        matches!(self, ReportFormat::Csv | ReportFormat::Both)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub download: Download,
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub classes: Vec<ClassConfig>,
    /// directory the relative paths of the file are resolved against
    #[serde(skip)]
    pub base: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct General {
    /// Points per overall position. Default: 32, 28, 25 ... 1.
    #[serde(default)]
    pub points: Vec<u32>,
    /// Points per class position. Default: same as `points`.
    #[serde(default)]
    pub class_points: Vec<u32>,
    #[serde(default)]
    pub classes_type: ClassAxis,
    /// Data directory holding downloads, reports and the database. Default: "data".
    #[serde(default = "default_data_dir")]
    pub directory: String,
    /// Static car catalog. Default: "cars.json".
    #[serde(default = "default_cars_catalog")]
    pub cars_catalog: String,
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_cars_catalog() -> String {
    "cars.json".into()
}

impl Default for General {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            class_points: Vec::new(),
            classes_type: ClassAxis::default(),
            directory: default_data_dir(),
            cars_catalog: default_cars_catalog(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Download {
    /// Stage results export, `{rally_id}` is replaced by the rally id.
    #[serde(default = "default_stage_url", rename = "rallyCSVURLTmpl")]
    pub stage_url: String,
    /// Overall results export.
    #[serde(default = "default_overall_url", rename = "rallyCSVOverallTmpl")]
    pub overall_url: String,
    #[serde(default = "default_download_dir")]
    pub directory: String,
    #[serde(default = "default_stage_file_name")]
    pub stage_file_name: String,
    #[serde(default = "default_overall_file_name")]
    pub overall_file_name: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_stage_url() -> String {
    "https://rallysimfans.hu/rbr/csv_export_beta.php?rally_id={rally_id}".into()
}
fn default_overall_url() -> String {
    "https://rallysimfans.hu/rbr/csv_export_results.php?rally_id={rally_id}&cg=7".into()
}
fn default_download_dir() -> String {
    "rallies".into()
}
fn default_stage_file_name() -> String {
    "table.csv".into()
}
fn default_overall_file_name() -> String {
    "All_table.csv".into()
}
fn default_delimiter() -> String {
    ";".into()
}

impl Default for Download {
    fn default() -> Self {
        Self {
            stage_url: default_stage_url(),
            overall_url: default_overall_url(),
            directory: default_download_dir(),
            stage_file_name: default_stage_file_name(),
            overall_file_name: default_overall_file_name(),
            delimiter: default_delimiter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default = "default_report_dir")]
    pub directory: String,
    #[serde(default)]
    pub format: ReportFormat,
    #[serde(default = "default_md_dir")]
    pub md_directory: String,
    #[serde(default = "default_csv_dir")]
    pub csv_directory: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub class: ReportClass,
    #[serde(default)]
    pub points: ReportPoints,
    #[serde(default)]
    pub drivers: ReportDrivers,
}

fn default_report_dir() -> String {
    "season_reports".into()
}
fn default_md_dir() -> String {
    "markdown".into()
}
fn default_csv_dir() -> String {
    "csv".into()
}

impl Default for Report {
    fn default() -> Self {
        Self {
            directory: default_report_dir(),
            format: ReportFormat::default(),
            md_directory: default_md_dir(),
            csv_directory: default_csv_dir(),
            delimiter: default_delimiter(),
            class: ReportClass::default(),
            points: ReportPoints::default(),
            drivers: ReportDrivers::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportClass {
    #[serde(default = "default_class_summary")]
    pub summary_filename: String,
}

fn default_class_summary() -> String {
    "class_summary".into()
}

impl Default for ReportClass {
    fn default() -> Self {
        Self { summary_filename: default_class_summary() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPoints {
    #[serde(default = "default_points_summary")]
    pub summary_file_name: String,
}

fn default_points_summary() -> String {
    "points_summary".into()
}

impl Default for ReportPoints {
    fn default() -> Self {
        Self { summary_file_name: default_points_summary() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDrivers {
    #[serde(default = "default_season_summary")]
    pub season_summary_filename: String,
    #[serde(default = "default_rally_summary")]
    pub rally_summary_filename: String,
}

fn default_season_summary() -> String {
    "drivers_summary".into()
}
fn default_rally_summary() -> String {
    "drivers_rally_summary".into()
}

impl Default for ReportDrivers {
    fn default() -> Self {
        Self {
            season_summary_filename: default_season_summary(),
            rally_summary_filename: default_rally_summary(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    #[serde(default = "default_database_name")]
    pub name: String,
    #[serde(default = "default_database_dir")]
    pub directory: String,
}

fn default_database_name() -> String {
    "season.db".into()
}
fn default_database_dir() -> String {
    "database".into()
}

impl Default for Database {
    fn default() -> Self {
        Self {
            name: default_database_name(),
            directory: default_database_dir(),
        }
    }
}

/// a configured class. `categories` is used on the car axis, `drivers` on the driver axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClassConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub drivers: Vec<String>,
}

fn single_char(field: &str, value: &str) -> CustomResult<u8> {
    match value.as_bytes() {
        [byte] => Ok(*byte),
        _ => InvalidConfigSnafu {
            message: format!("{field} must be a single character, got {value:?}"),
        }
        .fail(),
    }
}

impl Config {
    /// # load config
    /// read and validate the settings file. relative directories are
    /// resolved against the directory the file lives in.
    pub fn load(path: &Path) -> CustomResult<Config> {
        let content = fs::read_to_string(path).context(FileSnafu { path })?;
        let mut config = Config::parse(&content, path)?;
        config.base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// parse and validate settings from a string
    pub fn parse(content: &str, path: &Path) -> CustomResult<Config> {
        let config: Config = toml::from_str(content).context(TomlParseSnafu { path })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CustomResult<()> {
        for (field, url) in [
            ("download.rallyCSVURLTmpl", &self.download.stage_url),
            ("download.rallyCSVOverallTmpl", &self.download.overall_url),
        ] {
            if !url.contains(RALLY_ID_PLACEHOLDER) {
                return InvalidConfigSnafu {
                    message: format!("{field} must contain {RALLY_ID_PLACEHOLDER}"),
                }
                .fail();
            }
        }

        single_char("download.delimiter", &self.download.delimiter)?;
        single_char("report.delimiter", &self.report.delimiter)?;

        if self.database.name.trim().is_empty() {
            return InvalidConfigSnafu { message: "database.name is required" }.fail();
        }

        for class in &self.classes {
            if Helpers::slugify(&class.name).is_empty() {
                return InvalidConfigSnafu {
                    message: format!("class name {:?} has no usable characters", class.name),
                }
                .fail();
            }
        }

        Ok(())
    }

    pub fn points(&self) -> PointsTable {
        PointsTable::new(self.general.points.clone())
    }

    /// class points, falling back to the overall points table
    pub fn class_points(&self) -> PointsTable {
        if self.general.class_points.is_empty() {
            self.points()
        } else {
            PointsTable::new(self.general.class_points.clone())
        }
    }

    pub fn download_delimiter(&self) -> u8 {
        self.download.delimiter.as_bytes().first().copied().unwrap_or(b';')
    }

    pub fn report_delimiter(&self) -> u8 {
        self.report.delimiter.as_bytes().first().copied().unwrap_or(b';')
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base.join(&self.general.directory)
    }

    pub fn rally_dir(&self, rally_id: i64) -> PathBuf {
        self.data_dir().join(&self.download.directory).join(rally_id.to_string())
    }

    pub fn rally_description_path(&self, rally_id: i64) -> PathBuf {
        self.rally_dir(rally_id).join(format!("{rally_id}.toml"))
    }

    pub fn stage_file_path(&self, rally_id: i64) -> PathBuf {
        self.rally_dir(rally_id)
            .join(format!("{rally_id}_{}", self.download.stage_file_name))
    }

    pub fn overall_file_path(&self, rally_id: i64) -> PathBuf {
        self.rally_dir(rally_id)
            .join(format!("{rally_id}_{}", self.download.overall_file_name))
    }

    pub fn database_dir(&self) -> PathBuf {
        self.data_dir().join(&self.database.directory)
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join(&self.database.name)
    }

    pub fn report_dir(&self) -> PathBuf {
        self.data_dir().join(&self.report.directory)
    }

    pub fn markdown_dir(&self) -> PathBuf {
        self.report_dir().join(&self.report.md_directory)
    }

    pub fn csv_dir(&self) -> PathBuf {
        self.report_dir().join(&self.report.csv_directory)
    }

    pub fn cars_catalog_path(&self) -> PathBuf {
        self.base.join(&self.general.cars_catalog)
    }

    /// the directories the program writes to
    pub fn directories(&self) -> Vec<PathBuf> {
        vec![
            self.data_dir(),
            self.data_dir().join(&self.download.directory),
            self.database_dir(),
            self.markdown_dir(),
            self.csv_dir(),
        ]
    }
}

/// a rally description file, `[rally]` is its only table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RallyDescription {
    pub rally: RallyInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RallyInfo {
    pub rally_id: i64,
    pub name: String,
    pub description: String,
    pub creator: String,
    pub damage_level: String,
    pub number_of_legs: i64,
    pub super_rally: bool,
    pub pacenotes_options: String,
    /// unix seconds
    pub started: i64,
    pub finished: i64,
    pub total_distance: f64,
    /// comma separated
    pub car_groups: String,
    pub start_at: String,
    pub end_at: String,
}

/// # parse a schedule timestamp
/// empty means not scheduled. `YYYY-MM-DD HH:MM` and RFC 3339 are accepted,
/// RFC 3339 values are converted to UTC.
pub fn parse_schedule(field: &str, value: &str) -> CustomResult<Option<NaiveDateTime>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, SCHEDULE_FORMAT) {
        return Ok(Some(timestamp));
    }

    match DateTime::parse_from_rfc3339(value) {
        Ok(timestamp) => Ok(Some(timestamp.naive_utc())),
        Err(_) => InvalidRallySnafu {
            message: format!("rally.{field} {value:?} is not a valid timestamp"),
        }
        .fail(),
    }
}

impl RallyDescription {
    pub fn load(path: &Path) -> CustomResult<RallyDescription> {
        let content = fs::read_to_string(path).context(FileSnafu { path })?;
        RallyDescription::parse(&content, path)
    }

    /// decode and validate, unknown keys are rejected
    pub fn parse(content: &str, path: &Path) -> CustomResult<RallyDescription> {
        let description: RallyDescription = toml::from_str(content).context(TomlParseSnafu { path })?;
        description.validate()?;
        Ok(description)
    }

    /// a skeleton description for a freshly downloaded rally
    pub fn skeleton(rally_id: i64) -> RallyDescription {
        RallyDescription {
            rally: RallyInfo {
                rally_id,
                name: format!("Rally {rally_id}"),
                damage_level: "Normal".to_string(),
                number_of_legs: 1,
                ..RallyInfo::default()
            },
        }
    }

    pub fn to_toml(&self) -> CustomResult<String> {
        toml::to_string(self).context(TomlWriteSnafu)
    }

    pub fn validate(&self) -> CustomResult<()> {
        let rally = &self.rally;

        let fail = |message: String| InvalidRallySnafu { message }.fail();

        if rally.name.trim().is_empty() {
            return fail("rally.name must be set".to_string());
        }
        if rally.damage_level.trim().is_empty() {
            return fail("rally.damageLevel must be set".to_string());
        }
        if rally.number_of_legs <= 0 {
            return fail(format!("rally.numberOfLegs must be > 0 (got {})", rally.number_of_legs));
        }
        if rally.total_distance < 0.0 || !rally.total_distance.is_finite() {
            return fail(format!("rally.totalDistance must be >= 0 (got {})", rally.total_distance));
        }
        if rally.started > 0 && rally.finished > 0 && rally.finished < rally.started {
            return fail(format!(
                "rally.finished ({}) < rally.started ({})",
                rally.finished, rally.started
            ));
        }

        let start = parse_schedule("startAt", &rally.start_at)?;
        let end = parse_schedule("endAt", &rally.end_at)?;
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return fail(format!(
                    "rally.endAt ({}) is before rally.startAt ({})",
                    rally.end_at, rally.start_at
                ));
            }
        }

        Ok(())
    }

    pub fn car_group_list(&self) -> Vec<String> {
        Helpers::split_list(&self.rally.car_groups)
    }

    /// # to stored rally
    /// convert to the insertable row. the rally id of the file wins over
    /// `rally_id` unless the file leaves it at 0.
    pub fn to_new_rally(&self, rally_id: i64) -> CustomResult<NewRally> {
        let rally = &self.rally;
        let number_of_legs = i32::try_from(rally.number_of_legs).map_err(|_| {
            InvalidRallySnafu {
                message: format!("rally.numberOfLegs {} is too large", rally.number_of_legs),
            }
            .build()
        })?;

        Ok(NewRally {
            rally_id: if rally.rally_id == 0 { rally_id } else { rally.rally_id },
            name: rally.name.clone(),
            description: rally.description.clone(),
            creator: rally.creator.clone(),
            damage_level: rally.damage_level.clone(),
            number_of_legs,
            super_rally: rally.super_rally,
            pacenotes_options: rally.pacenotes_options.clone(),
            started: rally.started,
            finished: rally.finished,
            total_distance: rally.total_distance,
            car_groups: self.car_group_list().join(","),
            start_at: parse_schedule("startAt", &rally.start_at)?,
            end_at: parse_schedule("endAt", &rally.end_at)?,
        })
    }
}
