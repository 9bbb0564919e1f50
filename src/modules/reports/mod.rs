pub mod class_report;
pub mod driver_report;
pub mod points_report;
pub mod season_summary;

use std::fs;
use std::path::{Path, PathBuf};

use diesel::SqliteConnection;
use handlebars::{no_escape, Handlebars};
use log::info;
use serde::Serialize;
use snafu::ResultExt;

use crate::errors::{CsvSnafu, CustomResult, FileSnafu, RallyNotFoundSnafu, RenderSnafu, TemplateSnafu};
use crate::modules::config::Config;
use crate::modules::helpers::handelbars::format_duration::FormatDuration;
use crate::modules::helpers::handelbars::format_float::FormatFloat;
use crate::modules::models::rally::Rally;

const TEMPLATES: [(&str, &str); 4] = [
    ("points_report", include_str!("../../../templates/points_report.hbs")),
    ("season_summary", include_str!("../../../templates/season_summary.hbs")),
    ("driver_report", include_str!("../../../templates/driver_report.hbs")),
    ("class_report", include_str!("../../../templates/class_report.hbs")),
];

/// # template registry
/// every report template with the formatting helpers, in strict mode and
/// without html escaping
pub fn registry() -> CustomResult<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars.register_helper("formatDuration", Box::new(FormatDuration));
    handlebars.register_helper("formatFloat", Box::new(FormatFloat));
    handlebars.register_escape_fn(no_escape);
    handlebars.set_strict_mode(true);

    for (name, template) in TEMPLATES {
        handlebars
            .register_template_string(name, template)
            .context(TemplateSnafu { name })?;
    }

    Ok(handlebars)
}

pub fn render<T: Serialize>(handlebars: &Handlebars, name: &str, data: &T) -> CustomResult<String> {
    handlebars.render(name, data).context(RenderSnafu { name })
}

/// look up a stored rally, a missing rally is reported by id
pub fn stored_rally(conn: &mut SqliteConnection, rally_id: i64) -> CustomResult<Rally> {
    match Rally::get_by_rally_id(conn, rally_id) {
        Ok(rally) => Ok(rally),
        Err(diesel::result::Error::NotFound) => RallyNotFoundSnafu { rally_id }.fail(),
        Err(error) => Err(error.into()),
    }
}

/// writes rendered reports below the configured report directories
pub struct ReportWriter<'a> {
    config: &'a Config,
    handlebars: Handlebars<'static>,
}

impl<'a> ReportWriter<'a> {
    pub fn new(config: &'a Config) -> CustomResult<ReportWriter<'a>> {
        Ok(ReportWriter {
            config,
            handlebars: registry()?,
        })
    }

    /// # write report
    /// render the markdown and/or csv version of a report, depending on the
    /// configured format
    ///
    /// ## Arguments
    /// * `template` - name of the markdown template
    /// * `file_name` - file name without extension
    /// * `data` - the template data
    /// * `records` - the csv rows, the first one is the header
    ///
    /// ## Returns
    /// * `Vec<PathBuf>` - the files written
    pub fn write<T: Serialize>(
        &self,
        template: &str,
        file_name: &str,
        data: &T,
        records: impl FnOnce() -> Vec<Vec<String>>,
    ) -> CustomResult<Vec<PathBuf>> {
        let format = self.config.report.format;
        let mut written = Vec::new();

        if format.markdown() {
            let content = render(&self.handlebars, template, data)?;
            let path = self.config.markdown_dir().join(format!("{file_name}.md"));
            write_file(&path, &content)?;
            written.push(path);
        }

        if format.csv() {
            let path = self.config.csv_dir().join(format!("{file_name}.csv"));
            write_csv(&path, self.config.report_delimiter(), &records())?;
            written.push(path);
        }

        for path in &written {
            info!(target: "reports:write", "wrote {}", path.display());
        }

        Ok(written)
    }
}

fn write_file(path: &Path, content: &str) -> CustomResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context(FileSnafu { path: parent })?;
    }
    fs::write(path, content).context(FileSnafu { path })
}

pub fn write_csv(path: &Path, delimiter: u8, records: &[Vec<String>]) -> CustomResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context(FileSnafu { path: parent })?;
    }

    let file = path.display().to_string();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context(CsvSnafu { file: file.as_str() })?;

    for record in records {
        writer.write_record(record).context(CsvSnafu { file: file.as_str() })?;
    }
    writer
        .flush()
        .context(FileSnafu { path })?;

    Ok(())
}

/// format an optional number, `-` when missing
pub fn optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}
