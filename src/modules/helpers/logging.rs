use std::env;
use dotenvy::dotenv;
use fern::Dispatch;

use crate::errors::{CustomResult, FileSnafu, LoggingSnafu};
use snafu::ResultExt;

fn level_from_str(verbosity: &str) -> log::LevelFilter {
    match verbosity.to_uppercase().as_str() {
        "OFF" => log::LevelFilter::Off,
        "ERROR" => log::LevelFilter::Error,
        "WARN" => log::LevelFilter::Warn,
        "DEBUG" => log::LevelFilter::Debug,
        "TRACE" => log::LevelFilter::Trace,
        // default to info
        _ => log::LevelFilter::Info,
    }
}

/// # setup logging
/// log to stderr and to a log file. the level is read from `LOGGING_LEVEL`,
/// the file from `LOG_FILE` (default `rally_points.log`).
pub fn setup_logging() -> CustomResult<()> {
    dotenv().ok();
    let verbosity = env::var("LOGGING_LEVEL").unwrap_or_else(|_| "INFO".to_string());
    let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "rally_points.log".to_string());

    let base_config = Dispatch::new()
        .level(level_from_str(&verbosity))
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        });

    let file = fern::log_file(&log_file).context(FileSnafu { path: log_file.clone() })?;

    base_config
        .chain(std::io::stderr())
        .chain(file)
        .apply()
        .map_err(fern::InitError::from)
        .context(LoggingSnafu)?;

    Ok(())
}
