use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::{error, info};
use snafu::ResultExt;

use rally_points::errors::{CustomResult, FileSnafu};
use rally_points::modules::catalog::{load_cars, seed_catalog};
use rally_points::modules::config::Config;
use rally_points::modules::helpers::logging::setup_logging;
use rally_points::modules::ingest::ingest_from_dir;
use rally_points::modules::models::general::establish_connection;
use rally_points::modules::rally_api::grab_rally;
use rally_points::modules::reports::{class_report, driver_report, points_report, season_summary};

#[derive(Parser, Debug)]
#[command(author, version, about = "Rally points and championship standings", long_about = None)]
struct Cli {
    /// Settings file
    #[arg(long, env = "RALLY_POINTS_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the result exports of a rally
    Grab { rally_id: i64 },
    /// Store a downloaded rally
    Create {
        rally_id: i64,
        /// Replace the rally when it is already stored
        #[arg(long)]
        replace: bool,
    },
    /// Rally results with points and the championship standings
    Report { rally_id: i64 },
    /// Season statistics per driver
    Summary,
    /// Per driver metrics and stage results of a rally
    Driver { rally_id: i64 },
    /// Rally results and championship per class
    Class { rally_id: i64 },
    /// Grab, create and report a rally in one go
    All { rally_id: i64 },
}

fn run(cli: Cli) -> CustomResult<()> {
    let config = Config::load(&cli.config)?;
    for directory in config.directories() {
        fs::create_dir_all(&directory).context(FileSnafu { path: &directory })?;
    }

    let conn = &mut establish_connection(&config.database_path().display().to_string())?;
    seed_catalog(
        conn,
        || load_cars(&config.cars_catalog_path()),
        &config.classes,
        config.general.classes_type,
    )?;

    let written = match cli.command {
        Command::Grab { rally_id } => {
            grab_rally(&config, rally_id)?;
            Vec::new()
        }
        Command::Create { rally_id, replace } => {
            ingest_from_dir(conn, &config, rally_id, replace)?;
            Vec::new()
        }
        Command::Report { rally_id } => points_report::export(conn, &config, rally_id)?,
        Command::Summary => season_summary::export(conn, &config)?,
        Command::Driver { rally_id } => driver_report::export(conn, &config, rally_id)?,
        Command::Class { rally_id } => class_report::export(conn, &config, rally_id)?,
        Command::All { rally_id } => {
            grab_rally(&config, rally_id)?;
            ingest_from_dir(conn, &config, rally_id, true)?;

            let mut written = points_report::export(conn, &config, rally_id)?;
            written.extend(season_summary::export(conn, &config)?);
            written.extend(driver_report::export(conn, &config, rally_id)?);
            written.extend(class_report::export(conn, &config, rally_id)?);
            written
        }
    };

    for path in written {
        println!("{}", path.display());
    }

    Ok(())
}

fn main() {
    if let Err(error) = setup_logging() {
        eprintln!("{error}");
        process::exit(1);
    }

    let cli = Cli::parse();
    info!(target: "main", "running {:?}", cli.command);

    if let Err(error) = run(cli) {
        error!(target: "main", "{}", error);
        process::exit(1);
    }
}
