use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("database error: {source}"))]
    DatabaseError { source: diesel::result::Error },

    #[snafu(display("could not open database {path}: {source}"))]
    ConnectionError {
        path: String,
        source: diesel::ConnectionError,
    },

    #[snafu(display("rally {rally_id} already exists"))]
    AlreadyExistsError { rally_id: i64 },

    #[snafu(display("rally {rally_id} not found"))]
    RallyNotFoundError { rally_id: i64 },

    #[snafu(display("could not access {}: {source}", path.display()))]
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("could not read csv {file}: {source}"))]
    CsvError { file: String, source: csv::Error },

    #[snafu(display("row {row} of {file} has {found} columns, expected at least {expected}"))]
    MissingColumnsError {
        file: String,
        row: usize,
        found: usize,
        expected: usize,
    },

    #[snafu(display("car {name:?} (slug {slug:?}) is not in the car catalog"))]
    UnknownCarError { name: String, slug: String },

    #[snafu(display("invalid car catalog: {message}"))]
    InvalidCatalogError { message: String },

    #[snafu(display("could not parse car catalog {}: {source}", path.display()))]
    CatalogParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("invalid rally description: {message}"))]
    InvalidRallyError { message: String },

    #[snafu(display("could not parse {}: {source}", path.display()))]
    TomlParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[snafu(display("could not serialize rally description: {source}"))]
    TomlWriteError { source: toml::ser::Error },

    #[snafu(display("invalid configuration: {message}"))]
    InvalidConfigError { message: String },

    #[snafu(display("no finishers found for rally {rally_id}"))]
    NoFinishersError { rally_id: i64 },

    #[snafu(display("request to {url} failed: {source}"))]
    HttpError { url: String, source: reqwest::Error },

    #[snafu(display("bad status code {status} for {url}"))]
    BadStatusError { url: String, status: u16 },

    #[snafu(display("invalid report template {name}: {source}"))]
    TemplateError {
        name: String,
        source: handlebars::TemplateError,
    },

    #[snafu(display("could not render report {name}: {source}"))]
    RenderError {
        name: String,
        source: handlebars::RenderError,
    },

    #[snafu(display("could not set up logging: {source}"))]
    LoggingError { source: fern::InitError },
}

impl From<diesel::result::Error> for Error {
    fn from(source: diesel::result::Error) -> Self {
        Error::DatabaseError { source }
    }
}

pub type CustomResult<T> = Result<T, Error>;
