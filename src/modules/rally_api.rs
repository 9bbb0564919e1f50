use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use reqwest::blocking::Client;
use snafu::ResultExt;

use crate::errors::{BadStatusSnafu, CustomResult, FileSnafu, HttpSnafu};
use crate::modules::config::{Config, RallyDescription, RALLY_ID_PLACEHOLDER};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// fill the rally id into a url template
pub fn rally_url(template: &str, rally_id: i64) -> String {
    template.replace(RALLY_ID_PLACEHOLDER, &rally_id.to_string())
}

pub fn client() -> CustomResult<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .context(HttpSnafu { url: String::new() })
}

/// # download a file
/// fetch `url` and write the body to `path`. any status outside 2xx is an error.
pub fn download(client: &Client, url: &str, path: &Path) -> CustomResult<u64> {
    info!(target: "rally_api:download", "downloading {} to {}", url, path.display());

    let response = client.get(url).send().context(HttpSnafu { url })?;
    let status = response.status();
    if !status.is_success() {
        return BadStatusSnafu { url, status: status.as_u16() }.fail();
    }

    let body = response.bytes().context(HttpSnafu { url })?;
    fs::write(path, &body).context(FileSnafu { path })?;

    Ok(body.len() as u64)
}

/// # write a description skeleton
/// write a rally description to fill in by hand, an existing file is left alone
///
/// ## Returns
/// * `bool` - true when a new file was written
pub fn write_description_skeleton(path: &Path, rally_id: i64) -> CustomResult<bool> {
    if path.exists() {
        return Ok(false);
    }

    let content = RallyDescription::skeleton(rally_id).to_toml()?;
    fs::write(path, content).context(FileSnafu { path })?;
    Ok(true)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabSummary {
    pub stage_file: PathBuf,
    pub overall_file: PathBuf,
    pub description_written: bool,
}

/// # grab a rally
/// download both result exports of a rally into its download directory
pub fn grab_rally(config: &Config, rally_id: i64) -> CustomResult<GrabSummary> {
    let directory = config.rally_dir(rally_id);
    fs::create_dir_all(&directory).context(FileSnafu { path: &directory })?;

    let client = client()?;

    let stage_file = config.stage_file_path(rally_id);
    download(&client, &rally_url(&config.download.stage_url, rally_id), &stage_file)?;

    let overall_file = config.overall_file_path(rally_id);
    download(&client, &rally_url(&config.download.overall_url, rally_id), &overall_file)?;

    let description_written = write_description_skeleton(&config.rally_description_path(rally_id), rally_id)?;
    if description_written {
        info!(
            target: "rally_api:grab_rally",
            "wrote description skeleton for rally {}, fill it in before creating the rally",
            rally_id
        );
    }

    Ok(GrabSummary {
        stage_file,
        overall_file,
        description_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_in_rally_id() {
        assert_eq!(
            rally_url("https://example.com/export.php?rally_id={rally_id}&cg=7", 81234),
            "https://example.com/export.php?rally_id=81234&cg=7"
        );
    }

    #[test]
    fn skeleton_is_written_once() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("5.toml");

        assert!(write_description_skeleton(&path, 5).unwrap());
        fs::write(&path, "edited").unwrap();
        assert!(!write_description_skeleton(&path, 5).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "edited");
    }
}
