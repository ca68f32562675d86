//! Dataset acquisition.
//!
//! The raw churn CSV is downloaded over HTTP into the raw data directory.
//! Kaggle serves datasets as zip archives; every `.csv` entry is extracted
//! flat into the directory. Any other payload is stored as-is under
//! [`RAW_CSV_NAME`].

use crate::config::PipelineConfig;
use crate::error::{ChurnError, Result};
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// File name for a non-archive download.
pub const RAW_CSV_NAME: &str = "customer_churn.csv";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Download the dataset and return the raw CSV the pipeline should read.
///
/// When `KAGGLE_USERNAME` and `KAGGLE_KEY` are set they are sent as basic
/// auth credentials.
pub fn fetch_dataset(config: &PipelineConfig) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.raw_dir)?;

    info!(url = %config.dataset_url, "downloading dataset");
    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?;
    let mut request = client.get(&config.dataset_url);
    match kaggle_credentials() {
        Some((username, key)) => request = request.basic_auth(username, Some(key)),
        None => warn!("KAGGLE_USERNAME/KAGGLE_KEY not set, downloading anonymously"),
    }

    let bytes = request.send()?.error_for_status()?.bytes()?;
    info!(bytes = bytes.len(), "download complete");

    let written = store_payload(&bytes, &config.raw_dir)?;
    info!(files = ?written, "stored raw dataset");
    find_raw_csv(&config.raw_dir)
}

fn kaggle_credentials() -> Option<(String, String)> {
    let username = std::env::var("KAGGLE_USERNAME").ok()?;
    let key = std::env::var("KAGGLE_KEY").ok()?;
    Some((username, key))
}

/// Write a downloaded payload into `dir`, unpacking zip archives.
pub fn store_payload(bytes: &[u8], dir: &Path) -> Result<Vec<PathBuf>> {
    if bytes.is_empty() {
        return Err(ChurnError::Download("empty response body".to_string()));
    }
    if bytes.starts_with(ZIP_MAGIC) {
        return extract_csv_entries(bytes, dir);
    }
    let target = dir.join(RAW_CSV_NAME);
    std::fs::write(&target, bytes)?;
    Ok(vec![target])
}

/// Extract every `.csv` entry of a zip archive into `dir`.
///
/// Entry directories are flattened; entries whose names escape the archive
/// root are skipped.
pub fn extract_csv_entries(bytes: &[u8], dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut written = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let Some(path) = entry.enclosed_name() else {
            warn!(name = entry.name(), "skipping archive entry with unsafe path");
            continue;
        };
        let Some(file_name) = path.file_name().map(|n| n.to_os_string()) else {
            continue;
        };
        if !has_csv_extension(Path::new(&file_name)) {
            continue;
        }

        let target = dir.join(&file_name);
        let mut out = File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;
        written.push(target);
    }

    if written.is_empty() {
        return Err(ChurnError::Download(
            "archive contains no CSV file".to_string(),
        ));
    }
    Ok(written)
}

/// The raw CSV in `dir`: the first file (by name) whose name contains
/// `train`, otherwise the first `.csv` file.
pub fn find_raw_csv(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(ChurnError::MissingArtifact {
            path: dir.to_path_buf(),
        });
    }
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_csv_extension(path))
        .collect();
    candidates.sort();
    let training = candidates.iter().position(|path| {
        path.file_name()
            .map_or(false, |name| name.to_string_lossy().to_lowercase().contains("train"))
    });
    match training {
        Some(i) => Ok(candidates.swap_remove(i)),
        None => candidates
            .into_iter()
            .next()
            .ok_or_else(|| ChurnError::MissingArtifact {
                path: dir.join("*.csv"),
            }),
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
}
