//! Acquisition: download dataset archives and unpack them into the data directory.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::AcquireConfig;
use crate::error::{StatsError, StatsResult};

/// Join the base URL and an archive name with exactly one `/`.
pub fn archive_url(base_url: &str, file_name: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        file_name.trim_start_matches('/')
    )
}

/// GET `url` and store the body at `dest`. Non-2xx responses are errors.
pub fn download(client: &reqwest::blocking::Client, url: &str, dest: &Path) -> StatsResult<u64> {
    log::info!("Downloading: {url}");
    let http_err = |source: reqwest::Error| StatsError::Http {
        url: url.to_string(),
        source,
    };

    let bytes = client
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .map_err(http_err)?;

    let mut file = File::create(dest).map_err(|e| StatsError::io(dest, e))?;
    file.write_all(&bytes).map_err(|e| StatsError::io(dest, e))?;
    log::info!("Saved {} bytes to: {}", bytes.len(), dest.display());
    Ok(bytes.len() as u64)
}

/// Extract every entry of `archive` into `out_dir`.
///
/// Entries whose names would land outside `out_dir` are skipped.
/// Returns the paths of the extracted files.
pub fn extract_archive(archive: &Path, out_dir: &Path) -> StatsResult<Vec<PathBuf>> {
    log::info!("Extracting: {}", archive.display());
    let file = File::open(archive).map_err(|e| StatsError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file)?;

    let mut extracted = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Skipping unsafe archive entry {}", entry.name());
            continue;
        };
        let out_path = out_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| StatsError::io(&out_path, e))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StatsError::io(parent, e))?;
        }
        let mut out = File::create(&out_path).map_err(|e| StatsError::io(&out_path, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| StatsError::io(&out_path, e))?;
        extracted.push(out_path);
    }

    log::info!("Extracted {} files to: {}", extracted.len(), out_dir.display());
    Ok(extracted)
}

/// Download and extract every configured archive into `data_dir`.
pub fn fetch_all(config: &AcquireConfig, data_dir: &Path) -> StatsResult<Vec<PathBuf>> {
    std::fs::create_dir_all(data_dir).map_err(|e| StatsError::io(data_dir, e))?;
    let client = reqwest::blocking::Client::new();

    let mut extracted = Vec::new();
    for (label, file_name) in &config.files {
        let url = archive_url(&config.base_url, file_name);
        let zip_path = data_dir.join(format!("{label}.zip"));
        download(&client, &url, &zip_path)?;
        extracted.extend(extract_archive(&zip_path, data_dir)?);
    }
    Ok(extracted)
}
