//! End-to-end task run: load the dataset, apply tasks, persist the result.
//!
//! A run either completes the whole task list and replaces the destination
//! atomically, or fails without touching the destination.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::codec::{DatasetReader, DatasetWriter};
use crate::dataset::GeoSiteList;
use crate::engine::{apply_tasks, ApplyReport};
use crate::{Error, Result, TaskList};

/// Timeout for downloading a remote source dataset.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Overrides and switches for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Replaces the task file's `src`
    pub src_override: Option<String>,
    /// Replaces the task file's `dst`
    pub dst_override: Option<PathBuf>,
    /// Apply and encode, but do not write the destination
    pub dry_run: bool,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: ApplyReport,
    pub destination: PathBuf,
    /// Encoded size of the output in bytes
    pub output_size: usize,
    /// SHA-256 of the encoded output, hex
    pub sha256: String,
    /// Whether the destination was written
    pub written: bool,
}

/// Run a task list.
pub fn run(task_list: &TaskList, options: &RunOptions) -> Result<RunSummary> {
    let src = options
        .src_override
        .as_deref()
        .unwrap_or(task_list.src.as_str());
    let destination = options
        .dst_override
        .clone()
        .unwrap_or_else(|| PathBuf::from(&task_list.dst));

    if src.is_empty() {
        return Err(Error::Config("no source dataset given".to_string()));
    }
    if destination.as_os_str().is_empty() {
        return Err(Error::Config("no destination path given".to_string()));
    }

    let mut dataset = load_dataset(src)?;
    log::info!(
        "Loaded {} entries ({} domains) from {}",
        dataset.len(),
        dataset.domain_count(),
        src
    );

    let report = apply_tasks(&mut dataset, &task_list.tasks);
    log::info!("{}", report);

    let data = encode_for(&destination, &dataset)?;
    let sha256 = hex_digest(&data);

    let written = if options.dry_run {
        log::info!("Dry run, not writing {:?}", destination);
        false
    } else {
        write_atomic(&destination, &data)?;
        log::info!(
            "Wrote {:?} ({} bytes, sha256 {})",
            destination,
            data.len(),
            sha256
        );
        true
    };

    Ok(RunSummary {
        report,
        destination,
        output_size: data.len(),
        sha256,
        written,
    })
}

/// Whether `src` names a remote dataset.
pub fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Load a dataset from a local path or an http(s) URL.
pub fn load_dataset(src: &str) -> Result<GeoSiteList> {
    if is_remote(src) {
        let data = download(src)?;
        return DatasetReader::from_bytes(&data);
    }
    DatasetReader::open(Path::new(src))
}

fn download(url: &str) -> Result<Vec<u8>> {
    log::info!("Downloading {}", url);
    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    let data = response.bytes()?;
    log::debug!("Downloaded {} bytes", data.len());
    Ok(data.to_vec())
}

/// Encode for the destination, gzip-compressing `.gz` paths.
fn encode_for(destination: &Path, dataset: &GeoSiteList) -> Result<Vec<u8>> {
    let gzip = destination
        .extension()
        .map(|e| e.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);
    let mut writer = DatasetWriter::new();
    if gzip {
        writer.encode_gzip(dataset)
    } else {
        writer.encode(dataset)
    }
}

/// Write via a temp file in the destination directory, then rename.
fn write_atomic(destination: &Path, data: &[u8]) -> Result<()> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
    temp.write_all(data)?;
    if let Some(permissions) = output_permissions(destination) {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.as_file().sync_all()?;
    temp.persist(destination).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Permissions for the output: the existing destination's, else 0644.
#[cfg(unix)]
fn output_permissions(destination: &Path) -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = fs::metadata(destination)
        .map(|m| m.permissions())
        .unwrap_or_else(|_| fs::Permissions::from_mode(0o644));
    Some(permissions)
}

#[cfg(not(unix))]
fn output_permissions(destination: &Path) -> Option<fs::Permissions> {
    fs::metadata(destination).ok().map(|m| m.permissions())
}

fn hex_digest(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/geosite.dat"));
        assert!(is_remote("http://example.com/geosite.dat"));
        assert!(!is_remote("./geosite.dat"));
        assert!(!is_remote("/srv/http://geosite.dat"));
    }

    #[test]
    fn test_hex_digest() {
        assert_eq!(
            hex_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_missing_source_is_config_error() {
        let list = TaskList::default();
        let err = run(&list, &RunOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_write_atomic_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.dat");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_new_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.dat");

        write_atomic(&path, b"data").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
