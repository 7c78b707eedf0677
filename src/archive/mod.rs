//! Archive extraction into a per-invocation staging directory.
//!
//! `extract_archive` unpacks a zip archive into a fresh directory under the
//! configured staging root and returns an [`Extraction`] listing every
//! regular file. The staging directory lives exactly as long as the
//! `Extraction`, so dropping it cleans up on every exit path.

use crate::state::FileEntry;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed archive {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive entry escapes the extraction root: {0}")]
    UnsafePath(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to walk staging directory: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Extraction task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

/// Files of one extracted archive plus the staging directory holding them
#[derive(Debug)]
pub struct Extraction {
    pub entries: Vec<FileEntry>,
    staging: TempDir,
}

impl Extraction {
    /// Root the entries' relative paths are relative to
    pub fn root(&self) -> &Path {
        self.staging.path()
    }

    /// Find an entry by its relative path
    pub fn find(&self, relative_path: &str) -> Option<&FileEntry> {
        self.entries
            .binary_search_by(|e| e.relative_path.as_str().cmp(relative_path))
            .ok()
            .map(|i| &self.entries[i])
    }
}

/// Extract `archive` into a new directory under `staging_root`
pub async fn extract_archive(
    archive: &Path,
    staging_root: &Path,
) -> Result<Extraction, ExtractionError> {
    let archive = archive.to_path_buf();
    let staging_root = staging_root.to_path_buf();
    tokio::task::spawn_blocking(move || extract_archive_blocking(&archive, &staging_root)).await?
}

fn extract_archive_blocking(
    archive: &Path,
    staging_root: &Path,
) -> Result<Extraction, ExtractionError> {
    debug!(path = %archive.display(), "Extracting archive");

    std::fs::create_dir_all(staging_root)?;
    let staging = tempfile::Builder::new()
        .prefix("site-")
        .tempdir_in(staging_root)?;

    let file = File::open(archive).map_err(|source| ExtractionError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let malformed = |source| ExtractionError::Malformed {
        path: archive.to_path_buf(),
        source,
    };
    let mut zip = zip::ZipArchive::new(file).map_err(malformed)?;

    for index in 0..zip.len() {
        let mut item = zip.by_index(index).map_err(malformed)?;
        let Some(relative) = item.enclosed_name() else {
            return Err(ExtractionError::UnsafePath(item.name().to_string()));
        };
        let target = staging.path().join(relative);

        if item.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        std::io::copy(&mut item, &mut out)?;
    }

    let entries = scan_files(staging.path())?;
    debug!(files = entries.len(), root = %staging.path().display(), "Archive extracted");

    Ok(Extraction { entries, staging })
}

/// List regular files below `root`, sorted by relative path
fn scan_files(root: &Path) -> Result<Vec<FileEntry>, ExtractionError> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        entries.push(FileEntry::new(entry.path().to_path_buf(), relative_path));
    }

    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(entries)
}
