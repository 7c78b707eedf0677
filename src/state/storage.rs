use super::types::SiteState;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read state: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse state: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Read a state file, `None` if it does not exist yet
pub async fn read_state(path: &Path) -> Result<Option<SiteState>, StateError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).await?;
    let state: SiteState = serde_json::from_str(&content)?;
    Ok(Some(state))
}

/// Write a state file atomically using temp file + rename
pub async fn write_state(path: &Path, state: &SiteState) -> Result<(), StateError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let temp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&temp_path, &content).await?;
    fs::rename(&temp_path, path).await?;

    Ok(())
}

/// Remove a state file if present
pub async fn remove_state(path: &Path) -> Result<(), StateError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
