use crate::utils::STAGING_FOLDER;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn default_staging_root() -> PathBuf {
    std::env::temp_dir().join(STAGING_FOLDER)
}

/// Default number of uploads or deletes in flight at once
fn default_parallelism() -> usize {
    8
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Parent directory of the per-run staging directories
    #[serde(default = "default_staging_root")]
    pub staging_root: PathBuf,
    /// Upper bound on concurrent store calls during apply (at least 1)
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            staging_root: default_staging_root(),
            parallelism: default_parallelism(),
            endpoint_url: None,
            region: None,
            force_path_style: false,
        }
    }
}

impl SyncConfig {
    /// Parallelism clamped to at least one worker
    pub fn workers(&self) -> usize {
        self.parallelism.max(1)
    }
}

/// Read a configuration file, `None` if it does not exist
pub async fn read_config(path: &Path) -> Result<Option<SyncConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).await?;
    let config: SyncConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}

/// Write a configuration file
pub async fn write_config(path: &Path, config: &SyncConfig) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content).await?;
    Ok(())
}

/// Load the shared AWS configuration, applying region and endpoint overrides
pub async fn load_aws_config(config: &SyncConfig) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    loader.load().await
}
