use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Encoded key -> fingerprint
pub type StateMap = BTreeMap<String, String>;

/// A regular file discovered in an extracted archive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileEntry {
    /// Location inside the staging directory
    pub full_path: PathBuf,
    /// Path relative to the extraction root, always `/`-separated
    pub relative_path: String,
    pub fingerprint: String,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub cache_control: Option<String>,
    pub expires: Option<String>,
}

impl FileEntry {
    pub fn new(full_path: PathBuf, relative_path: String) -> Self {
        Self {
            full_path,
            relative_path,
            ..Default::default()
        }
    }

    /// Final path component of the relative path
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// Recorded state of one site resource, as the provisioning tool keeps it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteState {
    pub schema_version: u32,
    /// Resource identity; `None` once the bucket has disappeared
    pub id: Option<String>,
    pub bucket: String,
    pub path: String,
    #[serde(default)]
    pub exclude: String,
    #[serde(default)]
    pub files: StateMap,
    pub updated_at: String,
}

impl SiteState {
    pub fn new(
        bucket: impl Into<String>,
        path: impl Into<String>,
        exclude: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: 1,
            id: None,
            bucket: bucket.into(),
            path: path.into(),
            exclude: exclude.into(),
            files: StateMap::new(),
            updated_at: crate::utils::now_iso(),
        }
    }
}
