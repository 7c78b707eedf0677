#![allow(dead_code)]

use async_trait::async_trait;
use s3site::config::SyncConfig;
use s3site::site::Site;
use s3site::store::{MemoryStore, ObjectSummary, PutObject, RemoteStore, StoreError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;
use zip::write::SimpleFileOptions;

/// `console.log('hello');` compressed with gzip
pub const GZIPPED_JS: &[u8] = &[
    0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x03, 0x4b, 0xce, 0xcf, 0x2b, 0xce,
    0xcf, 0x49, 0xd5, 0xcb, 0xc9, 0x4f, 0xd7, 0x50, 0xcf, 0x48, 0xcd, 0xc9, 0xc9, 0x57, 0xd7,
    0xb4, 0xe6, 0x02, 0x00, 0x09, 0x79, 0x6c, 0x03, 0x16, 0x00, 0x00, 0x00,
];

pub const INDEX_HTML: &[u8] = b"<!DOCTYPE html>\n<html><body>hello</body></html>\n";

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write a zip archive holding `files` and return its path
pub fn write_archive(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).expect("Should create archive");
    let mut writer = zip::ZipWriter::new(file);

    for (name, content) in files {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("Should start file");
        writer.write_all(content).expect("Should write file");
    }

    writer.finish().expect("Should finish archive");
    path
}

/// Engine configuration staging under `dir`
pub fn test_config(dir: &Path) -> SyncConfig {
    SyncConfig {
        staging_root: dir.join("staging"),
        parallelism: 4,
        ..Default::default()
    }
}

/// A site engine over `store`, staging under `dir`
pub fn test_site(store: Arc<dyn RemoteStore>, dir: &Path) -> Site {
    Site::new(store, test_config(dir))
}

/// Store that rejects uploads of one key and records every delete
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_key: String,
    pub slow_key: Option<String>,
    pub deletes: Mutex<Vec<String>>,
}

impl FailingStore {
    pub fn new(fail_key: &str) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_key: fail_key.to_string(),
            slow_key: None,
            deletes: Mutex::new(Vec::new()),
        }
    }

    /// Uploads of `slow_key` take long enough to still be running when `fail_key` fails
    pub fn with_slow_key(mut self, slow_key: &str) -> Self {
        self.slow_key = Some(slow_key.to_string());
        self
    }
}

#[async_trait]
impl RemoteStore for FailingStore {
    async fn list(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        self.inner.list(bucket).await
    }

    async fn put(&self, bucket: &str, object: PutObject) -> Result<(), StoreError> {
        if object.key == self.fail_key {
            return Err(StoreError::Upload {
                key: object.key,
                message: "access denied".to_string(),
            });
        }
        if self.slow_key.as_deref() == Some(object.key.as_str()) {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        self.inner.put(bucket, object).await
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        self.deletes.lock().await.push(key.to_string());
        self.inner.delete(bucket, key).await
    }
}
