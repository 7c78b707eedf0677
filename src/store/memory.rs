use super::types::{ObjectSummary, PutObject, RemoteStore, StoreError};
use crate::utils::compute_fingerprint;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

/// An object held by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub object: PutObject,
    /// Quoted, the way S3 reports it
    pub etag: String,
}

/// In-process object store, used for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: Mutex<HashMap<String, BTreeMap<String, StoredObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bucket, keeping its contents if it already exists
    pub async fn create_bucket(&self, bucket: &str) {
        self.buckets
            .lock()
            .await
            .entry(bucket.to_string())
            .or_default();
    }

    /// Remove a bucket and everything in it
    pub async fn remove_bucket(&self, bucket: &str) {
        self.buckets.lock().await.remove(bucket);
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.buckets
            .lock()
            .await
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
    }

    /// Keys in `bucket`, sorted; empty if the bucket does not exist
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .lock()
            .await
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        let buckets = self.buckets.lock().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NotFound(bucket.to_string()))?;

        Ok(objects
            .iter()
            .map(|(key, stored)| ObjectSummary {
                key: key.clone(),
                etag: stored.etag.clone(),
            })
            .collect())
    }

    async fn put(&self, bucket: &str, object: PutObject) -> Result<(), StoreError> {
        let mut buckets = self.buckets.lock().await;
        let objects = buckets.get_mut(bucket).ok_or_else(|| StoreError::Upload {
            key: object.key.clone(),
            message: format!("bucket {bucket} does not exist"),
        })?;

        let etag = format!("\"{}\"", compute_fingerprint(&object.body));
        objects.insert(object.key.clone(), StoredObject { object, etag });
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let mut buckets = self.buckets.lock().await;
        let objects = buckets.get_mut(bucket).ok_or_else(|| StoreError::Delete {
            key: key.to_string(),
            message: format!("bucket {bucket} does not exist"),
        })?;

        objects.remove(key);
        Ok(())
    }
}
