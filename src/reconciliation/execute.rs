use super::plan::ReconciliationPlan;
use crate::archive::Extraction;
use crate::metadata::{decorate, MetadataError};
use crate::state::decode_key;
use crate::store::{PutObject, RemoteStore, StoreError};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Metadata error: {0}")]
    MetadataError(#[from] MetadataError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("No extracted file for key {0}")]
    MissingFile(String),
}

/// Result of applying a plan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationResult {
    /// Object keys uploaded, sorted
    pub put: Vec<String>,
    /// Object keys deleted, sorted
    pub deleted: Vec<String>,
}

/// Apply a plan against `bucket`.
///
/// Uploads run first, at most `workers` at a time. After the first failure no
/// new upload starts, uploads already in flight run to completion and the
/// first error is returned. Deletes are only issued once every upload succeeded.
pub async fn execute_reconciliation(
    store: &dyn RemoteStore,
    bucket: &str,
    plan: &ReconciliationPlan,
    extraction: &Extraction,
    workers: usize,
) -> Result<ReconciliationResult, ExecuteError> {
    let workers = workers.max(1);
    info!(
        bucket = %bucket,
        puts = plan.to_put.len(),
        deletes = plan.to_delete.len(),
        "Applying reconciliation plan"
    );

    let failed = AtomicBool::new(false);
    let failed = &failed;
    let outcomes: Vec<Result<Option<String>, ExecuteError>> = stream::iter(&plan.to_put)
        .map(|key| async move {
            if failed.load(Ordering::SeqCst) {
                return Ok(None);
            }
            let outcome = put_file(store, bucket, extraction, key).await;
            if outcome.is_err() {
                failed.store(true, Ordering::SeqCst);
            }
            outcome.map(Some)
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    let mut put = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        if let Some(key) = outcome? {
            put.push(key);
        }
    }
    put.sort();

    let keys: Vec<String> = plan.to_delete.iter().map(|key| decode_key(key)).collect();
    let deleted = delete_objects(store, bucket, keys, workers).await?;

    Ok(ReconciliationResult { put, deleted })
}

/// Delete every object currently in `bucket`
pub async fn delete_all_objects(
    store: &dyn RemoteStore,
    bucket: &str,
    workers: usize,
) -> Result<Vec<String>, ExecuteError> {
    let keys: Vec<String> = store
        .list(bucket)
        .await?
        .into_iter()
        .map(|object| object.key)
        .collect();

    info!(bucket = %bucket, objects = keys.len(), "Clearing bucket");
    delete_objects(store, bucket, keys, workers.max(1)).await
}

async fn delete_objects(
    store: &dyn RemoteStore,
    bucket: &str,
    keys: Vec<String>,
    workers: usize,
) -> Result<Vec<String>, ExecuteError> {
    let mut deleted: Vec<String> = stream::iter(keys)
        .map(|key| async move {
            debug!(bucket = %bucket, key = %key, "Deleting key");
            store.delete(bucket, &key).await?;
            Ok::<_, ExecuteError>(key)
        })
        .buffer_unordered(workers)
        .try_collect()
        .await?;
    deleted.sort();
    Ok(deleted)
}

async fn put_file(
    store: &dyn RemoteStore,
    bucket: &str,
    extraction: &Extraction,
    key: &str,
) -> Result<String, ExecuteError> {
    let relative_path = decode_key(key);
    let entry = extraction
        .find(&relative_path)
        .ok_or_else(|| ExecuteError::MissingFile(key.to_string()))?;

    let entry = decorate(entry.clone()).await?;
    let body = fs::read(&entry.full_path).await?;

    debug!(
        bucket = %bucket,
        key = %relative_path,
        content_type = ?entry.content_type,
        "Uploading file"
    );

    store
        .put(
            bucket,
            PutObject {
                key: relative_path.clone(),
                body,
                content_type: entry.content_type,
                content_encoding: entry.content_encoding,
                cache_control: entry.cache_control,
                expires: entry.expires,
            },
        )
        .await?;

    Ok(relative_path)
}
