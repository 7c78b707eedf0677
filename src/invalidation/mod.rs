//! Cache invalidation for the distribution in front of a site bucket.
//!
//! One apply issues one batch covering every file of its input set. The
//! resource has nothing to read, update or delete afterwards.

mod cloudfront;

pub use cloudfront::CloudFrontInvalidator;

use crate::state::{decode_key, StateMap};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Error, Debug)]
pub enum InvalidationError {
    #[error("Failed to build invalidation request: {0}")]
    Request(String),

    #[error("Invalidation for distribution {distribution_id} failed: {message}")]
    Rejected {
        distribution_id: String,
        message: String,
    },
}

/// Paths to invalidate plus the token that makes the request unique
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidationBatch {
    pub caller_reference: String,
    pub paths: Vec<String>,
}

/// Something that can invalidate cached paths of a distribution
#[async_trait]
pub trait Invalidator: Send + Sync {
    /// Submit one batch and return the invalidation id
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        batch: InvalidationBatch,
    ) -> Result<String, InvalidationError>;
}

/// Build a batch for the decoded paths of `files`
pub fn build_invalidation_batch(files: &StateMap) -> InvalidationBatch {
    InvalidationBatch {
        caller_reference: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
        paths: files.keys().map(|key| format!("/{}", decode_key(key))).collect(),
    }
}

/// Invalidate every file of `files`, `None` when there is nothing to invalidate
pub async fn invalidate_files(
    invalidator: &dyn Invalidator,
    distribution_id: &str,
    files: &StateMap,
) -> Result<Option<String>, InvalidationError> {
    if files.is_empty() {
        return Ok(None);
    }

    let batch = build_invalidation_batch(files);
    info!(
        distribution_id = %distribution_id,
        paths = batch.paths.len(),
        "Creating invalidation request"
    );

    let id = invalidator
        .create_invalidation(distribution_id, batch)
        .await?;
    Ok(Some(id))
}

/// Keeps submitted batches in memory instead of sending them
#[derive(Debug, Default)]
pub struct RecordingInvalidator {
    batches: Mutex<Vec<(String, InvalidationBatch)>>,
}

impl RecordingInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches submitted so far with their distribution ids
    pub async fn batches(&self) -> Vec<(String, InvalidationBatch)> {
        self.batches.lock().await.clone()
    }
}

#[async_trait]
impl Invalidator for RecordingInvalidator {
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        batch: InvalidationBatch,
    ) -> Result<String, InvalidationError> {
        let mut batches = self.batches.lock().await;
        batches.push((distribution_id.to_string(), batch));
        Ok(format!("I{}", batches.len()))
    }
}
