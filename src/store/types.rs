use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Bucket {0} does not exist")]
    NotFound(String),

    #[error("Failed to list bucket {bucket}: {message}")]
    List { bucket: String, message: String },

    #[error("Failed to upload {key}: {message}")]
    Upload { key: String, message: String },

    #[error("Failed to delete {key}: {message}")]
    Delete { key: String, message: String },
}

/// One entry of a bucket listing
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    /// ETag as the store reports it, possibly quoted
    pub etag: String,
}

/// An object to upload together with its delivery metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PutObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub cache_control: Option<String>,
    pub expires: Option<String>,
}

/// Object store primitives the reconciliation core depends on
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List every object in `bucket`.
    /// Fails with `StoreError::NotFound` when the bucket does not exist.
    async fn list(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StoreError>;

    /// Upload a single object, replacing any existing one under the same key.
    async fn put(&self, bucket: &str, object: PutObject) -> Result<(), StoreError>;

    /// Delete a single object.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError>;
}
