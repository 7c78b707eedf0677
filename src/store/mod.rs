mod memory;
mod s3;
mod types;

pub use memory::{MemoryStore, StoredObject};
pub use s3::S3Store;
pub use types::{ObjectSummary, PutObject, RemoteStore, StoreError};
