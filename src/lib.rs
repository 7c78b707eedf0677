pub mod archive;
pub mod config;
pub mod invalidation;
pub mod metadata;
pub mod reconciliation;
pub mod site;
pub mod state;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use archive::{extract_archive, Extraction, ExtractionError};
pub use config::{read_config, SyncConfig};
pub use invalidation::{
    build_invalidation_batch, invalidate_files, CloudFrontInvalidator, InvalidationBatch,
    InvalidationError, Invalidator, RecordingInvalidator,
};
pub use metadata::{decorate, MetadataError};
pub use reconciliation::{
    build_reconciliation_plan, execute_reconciliation, ExecuteError, ReconciliationPlan,
    ReconciliationResult,
};
pub use site::{Site, SiteApply, SiteConfig, SiteError};
pub use state::{
    decode_key, encode_key, filter_state, read_state, write_state, FileEntry, SiteState, StateMap,
};
pub use store::{MemoryStore, ObjectSummary, PutObject, RemoteStore, S3Store, StoreError};
pub use utils::{clean_etag, compute_file_fingerprint, compute_fingerprint, HashError};
