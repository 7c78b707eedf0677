mod hash;

pub use hash::{clean_etag, compute_file_fingerprint, compute_fingerprint, HashError, PART_SIZE};

/// Name of the directory under the system temp dir used for staging by default
pub const STAGING_FOLDER: &str = "s3site";

/// Default state file written by the CLI
pub const STATE_FILE: &str = "s3site.state.json";

/// Get current timestamp in ISO 8601 format
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
