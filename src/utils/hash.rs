use md5::{Digest, Md5};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Part size S3 uses when it splits an upload into multiple parts (5 MiB)
pub const PART_SIZE: usize = 5 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Compute the S3-compatible ETag of a byte buffer.
///
/// Content up to `PART_SIZE` hashes to the plain hex MD5. Larger content is
/// split into `PART_SIZE` chunks; the raw MD5 digests of the chunks are
/// concatenated and hashed again, and `-<parts>` is appended.
pub fn compute_fingerprint(content: &[u8]) -> String {
    if content.len() <= PART_SIZE {
        return hex::encode(Md5::digest(content));
    }

    let mut digests = Vec::with_capacity(content.len().div_ceil(PART_SIZE) * 16);
    let mut parts = 0usize;
    for chunk in content.chunks(PART_SIZE) {
        digests.extend_from_slice(&Md5::digest(chunk));
        parts += 1;
    }

    format!("{}-{}", hex::encode(Md5::digest(&digests)), parts)
}

/// Compute the S3-compatible ETag of a file's contents
pub async fn compute_file_fingerprint(path: &Path) -> Result<String, HashError> {
    let content = fs::read(path).await.map_err(|source| HashError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(compute_fingerprint(&content))
}

/// Strip the quoting S3 puts around ETag values
pub fn clean_etag(etag: &str) -> String {
    etag.trim_matches(|c| c == '"' || c == '\\').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_content_is_plain_md5() {
        assert_eq!(compute_fingerprint(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            compute_fingerprint(b"hello"),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn test_content_at_threshold_has_no_part_suffix() {
        let content = vec![b'a'; PART_SIZE];
        let fingerprint = compute_fingerprint(&content);
        assert_eq!(fingerprint, hex::encode(Md5::digest(&content)));
        assert!(!fingerprint.contains('-'));
    }

    #[test]
    fn test_content_over_threshold_uses_multipart_scheme() {
        let mut content = vec![b'a'; PART_SIZE];
        content.push(b'b');

        let mut expected = Vec::new();
        expected.extend_from_slice(&Md5::digest(&content[..PART_SIZE]));
        expected.extend_from_slice(&Md5::digest(b"b"));
        let expected = format!("{}-2", hex::encode(Md5::digest(&expected)));

        assert_eq!(compute_fingerprint(&content), expected);
    }

    #[test]
    fn test_part_count_rounds_up() {
        let content = vec![0u8; PART_SIZE * 2 + 10];
        assert!(compute_fingerprint(&content).ends_with("-3"));
    }

    #[test]
    fn test_clean_etag() {
        assert_eq!(clean_etag("\"abc\""), "abc");
        assert_eq!(clean_etag("\\\"abc-2\\\""), "abc-2");
        assert_eq!(clean_etag("abc"), "abc");
    }

    #[tokio::test]
    async fn test_missing_file_is_hash_error() {
        let result = compute_file_fingerprint(Path::new("/nonexistent/s3site/file")).await;
        assert!(matches!(result, Err(HashError::Read { .. })));
    }
}
