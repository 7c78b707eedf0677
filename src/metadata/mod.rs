mod sniff;

pub use sniff::{sniff_content_type, SNIFF_LEN};

use crate::state::FileEntry;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

pub const JAVASCRIPT: &str = "application/javascript";
pub const GZIP_ENCODING: &str = "gzip";
pub const INDEX_FILE: &str = "index.html";
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";
pub const EXPIRES_NOW: &str = "0";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fill in content type, encoding and cache policy for an entry
pub async fn decorate(mut entry: FileEntry) -> Result<FileEntry, MetadataError> {
    let head = read_head(&entry).await?;
    decorate_with_head(&mut entry, &head);
    Ok(entry)
}

/// Same as [`decorate`] with the leading bytes of the file already in hand
pub fn decorate_with_head(entry: &mut FileEntry, head: &[u8]) {
    let by_extension = mime_guess::from_path(&entry.relative_path).first();
    let extension = entry
        .file_name()
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    let content_type = match by_extension {
        Some(m) if !is_javascript(&m) => m.to_string(),
        _ => sniff_content_type(head).to_string(),
    };

    if content_type == sniff::GZIP && extension.as_deref() == Some("js") {
        entry.content_type = Some(JAVASCRIPT.to_string());
        entry.content_encoding = Some(GZIP_ENCODING.to_string());
    } else {
        entry.content_type = Some(content_type);
    }

    if entry.file_name() == INDEX_FILE {
        entry.cache_control = Some(NO_CACHE.to_string());
        entry.expires = Some(EXPIRES_NOW.to_string());
    }
}

fn is_javascript(m: &mime::Mime) -> bool {
    m.subtype().as_str().contains("javascript")
}

async fn read_head(entry: &FileEntry) -> Result<Vec<u8>, MetadataError> {
    let read_error = |source| MetadataError::Read {
        path: entry.full_path.clone(),
        source,
    };

    let file = File::open(&entry.full_path).await.map_err(read_error)?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await
        .map_err(read_error)?;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(relative_path: &str) -> FileEntry {
        FileEntry::new(PathBuf::from("/unused").join(relative_path), relative_path.into())
    }

    #[test]
    fn test_index_html_is_never_cached() {
        let mut e = entry("index.html");
        decorate_with_head(&mut e, b"<!DOCTYPE html><html></html>");
        assert_eq!(e.cache_control.as_deref(), Some(NO_CACHE));
        assert_eq!(e.expires.as_deref(), Some("0"));
        assert_eq!(e.content_type.as_deref(), Some("text/html"));

        let mut nested = entry("docs/index.html");
        decorate_with_head(&mut nested, b"<html></html>");
        assert_eq!(nested.cache_control.as_deref(), Some(NO_CACHE));
    }

    #[test]
    fn test_other_files_keep_store_defaults() {
        let mut e = entry("index.js");
        decorate_with_head(&mut e, b"console.log(1)");
        assert!(e.cache_control.is_none());
        assert!(e.expires.is_none());
        assert!(e.content_encoding.is_none());

        let mut e = entry("index.html.bak");
        decorate_with_head(&mut e, b"<html></html>");
        assert!(e.cache_control.is_none());
    }

    #[test]
    fn test_svg() {
        let mut e = entry("logo.svg");
        decorate_with_head(&mut e, b"<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>");
        assert_eq!(e.content_type.as_deref(), Some("image/svg+xml"));
    }

    #[test]
    fn test_gzipped_javascript() {
        let mut e = entry("static/main.js");
        decorate_with_head(&mut e, b"\x1f\x8b\x08\x00\x00\x00\x00\x00\x00\x03");
        assert_eq!(e.content_type.as_deref(), Some(JAVASCRIPT));
        assert_eq!(e.content_encoding.as_deref(), Some("gzip"));
    }

    #[test]
    fn test_plain_javascript_is_sniffed() {
        let mut e = entry("app.js");
        decorate_with_head(&mut e, b"console.log(1)");
        assert_eq!(e.content_type.as_deref(), Some(sniff::TEXT_PLAIN));
        assert!(e.content_encoding.is_none());

        let mut e = entry("legacy.mjs");
        decorate_with_head(&mut e, b"\x1f\x8b\x08\x00");
        assert_eq!(e.content_type.as_deref(), Some(sniff::GZIP));
        assert!(e.content_encoding.is_none());
    }

    #[test]
    fn test_unknown_extension_is_sniffed() {
        let mut e = entry("LICENSE");
        decorate_with_head(&mut e, b"MIT License");
        assert_eq!(e.content_type.as_deref(), Some(sniff::TEXT_PLAIN));

        let mut e = entry("blob");
        decorate_with_head(&mut e, b"\x1f\x8b\x08\x00");
        assert_eq!(e.content_type.as_deref(), Some(sniff::GZIP));
        assert!(e.content_encoding.is_none());
    }

    #[tokio::test]
    async fn test_decorate_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.js");
        std::fs::write(&path, b"\x1f\x8b\x08\x00\x00\x00\x00\x00").unwrap();

        let e = decorate(FileEntry::new(path, "bundle.js".into()))
            .await
            .unwrap();
        assert_eq!(e.content_encoding.as_deref(), Some("gzip"));
    }

    #[tokio::test]
    async fn test_decorate_missing_file() {
        let result = decorate(entry("gone.txt")).await;
        assert!(matches!(result, Err(MetadataError::Read { .. })));
    }
}
