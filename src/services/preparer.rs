//! Turns a local file into a payload ready for a retention-locked upload.
//!
//! The file is read twice: once fully into memory for the request body and
//! once as a stream through the MD5 accumulator. Both reads must observe the
//! same bytes, which is checked before a [`PreparedObject`] is handed out.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::{self, File};
use tracing::{debug, warn};

use crate::config::UploaderConfig;
use crate::error::{Result, WormError};
use crate::models::PreparedObject;
use crate::utils::hash::{calculate_md5_base64, calculate_md5_base64_from_reader};
use crate::utils::validation::validate_file_size;

/// Number of leading bytes inspected when sniffing the content type.
pub const SNIFF_LEN: usize = 512;

const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";

/// Source of upload payloads for the orchestrator.
#[async_trait]
pub trait ObjectPreparer: Send + Sync {
    async fn prepare(&self, path: &Path, now: DateTime<Utc>) -> Result<PreparedObject>;
}

pub struct UploadPreparer {
    max_file_size: u64,
    retention_days: i64,
}

impl Default for UploadPreparer {
    fn default() -> Self {
        Self::from_config(&UploaderConfig::default())
    }
}

impl UploadPreparer {
    pub fn new(max_file_size: u64, retention_days: i64) -> Self {
        Self {
            max_file_size,
            retention_days,
        }
    }

    pub fn from_config(config: &UploaderConfig) -> Self {
        Self::new(config.max_file_size, config.object_retention_days)
    }

    /// Reads the complete file into memory.
    pub async fn load_file(&self, path: &Path) -> Result<Bytes> {
        let metadata = fs::metadata(path).await.map_err(|e| file_error(path, e))?;
        validate_file_size(path, metadata.len(), self.max_file_size)?;

        let data = fs::read(path).await.map_err(|e| file_error(path, e))?;
        debug!("Loaded {} bytes from {}", data.len(), path.display());
        Ok(Bytes::from(data))
    }

}

#[async_trait]
impl ObjectPreparer for UploadPreparer {
    /// Builds the upload payload for `path`, with the retention deadline
    /// measured from `now`.
    async fn prepare(&self, path: &Path, now: DateTime<Utc>) -> Result<PreparedObject> {
        let payload = self.load_file(path).await?;
        let content_type = detect_content_type(&payload);
        let digest_base64 = compute_digest(path).await?;
        verify_payload_digest(path, &payload, &digest_base64)?;

        Ok(PreparedObject {
            source: path.to_path_buf(),
            payload,
            content_type,
            digest_base64,
            retain_until: retention_deadline(now, self.retention_days),
        })
    }
}

/// Fails with [`WormError::Digest`] unless `digest_base64` describes exactly
/// the bytes in `payload`.
pub fn verify_payload_digest(path: &Path, payload: &[u8], digest_base64: &str) -> Result<()> {
    if calculate_md5_base64(payload) != digest_base64 {
        return Err(WormError::Digest(format!(
            "{} changed while it was being read",
            path.display()
        )));
    }
    Ok(())
}

fn file_error(path: &Path, err: std::io::Error) -> WormError {
    if err.kind() == ErrorKind::NotFound {
        WormError::FileNotFound(path.to_path_buf())
    } else {
        WormError::FileRead {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

/// Best-guess MIME type from the first [`SNIFF_LEN`] bytes of `payload`.
pub fn detect_content_type(payload: &[u8]) -> String {
    let sample = &payload[..payload.len().min(SNIFF_LEN)];

    if let Some(kind) = infer::get(sample) {
        let mime_type = kind.mime_type();
        // Markup and scripts are text; label them like the plain-text fallback.
        if mime_type.starts_with("text/") && !mime_type.contains("charset") {
            return format!("{}; charset=utf-8", mime_type);
        }
        return mime_type.to_string();
    }

    match sniff_text(sample) {
        Some(text) => text.to_string(),
        None => mime::APPLICATION_OCTET_STREAM.to_string(),
    }
}

fn sniff_text(sample: &[u8]) -> Option<&'static str> {
    if sample.starts_with(&[0xFE, 0xFF]) {
        return Some("text/plain; charset=utf-16be");
    }
    if sample.starts_with(&[0xFF, 0xFE]) {
        return Some("text/plain; charset=utf-16le");
    }
    if sample.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some(TEXT_PLAIN_UTF_8);
    }

    // Tab, newline, form feed, carriage return and escape occur in text.
    let binary = sample
        .iter()
        .any(|&b| matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F));
    if binary {
        None
    } else {
        Some(TEXT_PLAIN_UTF_8)
    }
}

/// Streams the file at `path` through MD5 and returns the base64 digest.
///
/// An empty path or a file that cannot be opened yields
/// [`WormError::NoDigest`]. A read failure after the file was opened yields
/// [`WormError::Digest`], which callers treat as fatal.
pub async fn compute_digest(path: &Path) -> Result<String> {
    if path.as_os_str().is_empty() {
        return Err(WormError::NoDigest("empty path".to_string()));
    }

    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Cannot open {} for hashing: {}", path.display(), e);
            return Err(WormError::NoDigest(path.display().to_string()));
        }
    };

    calculate_md5_base64_from_reader(file)
        .await
        .map_err(|e| WormError::Digest(format!("{}: {}", path.display(), e)))
}

/// One day after `now`.
pub fn compute_retention_deadline(now: DateTime<Utc>) -> DateTime<Utc> {
    retention_deadline(now, 1)
}

pub fn retention_deadline(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now + Duration::days(days)
}
