use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{Result, WormError};
use crate::utils::validation::validate_object_key;

/// Retention enforcement strength for object lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionMode {
    /// Can be bypassed by principals holding the bypass permission.
    Governance,
    /// Cannot be bypassed by anyone until the retain-until date passes.
    Compliance,
}

impl RetentionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionMode::Governance => "GOVERNANCE",
            RetentionMode::Compliance => "COMPLIANCE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "GOVERNANCE" => Some(RetentionMode::Governance),
            "COMPLIANCE" => Some(RetentionMode::Compliance),
            _ => None,
        }
    }
}

impl fmt::Display for RetentionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket-level default retention rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultRetention {
    pub mode: RetentionMode,
    pub days: i32,
}

/// Object lock configuration as read back from a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockConfiguration {
    pub enabled: bool,
    pub rule: Option<DefaultRetention>,
}

/// Effective lock settings of a stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectLockStatus {
    pub lock_mode: Option<RetentionMode>,
    pub retain_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectOptions {
    pub content_type: String,
    pub content_digest: String,
    pub lock_mode: RetentionMode,
    pub retain_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Validate)]
pub struct UploadRequest {
    #[validate(length(min = 1, message = "a bucket name [-b BUCKET] is required"))]
    bucket_name: String,

    #[validate(length(min = 1, message = "a filename [-f FILENAME] is required"))]
    file_path: String,

    object_key: String,
}

impl UploadRequest {
    pub fn new(bucket_name: &str, file_path: &str, object_key: Option<&str>) -> Result<Self> {
        let request = Self {
            bucket_name: bucket_name.to_string(),
            file_path: file_path.to_string(),
            object_key: object_key.unwrap_or(file_path).to_string(),
        };
        request
            .validate()
            .map_err(|e| WormError::Input(e.to_string()))?;
        validate_object_key(&request.object_key)?;
        Ok(request)
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn file_path(&self) -> &Path {
        Path::new(&self.file_path)
    }

    pub fn object_key(&self) -> &str {
        &self.object_key
    }
}

/// A file turned into a self-describing, retention-locked upload payload.
#[derive(Debug, Clone)]
pub struct PreparedObject {
    pub source: PathBuf,
    pub payload: Bytes,
    pub content_type: String,
    pub digest_base64: String,
    pub retain_until: DateTime<Utc>,
}

impl PreparedObject {
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    pub fn put_options(&self, lock_mode: RetentionMode) -> PutObjectOptions {
        PutObjectOptions {
            content_type: self.content_type.clone(),
            content_digest: self.digest_base64.clone(),
            lock_mode,
            retain_until: self.retain_until,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    Failed(String),
    Skipped,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

/// Summary of what a prepared object looked like when it was uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSummary {
    pub content_type: String,
    pub digest_base64: String,
    pub size: usize,
    pub retain_until: DateTime<Utc>,
}

impl From<&PreparedObject> for PreparedSummary {
    fn from(object: &PreparedObject) -> Self {
        Self {
            content_type: object.content_type.clone(),
            digest_base64: object.digest_base64.clone(),
            size: object.size(),
            retain_until: object.retain_until,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub create_bucket: StepOutcome,
    pub put_retention: StepOutcome,
    pub get_retention: StepOutcome,
    pub upload: StepOutcome,
    pub head: StepOutcome,
    pub lock_configuration: Option<LockConfiguration>,
    pub prepared: Option<PreparedSummary>,
    pub object_status: Option<ObjectLockStatus>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        [
            &self.create_bucket,
            &self.put_retention,
            &self.get_retention,
            &self.upload,
            &self.head,
        ]
        .iter()
        .all(|step| step.is_success())
    }
}
