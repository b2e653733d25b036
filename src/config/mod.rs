use std::env;

use crate::error::{Result, WormError};
use crate::models::{DefaultRetention, RetentionMode};

/// Largest object a single PutObject request accepts (5 GiB)
pub const MAX_SINGLE_PUT_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Uploader configuration
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    /// Region used for the client and the bucket location (default: "us-east-1")
    pub region: String,

    /// Custom S3-compatible endpoint, e.g. MinIO (default: none)
    pub endpoint_url: Option<String>,

    /// Static credentials; both must be set to take effect
    pub access_key: Option<String>,
    pub secret_key: Option<String>,

    /// Use path-style addressing (default: false, true when an endpoint is set)
    pub force_path_style: bool,

    /// Bucket default retention mode (default: GOVERNANCE)
    pub default_retention_mode: RetentionMode,

    /// Bucket default retention period in days (default: 2)
    pub default_retention_days: i32,

    /// Lock mode applied to the uploaded object (default: COMPLIANCE)
    pub object_lock_mode: RetentionMode,

    /// Days until the uploaded object's retain-until date (default: 1)
    pub object_retention_days: i64,

    /// Maximum file size in bytes (default: 5 GiB)
    pub max_file_size: u64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint_url: None,
            access_key: None,
            secret_key: None,
            force_path_style: false,
            default_retention_mode: RetentionMode::Governance,
            default_retention_days: 2,
            object_lock_mode: RetentionMode::Compliance,
            object_retention_days: 1,
            max_file_size: MAX_SINGLE_PUT_SIZE,
        }
    }
}

impl UploaderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let endpoint_url = lookup("WORM_ENDPOINT").filter(|v| !v.trim().is_empty());

        Self {
            region: lookup("WORM_REGION").unwrap_or(default.region),

            force_path_style: lookup("WORM_FORCE_PATH_STYLE")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(endpoint_url.is_some()),

            endpoint_url,

            access_key: lookup("WORM_ACCESS_KEY"),
            secret_key: lookup("WORM_SECRET_KEY"),

            default_retention_mode: lookup("WORM_DEFAULT_RETENTION_MODE")
                .and_then(|v| RetentionMode::parse(&v))
                .unwrap_or(default.default_retention_mode),

            default_retention_days: lookup("WORM_DEFAULT_RETENTION_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.default_retention_days),

            object_lock_mode: lookup("WORM_OBJECT_LOCK_MODE")
                .and_then(|v| RetentionMode::parse(&v))
                .unwrap_or(default.object_lock_mode),

            object_retention_days: lookup("WORM_OBJECT_RETENTION_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.object_retention_days),

            max_file_size: lookup("WORM_MAX_FILE_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(WormError::Configuration("region cannot be empty".to_string()));
        }
        if self.default_retention_days <= 0 {
            return Err(WormError::Configuration(format!(
                "default retention must be at least one day, got {}",
                self.default_retention_days
            )));
        }
        if self.object_retention_days <= 0 {
            return Err(WormError::Configuration(format!(
                "object retention must be at least one day, got {}",
                self.object_retention_days
            )));
        }
        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(WormError::Configuration(
                "WORM_ACCESS_KEY and WORM_SECRET_KEY must be set together".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_retention(&self) -> DefaultRetention {
        DefaultRetention {
            mode: self.default_retention_mode,
            days: self.default_retention_days,
        }
    }
}
