use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WormError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{operation} failed: {message}")]
    Service { operation: String, message: String },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unable to read file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File {} is {size} bytes, limit is {max} bytes", path.display())]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("No MD5 digest possible for: {0}")]
    NoDigest(String),

    #[error("Digest computation failed: {0}")]
    Digest(String),
}

impl WormError {
    pub fn service(operation: &str, message: impl Into<String>) -> Self {
        WormError::Service {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Errors that prevent an object from being prepared but leave the rest
    /// of the run intact.
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            WormError::FileNotFound(_)
                | WormError::FileRead { .. }
                | WormError::FileTooLarge { .. }
                | WormError::NoDigest(_)
        )
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WormError::Input(_) | WormError::Configuration(_) | WormError::Digest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WormError>;
