use std::path::Path;

use crate::error::{Result, WormError};

/// Validates file size against maximum limit
pub fn validate_file_size(path: &Path, size: u64, max_size: u64) -> Result<()> {
    if size > max_size {
        return Err(WormError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max: max_size,
        });
    }
    Ok(())
}

/// Object keys are sent verbatim, so only reject what S3 itself refuses.
pub fn validate_object_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(WormError::Input("object key cannot be empty".to_string()));
    }
    if key.len() > 1024 {
        return Err(WormError::Input(format!(
            "object key is {} bytes, limit is 1024",
            key.len()
        )));
    }
    Ok(())
}
