//! Error types for key-value persistence.

use thiserror::Error;

/// Errors that can occur while reading or writing persisted blobs.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific failure (lock poisoning, I/O, ...).
    #[error("Storage error: {0}")]
    Backend(String),

    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored blob could not be (de)serialized.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_backend() {
        let err = StorageError::Backend("lock poisoned".to_string());
        assert_eq!(err.to_string(), "Storage error: lock poisoned");
    }

    #[test]
    fn error_from_serde_json() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: StorageError = json_err.into();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
