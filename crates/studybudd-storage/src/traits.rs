//! Blob store abstraction
//!
//! `BlobStore` is implemented by every backend and by test doubles.

use async_trait::async_trait;
use studybudd_core::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File size {size} bytes exceeds maximum allowed size of {max_mb}MB")]
    TooLarge { size: usize, max_mb: usize },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TooLarge { size, max_mb } => AppError::FileTooLarge { size, max_mb },
            StorageError::UploadFailed(msg) => {
                AppError::Storage(format!("Failed to upload file: {}", msg))
            }
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Configuration(msg),
        }
    }
}

/// Result of a best-effort blob removal.
///
/// Removal never fails the caller; a failure is reported so the call site can
/// decide what to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    FailedIgnored(String),
}

impl RemoveOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, RemoveOutcome::Removed)
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `content` under a fresh path in the owner's namespace and return
    /// that path once the backend has acknowledged the write.
    ///
    /// Content larger than the configured limit is rejected before any I/O.
    async fn store(
        &self,
        content: Vec<u8>,
        owner: Uuid,
        original_name: &str,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Delete a blob. Never returns an error.
    async fn remove(&self, storage_path: &str) -> RemoveOutcome;

    /// Publicly reachable URL for a stored path. No I/O.
    fn public_url(&self, storage_path: &str) -> String;

    /// Maximum accepted content length in bytes.
    fn max_upload_bytes(&self) -> usize;
}
