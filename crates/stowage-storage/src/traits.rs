//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use stowage_core::{ErrorMetadata, LogLevel};
use thiserror::Error;

/// Default `Cache-Control: max-age` applied to uploaded objects
pub const DEFAULT_CACHE_CONTROL_SECONDS: u64 = 3600;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid bucket: {0}")]
    InvalidBucket(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl ErrorMetadata for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            StorageError::AlreadyExists(_) => "OBJECT_ALREADY_EXISTS",
            StorageError::UploadFailed(_) => "UPLOAD_FAILED",
            StorageError::DeleteFailed(_) => "DELETE_FAILED",
            StorageError::NotFound(_) => "NOT_FOUND",
            StorageError::InvalidKey(_) => "INVALID_KEY",
            StorageError::InvalidBucket(_) => "INVALID_BUCKET",
            StorageError::BackendError(_) | StorageError::IoError(_) => "STORAGE_ERROR",
            StorageError::ConfigError(_) => "STORAGE_CONFIG_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_)
                | StorageError::DeleteFailed(_)
                | StorageError::BackendError(_)
                | StorageError::IoError(_)
        )
    }

    fn client_message(&self) -> String {
        match self {
            StorageError::AlreadyExists(key) => {
                format!("An object already exists at {}", key)
            }
            StorageError::NotFound(key) => format!("Object not found: {}", key),
            StorageError::InvalidKey(msg) | StorageError::InvalidBucket(msg) => msg.clone(),
            StorageError::ConfigError(_) => "Storage is not configured correctly".to_string(),
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            StorageError::InvalidKey(_) | StorageError::InvalidBucket(_) => LogLevel::Debug,
            StorageError::AlreadyExists(_) | StorageError::NotFound(_) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// Options for [`Storage::put_object`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectOptions {
    /// When false the write must fail with [`StorageError::AlreadyExists`]
    /// if an object is already stored at the key.
    pub overwrite: bool,
    pub cache_control_seconds: u64,
    pub content_type: Option<String>,
}

impl Default for PutObjectOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            cache_control_seconds: DEFAULT_CACHE_CONTROL_SECONDS,
            content_type: None,
        }
    }
}

impl PutObjectOptions {
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Value for the `Cache-Control` header
    pub fn cache_control(&self) -> String {
        format!("max-age={}", self.cache_control_seconds)
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem, in-memory) implement this
/// trait. The upload coordinator receives it as an explicit dependency, which
/// keeps it testable against a fake without a live service.
///
/// Buckets are passed per call; a backend maps them onto whatever namespace it
/// has (an S3 bucket, a directory, an in-memory store).
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` at `key` inside `bucket`.
    ///
    /// With `options.overwrite == false` an existing object is never replaced;
    /// the call fails with [`StorageError::AlreadyExists`] instead.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        options: &PutObjectOptions,
    ) -> StorageResult<()>;

    /// Resolve the publicly accessible URL of an object
    async fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool>;

    /// Delete an object. Deleting a missing object succeeds.
    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
