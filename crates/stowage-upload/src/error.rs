//! Error types for uploads and data URL decoding
//!
//! [`UploadError`] never escapes the coordinator; it is turned into an
//! [`crate::ErrorInfo`] inside the result. [`DecodeError`] is returned to the
//! caller as-is.

use stowage_core::{ErrorMetadata, LogLevel};
use stowage_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {size} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Storage backend panicked: {0}")]
    Panicked(String),
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            UploadError::InvalidInput(_) => "INVALID_INPUT",
            UploadError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            UploadError::Storage(err) => err.error_code(),
            UploadError::Panicked(_) => "INTERNAL_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            UploadError::Storage(err) => err.is_recoverable(),
            _ => false,
        }
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::Storage(err) => err.client_message(),
            UploadError::Panicked(_) => "Internal storage error".to_string(),
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            UploadError::InvalidInput(_) | UploadError::PayloadTooLarge { .. } => LogLevel::Debug,
            UploadError::Storage(err) => err.log_level(),
            UploadError::Panicked(_) => LogLevel::Error,
        }
    }
}

/// Malformed `data:` URL
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Not a data URL: input must start with 'data:'")]
    NotADataUrl,

    #[error("Malformed data URL: missing ',' between header and payload")]
    MissingSeparator,

    #[error("Malformed data URL: invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}
