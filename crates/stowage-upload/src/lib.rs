//! Stowage Upload Library
//!
//! Places files in object storage under user-scoped keys and reports the
//! outcome as values:
//!
//! - [`UploadCoordinator::upload_one`] never fails; problems end up in
//!   [`UploadResult::error`].
//! - [`UploadCoordinator::upload_many`] keeps going past failed files and
//!   collects them in [`BatchUploadResult::errors`].
//! - [`decode_data_url`] turns an inline `data:` URL into a [`FileBlob`] and
//!   does propagate its [`DecodeError`].

pub mod config;
pub mod coordinator;
pub mod data_url;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::UploadConfig;
pub use coordinator::UploadCoordinator;
pub use data_url::{decode_data_url, FALLBACK_CONTENT_TYPE};
pub use error::{DecodeError, UploadError};
pub use types::{BatchUploadResult, ErrorInfo, FileBlob, UploadResult};
