//! Stowage Storage Library
//!
//! This crate provides the storage abstraction the upload coordinator talks
//! to, the backends implementing it (S3, local filesystem, in-memory) and the
//! object key builder.
//!
//! # Object key format
//!
//! Keys are user-scoped and unique per upload:
//!
//! `[folder/]{user_id}/{timestamp_ms}-{token}[.ext]`
//!
//! Keys and bucket names must not contain `..` or a leading `/`. Key
//! generation and validation are centralized in the `keys` module so all
//! backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(any(feature = "storage-s3", feature = "storage-memory"))]
mod object_store_support;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{ObjectKey, ObjectPathBuilder};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use stowage_core::StorageBackend;
pub use traits::{PutObjectOptions, Storage, StorageError, StorageResult};
