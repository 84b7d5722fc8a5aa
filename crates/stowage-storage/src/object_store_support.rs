//! Glue between [`PutObjectOptions`] and the `object_store` crate.

use object_store::{Attribute, Attributes, Error as ObjectStoreError, PutMode, PutOptions};

use crate::traits::{PutObjectOptions, StorageError};

/// Translate upload options into `object_store` put options.
///
/// `overwrite == false` maps to a conditional create so the store itself
/// rejects a write to an existing key.
pub(crate) fn put_options(options: &PutObjectOptions) -> PutOptions {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::CacheControl, options.cache_control().into());
    if let Some(content_type) = &options.content_type {
        attributes.insert(Attribute::ContentType, content_type.clone().into());
    }

    let mode = if options.overwrite {
        PutMode::Overwrite
    } else {
        PutMode::Create
    };

    PutOptions {
        mode,
        attributes,
        ..Default::default()
    }
}

pub(crate) fn map_put_error(err: ObjectStoreError, key: &str) -> StorageError {
    match err {
        ObjectStoreError::AlreadyExists { .. } | ObjectStoreError::Precondition { .. } => {
            StorageError::AlreadyExists(key.to_string())
        }
        other => StorageError::UploadFailed(other.to_string()),
    }
}
