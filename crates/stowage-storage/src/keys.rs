//! Shared key generation and validation for storage backends.
//!
//! Key format: `[folder/]{user_id}/{timestamp_ms}-{token}[.ext]`.
//!
//! Uniqueness comes from the millisecond timestamp plus a random token. No
//! existence check is made before an upload; a collision is only caught by the
//! backend rejecting the write because overwrite is disabled.

use std::fmt::{Display, Formatter, Result as FmtResult};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::traits::{StorageError, StorageResult};

/// Maximum number of characters kept from a file extension
pub const MAX_EXTENSION_LEN: usize = 10;

const DEFAULT_TOKEN_LEN: usize = 8;

/// Characters left untouched when a key segment is placed in a URL
const URL_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A storage key produced by [`ObjectPathBuilder`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0
    }
}

/// Derives user-scoped, collision-resistant object keys.
#[derive(Debug, Clone)]
pub struct ObjectPathBuilder {
    token_len: usize,
}

impl Default for ObjectPathBuilder {
    fn default() -> Self {
        Self {
            token_len: DEFAULT_TOKEN_LEN,
        }
    }
}

impl ObjectPathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Length of the random token placed after the timestamp.
    pub fn with_token_len(mut self, token_len: usize) -> Self {
        self.token_len = token_len.max(1);
        self
    }

    /// Build a key for `original_name` owned by `user_id`, optionally under `folder`.
    ///
    /// Total over its inputs: a name without a usable extension simply gets no
    /// `.ext` suffix.
    pub fn build(&self, user_id: &str, original_name: &str, folder: Option<&str>) -> ObjectKey {
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        let token = random_token(self.token_len);
        compose_key(folder, user_id, timestamp_ms, &token, original_name)
    }
}

fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

pub(crate) fn compose_key(
    folder: Option<&str>,
    user_id: &str,
    timestamp_ms: i64,
    token: &str,
    original_name: &str,
) -> ObjectKey {
    let prefix = folder.map(normalize_folder).unwrap_or_default();
    let extension = sanitize_extension(original_name);

    let mut key = format!("{}{}/{}-{}", prefix, user_id, timestamp_ms, token);
    if !extension.is_empty() {
        key.push('.');
        key.push_str(&extension);
    }
    ObjectKey(key)
}

/// Extension of `original_name`, reduced to ASCII alphanumerics and capped at
/// [`MAX_EXTENSION_LEN`]. Empty when the name has no `.`.
pub fn sanitize_extension(original_name: &str) -> String {
    let mut segments = original_name.split('.');
    let first = segments.next();
    let candidate = match (first, segments.last()) {
        (Some(_), Some(last)) => last,
        _ => "",
    };

    candidate
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_EXTENSION_LEN)
        .collect()
}

/// Strip one leading and one trailing `/`, then append `/`.
///
/// A folder that is empty after stripping contributes no prefix.
pub fn normalize_folder(folder: &str) -> String {
    let trimmed = folder.strip_prefix('/').unwrap_or(folder);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

/// Reject bucket names that could escape the backend namespace.
pub fn validate_bucket(bucket: &str) -> StorageResult<()> {
    if bucket.trim().is_empty() {
        return Err(StorageError::InvalidBucket(
            "Bucket name must not be empty".to_string(),
        ));
    }
    if bucket.contains("..") || bucket.contains('/') || bucket.contains('\\') {
        return Err(StorageError::InvalidBucket(
            "Bucket name contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Reject keys that are empty, absolute or contain path traversal.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey(
            "Storage key must not be empty".to_string(),
        ));
    }
    if key.contains("..") || key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Percent-encode every segment of `key`, keeping the `/` separators.
pub fn encode_key_for_url(key: &str) -> String {
    key.split('/')
        .map(|segment| utf8_percent_encode(segment, URL_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
