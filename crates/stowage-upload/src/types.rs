//! Upload inputs and outcomes

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use stowage_core::ErrorMetadata;

use crate::data_url::FALLBACK_CONTENT_TYPE;
use crate::error::UploadError;

/// A named blob of bytes with a content type, ready to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();

        Ok(Self::new(name, content_type, data))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Serializable description of a failed upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    /// Machine-readable code, e.g. `OBJECT_ALREADY_EXISTS`
    pub code: String,
    pub message: String,
    pub recoverable: bool,
    /// Name of the file the error belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ErrorInfo {
    pub fn from_error(err: &UploadError, file: Option<&str>) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.client_message(),
            recoverable: err.is_recoverable(),
            file: file.map(String::from),
        }
    }
}

/// Outcome of a single upload
///
/// On completion either `url` and `path` are set, or `error` is; never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub url: Option<String>,
    pub path: Option<String>,
    pub error: Option<ErrorInfo>,
}

impl UploadResult {
    pub(crate) fn success(url: String, path: String) -> Self {
        Self {
            url: Some(url),
            path: Some(path),
            error: None,
        }
    }

    pub(crate) fn failure(error: ErrorInfo) -> Self {
        Self {
            url: None,
            path: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a batch upload
///
/// `urls[i]` and `paths[i]` describe the same file; successes keep input
/// order. A batch with an empty `errors` list fully succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchUploadResult {
    pub urls: Vec<String>,
    pub paths: Vec<String>,
    pub errors: Vec<ErrorInfo>,
}

impl BatchUploadResult {
    pub(crate) fn record(&mut self, result: UploadResult) {
        match (result.error, result.url, result.path) {
            (Some(error), _, _) => self.errors.push(error),
            (None, Some(url), Some(path)) => {
                self.urls.push(url);
                self.paths.push(path);
            }
            (None, _, _) => {}
        }
    }

    pub fn is_complete_success(&self) -> bool {
        self.errors.is_empty()
    }
}
