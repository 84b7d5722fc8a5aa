//! Upload coordinator
//!
//! Places files in storage under keys from [`ObjectPathBuilder`] and folds
//! every failure into the returned result. Nothing here returns `Err`.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::{stream, FutureExt, StreamExt};
use stowage_core::{ErrorMetadata, LogLevel};
use stowage_storage::{ObjectPathBuilder, PutObjectOptions, Storage};

use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::types::{BatchUploadResult, ErrorInfo, FileBlob, UploadResult};

/// Uploads files to an injected [`Storage`] backend
#[derive(Clone)]
pub struct UploadCoordinator {
    storage: Arc<dyn Storage>,
    paths: ObjectPathBuilder,
    config: UploadConfig,
}

impl UploadCoordinator {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_config(storage, UploadConfig::default())
    }

    pub fn with_config(storage: Arc<dyn Storage>, config: UploadConfig) -> Self {
        Self {
            storage,
            paths: ObjectPathBuilder::new(),
            config,
        }
    }

    pub fn with_path_builder(mut self, paths: ObjectPathBuilder) -> Self {
        self.paths = paths;
        self
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Upload one file to `bucket` under a fresh key for `user_id`.
    ///
    /// Single attempt, no retry. The object is written with overwrite
    /// disabled, so a key collision is reported as an error. Any failure,
    /// including a panic inside the storage backend, is returned in
    /// [`UploadResult::error`].
    pub async fn upload_one(
        &self,
        bucket: &str,
        file: &FileBlob,
        user_id: &str,
        folder: Option<&str>,
    ) -> UploadResult {
        let start = Instant::now();

        let attempt = AssertUnwindSafe(self.try_upload(bucket, file, user_id, folder))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(UploadError::Panicked(panic_message(panic.as_ref()))));

        match attempt {
            Ok((path, url)) => {
                tracing::info!(
                    bucket = %bucket,
                    key = %path,
                    file_name = %file.name,
                    size_bytes = file.size(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Upload successful"
                );
                UploadResult::success(url, path)
            }
            Err(err) => {
                log_failure(&err, bucket, file, start);
                UploadResult::failure(ErrorInfo::from_error(&err, Some(file.name.as_str())))
            }
        }
    }

    async fn try_upload(
        &self,
        bucket: &str,
        file: &FileBlob,
        user_id: &str,
        folder: Option<&str>,
    ) -> Result<(String, String), UploadError> {
        if user_id.trim().is_empty() {
            return Err(UploadError::InvalidInput(
                "User id must not be empty".to_string(),
            ));
        }

        if file.size() > self.config.max_file_size_bytes {
            return Err(UploadError::PayloadTooLarge {
                size: file.size(),
                limit: self.config.max_file_size_bytes,
            });
        }

        let key = self.paths.build(user_id, &file.name, folder);
        let options = PutObjectOptions {
            overwrite: false,
            cache_control_seconds: self.config.cache_control_seconds,
            content_type: Some(file.content_type.clone()),
        };

        self.storage
            .put_object(bucket, key.as_str(), file.data.clone(), &options)
            .await?;

        let url = self.storage.public_url(bucket, key.as_str()).await?;

        Ok((key.into_string(), url))
    }

    /// Upload `files` in order, continuing past failures.
    ///
    /// With `batch_concurrency == 1` each upload finishes before the next one
    /// starts and `errors` follows the order failures happened in. With a
    /// higher setting up to that many uploads run at once; `urls`/`paths` and
    /// `errors` are then both reported in input order.
    pub async fn upload_many(
        &self,
        bucket: &str,
        files: &[FileBlob],
        user_id: &str,
        folder: Option<&str>,
    ) -> BatchUploadResult {
        let mut batch = BatchUploadResult::default();

        if self.config.batch_concurrency <= 1 {
            for file in files {
                batch.record(self.upload_one(bucket, file, user_id, folder).await);
            }
        } else {
            let results: Vec<UploadResult> = stream::iter(files)
                .map(|file| self.upload_one(bucket, file, user_id, folder))
                .buffered(self.config.batch_concurrency)
                .collect()
                .await;
            for result in results {
                batch.record(result);
            }
        }

        tracing::info!(
            bucket = %bucket,
            files = files.len(),
            succeeded = batch.paths.len(),
            failed = batch.errors.len(),
            "Batch upload finished"
        );

        batch
    }

    /// Delete previously uploaded objects one after another.
    ///
    /// Returns the failures; an empty list means every path is gone.
    pub async fn remove_many(&self, bucket: &str, paths: &[String]) -> Vec<ErrorInfo> {
        let mut errors = Vec::new();

        for path in paths {
            let attempt = AssertUnwindSafe(self.storage.delete_object(bucket, path))
                .catch_unwind()
                .await;
            let outcome = match attempt {
                Ok(result) => result.map_err(UploadError::from),
                Err(panic) => Err(UploadError::Panicked(panic_message(panic.as_ref()))),
            };

            if let Err(err) = outcome {
                tracing::warn!(
                    error = %err,
                    bucket = %bucket,
                    key = %path,
                    "Failed to delete object"
                );
                errors.push(ErrorInfo::from_error(&err, Some(path.as_str())));
            }
        }

        errors
    }
}

fn log_failure(err: &UploadError, bucket: &str, file: &FileBlob, start: Instant) {
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            error = %err,
            bucket = %bucket,
            file_name = %file.name,
            "Upload rejected"
        ),
        LogLevel::Warn => tracing::warn!(
            error = %err,
            bucket = %bucket,
            file_name = %file.name,
            duration_ms,
            "Upload failed"
        ),
        LogLevel::Error => tracing::error!(
            error = %err,
            bucket = %bucket,
            file_name = %file.name,
            size_bytes = file.size(),
            duration_ms,
            "Upload failed"
        ),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
