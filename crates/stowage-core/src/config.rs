//! Configuration module
//!
//! This module provides the configuration for the storage backends and the
//! upload coordinator. Values come from the environment (a `.env` file is
//! honoured) with defaults for everything that is not backend-specific.

use std::env;

use crate::storage_types::StorageBackend;

const CACHE_CONTROL_SECONDS: u64 = 3600;
const BATCH_CONCURRENCY: usize = 1;
const MAX_FILE_SIZE_MB: usize = 50;
const MEMORY_STORAGE_BASE_URL: &str = "memory://";

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub environment: String,
    /// `text` or `json`
    pub log_format: String,
}

/// Storage and upload configuration
#[derive(Clone, Debug)]
pub struct StowageConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub storage_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, R2, etc.)
    pub s3_public_base_url: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub memory_storage_base_url: String,
    // Upload behaviour
    pub cache_control_seconds: u64,
    pub batch_concurrency: usize,
    pub max_file_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<StowageConfig>);

impl Config {
    fn as_stowage(&self) -> &StowageConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_stowage().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = StowageConfig::from_lookup(|name| env::var(name).ok())?;
        Ok(Config(Box::new(config)))
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = StowageConfig::from_lookup(lookup)?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_stowage().validate()
    }

    pub fn environment(&self) -> &str {
        &self.as_stowage().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_stowage().base.log_format
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.as_stowage().storage_backend
    }

    pub fn storage_bucket(&self) -> Option<&str> {
        self.as_stowage().storage_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_stowage().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_stowage().s3_endpoint.as_deref()
    }

    pub fn s3_public_base_url(&self) -> Option<&str> {
        self.as_stowage().s3_public_base_url.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_stowage().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_stowage().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_stowage().local_storage_base_url.as_deref()
    }

    pub fn memory_storage_base_url(&self) -> &str {
        &self.as_stowage().memory_storage_base_url
    }

    pub fn cache_control_seconds(&self) -> u64 {
        self.as_stowage().cache_control_seconds
    }

    pub fn batch_concurrency(&self) -> usize {
        self.as_stowage().batch_concurrency
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_stowage().max_file_size_bytes
    }
}

impl StowageConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

        let environment = non_empty("ENVIRONMENT")
            .or_else(|| non_empty("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let log_format = non_empty("LOG_FORMAT")
            .unwrap_or_else(|| "text".to_string())
            .to_lowercase();

        let storage_backend = non_empty("STORAGE_BACKEND")
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?;

        let cache_control_seconds = match non_empty("UPLOAD_CACHE_CONTROL_SECONDS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                anyhow::anyhow!("UPLOAD_CACHE_CONTROL_SECONDS must be a valid number")
            })?,
            None => CACHE_CONTROL_SECONDS,
        };

        let batch_concurrency = match non_empty("UPLOAD_BATCH_CONCURRENCY") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                anyhow::anyhow!("UPLOAD_BATCH_CONCURRENCY must be a valid number")
            })?,
            None => BATCH_CONCURRENCY,
        };

        let max_file_size_mb: usize = match non_empty("MAX_FILE_SIZE_MB") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_MB must be a valid number"))?,
            None => MAX_FILE_SIZE_MB,
        };

        let config = StowageConfig {
            base: BaseConfig {
                environment,
                log_format,
            },
            storage_backend,
            storage_bucket: non_empty("STORAGE_BUCKET"),
            s3_region: non_empty("S3_REGION"),
            s3_endpoint: non_empty("S3_ENDPOINT"),
            s3_public_base_url: non_empty("S3_PUBLIC_BASE_URL"),
            aws_region: non_empty("AWS_REGION"),
            local_storage_path: non_empty("LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty("LOCAL_STORAGE_BASE_URL"),
            memory_storage_base_url: non_empty("MEMORY_STORAGE_BASE_URL")
                .unwrap_or_else(|| MEMORY_STORAGE_BASE_URL.to_string()),
            cache_control_seconds,
            batch_concurrency,
            max_file_size_bytes: max_file_size_mb.saturating_mul(1024 * 1024),
        };

        config.validate_settings()?;
        Ok(config)
    }

    /// Full validation, including the settings the selected backend needs.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.validate_settings()?;
        self.validate_storage()
    }

    fn validate_settings(&self) -> Result<(), anyhow::Error> {
        if !matches!(self.base.log_format.as_str(), "text" | "json") {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'text' or 'json'"));
        }

        if self.batch_concurrency == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_BATCH_CONCURRENCY must be at least 1"
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        Ok(())
    }

    /// Backend-specific settings. Only needed once storage is actually used.
    pub fn validate_storage(&self) -> Result<(), anyhow::Error> {
        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        Ok(())
    }
}
