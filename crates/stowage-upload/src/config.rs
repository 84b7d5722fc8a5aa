use stowage_core::Config;
use stowage_storage::traits::DEFAULT_CACHE_CONTROL_SECONDS;

const MAX_FILE_SIZE_BYTES: usize = 50 * 1024 * 1024;

/// Upload coordinator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// `Cache-Control: max-age` sent with every object
    pub cache_control_seconds: u64,
    /// Number of files of a batch in flight at once. 1 keeps batches strictly
    /// sequential.
    pub batch_concurrency: usize,
    /// Files above this size are rejected before reaching storage
    pub max_file_size_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            cache_control_seconds: DEFAULT_CACHE_CONTROL_SECONDS,
            batch_concurrency: 1,
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
        }
    }
}

impl From<&Config> for UploadConfig {
    fn from(config: &Config) -> Self {
        Self {
            cache_control_seconds: config.cache_control_seconds(),
            batch_concurrency: config.batch_concurrency().max(1),
            max_file_size_bytes: config.max_file_size_bytes(),
        }
    }
}
