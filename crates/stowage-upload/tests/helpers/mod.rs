#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use std::sync::Arc;

use stowage_storage::Storage;
use stowage_upload::{UploadConfig, UploadCoordinator};

pub const BUCKET: &str = "media";
pub const USER_ID: &str = "user-42";

/// Coordinator over `storage` with default settings.
pub fn coordinator_with(storage: Arc<dyn Storage>) -> UploadCoordinator {
    UploadCoordinator::new(storage)
}

/// Coordinator running up to `concurrency` uploads of a batch at once.
pub fn concurrent_coordinator_with(
    storage: Arc<dyn Storage>,
    concurrency: usize,
) -> UploadCoordinator {
    UploadCoordinator::with_config(
        storage,
        UploadConfig {
            batch_concurrency: concurrency,
            ..UploadConfig::default()
        },
    )
}
