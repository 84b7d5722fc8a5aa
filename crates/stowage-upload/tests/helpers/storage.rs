//! Fake storage collaborators.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use stowage_storage::{
    MemoryStorage, PutObjectOptions, Storage, StorageBackend, StorageError, StorageResult,
};

/// A `put_object` call as seen by [`ScriptedStorage`].
#[derive(Debug, Clone)]
pub struct PutCall {
    pub bucket: String,
    pub key: String,
    pub size: usize,
    pub options: PutObjectOptions,
}

/// Wraps [`MemoryStorage`] and fails writes for keys ending in one of the
/// configured extensions. Optional per-extension delays make ordering under
/// concurrency observable.
pub struct ScriptedStorage {
    inner: MemoryStorage,
    failing_extensions: HashSet<String>,
    delays: Vec<(String, Duration)>,
    fail_public_url: bool,
    calls: Mutex<Vec<PutCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for ScriptedStorage {
    fn default() -> Self {
        Self {
            inner: MemoryStorage::default(),
            failing_extensions: HashSet::new(),
            delays: Vec::new(),
            fail_public_url: false,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl ScriptedStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, extension: &str) -> Self {
        self.failing_extensions.insert(extension.to_string());
        self
    }

    pub fn delaying(mut self, extension: &str, delay: Duration) -> Self {
        self.delays.push((extension.to_string(), delay));
        self
    }

    pub fn without_public_urls(mut self) -> Self {
        self.fail_public_url = true;
        self
    }

    pub fn calls(&self) -> Vec<PutCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }

    fn extension_of(key: &str) -> &str {
        key.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
    }
}

#[async_trait]
impl Storage for ScriptedStorage {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        options: &PutObjectOptions,
    ) -> StorageResult<()> {
        self.calls.lock().unwrap().push(PutCall {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size: data.len(),
            options: options.clone(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let extension = Self::extension_of(key).to_string();
        if let Some((_, delay)) = self.delays.iter().find(|(ext, _)| *ext == extension) {
            tokio::time::sleep(*delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        let result = if self.failing_extensions.contains(&extension) {
            Err(StorageError::UploadFailed(format!(
                "simulated network failure for {}",
                key
            )))
        } else {
            self.inner.put_object(bucket, key, data, options).await
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String> {
        if self.fail_public_url {
            return Err(StorageError::BackendError(
                "public URL resolution unavailable".to_string(),
            ));
        }
        self.inner.public_url(bucket, key).await
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        self.inner.exists(bucket, key).await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.inner.delete_object(bucket, key).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

/// Reports every write as a collision.
pub struct CollidingStorage;

#[async_trait]
impl Storage for CollidingStorage {
    async fn put_object(
        &self,
        _bucket: &str,
        key: &str,
        _data: Bytes,
        _options: &PutObjectOptions,
    ) -> StorageResult<()> {
        Err(StorageError::AlreadyExists(key.to_string()))
    }

    async fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String> {
        Ok(format!("https://example.invalid/{}/{}", bucket, key))
    }

    async fn exists(&self, _bucket: &str, _key: &str) -> StorageResult<bool> {
        Ok(true)
    }

    async fn delete_object(&self, _bucket: &str, _key: &str) -> StorageResult<()> {
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

/// Panics on every call.
pub struct PanickingStorage;

#[async_trait]
impl Storage for PanickingStorage {
    async fn put_object(
        &self,
        _bucket: &str,
        _key: &str,
        _data: Bytes,
        _options: &PutObjectOptions,
    ) -> StorageResult<()> {
        panic!("storage client exploded")
    }

    async fn public_url(&self, _bucket: &str, _key: &str) -> StorageResult<String> {
        panic!("storage client exploded")
    }

    async fn exists(&self, _bucket: &str, _key: &str) -> StorageResult<bool> {
        panic!("storage client exploded")
    }

    async fn delete_object(&self, _bucket: &str, _key: &str) -> StorageResult<()> {
        panic!("storage client exploded")
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
