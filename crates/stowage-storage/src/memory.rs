use crate::keys::{encode_key_for_url, validate_bucket, validate_key};
use crate::object_store_support::{map_put_error, put_options};
use crate::traits::{PutObjectOptions, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, ObjectStore, ObjectStoreExt, PutPayload};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// An object read back from [`MemoryStorage`]
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
}

/// In-process storage backed by `object_store`'s `InMemory` store
///
/// One store per bucket, created on first write. Nothing survives the
/// process; meant for tests and local experiments.
#[derive(Clone)]
pub struct MemoryStorage {
    buckets: Arc<RwLock<HashMap<String, Arc<InMemory>>>>,
    base_url: String,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("memory://")
    }
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
        }
    }

    fn bucket(&self, bucket: &str) -> StorageResult<Option<Arc<InMemory>>> {
        let buckets = self
            .buckets
            .read()
            .map_err(|_| StorageError::BackendError("Memory storage lock poisoned".to_string()))?;
        Ok(buckets.get(bucket).cloned())
    }

    fn bucket_or_create(&self, bucket: &str) -> StorageResult<Arc<InMemory>> {
        if let Some(store) = self.bucket(bucket)? {
            return Ok(store);
        }
        let mut buckets = self
            .buckets
            .write()
            .map_err(|_| StorageError::BackendError("Memory storage lock poisoned".to_string()))?;
        Ok(buckets
            .entry(bucket.to_string())
            .or_insert_with(|| Arc::new(InMemory::new()))
            .clone())
    }

    fn generate_url(&self, bucket: &str, key: &str) -> String {
        let separator = if self.base_url.ends_with('/') { "" } else { "/" };
        format!(
            "{}{}{}/{}",
            self.base_url,
            separator,
            bucket,
            encode_key_for_url(key)
        )
    }

    /// Read an object back together with the attributes it was stored with.
    pub async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
        validate_bucket(bucket)?;
        validate_key(key)?;

        let store = self
            .bucket(bucket)?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        let location = Path::from(key.to_string());

        let result = store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => StorageError::BackendError(other.to_string()),
        })?;

        let attribute = |name: &Attribute| -> Option<String> {
            result.attributes.get(name).map(|v| {
                let value: &str = v.as_ref();
                value.to_string()
            })
        };
        let content_type = attribute(&Attribute::ContentType);
        let cache_control = attribute(&Attribute::CacheControl);

        let data = result
            .bytes()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        Ok(StoredObject {
            data,
            content_type,
            cache_control,
        })
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        options: &PutObjectOptions,
    ) -> StorageResult<()> {
        validate_bucket(bucket)?;
        validate_key(key)?;

        let store = self.bucket_or_create(bucket)?;
        let size = data.len();
        let location = Path::from(key.to_string());

        store
            .put_opts(&location, PutPayload::from(data), put_options(options))
            .await
            .map_err(|e| map_put_error(e, key))?;

        tracing::debug!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            "Memory storage upload successful"
        );

        Ok(())
    }

    async fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        Ok(self.generate_url(bucket, key))
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        validate_bucket(bucket)?;
        validate_key(key)?;

        let Some(store) = self.bucket(bucket)? else {
            return Ok(false);
        };
        let location = Path::from(key.to_string());
        match store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        validate_bucket(bucket)?;
        validate_key(key)?;

        let Some(store) = self.bucket(bucket)? else {
            return Ok(());
        };
        let location = Path::from(key.to_string());
        match store.delete(&location).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
