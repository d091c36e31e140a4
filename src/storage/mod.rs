//! Object storage for original and generated audio.
//!
//! All backends implement [`AudioStore`]. Uploads are create-only: writing to a
//! key that already exists fails with [`StorageError::AlreadyExists`] instead of
//! replacing the stored object.
//!
//! # Backends
//! - [`SupabaseStore`] - Supabase Storage REST API
//! - [`ObjectStoreBackend`] - any `object_store` implementation (S3-compatible, in-memory)

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::config::{ServerConfig, StorageBackendKind};

mod object;
mod supabase;

pub use object::ObjectStoreBackend;
pub use supabase::SupabaseStore;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An object that has been written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Key inside the bucket, e.g. `audio/{id}_sample.wav`
    pub key: String,
    pub content_type: String,
    /// Publicly retrievable URL for the object
    pub public_url: String,
    pub size_bytes: usize,
}

/// Storage abstraction used by the upload pipeline.
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Upload `data` under `key` without overwriting an existing object.
    async fn upload(&self, key: &str, data: Bytes, content_type: &str)
    -> StorageResult<StoredObject>;

    /// Delete the object stored under `key`.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Resolve a key to its public URL.
    fn public_url(&self, key: &str) -> String;

    /// Name of the bucket objects are written to.
    fn bucket(&self) -> &str;
}

/// Build the configured storage backend.
pub fn create_audio_store(config: &ServerConfig) -> StorageResult<Arc<dyn AudioStore>> {
    match config.storage_backend {
        StorageBackendKind::Supabase => {
            let (url, key) = config
                .get_supabase_credentials()
                .map_err(StorageError::ConfigError)?;
            Ok(Arc::new(SupabaseStore::new(
                url,
                key,
                config.storage_bucket.clone(),
            )?))
        }
        StorageBackendKind::S3 => Ok(Arc::new(ObjectStoreBackend::s3(
            config.storage_bucket.clone(),
            config.get_s3_region(),
            config.s3_endpoint.clone(),
            config.s3_access_key.clone(),
            config.s3_secret_key.clone(),
            config.storage_public_url.clone(),
        )?)),
        StorageBackendKind::Memory => Ok(Arc::new(ObjectStoreBackend::in_memory(
            config.storage_bucket.clone(),
            config
                .storage_public_url
                .clone()
                .unwrap_or_else(|| "http://localhost/storage".to_string()),
        ))),
    }
}
