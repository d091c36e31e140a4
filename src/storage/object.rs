use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, AttributeValue, Attributes, Error as ObjectStoreError, ObjectStore, PutMode,
    PutOptions, PutPayload,
};
use tracing::{error, info};

use super::{AudioStore, StorageError, StorageResult, StoredObject};

/// [`AudioStore`] backed by an `object_store` implementation.
///
/// Uploads use `PutMode::Create`, so an existing key is never replaced.
#[derive(Clone)]
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    url_style: PublicUrlStyle,
}

/// How public URLs are derived from a key.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PublicUrlStyle {
    /// `{base}/{bucket}/{key}`
    Path(String),
    /// `{base}/{key}`, the bucket is part of the host
    VirtualHosted(String),
}

impl ObjectStoreBackend {
    /// Wrap an existing store. Public URLs are path-style:
    /// `{public_base_url}/{bucket}/{key}`.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            url_style: PublicUrlStyle::Path(
                public_base_url.into().trim_end_matches('/').to_string(),
            ),
        }
    }

    /// In-process store, used for local runs and tests.
    pub fn in_memory(bucket: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(InMemory::new()), bucket, public_base_url)
    }

    /// S3 or S3-compatible store.
    ///
    /// When no public URL is configured, AWS virtual-hosted URLs are used, or
    /// `{endpoint}/{bucket}/{key}` for custom endpoints (MinIO, R2, ...).
    pub fn s3(
        bucket: String,
        region: String,
        endpoint: Option<String>,
        access_key: Option<String>,
        secret_key: Option<String>,
        public_base_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint {
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(endpoint.starts_with("http://"));
        }
        if let Some(key) = access_key {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = secret_key {
            builder = builder.with_secret_access_key(secret);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let public_base_url = match (public_base_url, endpoint) {
            (Some(base), _) => base,
            (None, Some(endpoint)) => endpoint,
            (None, None) => {
                let host = format!("https://{}.s3.{}.amazonaws.com", bucket, region);
                return Ok(Self {
                    store: Arc::new(store),
                    bucket,
                    url_style: PublicUrlStyle::VirtualHosted(host),
                });
            }
        };

        Ok(Self::new(Arc::new(store), bucket, public_base_url))
    }

    /// Underlying object store handle.
    pub fn inner(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    fn parse_key(key: &str) -> StorageResult<ObjectPath> {
        ObjectPath::parse(key).map_err(|e| StorageError::InvalidKey(e.to_string()))
    }
}

#[async_trait]
impl AudioStore for ObjectStoreBackend {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let location = Self::parse_key(key)?;
        let size = data.len();
        let start = Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );
        let options = PutOptions {
            mode: PutMode::Create,
            attributes,
            ..Default::default()
        };

        match self
            .store
            .put_opts(&location, PutPayload::from(data), options)
            .await
        {
            Ok(_) => {}
            Err(ObjectStoreError::AlreadyExists { path, .. }) => {
                error!(bucket = %self.bucket, key = %key, "Refusing to overwrite existing object");
                return Err(StorageError::AlreadyExists(path));
            }
            Err(e) => {
                error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object store upload failed"
                );
                return Err(StorageError::UploadFailed(e.to_string()));
            }
        }

        info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object store upload successful"
        );

        Ok(StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            public_url: self.public_url(key),
            size_bytes: size,
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let location = Self::parse_key(key)?;
        self.store
            .delete(&location)
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))
    }

    fn public_url(&self, key: &str) -> String {
        match &self.url_style {
            PublicUrlStyle::Path(base) => format!("{}/{}/{}", base, self.bucket, key),
            PublicUrlStyle::VirtualHosted(base) => format!("{}/{}", base, key),
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
