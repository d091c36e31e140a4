use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::{AudioStore, StorageError, StorageResult, StoredObject};

/// Cache lifetime sent with every upload, in seconds.
const CACHE_CONTROL_SECONDS: u32 = 3600;

/// Successful upload response from Supabase Storage.
#[derive(Debug, Deserialize)]
struct SupabaseUploadResponse {
    /// `{bucket}/{key}`
    #[serde(rename = "Key")]
    key: Option<String>,
}

/// Error body returned by Supabase Storage.
///
/// `statusCode` is a string in the storage API (e.g. `"409"`), and duplicate
/// uploads are sometimes reported with an HTTP 400 wrapper.
#[derive(Debug, Default, Deserialize)]
struct SupabaseErrorResponse {
    #[serde(rename = "statusCode")]
    status_code: Option<String>,
    error: Option<String>,
    message: Option<String>,
}

impl SupabaseErrorResponse {
    fn is_duplicate(&self) -> bool {
        self.status_code.as_deref() == Some("409")
            || self.error.as_deref() == Some("Duplicate")
    }

    fn describe(&self, status: u16) -> String {
        match (&self.message, &self.error) {
            (Some(message), _) => message.clone(),
            (None, Some(error)) => error.clone(),
            (None, None) => format!("request failed with status {}", status),
        }
    }
}

/// [`AudioStore`] backed by the Supabase Storage REST API.
///
/// - Upload: `POST {url}/storage/v1/object/{bucket}/{key}` with `x-upsert: false`
/// - Delete: `DELETE {url}/storage/v1/object/{bucket}/{key}`
/// - Public URL: `{url}/storage/v1/object/public/{bucket}/{key}`
#[derive(Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl SupabaseStore {
    pub fn new(base_url: String, api_key: String, bucket: String) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            bucket,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, key
        )
    }
}

#[async_trait]
impl AudioStore for SupabaseStore {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let size = data.len();
        let start = Instant::now();

        debug!(bucket = %self.bucket, key = %key, size_bytes = size, "Uploading to Supabase");

        let response = self
            .client
            .post(self.object_url(key))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header("x-upsert", "false")
            .header(
                "cache-control",
                format!("max-age={}", CACHE_CONTROL_SECONDS),
            )
            .header("content-type", content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Supabase upload error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let api_error: SupabaseErrorResponse =
                serde_json::from_slice(&body).unwrap_or_default();

            error!(
                status = status.as_u16(),
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Supabase upload failed"
            );

            if status.as_u16() == 409 || api_error.is_duplicate() {
                return Err(StorageError::AlreadyExists(key.to_string()));
            }
            return Err(StorageError::UploadFailed(format!(
                "Supabase upload error: {}",
                api_error.describe(status.as_u16())
            )));
        }

        // The stored path is `{bucket}/{key}`; fall back to the requested key.
        let stored_key = response
            .json::<SupabaseUploadResponse>()
            .await
            .ok()
            .and_then(|r| r.key)
            .and_then(|k| {
                k.strip_prefix(&format!("{}/", self.bucket))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| key.to_string());

        info!(
            bucket = %self.bucket,
            key = %stored_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Supabase upload successful"
        );

        Ok(StoredObject {
            public_url: self.public_url(&stored_key),
            key: stored_key,
            content_type: content_type.to_string(),
            size_bytes: size,
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let response = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StorageError::DeleteFailed(format!(
                "Supabase delete of {} failed with status {}",
                key,
                response.status().as_u16()
            )))
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
