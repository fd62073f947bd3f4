use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::AppError;

/// Presigned upload URLs stay valid for ten minutes.
const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);

/// StorageService
///
/// Object storage for product images. Admins upload straight to the bucket through a
/// presigned URL and then save the returned public URL on the product.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the bucket if missing. Only called in `Env::Local` (MinIO).
    async fn ensure_bucket_exists(&self);

    /// Signed PUT URL for `key`, bound to `content_type`.
    async fn presigned_upload_url(&self, key: &str, content_type: &str)
    -> Result<String, AppError>;
}

pub type StorageState = Arc<dyn StorageService>;

/// S3StorageClient
///
/// aws-sdk-s3 client pointed at MinIO locally and Supabase Storage in production.
/// Both require path-style addressing.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
}

impl S3StorageClient {
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            // Already-owned buckets report an error as well.
            tracing::debug!("create_bucket: {:?}", e);
        }
    }

    async fn presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, AppError> {
        let presigning = PresigningConfig::expires_in(UPLOAD_URL_TTL)
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let presigned_req = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(presigned_req.uri().to_string())
    }
}

/// product_image_key
///
/// Builds `products/<uuid>.<ext>` for an image upload. Only `image/*` content types and
/// plain alphanumeric extensions are accepted.
pub fn product_image_key(filename: &str, content_type: &str) -> Result<String, AppError> {
    if !content_type.starts_with("image/") {
        return Err(AppError::Validation(format!(
            "unsupported content type '{}'",
            content_type
        )));
    }

    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "bin".to_string());

    Ok(format!("products/{}.{}", Uuid::new_v4(), extension))
}

/// MockStorageService
///
/// Deterministic URLs for tests; `should_fail` simulates an unreachable bucket.
#[derive(Clone, Default)]
pub struct MockStorageService {
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn presigned_upload_url(
        &self,
        key: &str,
        _content_type: &str,
    ) -> Result<String, AppError> {
        if self.should_fail {
            return Err(AppError::Storage("Mock Storage Error".to_string()));
        }
        Ok(format!(
            "http://localhost:9000/mock-bucket/{}?signature=fake",
            key
        ))
    }
}
