use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::sync::Arc;
use std::time::Duration;

/// How long an upload URL stays valid.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);

/// MIME types accepted for document uploads, with the extension used for the object key.
pub const ALLOWED_UPLOAD_TYPES: &[(&str, &str)] = &[
    ("application/pdf", "pdf"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
    ("application/msword", "doc"),
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("text/plain", "txt"),
];

/// Extension for an accepted MIME type, `None` if uploads of that type are refused.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_UPLOAD_TYPES
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(content_type.trim()))
        .map(|(_, ext)| *ext)
}

/// StorageService
///
/// The contract for the document file store. The real S3 client and the
/// in-memory mock both implement it, so handlers never know which one they hold.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the configured bucket if missing. Used for the local MinIO setup.
    async fn ensure_bucket_exists(&self);

    /// Generates a signed URL allowing the client to PUT one file directly into
    /// the bucket under `key`, constrained to `content_type`.
    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, String>;
}

/// S3StorageClient
///
/// S3-compatible client (MinIO locally, the managed bucket in production).
/// `force_path_style(true)` is required for MinIO.
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
        // CreateBucket fails harmlessly when the bucket is already there.
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(bucket = %self.bucket_name, error = %e, "create_bucket skipped");
        }
    }

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, String> {
        let presigning = PresigningConfig::expires_in(UPLOAD_URL_TTL).map_err(|e| e.to_string())?;

        let presigned_req = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            // The signature covers Content-Type, so the client cannot upload another type.
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| e.to_string())?;

        Ok(presigned_req.uri().to_string())
    }
}

/// Strips empty, `.` and `..` segments from an object key.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockStorageService
///
/// Network-free `StorageService` for tests and local runs without MinIO.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, every call returns a simulated failure.
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

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        _content_type: &str,
    ) -> Result<String, String> {
        if self.should_fail {
            return Err("mock storage failure".to_string());
        }
        Ok(format!(
            "http://localhost:9000/mock-bucket/{}?signature=fake",
            sanitize_key(key)
        ))
    }
}

/// StorageState
///
/// The shared handle to the storage service held in the application state.
pub type StorageState = Arc<dyn StorageService>;
