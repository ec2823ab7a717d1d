//! S3 client implementation.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Default lifetime for presigned upload URLs.
pub const DEFAULT_UPLOAD_URL_TTL: Duration = Duration::from_secs(300);

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region
    pub region: String,
    /// Optional custom endpoint (MinIO, localstack)
    pub endpoint_url: Option<String>,
    /// Lifetime of presigned upload URLs
    pub upload_url_ttl: Duration,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("AWS_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("AWS_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("S3_BUCKET")
                .map_err(|_| StorageError::config_error("S3_BUCKET not set"))?,
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "ap-south-1".to_string()),
            endpoint_url: std::env::var("S3_ENDPOINT_URL").ok().filter(|u| !u.is_empty()),
            upload_url_ttl: std::env::var("RESUME_URL_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_UPLOAD_URL_TTL),
        })
    }
}

/// S3 storage client for resume blobs.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
    upload_url_ttl: Duration,
}

impl S3Client {
    /// Create a new S3 client from configuration.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "s3",
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());

        Ok(Self {
            client,
            bucket: config.bucket_name,
            upload_url_ttl: config.upload_url_ttl,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Self::new(config).await
    }

    /// Generate a presigned PUT URL the browser uploads a resume to directly.
    pub async fn presign_put(&self, key: &str, content_type: &str) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(self.upload_url_ttl)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Download object as bytes.
    pub async fn download_bytes(&self, key: &str) -> StorageResult<Vec<u8>> {
        debug!("Downloading {}", key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::TimeoutError(_) => {
                    StorageError::timeout(format!("get {} timed out", key))
                }
                SdkError::DispatchFailure(d) if d.is_timeout() => {
                    StorageError::timeout(format!("get {} timed out", key))
                }
                _ if e
                    .as_service_error()
                    .is_some_and(GetObjectError::is_no_such_key) =>
                {
                    StorageError::not_found(key)
                }
                _ => StorageError::DownloadFailed(e.to_string()),
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(bytes)
    }

    /// Check connectivity by heading the bucket.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(e.to_string()))?;
        Ok(())
    }
}
