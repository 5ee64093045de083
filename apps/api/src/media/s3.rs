use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use super::{generate_filename, MediaError, MediaStorage, StoredMedia, UploadedFile};
use crate::config::S3Config;

const KEY_PREFIX: &str = "uploads";
const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Remote media host backed by an S3-compatible bucket.
///
/// Objects are stored as uploaded; format and quality negotiation is left to
/// the CDN in front of `public_url`.
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: &str, public_url: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Constructs a client for AWS, or for MinIO and friends when an endpoint is set.
    pub async fn from_config(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "site-api-static",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        Self::new(
            aws_sdk_s3::Client::from_conf(s3_config),
            &config.bucket,
            &config.public_url,
        )
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

#[async_trait]
impl MediaStorage for S3Storage {
    fn backend(&self) -> &'static str {
        "s3"
    }

    async fn store(&self, file: &UploadedFile) -> Result<StoredMedia, MediaError> {
        let key = format!(
            "{KEY_PREFIX}/{}",
            generate_filename(file.file_name.as_deref())
        );
        let content_type = file
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.bytes.clone()))
            .content_type(content_type)
            .cache_control(CACHE_CONTROL)
            .send()
            .await
            .map_err(|e| MediaError::Remote(format!("S3 upload failed: {e}")))?;

        info!("Uploaded s3://{}/{} ({} bytes)", self.bucket, key, file.bytes.len());

        Ok(StoredMedia {
            url: self.object_url(&key),
            id: key,
        })
    }

    /// Remote objects are left in place when their record is deleted.
    async fn release(&self, _src: &str) -> Result<bool, MediaError> {
        Ok(false)
    }
}
