use anyhow::anyhow;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{primitives::ByteStream, Client};

use crate::{consts::consts::ImageRef, options::PipelineOptions};

use super::{GatewayError, GatewayResult, ImageStore};

/// Uploads images into the bucket the recognition service reads from
pub struct S3ImageStore {
    client: Client,
    bucket: String,
}

impl S3ImageStore {
    pub fn new(sdk: &SdkConfig, options: &PipelineOptions) -> Self {
        Self {
            client: Client::new(sdk),
            bucket: options.bucket.clone(),
        }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    #[tracing::instrument(skip(self, bytes))]
    async fn put_image(&self, key: &str, bytes: Vec<u8>) -> GatewayResult<ImageRef> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| GatewayError::UnableToWriteImage(anyhow!(e)))?;

        Ok(ImageRef(key.to_string()))
    }
}
