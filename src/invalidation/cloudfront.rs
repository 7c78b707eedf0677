use super::{InvalidationBatch, InvalidationError, Invalidator};
use crate::config::{load_aws_config, SyncConfig};
use async_trait::async_trait;
use aws_sdk_cloudfront::types::{InvalidationBatch as CfBatch, Paths};
use aws_sdk_cloudfront::Client;

/// [`Invalidator`] backed by Amazon CloudFront
#[derive(Debug, Clone)]
pub struct CloudFrontInvalidator {
    client: Client,
}

impl CloudFrontInvalidator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_config(config: &SyncConfig) -> Self {
        Self::new(Client::new(&load_aws_config(config).await))
    }
}

#[async_trait]
impl Invalidator for CloudFrontInvalidator {
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        batch: InvalidationBatch,
    ) -> Result<String, InvalidationError> {
        let request_error = |e: aws_sdk_cloudfront::error::BuildError| {
            InvalidationError::Request(e.to_string())
        };

        let quantity = i32::try_from(batch.paths.len())
            .map_err(|e| InvalidationError::Request(e.to_string()))?;
        let paths = Paths::builder()
            .quantity(quantity)
            .set_items(Some(batch.paths))
            .build()
            .map_err(request_error)?;
        let cf_batch = CfBatch::builder()
            .caller_reference(batch.caller_reference)
            .paths(paths)
            .build()
            .map_err(request_error)?;

        let response = self
            .client
            .create_invalidation()
            .distribution_id(distribution_id)
            .invalidation_batch(cf_batch)
            .send()
            .await
            .map_err(|e| InvalidationError::Rejected {
                distribution_id: distribution_id.to_string(),
                message: e.to_string(),
            })?;

        Ok(response
            .invalidation()
            .map(|invalidation| invalidation.id().to_string())
            .unwrap_or_default())
    }
}
