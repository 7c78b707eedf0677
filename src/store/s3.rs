use super::types::{ObjectSummary, PutObject, RemoteStore, StoreError};
use crate::config::{load_aws_config, SyncConfig};
use crate::utils::PART_SIZE;
use async_trait::async_trait;
use aws_sdk_s3::primitives::{ByteStream, DateTime, DateTimeFormat};
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use tracing::{debug, warn};

/// [`RemoteStore`] backed by Amazon S3 (or any S3-compatible endpoint)
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration plus `config` overrides
    pub async fn from_config(config: &SyncConfig) -> Self {
        let shared = load_aws_config(config).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }
        Self::new(Client::from_conf(builder.build()))
    }

    /// Upload in `PART_SIZE` parts so the resulting ETag matches the local fingerprint
    async fn put_multipart(&self, bucket: &str, object: PutObject) -> Result<(), StoreError> {
        let upload = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(&object.key)
            .set_content_type(object.content_type)
            .set_content_encoding(object.content_encoding)
            .set_cache_control(object.cache_control)
            .set_expires(object.expires.as_deref().map(parse_expires))
            .send()
            .await
            .map_err(|e| upload_error(&object.key, e))?;
        let upload_id = upload
            .upload_id()
            .ok_or_else(|| upload_error(&object.key, "missing upload id"))?
            .to_string();

        match self
            .upload_parts(bucket, &object.key, &upload_id, &object.body)
            .await
        {
            Ok(parts) => {
                self.client
                    .complete_multipart_upload()
                    .bucket(bucket)
                    .key(&object.key)
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(|e| upload_error(&object.key, e))?;
                Ok(())
            }
            Err(e) => {
                if let Err(abort_err) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(&object.key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    warn!(
                        key = %object.key,
                        error = %abort_err,
                        "Failed to abort multipart upload"
                    );
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        body: &[u8],
    ) -> Result<Vec<CompletedPart>, StoreError> {
        let mut parts = Vec::new();

        for (index, chunk) in body.chunks(PART_SIZE).enumerate() {
            let part_number = i32::try_from(index + 1).map_err(|e| upload_error(key, e))?;
            let part = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(chunk.to_vec()))
                .send()
                .await
                .map_err(|e| upload_error(key, e))?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(part.e_tag().map(ToOwned::to_owned))
                    .part_number(part_number)
                    .build(),
            );
        }

        Ok(parts)
    }
}

fn upload_error(key: &str, error: impl std::fmt::Display) -> StoreError {
    StoreError::Upload {
        key: key.to_string(),
        message: error.to_string(),
    }
}

/// `Expires` must be an HTTP date; anything else (such as `"0"`) means already expired
fn parse_expires(value: &str) -> DateTime {
    DateTime::from_str(value, DateTimeFormat::HttpDate).unwrap_or_else(|_| DateTime::from_secs(0))
}

#[async_trait]
impl RemoteStore for S3Store {
    async fn list(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket);
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| {
                let no_such_bucket = e
                    .as_service_error()
                    .map(|se| se.is_no_such_bucket())
                    .unwrap_or(false);
                if no_such_bucket {
                    StoreError::NotFound(bucket.to_string())
                } else {
                    StoreError::List {
                        bucket: bucket.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    objects.push(ObjectSummary {
                        key: key.to_string(),
                        etag: object.e_tag().unwrap_or_default().to_string(),
                    });
                }
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(ToOwned::to_owned);
            } else {
                break;
            }
        }

        Ok(objects)
    }

    async fn put(&self, bucket: &str, object: PutObject) -> Result<(), StoreError> {
        debug!(bucket = %bucket, key = %object.key, size = object.body.len(), "Uploading object");

        if object.body.len() > PART_SIZE {
            return self.put_multipart(bucket, object).await;
        }

        self.client
            .put_object()
            .bucket(bucket)
            .key(&object.key)
            .body(ByteStream::from(object.body))
            .set_content_type(object.content_type)
            .set_content_encoding(object.content_encoding)
            .set_cache_control(object.cache_control)
            .set_expires(object.expires.as_deref().map(parse_expires))
            .send()
            .await
            .map_err(|e| upload_error(&object.key, e))?;

        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        debug!(bucket = %bucket, key = %key, "Deleting object");

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expires() {
        assert_eq!(parse_expires("0"), DateTime::from_secs(0));
        assert_eq!(
            parse_expires("Thu, 01 Jan 1970 00:01:00 GMT"),
            DateTime::from_secs(60)
        );
    }
}
