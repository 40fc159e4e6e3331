use anyhow::anyhow;
use async_trait::async_trait;
use rusoto_s3::{
    Delete, DeleteObjectsRequest, ListObjectsV2Request, ObjectIdentifier, PutObjectRequest, S3,
};

use super::{DataLakeRepository, DataLakeRepositoryError};
use crate::unknown_error::UnknownError;

/// Most keys a single `DeleteObjects` request accepts.
const DELETE_BATCH_SIZE: usize = 1000;
const PARQUET_CONTENT_TYPE: &str = "application/vnd.apache.parquet";

pub struct DataLakeRepositoryImpl<T: S3 + Sync + Send> {
    bucket_name: String,
    s3_client: T,
}

impl<T: S3 + Sync + Send> DataLakeRepositoryImpl<T> {
    pub fn new(bucket_name: String, s3_client: T) -> Self {
        Self {
            bucket_name,
            s3_client,
        }
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, DataLakeRepositoryError> {
        let mut keys = Vec::new();
        let mut continuation_token = None;

        loop {
            let output = self
                .s3_client
                .list_objects_v2(ListObjectsV2Request {
                    bucket: self.bucket_name.clone(),
                    prefix: Some(prefix.to_owned()),
                    continuation_token: continuation_token.take(),
                    ..ListObjectsV2Request::default()
                })
                .await
                .map_err(|e| DataLakeRepositoryError::unknown(e, Some("Error listing objects")))?;

            keys.extend(
                output
                    .contents
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|object| object.key),
            );

            match (output.is_truncated, output.next_continuation_token) {
                (Some(true), Some(token)) => continuation_token = Some(token),
                _ => break,
            }
        }

        Ok(keys)
    }
}

/// Parquet parts are tagged as such, markers and other objects get no content type.
fn content_type(key: &str) -> Option<String> {
    key.ends_with(".parquet").then(|| PARQUET_CONTENT_TYPE.to_owned())
}

fn build_delete_request(bucket_name: &str, keys: &[String]) -> DeleteObjectsRequest {
    DeleteObjectsRequest {
        bucket: bucket_name.to_owned(),
        delete: Delete {
            objects: keys
                .iter()
                .map(|key| ObjectIdentifier {
                    key: key.clone(),
                    version_id: None,
                })
                .collect(),
            quiet: Some(true),
        },
        ..DeleteObjectsRequest::default()
    }
}

#[async_trait]
impl<T: S3 + Sync + Send> DataLakeRepository for DataLakeRepositoryImpl<T> {
    async fn purge_prefix(&self, prefix: &str) -> Result<usize, DataLakeRepositoryError> {
        let keys = self.list_keys(prefix).await?;

        for batch in keys.chunks(DELETE_BATCH_SIZE) {
            let output = self
                .s3_client
                .delete_objects(build_delete_request(&self.bucket_name, batch))
                .await
                .map_err(|e| DataLakeRepositoryError::unknown(e, Some("Error deleting objects")))?;

            if let Some(error) = output.errors.and_then(|errors| errors.into_iter().next()) {
                return Err(DataLakeRepositoryError::Unknown(anyhow!(
                    "unable to delete s3://{}/{}: {}",
                    self.bucket_name,
                    error.key.unwrap_or_default(),
                    error.message.unwrap_or_default()
                )));
            }
        }

        tracing::info!(
            bucket = self.bucket_name,
            prefix,
            deleted = keys.len(),
            "Purged s3://{}/{prefix}",
            self.bucket_name
        );

        Ok(keys.len())
    }

    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), DataLakeRepositoryError> {
        let size = body.len();

        self.s3_client
            .put_object(PutObjectRequest {
                bucket: self.bucket_name.clone(),
                key: key.to_owned(),
                content_length: Some(size as i64),
                content_type: content_type(key),
                body: Some(body.into()),
                ..PutObjectRequest::default()
            })
            .await
            .map_err(|e| {
                DataLakeRepositoryError::Unknown(
                    anyhow!(e).context(format!("Error writing s3://{}/{key}", self.bucket_name)),
                )
            })?;

        tracing::debug!(key, size, "Wrote s3://{}/{key}", self.bucket_name);

        Ok(())
    }
}
