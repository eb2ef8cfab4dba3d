//! AWS S3 object store implementation.

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::{ByteStream, DateTime as S3DateTime};
use aws_sdk_s3::types::Object;
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::{StoreError, StoreResult};
use crate::object::{
    ListObjectsOutput, ObjectKey, ObjectMetadata, ObjectSummary, StoredObject,
    DEFAULT_CONTENT_TYPE,
};
use crate::traits::ObjectStore;

/// S3 object store.
///
/// Wraps an explicitly constructed [`Client`]; the caller owns the client's
/// lifecycle. Continuation cursors are S3's `NextContinuationToken` values,
/// passed through untouched.
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the standard AWS environment (credentials chain,
    /// `AWS_REGION`, profile files).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }

    /// Build a client for an S3-compatible endpoint (MinIO, LocalStack, ...).
    /// Path-style addressing is forced since such endpoints rarely support
    /// virtual-hosted buckets.
    pub async fn with_endpoint(endpoint_url: impl Into<String>, region: impl Into<String>) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .endpoint_url(endpoint_url)
            .region(Region::new(region.into()))
            .load()
            .await;
        let config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();
        Self::new(Client::from_conf(config))
    }
}

fn to_chrono(t: &S3DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(t.secs(), t.subsec_nanos()).unwrap_or_default()
}

/// Map an SDK error onto the store taxonomy. `key` is `None` for listing
/// calls, where `InvalidArgument` means the continuation token was rejected.
fn classify<E, R>(err: SdkError<E, R>, bucket: &str, key: Option<&str>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match err.code() {
        Some("NoSuchKey") | Some("NotFound") => StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.unwrap_or_default().to_string(),
        },
        Some("NoSuchBucket") => StoreError::NoSuchBucket(bucket.to_string()),
        Some("AccessDenied") | Some("InvalidAccessKeyId") | Some("SignatureDoesNotMatch") => {
            tracing::warn!(bucket, error = %message, "s3 request denied");
            StoreError::PermissionDenied(message)
        }
        Some("InvalidArgument") if key.is_none() => StoreError::InvalidCursor(message),
        _ => {
            tracing::warn!(bucket, error = %message, "s3 request failed");
            StoreError::Unavailable(message)
        }
    }
}

/// Project one listing entry. S3 always returns a key; an entry without one
/// is a malformed response, not something to skip.
fn summarize(obj: &Object) -> StoreResult<ObjectSummary> {
    let key = obj
        .key()
        .ok_or_else(|| StoreError::Unavailable("listing entry without a key".into()))?;
    Ok(ObjectSummary {
        key: key.to_string(),
        size: obj.size().unwrap_or(0).max(0) as u64,
        last_modified: obj.last_modified().map(to_chrono).unwrap_or_default(),
    })
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: u32,
        cursor: Option<&str>,
    ) -> StoreResult<ListObjectsOutput> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .max_keys(i32::try_from(max_keys).unwrap_or(i32::MAX))
            .set_continuation_token(cursor.map(str::to_string))
            .send()
            .await
            .map_err(|e| classify(e, bucket, None))?;

        let objects = output
            .contents()
            .iter()
            .map(summarize)
            .collect::<StoreResult<Vec<_>>>()?;

        let next_cursor = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ListObjectsOutput {
            objects,
            next_cursor,
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> StoreResult<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key.as_str())
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| classify(e, bucket, Some(key.as_str())))?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &ObjectKey) -> StoreResult<StoredObject> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| classify(e, bucket, Some(key.as_str())))?;

        let content_type = output
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let last_modified = output.last_modified().map(to_chrono).unwrap_or_default();
        let etag = output.e_tag().unwrap_or_default().trim_matches('"').to_string();

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .into_bytes();

        Ok(StoredObject {
            metadata: ObjectMetadata {
                size: data.len() as u64,
                content_type,
                last_modified,
                etag,
            },
            data,
        })
    }

    async fn head_object(&self, bucket: &str, key: &ObjectKey) -> StoreResult<ObjectMetadata> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| classify(e, bucket, Some(key.as_str())))?;

        Ok(ObjectMetadata {
            size: output.content_length().unwrap_or(0).max(0) as u64,
            content_type: output
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string(),
            last_modified: output.last_modified().map(to_chrono).unwrap_or_default(),
            etag: output.e_tag().unwrap_or_default().trim_matches('"').to_string(),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &ObjectKey) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| classify(e, bucket, Some(key.as_str())))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
