use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{StoreError, StoreResult};
use crate::object::{ListObjectsOutput, ObjectKey, ObjectMetadata, StoredObject};

/// Key-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - `list_objects` returns keys in ascending lexicographic byte order, at
///   most `max_keys` of them, and a cursor if and only if more keys remain.
/// - Cursors are opaque strings; callers hand them back unchanged.
/// - A cursor the backend cannot resolve fails with
///   [`StoreError::InvalidCursor`].
/// - Missing objects fail with [`StoreError::NotFound`], except on delete,
///   which is idempotent.
/// - All backend errors are propagated, never silently ignored.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List up to `max_keys` objects whose keys start with `prefix`,
    /// resuming after `cursor` when one is given.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: u32,
        cursor: Option<&str>,
    ) -> StoreResult<ListObjectsOutput>;

    /// Write an object, replacing any existing object at `key`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> StoreResult<()>;

    /// Read an object body and its metadata.
    async fn get_object(&self, bucket: &str, key: &ObjectKey) -> StoreResult<StoredObject>;

    /// Read only the metadata of an object.
    async fn head_object(&self, bucket: &str, key: &ObjectKey) -> StoreResult<ObjectMetadata>;

    /// Delete an object. Deleting a missing object succeeds.
    async fn delete_object(&self, bucket: &str, key: &ObjectKey) -> StoreResult<()>;

    /// Check whether an object exists.
    ///
    /// Default implementation issues a head request and maps
    /// [`StoreError::NotFound`] to `false`.
    async fn object_exists(&self, bucket: &str, key: &ObjectKey) -> StoreResult<bool> {
        match self.head_object(bucket, key).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Short backend name for logging.
    fn backend_name(&self) -> &'static str;
}
