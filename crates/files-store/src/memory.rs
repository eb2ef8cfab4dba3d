use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::{StoreError, StoreResult};
use crate::object::{ListObjectsOutput, ObjectKey, ObjectMetadata, StoredObject};
use crate::traits::ObjectStore;

type Bucket = BTreeMap<String, StoredObject>;

/// In-memory, BTreeMap-based object store.
///
/// Intended for tests and local runs. Each bucket is an ordered map, so
/// listings come out in key order for free. Continuation cursors are the
/// hex-encoded last key of the previous batch; listing resumes strictly after
/// that key whether or not it still exists.
pub struct InMemoryObjectStore {
    buckets: RwLock<HashMap<String, Bucket>>,
}

impl InMemoryObjectStore {
    /// Create a store with no buckets.
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store with a single empty bucket.
    pub fn with_bucket(name: impl Into<String>) -> Self {
        let store = Self::new();
        store.create_bucket(name);
        store
    }

    /// Create an empty bucket. Returns `false` if it already existed.
    pub fn create_bucket(&self, name: impl Into<String>) -> bool {
        let mut buckets = self.buckets.write().expect("lock poisoned");
        let name = name.into();
        if buckets.contains_key(&name) {
            return false;
        }
        tracing::debug!(bucket = %name, "bucket created");
        buckets.insert(name, Bucket::new());
        true
    }

    /// Number of objects in `bucket` (zero if the bucket does not exist).
    pub fn len(&self, bucket: &str) -> usize {
        self.buckets
            .read()
            .expect("lock poisoned")
            .get(bucket)
            .map_or(0, BTreeMap::len)
    }

    /// Returns `true` if `bucket` holds no objects.
    pub fn is_empty(&self, bucket: &str) -> bool {
        self.len(bucket) == 0
    }

    /// Write an object with an explicit modification time.
    pub fn insert_at(
        &self,
        bucket: &str,
        key: &ObjectKey,
        data: impl Into<Bytes>,
        content_type: &str,
        last_modified: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut buckets = self.buckets.write().expect("lock poisoned");
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        objects.insert(
            key.as_str().to_string(),
            StoredObject::new(data, content_type, last_modified),
        );
        Ok(())
    }

    fn with_object<T>(
        &self,
        bucket: &str,
        key: &ObjectKey,
        f: impl FnOnce(&StoredObject) -> T,
    ) -> StoreResult<T> {
        let buckets = self.buckets.read().expect("lock poisoned");
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        objects
            .get(key.as_str())
            .map(f)
            .ok_or_else(|| StoreError::not_found(bucket, key.as_str()))
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_cursor(last_key: &str) -> String {
    hex::encode(last_key.as_bytes())
}

fn decode_cursor(cursor: &str) -> StoreResult<String> {
    let bytes = hex::decode(cursor).map_err(|e| StoreError::InvalidCursor(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StoreError::InvalidCursor(e.to_string()))
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: u32,
        cursor: Option<&str>,
    ) -> StoreResult<ListObjectsOutput> {
        let start_after = cursor.map(decode_cursor).transpose()?;

        let buckets = self.buckets.read().expect("lock poisoned");
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;

        let lower = match start_after.as_deref() {
            Some(after) if after >= prefix => Bound::Excluded(after),
            _ => Bound::Included(prefix),
        };
        let mut matching = objects
            .range::<str, _>((lower, Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix));

        let batch: Vec<_> = matching
            .by_ref()
            .take(max_keys as usize)
            .map(|(key, obj)| obj.summary(key))
            .collect();

        let next_cursor = if max_keys > 0 && matching.next().is_some() {
            batch.last().map(|summary| encode_cursor(&summary.key))
        } else {
            None
        };

        Ok(ListObjectsOutput {
            objects: batch,
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
        self.insert_at(bucket, key, data, content_type, Utc::now())
    }

    async fn get_object(&self, bucket: &str, key: &ObjectKey) -> StoreResult<StoredObject> {
        self.with_object(bucket, key, StoredObject::clone)
    }

    async fn head_object(&self, bucket: &str, key: &ObjectKey) -> StoreResult<ObjectMetadata> {
        self.with_object(bucket, key, |obj| obj.metadata.clone())
    }

    async fn delete_object(&self, bucket: &str, key: &ObjectKey) -> StoreResult<()> {
        let mut buckets = self.buckets.write().expect("lock poisoned");
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        objects.remove(key.as_str());
        Ok(())
    }

    async fn object_exists(&self, bucket: &str, key: &ObjectKey) -> StoreResult<bool> {
        match self.with_object(bucket, key, |_| ()) {
            Ok(()) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let buckets = self.buckets.read().expect("lock poisoned");
        let mut names: Vec<&String> = buckets.keys().collect();
        names.sort();
        f.debug_struct("InMemoryObjectStore")
            .field("buckets", &names)
            .finish()
    }
}
