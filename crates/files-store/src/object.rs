use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Maximum length of an object key in bytes (the S3 limit).
pub const MAX_KEY_LEN: usize = 1024;

/// Content type recorded when the uploader does not supply one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// ObjectKey
// ---------------------------------------------------------------------------

/// A validated object key.
///
/// Keys are non-empty UTF-8 strings without a leading slash, at most
/// [`MAX_KEY_LEN`] bytes long. Slashes inside the key are ordinary
/// characters; they only carry meaning as a directory convention.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate and wrap a key.
    pub fn parse(key: impl Into<String>) -> StoreResult<Self> {
        let key = key.into();
        let reason = if key.is_empty() {
            Some("key is empty".to_string())
        } else if key.starts_with('/') {
            Some("key must not start with '/'".to_string())
        } else if key.len() > MAX_KEY_LEN {
            Some(format!("key is {} bytes (max {MAX_KEY_LEN})", key.len()))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(StoreError::InvalidKey { key, reason }),
            None => Ok(Self(key)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectKey({:?})", self.0)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = StoreError;

    fn try_from(value: String) -> StoreResult<Self> {
        Self::parse(value)
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0
    }
}

// ---------------------------------------------------------------------------
// Metadata & stored objects
// ---------------------------------------------------------------------------

/// Metadata of a single stored object, as returned by a head request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Body size in bytes.
    pub size: u64,
    /// MIME type recorded at upload time.
    pub content_type: String,
    /// Time of the last write.
    pub last_modified: DateTime<Utc>,
    /// Entity tag identifying this version of the body (unquoted).
    pub etag: String,
}

/// An object body together with its metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub metadata: ObjectMetadata,
}

impl StoredObject {
    /// Build a stored object, deriving size and entity tag from `data`.
    pub fn new(
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        let data = data.into();
        let metadata = ObjectMetadata {
            size: data.len() as u64,
            content_type: content_type.into(),
            last_modified,
            etag: compute_etag(&data),
        };
        Self { data, metadata }
    }

    /// Project this object into a listing summary under `key`.
    pub fn summary(&self, key: &str) -> ObjectSummary {
        ObjectSummary {
            key: key.to_string(),
            size: self.metadata.size,
            last_modified: self.metadata.last_modified,
        }
    }
}

/// Entity tag: first 16 bytes of the BLAKE3 digest, hex-encoded.
fn compute_etag(data: &[u8]) -> String {
    hex::encode(&blake3::hash(data).as_bytes()[..16])
}

// ---------------------------------------------------------------------------
// Listing primitive
// ---------------------------------------------------------------------------

/// One entry of a raw listing batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// A bounded listing batch plus the backend's continuation cursor.
///
/// `next_cursor` is `Some` if and only if more keys remain after this batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListObjectsOutput {
    pub objects: Vec<ObjectSummary>,
    pub next_cursor: Option<String>,
}

impl ListObjectsOutput {
    /// A final, empty batch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if the backend has more keys after this batch.
    pub fn is_truncated(&self) -> bool {
        self.next_cursor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_accepts_nested_paths() {
        let key = ObjectKey::parse("some/nested/file.txt").unwrap();
        assert_eq!(key.as_str(), "some/nested/file.txt");
        assert_eq!(key.to_string(), "some/nested/file.txt");
    }

    #[test]
    fn key_rejects_empty() {
        let err = ObjectKey::parse("").unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { .. }));
    }

    #[test]
    fn key_rejects_leading_slash() {
        let err = ObjectKey::parse("/etc/passwd").unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { ref reason, .. } if reason.contains('/')));
    }

    #[test]
    fn key_length_limit() {
        assert!(ObjectKey::parse("a".repeat(MAX_KEY_LEN)).is_ok());
        assert!(ObjectKey::parse("a".repeat(MAX_KEY_LEN + 1)).is_err());
    }

    #[test]
    fn key_serde_validates() {
        let key: ObjectKey = serde_json::from_str("\"a/b\"").unwrap();
        assert_eq!(key.as_str(), "a/b");
        assert!(serde_json::from_str::<ObjectKey>("\"/a\"").is_err());
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"a/b\"");
    }

    #[test]
    fn stored_object_metadata() {
        let now = Utc::now();
        let obj = StoredObject::new(b"some content".to_vec(), "text/plain", now);
        assert_eq!(obj.metadata.size, 12);
        assert_eq!(obj.metadata.content_type, "text/plain");
        assert_eq!(obj.metadata.last_modified, now);
        assert_eq!(obj.metadata.etag.len(), 32);
    }

    #[test]
    fn etag_tracks_content() {
        let now = Utc::now();
        let a = StoredObject::new(b"aaa".to_vec(), DEFAULT_CONTENT_TYPE, now);
        let b = StoredObject::new(b"aaa".to_vec(), "text/plain", now);
        let c = StoredObject::new(b"bbb".to_vec(), DEFAULT_CONTENT_TYPE, now);
        assert_eq!(a.metadata.etag, b.metadata.etag);
        assert_ne!(a.metadata.etag, c.metadata.etag);
    }

    #[test]
    fn summary_projection() {
        let now = Utc::now();
        let obj = StoredObject::new(b"12345".to_vec(), DEFAULT_CONTENT_TYPE, now);
        let summary = obj.summary("dir/file");
        assert_eq!(summary.key, "dir/file");
        assert_eq!(summary.size, 5);
        assert_eq!(summary.last_modified, now);
    }

    #[test]
    fn empty_output_is_final() {
        let out = ListObjectsOutput::empty();
        assert!(out.objects.is_empty());
        assert!(!out.is_truncated());
    }
}
