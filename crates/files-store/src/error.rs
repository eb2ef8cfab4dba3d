/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The bucket does not exist on the backend.
    #[error("bucket not found: {0}")]
    NoSuchBucket(String),

    /// The key violates the object key rules.
    #[error("invalid object key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// The backend could not resolve a listing continuation cursor.
    #[error("invalid continuation cursor: {0}")]
    InvalidCursor(String),

    /// The backend refused the request.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Network, throttling, or any other backend-side failure.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn not_found(bucket: &str, key: &str) -> Self {
        Self::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    /// Returns `true` if this error means the object is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
