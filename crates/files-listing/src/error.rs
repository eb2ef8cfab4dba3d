use files_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListingError {
    /// The page token does not decode to a backend cursor, or the backend
    /// could not resolve the cursor it carried. Never retried.
    #[error("invalid page token: {0}")]
    InvalidPageToken(String),

    /// The backend failed or broke the listing contract.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl From<StoreError> for ListingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidCursor(reason) => Self::InvalidPageToken(reason),
            other => Self::BackendUnavailable(other.to_string()),
        }
    }
}

pub type ListingResult<T> = Result<T, ListingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolvable_cursor_is_a_token_error() {
        let err: ListingError = StoreError::InvalidCursor("expired".into()).into();
        assert!(matches!(err, ListingError::InvalidPageToken(ref r) if r == "expired"));
    }

    #[test]
    fn other_store_errors_are_backend_errors() {
        let err: ListingError = StoreError::PermissionDenied("AccessDenied".into()).into();
        assert!(matches!(err, ListingError::BackendUnavailable(_)));
        assert!(err.to_string().contains("AccessDenied"));

        let err: ListingError = StoreError::NoSuchBucket("b".into()).into();
        assert!(matches!(err, ListingError::BackendUnavailable(_)));
    }
}
