use std::sync::Arc;

use files_store::ObjectStore;

use crate::error::{ListingError, ListingResult};
use crate::record::{ListingPage, ListingQuery};
use crate::token::PageToken;

/// Single-round-trip paginated listing over one bucket.
///
/// Every call to [`Paginator::list`] decodes the page token (if any), issues
/// exactly one backend listing call with `page_size` as the batch size, and
/// assembles the result. No retries, no aggregation across calls, no caching.
/// The store handle is injected by the caller, who owns its lifecycle.
#[derive(Clone)]
pub struct Paginator {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl Paginator {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// List one page.
    ///
    /// An empty match is a normal, final, empty page. A backend batch larger
    /// than the requested page size is reported as a backend failure.
    pub async fn list(&self, query: &ListingQuery) -> ListingResult<ListingPage> {
        let cursor = query
            .page_token
            .as_ref()
            .map(PageToken::decode)
            .transpose()?;
        let page_size = query.page_size.get();

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %query.prefix,
            page_size,
            resumed = cursor.is_some(),
            "listing objects"
        );

        let output = self
            .store
            .list_objects(&self.bucket, &query.prefix, page_size, cursor.as_deref())
            .await?;

        if output.objects.len() > page_size as usize {
            return Err(ListingError::BackendUnavailable(format!(
                "{} backend returned {} objects for a page size of {page_size}",
                self.store.backend_name(),
                output.objects.len()
            )));
        }

        Ok(ListingPage::from_output(output))
    }
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("backend", &self.store.backend_name())
            .field("bucket", &self.bucket)
            .finish()
    }
}
