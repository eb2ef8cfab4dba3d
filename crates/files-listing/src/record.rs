use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use files_store::{ListObjectsOutput, ObjectSummary};
use serde::{Deserialize, Serialize};

use crate::token::PageToken;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One listed object, as served to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(rename = "file_path")]
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size_bytes: u64,
}

impl From<ObjectSummary> for ObjectRecord {
    fn from(summary: ObjectSummary) -> Self {
        Self {
            key: summary.key,
            last_modified: summary.last_modified,
            size_bytes: summary.size,
        }
    }
}

/// One page of a listing.
///
/// `next_page_token` is `None` on the final page and serializes as `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPage {
    pub files: Vec<ObjectRecord>,
    pub next_page_token: Option<PageToken>,
}

impl ListingPage {
    /// Assemble a page from a raw backend batch, keeping backend order and
    /// wrapping the backend cursor into a page token.
    pub fn from_output(output: ListObjectsOutput) -> Self {
        Self {
            files: output.objects.into_iter().map(ObjectRecord::from).collect(),
            next_page_token: output.next_cursor.as_deref().map(PageToken::encode),
        }
    }

    /// Returns `true` if no page follows this one.
    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }
}

/// Parameters of one listing call.
///
/// A `page_token` must come from a previous page listed with the same
/// `prefix` and `page_size`. Mixing them is not detected here; what happens
/// then is up to the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingQuery {
    pub prefix: String,
    pub page_size: NonZeroU32,
    pub page_token: Option<PageToken>,
}

impl ListingQuery {
    /// Query for the first page under `prefix`.
    pub fn new(prefix: impl Into<String>, page_size: NonZeroU32) -> Self {
        Self {
            prefix: prefix.into(),
            page_size,
            page_token: None,
        }
    }

    pub fn with_page_token(mut self, token: Option<PageToken>) -> Self {
        self.page_token = token;
        self
    }

    /// The query for the page after `page`, or `None` if `page` was the last.
    pub fn next(&self, page: &ListingPage) -> Option<Self> {
        page.next_page_token
            .clone()
            .map(|token| self.clone().with_page_token(Some(token)))
    }
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self::new(
            "",
            NonZeroU32::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroU32::MIN),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(key: &str, size: u64) -> ObjectSummary {
        ObjectSummary {
            key: key.into(),
            size,
            last_modified: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn record_wire_shape() {
        let record = ObjectRecord::from(summary("some/nested/file.txt", 12));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["file_path"], "some/nested/file.txt");
        assert_eq!(json["size_bytes"], 12);
        assert_eq!(json["last_modified"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn page_keeps_backend_order() {
        let page = ListingPage::from_output(ListObjectsOutput {
            objects: vec![summary("a", 1), summary("b", 2), summary("c", 3)],
            next_cursor: Some("opaque".into()),
        });
        let keys: Vec<_> = page.files.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(page.next_page_token.unwrap().decode().unwrap(), "opaque");
    }

    #[test]
    fn final_page_serializes_null_token() {
        let page = ListingPage::from_output(ListObjectsOutput::empty());
        assert!(page.is_last());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json, serde_json::json!({"files": [], "next_page_token": null}));
    }

    #[test]
    fn default_query() {
        let q = ListingQuery::default();
        assert_eq!(q.prefix, "");
        assert_eq!(q.page_size.get(), DEFAULT_PAGE_SIZE);
        assert!(q.page_token.is_none());
    }

    #[test]
    fn next_query_follows_token() {
        let q = ListingQuery::new("dir/", NonZeroU32::new(2).unwrap());
        let page = ListingPage {
            files: vec![],
            next_page_token: Some(PageToken::encode("c")),
        };
        let next = q.next(&page).unwrap();
        assert_eq!(next.prefix, "dir/");
        assert_eq!(next.page_size.get(), 2);
        assert_eq!(next.page_token, page.next_page_token);

        assert!(q.next(&ListingPage::default()).is_none());
    }
}
