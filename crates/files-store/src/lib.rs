//! Object store client for the Files API.
//!
//! Objects are opaque byte blobs addressed by slash-delimited keys inside a
//! bucket. The key space is flat; "directories" exist only by convention, as
//! shared key prefixes.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- ordered in-memory store for tests and local runs
//! - `S3ObjectStore` -- AWS S3 (or any S3-compatible endpoint), behind the `s3` feature
//!
//! # Listing Contract
//!
//! 1. Keys are listed in ascending lexicographic byte order.
//! 2. A listing call returns at most `max_keys` summaries.
//! 3. A continuation cursor is returned if and only if more keys remain.
//! 4. Cursors are opaque to callers and only meaningful to the backend that
//!    produced them.
//! 5. All backend errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod object;
#[cfg(feature = "s3")]
pub mod s3;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{
    ListObjectsOutput, ObjectKey, ObjectMetadata, ObjectSummary, StoredObject,
    DEFAULT_CONTENT_TYPE, MAX_KEY_LEN,
};
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;
pub use traits::ObjectStore;
