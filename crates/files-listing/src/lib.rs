//! Paginated object listing for the Files API.
//!
//! Turns the object store's continuation-cursor listing primitive into a
//! page-size-bounded, prefix-filtered enumeration that clients drive with
//! opaque page tokens.
//!
//! - [`Paginator`] -- issues exactly one backend listing call per page.
//! - [`PageToken`] -- tagged, checksummed envelope around a backend cursor.
//! - [`ListingPage`] / [`ObjectRecord`] -- the response shape served to clients.
//!
//! A first page and a continuation page go through the same
//! [`Paginator::list`] call and produce the same shape, so callers cannot tell
//! them apart. The paginator holds no state between calls.

pub mod engine;
pub mod error;
pub mod record;
pub mod token;

pub use engine::Paginator;
pub use error::{ListingError, ListingResult};
pub use record::{ListingPage, ListingQuery, ObjectRecord, DEFAULT_PAGE_SIZE};
pub use token::PageToken;
