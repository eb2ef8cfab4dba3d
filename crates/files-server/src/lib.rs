//! HTTP server for the Files API.
//!
//! Exposes a single object-store bucket as a small REST surface:
//!
//! - `GET /files` -- paginated, prefix-filtered listing driven by page tokens.
//! - `PUT /files/{path}` -- multipart upload (create or overwrite).
//! - `GET` / `HEAD` / `DELETE /files/{path}` -- fetch, inspect, remove.
//! - `GET /health` -- liveness probe.
//!
//! The store handle is injected through [`AppState`]; every failure is
//! rendered as `{"detail": ...}` with a matching status code.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::{
    process_env, BackendKind, S3Config, ServerConfig, BIND_ENV, BUCKET_ENV, PAGE_SIZE_CEILING,
};
pub use endpoint::{HealthResponse, PutFileResponse};
pub use error::{ErrorBody, ServerError, ServerResult};
pub use server::FilesServer;
pub use state::AppState;
