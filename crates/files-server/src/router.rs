use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{BoxError, Router};
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::endpoint::endpoints;
use crate::error::ServerError;
use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Files API endpoints.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let timeout = state.config.request_timeout();

    Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(endpoints::FILES, get(handler::list_files))
        .route(
            endpoints::FILE,
            get(handler::get_file)
                .put(handler::upload_file)
                .head(handler::head_file)
                .delete(handler::delete_file),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    middleware_error(err, timeout)
                }))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Route middleware failures through [`ServerError`] so they get the same
/// status mapping and `{"detail": ...}` body as handler failures.
fn middleware_error(err: BoxError, timeout: std::time::Duration) -> ServerError {
    if err.is::<Elapsed>() {
        ServerError::Timeout(timeout)
    } else {
        ServerError::Internal(err.to_string())
    }
}
