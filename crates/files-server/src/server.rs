use std::sync::Arc;

use files_store::ObjectStore;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Files API server.
pub struct FilesServer {
    state: AppState,
}

impl FilesServer {
    pub fn new(store: Arc<dyn ObjectStore>, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(store, config),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let addr = self.state.config.bind_addr;
        let app = build_router(self.state);
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Files API listening on {}", listener.local_addr()?);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
