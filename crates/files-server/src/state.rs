use std::sync::Arc;

use files_listing::Paginator;
use files_store::ObjectStore;

use crate::config::ServerConfig;

/// Shared handler state. The store handle is built by the process bootstrap
/// and injected here; handlers never construct clients themselves.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub paginator: Paginator,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, config: ServerConfig) -> Self {
        let paginator = Paginator::new(Arc::clone(&store), config.bucket_name.clone());
        Self {
            store,
            paginator,
            config: Arc::new(config),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket_name
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.store.backend_name())
            .field("bucket", &self.config.bucket_name)
            .finish()
    }
}
