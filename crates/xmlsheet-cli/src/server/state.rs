//! Application state for the web server.

use std::sync::Arc;
use tokio::sync::RwLock;

use xmlsheet::Catalog;
use xmlsheet::input::LoaderConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The catalog being edited. Writers are serialized by the lock.
    pub catalog: Arc<RwLock<Catalog>>,
    /// Settings for `POST /api/load-url`.
    pub loader: LoaderConfig,
}

impl AppState {
    /// Create new application state.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            loader: LoaderConfig::default(),
        }
    }
}
