// ABOUTME: Shared application state for the csatd HTTP server.
// ABOUTME: Holds the one ResponseStore for the process and the storage directory it was opened on.

use std::path::PathBuf;
use std::sync::Arc;

use csat_store::ResponseStore;

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    pub store: Arc<dyn ResponseStore>,
    pub csat_home: PathBuf,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create a new AppState around an already-opened store.
    pub fn new(store: Arc<dyn ResponseStore>, csat_home: PathBuf) -> Self {
        Self { store, csat_home }
    }
}
