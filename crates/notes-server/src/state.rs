//! Application state shared across handlers.

use std::sync::Arc;

use notes_store::NoteStore;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// The note store is injected at construction; handlers never reach for a
/// process-wide instance.
#[derive(Clone)]
pub struct AppState {
    /// The note store.
    pub store: Arc<NoteStore>,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: Arc<NoteStore>, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
