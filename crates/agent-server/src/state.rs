//! Application State

use std::sync::Arc;

use hr_assistant::{Configuration, SearchClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Process-wide configuration, read-only
    pub config: Arc<Configuration>,

    /// Knowledge base client shared by every request
    pub search: Arc<dyn SearchClient>,
}

impl AppState {
    pub fn new(config: Configuration, search: Arc<dyn SearchClient>) -> Self {
        Self {
            config: Arc::new(config),
            search,
        }
    }
}
