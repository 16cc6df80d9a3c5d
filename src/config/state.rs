// Application state module
// Shared by every connection task

use std::sync::Arc;

use super::types::Config;
use crate::repository::TodoStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn TodoStore>) -> Self {
        Self { config, store }
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
