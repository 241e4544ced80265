use std::sync::Arc;

use astra_assistant::Answerer;
use astra_persist::PersistClient;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Everything here is read-only after startup; `/ask` requests share no
/// mutable state with each other.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: PersistClient,
    pub assistant: Arc<dyn Answerer>,
}

impl AppState {
    pub fn new(config: Config, persist: PersistClient, assistant: Arc<dyn Answerer>) -> Self {
        Self {
            config: Arc::new(config),
            persist,
            assistant,
        }
    }
}
