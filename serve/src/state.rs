//! Process-scoped state shared across connections (§3 `ServerState`, §5
//! "Shared resources").

use std::sync::Arc;

use gateway_core::{unix_now, Generator, ToolExecutor};

use crate::controller::ServerStatus;

/// Everything a request handler needs, beyond the request itself. Cheap to
/// clone (every field is an `Arc`), so each connection task gets its own
/// owned copy.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn Generator>,
    pub executor: Arc<dyn ToolExecutor>,
    /// `Model.created`: captured once at process start, read concurrently
    /// without locking (§3 invariant, §5).
    pub model_created: u64,
    pub settings: Option<Arc<config::SettingsStore>>,
    pub status: Arc<ServerStatus>,
}

impl AppState {
    pub fn new(generator: Arc<dyn Generator>, executor: Arc<dyn ToolExecutor>) -> Self {
        Self {
            generator,
            executor,
            model_created: unix_now(),
            settings: None,
            status: Arc::new(ServerStatus::new()),
        }
    }

    pub fn with_settings(mut self, settings: Arc<config::SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_status(mut self, status: Arc<ServerStatus>) -> Self {
        self.status = status;
        self
    }

    /// Loads persisted settings, falling back to documented defaults when no
    /// store is wired (§6.3).
    pub fn settings(&self) -> config::Settings {
        self.settings
            .as_ref()
            .map(|s| s.load())
            .unwrap_or_default()
    }
}
