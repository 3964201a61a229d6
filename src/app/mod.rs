//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Network calls never happen inside `update`. They are queued on the model
//! and handed to the [`ApiWorker`](crate::api::ApiWorker) by the event loop;
//! their completions come back in as [`Message::ApiCompleted`].

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, Screen, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;
use std::time::Duration;

use crate::editor::DEFAULT_AUTOSAVE_DELAY_MS;

/// Default per-request timeout for API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    api_url: String,
    autosave_ms: u64,
    timeout: Duration,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application talking to the API at `api_url`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            autosave_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            timeout: DEFAULT_TIMEOUT,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Set the autosave quiet period.
    pub const fn with_autosave_ms(mut self, delay_ms: u64) -> Self {
        self.autosave_ms = delay_ms;
        self
    }

    /// Set the per-request timeout.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}
