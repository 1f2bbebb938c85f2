pub mod system;

pub use system::*;

use crate::core::Config;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared application state for request handlers
#[derive(Clone)]
pub struct AppState {
    /// Immutable configuration snapshot taken at startup
    pub config: Arc<Config>,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            started_at: Instant::now(),
        }
    }

    /// Time since the server started
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
