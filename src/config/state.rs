// Application state module
// Shared by every connection task for the lifetime of the server

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::relay::{RelayError, UpstreamClient};

/// Application state
pub struct AppState {
    pub config: Config,
    pub upstream: UpstreamClient,

    /// Fired once when the process is asked to stop
    pub shutdown_signal: Arc<Notify>,
    pub shutdown_requested: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, RelayError> {
        Ok(Self {
            config: config.clone(),
            upstream: UpstreamClient::new(&config.upstream)?,
            shutdown_signal: Arc::new(Notify::new()),
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Request a graceful shutdown of the accept loop
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        self.shutdown_signal.notify_waiters();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }
}
