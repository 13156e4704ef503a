pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::config::Config;
use crate::host::HostHandle;
use crate::services::HostNotifier;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub host: HostHandle,
    // Chat and operator history for the broadcast endpoints
    pub notifier: Arc<HostNotifier>,
}

impl AppState {
    pub fn new(config: Arc<Config>, host: HostHandle, notifier: Arc<HostNotifier>) -> Self {
        Self {
            config,
            host,
            notifier,
        }
    }
}
