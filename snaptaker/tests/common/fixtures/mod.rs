//! This module provides reusable test utilities:
//! - Mock snapshot daemon on a temporary unix socket
//! - Mock operator webhook
//! - Recording notification sink and scripted persistence domains
//! - Test configuration builders

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_daemon;
pub mod mock_webhook;
pub mod recording_sink;
pub mod scripted;
pub mod test_config;

// Re-export commonly used items
pub use mock_daemon::{DaemonBehavior, MockDaemon};
pub use mock_webhook::MockWebhookServer;
pub use recording_sink::RecordingSink;
pub use scripted::{CountingClient, ScriptedDomain};
pub use test_config::{TestConfig, TestConfigBuilder};
