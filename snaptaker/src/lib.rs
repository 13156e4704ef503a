pub mod activity;
pub mod clock;
pub mod config;
pub mod constants;
pub mod detector;
pub mod errors;
pub mod flusher;
pub mod host;
pub mod notify;
pub mod orchestrator;
pub mod protocol;
pub mod services;
pub mod sleep;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigManager, WorldConfig};
pub use detector::{DayBoundaryDetector, DayEvent, TickSample};
pub use errors::{FlushError, HostError, OrchestratorError, ProtocolError};
pub use host::{HostHandle, HostRuntime, HostStatus};
pub use orchestrator::{CyclePhase, CycleReport, Orchestrator, SnapshotResult, Trigger};
pub use protocol::{DaemonReply, SnapshotClient, SnapshotRequest, UnixSocketClient};
pub use services::{HostNotifier, OperatorService};
