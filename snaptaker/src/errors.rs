//! Error types for the backup orchestrator
//!
//! Every failure of a snapshot cycle is one of these variants. They are
//! recovered at the orchestrator boundary and turned into log lines plus
//! notifications; none of them escapes to the tick loop.

use std::io;
use std::time::Duration;

use crate::host::roster::RosterError;

/// Main error type for one orchestration cycle
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// World state could not be written; the protocol exchange is skipped
    #[error("Flush failed: {0}")]
    Flush(#[from] FlushError),

    /// Connection, timeout or I/O failure talking to the daemon
    #[error("Protocol failure: {0}")]
    Protocol(#[from] ProtocolError),

    /// Daemon answered but without the success prefix
    #[error("Daemon rejected snapshot '{label}': {response}")]
    DaemonRejected { label: String, response: String },

    /// Another cycle is already in flight
    #[error("Snapshot cycle already in progress ({phase})")]
    Busy { phase: String },
}

/// Persistence flush error variants
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    /// A single persistence domain failed to write its state
    #[error("World '{domain}' could not be saved: {source}")]
    Domain {
        domain: String,
        #[source]
        source: io::Error,
    },

    /// State could not be serialized before writing
    #[error("World '{domain}' could not be encoded: {reason}")]
    Encode { domain: String, reason: String },
}

/// Snapshot daemon protocol error variants
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Socket connect failed (daemon down, refused, missing path)
    #[error("Connection to {path} failed: {source}")]
    Connect {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Writing the request or half-closing failed
    #[error("Sending request failed: {0}")]
    Write(#[source] io::Error),

    /// Reading the response failed before the peer closed
    #[error("Reading response failed: {0}")]
    Read(#[source] io::Error),

    /// Daemon kept sending past the response size limit
    #[error("Response exceeded {0} bytes")]
    ResponseTooLarge(usize),

    /// Exchange did not finish within the configured bound
    #[error("Exchange timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors surfaced to callers of the host runtime handle
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Cycle(#[from] OrchestratorError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("World '{0}' is not loaded")]
    UnknownWorld(String),

    #[error("Beds can only be used at night (cycle time {cycle_time})")]
    NotNight { cycle_time: u64 },

    /// The runtime task has exited and no longer accepts commands
    #[error("Host runtime stopped")]
    Stopped,
}

impl OrchestratorError {
    /// Short machine-readable kind used in logs and API payloads
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestratorError::Flush(_) => "flush_failure",
            OrchestratorError::Protocol(_) => "protocol_failure",
            OrchestratorError::DaemonRejected { .. } => "daemon_rejected",
            OrchestratorError::Busy { .. } => "busy",
        }
    }
}
