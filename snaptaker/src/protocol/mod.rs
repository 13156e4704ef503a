//! Snapshot daemon request/response protocol
//!
//! The daemon listens on a filesystem-path local socket. One exchange is:
//!
//! 1. connect
//! 2. write the UTF-8 label, unframed
//! 3. half-close the write side ("request complete")
//! 4. read until the daemon closes ("response complete")
//!
//! A response starting with `SUCCESS: ` means the snapshot exists; anything
//! else, including an empty response, is a rejection. Transport problems are
//! reported separately as [`ProtocolError`] and never retried here.
//!
//! The [`SnapshotClient`] trait is the seam for swapping in a framed
//! protocol later without touching the orchestrator.

pub mod unix_socket;

pub use unix_socket::UnixSocketClient;

use serde::Serialize;
use std::future::Future;

use crate::constants::protocol::{LABEL_PREFIX, SUCCESS_PREFIX};
use crate::errors::ProtocolError;

/// Name of the snapshot to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRequest {
    pub label: String,
}

impl SnapshotRequest {
    /// Label derived from the absolute world time, e.g. `gt12345`.
    /// Contains no newline or NUL by construction.
    pub fn from_game_time(game_time: u64) -> Self {
        Self {
            label: format!("{}{}", LABEL_PREFIX, game_time),
        }
    }
}

/// Daemon-supplied detail of a successful response: the text after the
/// success prefix, trailing whitespace removed
pub fn success_detail(raw: &str) -> Option<&str> {
    raw.strip_prefix(SUCCESS_PREFIX).map(str::trim_end)
}

/// Raw daemon response with its classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaemonReply {
    raw: String,
}

impl DaemonReply {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn succeeded(&self) -> bool {
        self.raw.starts_with(SUCCESS_PREFIX)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Daemon-supplied detail after the success prefix
    pub fn detail(&self) -> Option<&str> {
        success_detail(&self.raw)
    }

    pub fn into_raw(self) -> String {
        self.raw
    }
}

/// One request/response exchange with the snapshot daemon
pub trait SnapshotClient: Send + Sync + 'static {
    fn request_snapshot(
        &self,
        request: &SnapshotRequest,
    ) -> impl Future<Output = Result<DaemonReply, ProtocolError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_game_time() {
        assert_eq!(SnapshotRequest::from_game_time(12345).label, "gt12345");
        assert_eq!(SnapshotRequest::from_game_time(0).label, "gt0");
    }

    #[test]
    fn test_success_detail_is_verbatim() {
        let reply = DaemonReply::new("SUCCESS: gt12345");
        assert!(reply.succeeded());
        assert_eq!(reply.detail(), Some("gt12345"));
        assert_eq!(reply.raw(), "SUCCESS: gt12345");
    }

    #[test]
    fn test_daemon_trailing_newline_trimmed_from_detail() {
        let reply = DaemonReply::new("SUCCESS: Create a snapshot of 'src' in './gt7'\n\n");
        assert_eq!(reply.detail(), Some("Create a snapshot of 'src' in './gt7'"));
    }

    #[test]
    fn test_anything_else_is_rejection() {
        for raw in ["", "ERROR: Invalid suffix format", "SUCCESS:gt1", " SUCCESS: gt1", "success: gt1"] {
            let reply = DaemonReply::new(raw);
            assert!(!reply.succeeded(), "{:?} must not count as success", raw);
            assert_eq!(reply.detail(), None);
        }
    }
}
