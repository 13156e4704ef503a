//! Scripted persistence domains and snapshot clients

use snaptaker::errors::{FlushError, ProtocolError};
use snaptaker::flusher::PersistenceDomain;
use snaptaker::protocol::{DaemonReply, SnapshotClient, SnapshotRequest};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Persistence domain that succeeds or fails on demand and counts flushes
#[derive(Debug, Clone)]
pub struct ScriptedDomain {
    name: String,
    fail: bool,
    flushes: Arc<AtomicUsize>,
}

impl ScriptedDomain {
    pub fn healthy(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            flushes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::healthy(name)
        }
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl PersistenceDomain for ScriptedDomain {
    fn name(&self) -> &str {
        &self.name
    }

    fn flush(&mut self) -> Result<(), FlushError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FlushError::Domain {
                domain: self.name.clone(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only filesystem"),
            });
        }
        Ok(())
    }
}

/// Outcome a [`CountingClient`] hands back for every request
#[derive(Debug, Clone)]
pub enum ClientScript {
    Reply(String),
    Timeout,
    Refused,
}

/// In-process snapshot client that records labels instead of talking to a socket
#[derive(Debug)]
pub struct CountingClient {
    script: ClientScript,
    labels: Mutex<Vec<String>>,
}

impl CountingClient {
    pub fn replying(response: &str) -> Self {
        Self::with_script(ClientScript::Reply(response.to_string()))
    }

    pub fn with_script(script: ClientScript) -> Self {
        Self {
            script,
            labels: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.labels.lock().unwrap().len()
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }
}

impl SnapshotClient for CountingClient {
    async fn request_snapshot(&self, request: &SnapshotRequest) -> Result<DaemonReply, ProtocolError> {
        self.labels.lock().unwrap().push(request.label.clone());
        match &self.script {
            ClientScript::Reply(response) => Ok(DaemonReply::new(response.clone())),
            ClientScript::Timeout => Err(ProtocolError::Timeout(std::time::Duration::from_secs(60))),
            ClientScript::Refused => Err(ProtocolError::Connect {
                path: "/run/snapshotter/snapshot.sock".to_string(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            }),
        }
    }
}
