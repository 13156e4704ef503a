use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;
use tracing::{debug, instrument};

use super::{DaemonReply, SnapshotClient, SnapshotRequest};
use crate::constants::protocol::{
    DEFAULT_SOCKET_PATH, DEFAULT_TIMEOUT, MAX_RESPONSE_BYTES, READ_CHUNK_BYTES,
};
use crate::errors::ProtocolError;

/// Half-close framed client for the snapshot daemon socket
#[derive(Debug, Clone)]
pub struct UnixSocketClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl UnixSocketClient {
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // The stream is dropped, and therefore closed, on every return path,
    // including when the surrounding timeout cancels this future.
    async fn exchange(&self, label: &str) -> Result<DaemonReply, ProtocolError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| ProtocolError::Connect {
                path: self.socket_path.display().to_string(),
                source,
            })?;

        stream
            .write_all(label.as_bytes())
            .await
            .map_err(ProtocolError::Write)?;

        // half-close: the daemon reads until EOF
        stream.shutdown().await.map_err(ProtocolError::Write)?;

        let mut response = Vec::with_capacity(READ_CHUNK_BYTES);
        (&mut stream)
            .take(MAX_RESPONSE_BYTES as u64 + 1)
            .read_to_end(&mut response)
            .await
            .map_err(ProtocolError::Read)?;
        if response.len() > MAX_RESPONSE_BYTES {
            return Err(ProtocolError::ResponseTooLarge(MAX_RESPONSE_BYTES));
        }

        debug!("Daemon sent {} bytes for {}", response.len(), label);
        Ok(DaemonReply::new(String::from_utf8_lossy(&response)))
    }
}

impl Default for UnixSocketClient {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_PATH, DEFAULT_TIMEOUT)
    }
}

impl SnapshotClient for UnixSocketClient {
    #[instrument(skip(self, request), fields(label = %request.label))]
    async fn request_snapshot(&self, request: &SnapshotRequest) -> Result<DaemonReply, ProtocolError> {
        match timeout(self.timeout, self.exchange(&request.label)).await {
            Ok(result) => result,
            Err(_) => Err(ProtocolError::Timeout(self.timeout)),
        }
    }
}
