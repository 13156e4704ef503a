//! Mock snapshot daemon for testing the socket protocol
//!
//! Listens on a unix socket inside a temporary directory, reads each
//! request until the client half-closes, records it and answers according
//! to the configured behavior.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

/// How the mock daemon answers a request
#[derive(Debug, Clone)]
pub enum DaemonBehavior {
    /// Write the response, then close
    Reply(String),
    /// Close without writing anything
    CloseSilently,
    /// Wait, then write the response and close
    ReplyAfter(Duration, String),
    /// Read the request and never answer
    Hang,
}

pub struct MockDaemon {
    _temp_dir: TempDir,
    socket_path: PathBuf,
    requests: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl MockDaemon {
    /// Bind a new daemon; must be called inside a tokio runtime
    pub fn start(behavior: DaemonBehavior) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let socket_path = temp_dir.path().join("snapshot.sock");
        let listener = UnixListener::bind(&socket_path).expect("Failed to bind mock daemon socket");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let captured = requests.clone();
        let task = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let captured = captured.clone();
                let behavior = behavior.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    if stream.read_to_end(&mut request).await.is_err() {
                        return;
                    }
                    captured
                        .lock()
                        .unwrap()
                        .push(String::from_utf8_lossy(&request).into_owned());

                    match behavior {
                        DaemonBehavior::Reply(response) => {
                            let _ = stream.write_all(response.as_bytes()).await;
                        }
                        DaemonBehavior::CloseSilently => {}
                        DaemonBehavior::ReplyAfter(delay, response) => {
                            tokio::time::sleep(delay).await;
                            let _ = stream.write_all(response.as_bytes()).await;
                        }
                        DaemonBehavior::Hang => {
                            tokio::time::sleep(Duration::from_secs(3600)).await;
                        }
                    }
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            _temp_dir: temp_dir,
            socket_path,
            requests,
            task,
        }
    }

    /// Daemon answering every request with `SUCCESS: <label>`-style text
    pub fn replying(response: &str) -> Self {
        Self::start(DaemonBehavior::Reply(response.to_string()))
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Labels received so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Stop accepting connections; the socket file stays behind
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for MockDaemon {
    fn drop(&mut self) {
        self.task.abort();
    }
}
