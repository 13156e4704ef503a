use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::OperatorService;
use crate::constants::notify::BROADCAST_HISTORY;
use crate::notify::{Invoker, NotificationSink};

#[derive(Debug, Clone, Serialize)]
pub struct BroadcastEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectMessage {
    pub timestamp: DateTime<Utc>,
    pub recipient: String,
    pub message: String,
}

#[derive(Debug, Default)]
struct History {
    broadcasts: VecDeque<BroadcastEntry>,
    direct: VecDeque<DirectMessage>,
    operator_commands: VecDeque<BroadcastEntry>,
}

/// Notification sink of the headless host: chat goes to the log and a
/// bounded history, operator commands go to the webhook.
pub struct HostNotifier {
    operator: Arc<OperatorService>,
    history: Mutex<History>,
}

impl HostNotifier {
    pub fn new(operator: Arc<OperatorService>) -> Self {
        Self {
            operator,
            history: Mutex::new(History::default()),
        }
    }

    pub fn recent_broadcasts(&self) -> Vec<BroadcastEntry> {
        self.with_history(|h| h.broadcasts.iter().cloned().collect())
    }

    pub fn recent_direct_messages(&self) -> Vec<DirectMessage> {
        self.with_history(|h| h.direct.iter().cloned().collect())
    }

    pub fn recent_operator_commands(&self) -> Vec<BroadcastEntry> {
        self.with_history(|h| h.operator_commands.iter().cloned().collect())
    }

    fn with_history<T>(&self, f: impl FnOnce(&mut History) -> T) -> T {
        // a poisoned lock only means a panicking reader; the data is still usable
        let mut guard = match self.history.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, item: T) {
    if queue.len() == BROADCAST_HISTORY {
        queue.pop_front();
    }
    queue.push_back(item);
}

impl NotificationSink for HostNotifier {
    fn broadcast(&self, message: &str) {
        info!("[broadcast] {}", message);
        self.with_history(|h| {
            push_bounded(
                &mut h.broadcasts,
                BroadcastEntry {
                    timestamp: Utc::now(),
                    message: message.to_string(),
                },
            )
        });
    }

    fn notify(&self, invoker: &Invoker, message: &str) {
        info!("[to {}] {}", invoker, message);
        self.with_history(|h| {
            push_bounded(
                &mut h.direct,
                DirectMessage {
                    timestamp: Utc::now(),
                    recipient: invoker.to_string(),
                    message: message.to_string(),
                },
            )
        });
    }

    fn dispatch_operator_command(&self, command: &str) {
        info!("[operator] {}", command);
        self.with_history(|h| {
            push_bounded(
                &mut h.operator_commands,
                BroadcastEntry {
                    timestamp: Utc::now(),
                    message: command.to_string(),
                },
            )
        });

        if !self.operator.is_enabled() {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let operator = self.operator.clone();
                let command = command.to_string();
                handle.spawn(async move {
                    if let Err(e) = operator.send_command(&command).await {
                        warn!("Operator command '{}' not delivered: {}", command, e);
                    }
                });
            }
            Err(_) => warn!("No async runtime, operator command '{}' not delivered", command),
        }
    }
}
