//! Outbound notification seam
//!
//! The orchestrator never talks to chat or the operator channel directly.
//! Hosts plug in a [`NotificationSink`]; the headless host's implementation
//! lives in `services::notifier`.

use serde::Serialize;
use std::fmt;

/// Who asked for the snapshot cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Invoker {
    /// Host console; scheduled cycles report here
    Console,
    /// A named actor that issued the manual command
    Remote(String),
}

impl fmt::Display for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invoker::Console => write!(f, "console"),
            Invoker::Remote(name) => write!(f, "{}", name),
        }
    }
}

pub trait NotificationSink: Send + Sync {
    /// Plain-text message to every participant
    fn broadcast(&self, message: &str);

    /// Direct reply to whoever invoked the cycle
    fn notify(&self, invoker: &Invoker, message: &str);

    /// Operator-level command for the external channel (e.g. a chat bridge)
    fn dispatch_operator_command(&self, command: &str);
}
