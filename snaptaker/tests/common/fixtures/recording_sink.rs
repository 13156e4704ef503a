//! Notification sink that records everything it is asked to send

use snaptaker::notify::{Invoker, NotificationSink};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct RecordingSink {
    broadcasts: Mutex<Vec<String>>,
    replies: Mutex<Vec<(Invoker, String)>>,
    commands: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<(Invoker, String)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn replies_to(&self, invoker: &Invoker) -> Vec<String> {
        self.replies()
            .into_iter()
            .filter(|(to, _)| to == invoker)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn operator_commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn count_broadcasts(&self, message: &str) -> usize {
        self.broadcasts().iter().filter(|m| m.as_str() == message).count()
    }
}

impl NotificationSink for RecordingSink {
    fn broadcast(&self, message: &str) {
        self.broadcasts.lock().unwrap().push(message.to_string());
    }

    fn notify(&self, invoker: &Invoker, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push((invoker.clone(), message.to_string()));
    }

    fn dispatch_operator_command(&self, command: &str) {
        self.commands.lock().unwrap().push(command.to_string());
    }
}
