pub mod notifier;
pub mod operator_service;

pub use notifier::{BroadcastEntry, DirectMessage, HostNotifier};
pub use operator_service::{OperatorPayload, OperatorService};
