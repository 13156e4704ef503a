//! HTTP request handlers for the host API.
//!
//! This module is organized by domain:
//! - `common` - Shared response types and error mapping
//! - `participants` - Join, leave, sleep and position endpoints
//! - `snapshots` - Manual snapshot trigger
//! - `status` - Host status and message history

pub mod common;
pub mod participants;
pub mod snapshots;
pub mod status;

pub use participants::*;
pub use snapshots::*;
pub use status::*;
