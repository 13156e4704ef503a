//! Sleep-state adapter
//!
//! Hosts that only expose sleep state through internals implement this
//! trait in an isolated adapter; the orchestrator only ever asks the yes/no
//! question below.

pub trait SleepStatusProvider {
    /// Whether enough participants in `world` are sleeping for the night to
    /// be skipped, given the host's required percentage (0..=100)
    fn enough_sleeping(&self, world: &str, required_percentage: u32) -> bool;
}

/// Sleepers needed out of `online` participants for `percentage`; at least
/// one whenever anyone is online
pub fn sleepers_needed(online: usize, percentage: u32) -> usize {
    if online == 0 {
        return 0;
    }
    let needed = (online * percentage as usize).div_ceil(100);
    needed.max(1)
}
