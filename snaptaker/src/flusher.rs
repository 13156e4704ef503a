//! Synchronous flush of every loaded persistence domain
//!
//! Called on the context that owns world state, right before the snapshot
//! exchange. All domains are attempted even when one fails so the rest of
//! the state still reaches disk; the cycle is aborted with the first error.

use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::errors::FlushError;

/// A unit of world state that can be forced to durable storage
pub trait PersistenceDomain {
    fn name(&self) -> &str;

    /// Write the full in-memory state and block until it is durable
    fn flush(&mut self) -> Result<(), FlushError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct FlushReport {
    pub duration_millis: u64,
    pub domains: Vec<String>,
}

pub struct Flusher;

impl Flusher {
    pub fn flush_all<D: PersistenceDomain>(domains: &mut [D]) -> Result<FlushReport, FlushError> {
        let started = Instant::now();
        let mut flushed = Vec::with_capacity(domains.len());
        let mut first_failure = None;

        for domain in domains.iter_mut() {
            match domain.flush() {
                Ok(()) => {
                    debug!("Flushed world {}", domain.name());
                    flushed.push(domain.name().to_string());
                }
                Err(e) => {
                    error!("Flush of world {} failed: {}", domain.name(), e);
                    if first_failure.is_none() {
                        first_failure = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_failure {
            return Err(e);
        }

        let duration_millis = started.elapsed().as_millis() as u64;
        info!("Flushed {} worlds in {}ms", flushed.len(), duration_millis);

        Ok(FlushReport {
            duration_millis,
            domains: flushed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct Scripted {
        name: String,
        fail: bool,
        flushes: u32,
    }

    impl PersistenceDomain for Scripted {
        fn name(&self) -> &str {
            &self.name
        }

        fn flush(&mut self) -> Result<(), FlushError> {
            self.flushes += 1;
            if self.fail {
                Err(FlushError::Domain {
                    domain: self.name.clone(),
                    source: io::Error::new(io::ErrorKind::Other, "read-only filesystem"),
                })
            } else {
                Ok(())
            }
        }
    }

    fn domain(name: &str, fail: bool) -> Scripted {
        Scripted {
            name: name.to_string(),
            fail,
            flushes: 0,
        }
    }

    #[test]
    fn test_flushes_every_domain() {
        let mut domains = vec![domain("world", false), domain("world_nether", false)];
        let report = Flusher::flush_all(&mut domains).unwrap();
        assert_eq!(report.domains, vec!["world", "world_nether"]);
        assert!(domains.iter().all(|d| d.flushes == 1));
    }

    #[test]
    fn test_failure_still_attempts_remaining_domains() {
        let mut domains = vec![
            domain("world", true),
            domain("world_nether", false),
            domain("world_the_end", true),
        ];
        let err = Flusher::flush_all(&mut domains).unwrap_err();
        assert!(err.to_string().contains("'world'"));
        assert!(domains.iter().all(|d| d.flushes == 1));
    }
}
