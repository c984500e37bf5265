//! Retry with backoff for transient provider failures
//!
//! Applied around whole trigger runs at the caller boundary. Protocol
//! errors (preconditions, tamper findings, root mismatches) and skip
//! outcomes are terminal for a run and are never retried.

use crate::CoordinatorError;
use std::time::Duration;
use tracing::warn;

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Run `op`, retrying transient failures with exponential backoff.
    pub fn run<T>(
        &self,
        label: &str,
        mut op: impl FnMut() -> Result<T, CoordinatorError>,
    ) -> Result<T, CoordinatorError> {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt + 1 < self.attempts => {
                    let delay = self.base_delay * 2u32.saturating_pow(attempt);
                    warn!(
                        target: "coordinator",
                        "{label}: transient failure (attempt {}/{}), retrying in {:?}: {err}",
                        attempt + 1,
                        self.attempts,
                        delay
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
