//! Retry with exponential backoff for release API calls

use std::fmt::Display;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// How often and how patiently a failed call is retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one; at least 1
    pub max_attempts: u32,
    /// Delay before the first retry, doubled after each further failure
    pub initial_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    /// A single attempt, no retries
    pub fn none() -> Self {
        RetryPolicy::new(1, Duration::ZERO)
    }

    /// Delay after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(3, Duration::from_millis(500))
    }
}

/// Run `call` until it succeeds, fails permanently, or attempts run out.
///
/// `is_transient` decides whether an error is worth another attempt; a
/// permanent error is returned immediately.
pub fn with_retry<T, E, F, P>(
    policy: &RetryPolicy,
    operation: &str,
    is_transient: P,
    mut call: F,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match call() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts && is_transient(&err) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, retrying"
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
