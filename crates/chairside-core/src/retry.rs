//! Bounded exponential backoff for loading source images.
//!
//! Source photos are fetched from remote storage, so transient failures are
//! expected. The retry is a plain loop: attempt, and on a retryable error
//! sleep `base * 2^(n-1)` (capped) before the next attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::decode::DecodeError;

/// Suspends the current task. Implemented with `setTimeout` in the browser
/// and with a no-op recorder in tests.
#[async_trait(?Send)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for DecodeError {
    fn is_retryable(&self) -> bool {
        DecodeError::is_retryable(self)
    }
}

/// Attempt cap and delay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 300,
            max_delay_ms: 3_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the `failed_attempt`-th failure (1-based).
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(31);
        let delay = self
            .base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// attempt cap is reached. `op` receives the 1-based attempt number.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && err.is_retryable() => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Source load failed, retrying"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records requested delays instead of sleeping.
    #[derive(Default)]
    pub struct RecordingSleeper {
        pub delays: RefCell<Vec<Duration>>,
    }

    #[async_trait(?Send)]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.borrow_mut().push(duration);
        }
    }
}
