//! Bounded polling of an eventually-consistent data source.
//!
//! The history backend computes series asynchronously and answers "pending"
//! until it is done. Callers poll a bounded number of times and then give up,
//! falling back to whatever they already had.

use std::thread;
use std::time::Duration;

use burnrate_core::config::{BackoffKind, RetryConfig};

/// How long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every attempt.
    Fixed,
    /// Delay doubles after every attempt, capped at `max`.
    Exponential { max: Duration },
}

/// Attempt bound and inter-attempt delay for polling a pending source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}

/// Default number of polls before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 25;

/// Default wait between polls.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

impl RetryPolicy {
    /// Poll up to `max_attempts` times with a constant `delay`.
    ///
    /// A zero attempt bound is raised to one so the source is always asked.
    #[must_use]
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            delay,
            backoff: Backoff::Fixed,
        }
    }

    /// Poll up to `max_attempts` times, doubling the delay up to `max`.
    #[must_use]
    pub const fn exponential(max_attempts: u32, initial: Duration, max: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            delay: initial,
            backoff: Backoff::Exponential { max },
        }
    }

    /// Single attempt, no waiting.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    #[must_use]
    pub const fn from_config(config: &RetryConfig) -> Self {
        match config.backoff {
            BackoffKind::Fixed => Self::fixed(config.max_attempts, config.delay()),
            BackoffKind::Exponential => {
                Self::exponential(config.max_attempts, config.delay(), config.max_delay())
            }
        }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Wait after the `attempt`-th failed poll (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential { max } => {
                let shift = attempt.saturating_sub(1).min(31);
                self.delay.saturating_mul(1_u32 << shift).min(max)
            }
        }
    }

    /// Upper bound on the total time spent sleeping by [`Self::poll`].
    #[must_use]
    pub fn worst_case_wait(&self) -> Duration {
        (1..self.max_attempts)
            .map(|attempt| self.delay_after(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Call `op` until it yields a value, fails, or the attempt bound is hit.
    ///
    /// `op` returns `Ok(None)` for "not ready yet". There is no sleep after
    /// the last attempt. Returns `Ok(None)` when every attempt was pending.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `op` without retrying.
    pub fn poll<T, E>(
        &self,
        mut op: impl FnMut(u32) -> Result<Option<T>, E>,
    ) -> Result<Option<T>, E> {
        for attempt in 1..=self.max_attempts {
            if let Some(value) = op(attempt)? {
                return Ok(Some(value));
            }
            if attempt < self.max_attempts {
                let wait = self.delay_after(attempt);
                tracing::trace!(attempt, wait_ms = wait.as_millis(), "source pending, retrying");
                if !wait.is_zero() {
                    thread::sleep(wait);
                }
            }
        }
        Ok(None)
    }
}
