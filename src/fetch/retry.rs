//! Retry policy for origin requests
//!
//! Backoff starts at `initial_backoff` and doubles after every failed attempt:
//! with the defaults the delays are 500 ms and then 1 s between three attempts.

use std::time::Duration;

/// How many times a request is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one (values below 1 behave as 1)
    pub max_retries: u32,

    /// Delay before the second attempt
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    /// A policy that makes exactly one attempt
    pub fn single_attempt() -> Self {
        Self {
            max_retries: 1,
            ..Self::default()
        }
    }

    /// Number of attempts actually made, never less than one
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay to sleep after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1 << exponent)
    }

    /// The full backoff schedule, one entry per gap between attempts
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use wilayah::fetch::RetryPolicy;
    ///
    /// let delays: Vec<_> = RetryPolicy::default().delays().collect();
    /// assert_eq!(delays, vec![Duration::from_millis(500), Duration::from_millis(1000)]);
    /// ```
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.attempts()).map(|attempt| self.delay_after(attempt))
    }

    /// Upper bound on total time spent, given a per-attempt timeout
    pub fn worst_case(&self, timeout: Duration) -> Duration {
        let waiting: Duration = self.delays().sum();
        timeout.saturating_mul(self.attempts()) + waiting
    }
}
