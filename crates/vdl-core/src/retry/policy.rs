use std::time::Duration;

use crate::config::RetryConfig;

/// Classification of a task failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Downloader ran and exited with a nonzero status (network hiccup, throttling, ...).
    Exit,
    /// Downloader could not be started or its output could not be read.
    Launch,
    /// The job itself panicked; retrying would hit the same bug.
    Internal,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this task.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff between passes with caps.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts per task (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(2, &RetryConfig::default())
    }
}

impl RetryPolicy {
    /// `retries` extra attempts on top of the first one.
    pub fn from_config(retries: u32, cfg: &RetryConfig) -> Self {
        let max_delay = Duration::from_secs(cfg.max_delay_secs);
        // NaN and negatives mean no delay; anything too large for a Duration is capped.
        let base_delay = if cfg.base_delay_secs.is_nan() || cfg.base_delay_secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(cfg.base_delay_secs)
                .unwrap_or(max_delay)
                .min(max_delay)
        };
        Self {
            max_attempts: retries.saturating_add(1),
            base_delay,
            max_delay,
        }
    }

    /// Compute the delay before attempt `attempt + 1`.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when we should stop retrying.
    pub fn decide(&self, attempt: u32, kind: FailureKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            FailureKind::Launch | FailureKind::Internal => RetryDecision::NoRetry,
            FailureKind::Exit => {
                // base * 2^(attempt-1), capped.
                let exp = 1u32 << attempt.saturating_sub(1).min(8);
                let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}
