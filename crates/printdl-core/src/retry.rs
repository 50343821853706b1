//! Fixed-delay retry policy for per-file downloads.
//!
//! Every failure waits the same delay regardless of cause, up to a bounded
//! number of attempts. The external contract is only "bounded attempts, then
//! a boolean outcome", so the policy could grow backoff later without
//! touching callers.

use crate::config::RetryConfig;
use std::time::Duration;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Budget spent; report failure.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Bounded fixed-delay policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from the optional config section, falling back to the
    /// built-in defaults.
    pub fn from_config(cfg: Option<&RetryConfig>) -> Self {
        match cfg {
            Some(c) => Self {
                max_attempts: c.max_attempts.max(1),
                delay: Duration::from_secs_f64(c.delay_secs.max(0.0)),
            },
            None => Self::default(),
        }
    }

    /// `attempt` is 1-based (1 = first attempt). Returns `NoRetry` once the
    /// budget is spent.
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            RetryDecision::NoRetry
        } else {
            RetryDecision::RetryAfter(self.delay)
        }
    }
}
