use std::time::Duration;

/// Failed attempts that are retried before a download gives up.
pub const DOWNLOAD_FAIL_MAX: u32 = 10;

/// Pause between two attempts of the same download.
pub const DOWNLOAD_FAIL_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Budget spent: record the failure and stop.
    GiveUp,
    /// Sleep for the given delay, then try again.
    RetryAfter(Duration),
}

/// Fixed-delay retry budget.
///
/// Each retry sleep holds one pool thread, so `max_failures * delay` bounds
/// how long a dead URL can keep a worker away from queued tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of failed attempts that are retried (the first attempt is not counted).
    pub max_failures: u32,
    /// Delay slept before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_failures: DOWNLOAD_FAIL_MAX,
            delay: DOWNLOAD_FAIL_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn fixed(max_failures: u32, delay: Duration) -> Self {
        Self { max_failures, delay }
    }

    /// Decide what to do after a failed attempt, given how many retries
    /// were already made for this download.
    pub fn decide(&self, retries_so_far: u32) -> RetryDecision {
        if retries_so_far < self.max_failures {
            RetryDecision::RetryAfter(self.delay)
        } else {
            RetryDecision::GiveUp
        }
    }
}
