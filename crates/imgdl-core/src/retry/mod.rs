//! Retry policy for download attempts.
//!
//! Every failure (non-2xx status, transport error, storage error) is retried
//! after the same fixed delay until the failure budget is spent.

mod error;
mod policy;

pub use error::FetchError;
pub use policy::{RetryDecision, RetryPolicy, DOWNLOAD_FAIL_MAX, DOWNLOAD_FAIL_RETRY_DELAY};
