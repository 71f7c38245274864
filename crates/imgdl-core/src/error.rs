//! Validation errors raised synchronously by the downloader API.
//!
//! Download failures are not reported here: they are captured per task and
//! surfaced through [`crate::DownloadInfo`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The worker pool needs at least one thread.
    #[error("threads_max has to be greater than 0 (got {0})")]
    InvalidPoolSize(usize),

    /// A state filter named a state that does not exist.
    #[error("unknown download state '{0}'")]
    UnknownState(String),

    /// The OS refused to start a pool thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}
