//! Per-task state shared between the downloader, its workers and callers.
//!
//! A task is a [`TaskRecord`] (what to download and what happened so far)
//! bound to the [`TaskHandle`] of its current submission. The caller-visible
//! [`DownloadState`] is derived from both on demand.

mod handle;
mod info;
mod record;
mod state;

pub use handle::{CompletionSignal, HandleStatus, TaskHandle};
pub use info::{DownloadInfo, TaskFailure};
pub use record::TaskRecord;
pub use state::{derive_state, DownloadState};
