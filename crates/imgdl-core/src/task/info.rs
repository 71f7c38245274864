use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use super::handle::{HandleStatus, TaskHandle};
use super::record::TaskRecord;
use super::state::{state_for_status, DownloadState};
use crate::retry::FetchError;

/// Why a task ended in [`DownloadState::CancelledError`].
#[derive(Debug, Clone, Error)]
pub enum TaskFailure {
    /// Every attempt failed; carries the last attempt's error.
    #[error("{0}")]
    Fetch(Arc<FetchError>),
    /// The worker routine panicked.
    #[error("worker fault: {0}")]
    Fault(String),
}

/// Read-only snapshot of a task.
#[derive(Debug, Clone)]
pub struct DownloadInfo {
    pub url: String,
    /// Output path; `None` until the filename is resolved.
    pub path: Option<PathBuf>,
    pub state: DownloadState,
    pub error: Option<TaskFailure>,
}

impl DownloadInfo {
    pub fn snapshot(record: &TaskRecord, handle: &TaskHandle) -> Self {
        // One status read keeps state and error consistent with each other.
        let status = handle.status();
        let state = state_for_status(record, &status);
        let error = match status {
            HandleStatus::Faulted(msg) => Some(TaskFailure::Fault(msg)),
            _ => record.last_error().map(TaskFailure::Fetch),
        };
        Self {
            url: record.url().to_string(),
            path: record.path(),
            state,
            error,
        }
    }
}
