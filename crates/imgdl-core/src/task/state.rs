use std::fmt;
use std::str::FromStr;

use super::handle::{HandleStatus, TaskHandle};
use super::record::TaskRecord;
use crate::error::Error;

/// Caller-visible lifecycle state of a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadState {
    /// Not started yet.
    Pending,
    /// In progress.
    Running,
    /// Stopped by the user, or cancelled before it could start.
    Cancelled,
    /// Gave up after the retry budget, or the worker faulted.
    CancelledError,
    /// The whole body was written.
    Finished,
}

impl DownloadState {
    pub const ALL: [DownloadState; 5] = [
        DownloadState::Pending,
        DownloadState::Running,
        DownloadState::Cancelled,
        DownloadState::CancelledError,
        DownloadState::Finished,
    ];

    /// States after which no further transition happens.
    pub const TERMINAL: [DownloadState; 3] = [
        DownloadState::Finished,
        DownloadState::Cancelled,
        DownloadState::CancelledError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DownloadState::Pending => "pending",
            DownloadState::Running => "running",
            DownloadState::Cancelled => "cancelled",
            DownloadState::CancelledError => "cancelled_error",
            DownloadState::Finished => "finished",
        }
    }

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownState(s.to_string()))
    }
}

/// Derives the state of a task from its record and current handle.
///
/// A handle cancelled while queued never ran, so it cannot carry an error
/// and maps to `Cancelled`. A faulted handle maps to `CancelledError`
/// independently of the record's `last_error`.
pub fn derive_state(record: &TaskRecord, handle: &TaskHandle) -> DownloadState {
    state_for_status(record, &handle.status())
}

pub(crate) fn state_for_status(record: &TaskRecord, status: &HandleStatus) -> DownloadState {
    match status {
        HandleStatus::Queued => DownloadState::Pending,
        HandleStatus::Running => DownloadState::Running,
        HandleStatus::Cancelled => DownloadState::Cancelled,
        HandleStatus::Faulted(_) => DownloadState::CancelledError,
        HandleStatus::Completed => {
            if record.last_error().is_some() {
                DownloadState::CancelledError
            } else if record.is_cancelled() {
                DownloadState::Cancelled
            } else {
                DownloadState::Finished
            }
        }
    }
}
