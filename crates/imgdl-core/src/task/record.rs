use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::retry::FetchError;

/// Mutable state of one download, keyed by its URL.
///
/// Only the bound worker writes `name` and `last_error`; callers read them
/// once the handle is terminal. `cancelled` is also written by callers and is
/// polled by the worker.
#[derive(Debug)]
pub struct TaskRecord {
    url: String,
    output_dir: PathBuf,
    name: OnceLock<String>,
    last_error: Mutex<Option<Arc<FetchError>>>,
    cancelled: AtomicBool,
    notified: AtomicBool,
}

impl TaskRecord {
    pub fn new(url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output_dir: output_dir.into(),
            name: OnceLock::new(),
            last_error: Mutex::new(None),
            cancelled: AtomicBool::new(false),
            notified: AtomicBool::new(false),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Resolved filename, once naming ran.
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Assigns the filename. The first assignment wins and is kept across
    /// restarts; returns the effective name.
    pub fn assign_name(&self, name: String) -> &str {
        self.name.get_or_init(|| name)
    }

    /// `output_dir/name`, or `None` while naming has not happened.
    pub fn path(&self) -> Option<PathBuf> {
        self.name().map(|n| self.output_dir.join(n))
    }

    pub fn last_error(&self) -> Option<Arc<FetchError>> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_last_error(&self, err: FetchError) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(err));
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Marks the record as delivered to an observer. Returns true only for
    /// the call that flipped the flag.
    pub fn mark_notified(&self) -> bool {
        !self.notified.swap(true, Ordering::AcqRel)
    }

    /// Clears per-submission state before the record is (re)dispatched.
    /// The assigned name survives.
    pub fn reset_for_submit(&self) {
        self.cancelled.store(false, Ordering::Release);
        self.notified.store(false, Ordering::Release);
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
