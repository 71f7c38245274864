//! Execution handle of one submission.
//!
//! A handle moves `Queued → Running → Completed | Faulted`, or
//! `Queued → Cancelled` when cancellation wins the race against the pool.
//! Every transition into a terminal status takes a number from the shared
//! [`CompletionSignal`], which orders completions across handles and wakes
//! anyone waiting for "some handle finished".

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Observable status of a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleStatus {
    /// Waiting for a pool thread.
    Queued,
    /// The worker routine is executing.
    Running,
    /// Cancelled before a pool thread picked it up; the worker never ran.
    Cancelled,
    /// The worker routine returned.
    Completed,
    /// The worker routine panicked; carries the panic message.
    Faulted(String),
}

impl HandleStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HandleStatus::Cancelled | HandleStatus::Completed | HandleStatus::Faulted(_)
        )
    }
}

/// Shared completion counter for a set of handles.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    next_seq: AtomicU64,
    generation: Mutex<u64>,
    changed: Condvar,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Completion numbers handed out so far. Every handle whose
    /// [`TaskHandle::completion_seq`] is below this value is terminal.
    pub fn issued(&self) -> u64 {
        self.next_seq.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        *self.lock() += 1;
        self.changed.notify_all();
    }

    /// Number of completions observed so far. Read it before inspecting
    /// handles, then pass it to [`CompletionSignal::wait_past`].
    pub fn generation(&self) -> u64 {
        *self.lock()
    }

    /// Blocks until at least one completion happened after `seen` was read.
    pub fn wait_past(&self, seen: u64) {
        let guard = self.lock();
        let _guard = self
            .changed
            .wait_while(guard, |generation| *generation == seen)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

#[derive(Debug)]
struct Inner {
    status: HandleStatus,
    completion_seq: Option<u64>,
}

/// Handle of one worker routine execution.
#[derive(Debug)]
pub struct TaskHandle {
    inner: Mutex<Inner>,
    done: Condvar,
    signal: Arc<CompletionSignal>,
}

impl TaskHandle {
    pub fn new(signal: Arc<CompletionSignal>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                status: HandleStatus::Queued,
                completion_seq: None,
            }),
            done: Condvar::new(),
            signal,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves `from` to `to` if the handle is currently in `from`.
    fn transition(&self, from: &HandleStatus, to: HandleStatus) -> bool {
        let terminal = to.is_terminal();
        {
            let mut inner = self.lock();
            if inner.status != *from {
                return false;
            }
            inner.status = to;
            if terminal {
                inner.completion_seq = Some(self.signal.next_seq());
            }
        }
        if terminal {
            self.done.notify_all();
            self.signal.bump();
        }
        true
    }

    /// Called by the pool thread before running the worker. Returns false if
    /// the handle was cancelled while queued.
    pub fn try_start(&self) -> bool {
        self.transition(&HandleStatus::Queued, HandleStatus::Running)
    }

    /// Prevents a queued handle from running. Returns false once the worker
    /// has started (or the handle is already terminal).
    pub fn try_cancel(&self) -> bool {
        self.transition(&HandleStatus::Queued, HandleStatus::Cancelled)
    }

    /// Records the end of the worker routine: `Err` carries a panic message.
    pub fn complete(&self, outcome: Result<(), String>) {
        let to = match outcome {
            Ok(()) => HandleStatus::Completed,
            Err(msg) => HandleStatus::Faulted(msg),
        };
        self.transition(&HandleStatus::Running, to);
    }

    pub fn status(&self) -> HandleStatus {
        self.lock().status.clone()
    }

    pub fn is_terminal(&self) -> bool {
        self.lock().status.is_terminal()
    }

    /// Position of this handle in the global completion order.
    pub fn completion_seq(&self) -> Option<u64> {
        self.lock().completion_seq
    }

    /// Blocks until the handle is terminal.
    pub fn wait(&self) {
        let guard = self.lock();
        let _guard = self
            .done
            .wait_while(guard, |inner| !inner.status.is_terminal())
            .unwrap_or_else(PoisonError::into_inner);
    }
}
