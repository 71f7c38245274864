//! Task registry: URL → (record, handle) over a bounded worker pool.
//!
//! `submit` never blocks; tasks beyond the pool size wait in the queue.
//! Cancellation sets the record's flag, prevents queued handles from
//! starting and then waits for the handle to become terminal, so when
//! `cancel`/`remove`/`restart` return, no worker touches the task anymore.
//! Completed tasks are reported to `wait_all_with` observers once per
//! submission, in the order they finished.

mod pool;
mod worker;

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::DownloaderConfig;
use crate::error::Result;
use crate::task::{
    derive_state, CompletionSignal, DownloadInfo, DownloadState, TaskHandle, TaskRecord,
};
use crate::transport::{CurlTransport, Transport};
use crate::url_model::NameReservations;

use pool::WorkerPool;
use worker::WorkerContext;

#[derive(Clone)]
struct Entry {
    record: Arc<TaskRecord>,
    handle: Arc<TaskHandle>,
}

impl Entry {
    fn info(&self) -> DownloadInfo {
        DownloadInfo::snapshot(&self.record, &self.handle)
    }

    fn state(&self) -> DownloadState {
        derive_state(&self.record, &self.handle)
    }

    /// Flags the record, stops a queued handle, then waits for the handle.
    fn cancel_and_wait(&self) {
        self.record.request_cancel();
        if self.handle.try_cancel() {
            tracing::debug!(url = self.record.url(), "cancelled before start");
        }
        self.handle.wait();
    }
}

/// Entries in submission order.
#[derive(Default)]
struct Registry {
    entries: HashMap<String, Entry>,
    order: Vec<String>,
}

impl Registry {
    fn get(&self, url: &str) -> Option<&Entry> {
        self.entries.get(url)
    }

    fn insert(&mut self, url: String, entry: Entry) {
        self.order.push(url.clone());
        self.entries.insert(url, entry);
    }

    fn remove(&mut self, url: &str) -> Option<Entry> {
        let entry = self.entries.remove(url)?;
        self.order.retain(|u| u != url);
        Some(entry)
    }

    fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.order.iter().filter_map(|url| self.entries.get(url))
    }

    fn snapshot(&self) -> Vec<Entry> {
        self.iter().cloned().collect()
    }
}

/// Cancels a handle whose job was dropped by the pool without running.
struct AbandonGuard(Arc<TaskHandle>);

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        self.0.try_cancel();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Downloads URLs into directories on a bounded pool of threads.
///
/// Each URL is one task; a URL can be registered only once at a time.
/// Dropping the downloader cancels every task and joins the pool.
pub struct Downloader {
    tasks: Mutex<Registry>,
    ctx: Arc<WorkerContext>,
    signal: Arc<CompletionSignal>,
    pool: WorkerPool,
}

impl Downloader {
    /// Downloader with `threads_max` workers and default settings.
    pub fn new(threads_max: usize) -> Result<Self> {
        Self::from_config(&DownloaderConfig {
            threads_max,
            ..DownloaderConfig::default()
        })
    }

    /// Downloader using libcurl as transport.
    pub fn from_config(cfg: &DownloaderConfig) -> Result<Self> {
        let transport = CurlTransport::new().with_buffer_size(cfg.chunk_size_bytes);
        Self::with_transport(cfg, Arc::new(transport))
    }

    /// Downloader over a custom transport. Fails if `cfg.threads_max` is 0.
    pub fn with_transport(cfg: &DownloaderConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let pool = WorkerPool::new(cfg.threads_max)?;
        tracing::debug!(threads = pool.size(), "downloader started");
        Ok(Self {
            tasks: Mutex::new(Registry::default()),
            ctx: Arc::new(WorkerContext {
                transport,
                retry: cfg.retry_policy(),
                timeout: cfg.request_timeout(),
                names: NameReservations::new(),
            }),
            signal: Arc::new(CompletionSignal::new()),
            pool,
        })
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Registry> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resets the record and queues a worker run for it.
    fn dispatch(&self, record: &Arc<TaskRecord>, rewrite: bool) -> Arc<TaskHandle> {
        record.reset_for_submit();
        let handle = Arc::new(TaskHandle::new(Arc::clone(&self.signal)));

        let guard = AbandonGuard(Arc::clone(&handle));
        let record = Arc::clone(record);
        let ctx = Arc::clone(&self.ctx);
        self.pool.execute(Box::new(move || {
            let handle = &guard.0;
            if !handle.try_start() {
                return;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                worker::run_download(&ctx, &record, rewrite)
            }));
            match outcome {
                Ok(_) => handle.complete(Ok(())),
                Err(payload) => {
                    let msg = panic_message(payload);
                    tracing::error!(url = record.url(), "download worker panicked: {}", msg);
                    handle.complete(Err(msg));
                }
            }
        }));
        handle
    }

    /// Queues a download of every URL into `output_dir`.
    ///
    /// URLs that are already registered are skipped. With `rewrite`, an
    /// existing file with the same name is overwritten instead of picking a
    /// numbered name.
    pub fn submit<I, S>(&self, output_dir: impl AsRef<Path>, rewrite: bool, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let output_dir = output_dir.as_ref();
        let mut tasks = self.lock_tasks();
        for url in urls {
            let url = url.into();
            if tasks.get(&url).is_some() {
                tracing::debug!(url = %url, "already registered, skipped");
                continue;
            }
            let record = Arc::new(TaskRecord::new(url.clone(), output_dir));
            let handle = self.dispatch(&record, rewrite);
            tracing::debug!(url = %url, dir = %output_dir.display(), "download submitted");
            tasks.insert(url, Entry { record, handle });
        }
    }

    /// Cancels the given tasks and waits until their workers stopped.
    /// Unknown URLs are ignored.
    pub fn cancel<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            let entry = self.lock_tasks().get(url.as_ref()).cloned();
            if let Some(entry) = entry {
                entry.cancel_and_wait();
            }
        }
    }

    /// Cancels the given tasks and forgets them. Unknown URLs are ignored.
    pub fn remove<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            let entry = self.lock_tasks().remove(url.as_ref());
            if let Some(entry) = entry {
                entry.cancel_and_wait();
                tracing::debug!(url = url.as_ref(), "download removed");
            }
        }
    }

    /// Cancels the given tasks and submits them again, overwriting the file
    /// they resolved before. Unknown URLs are ignored.
    ///
    /// The registry stays unlocked while a running worker winds down; a task
    /// removed or restarted by someone else meanwhile is left alone.
    pub fn restart<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            let url = url.as_ref();
            let Some(entry) = self.lock_tasks().get(url).cloned() else {
                continue;
            };
            entry.cancel_and_wait();

            let mut tasks = self.lock_tasks();
            let unchanged = tasks
                .get(url)
                .is_some_and(|current| Arc::ptr_eq(&current.handle, &entry.handle));
            if !unchanged {
                tracing::debug!(url, "task changed while restarting, skipped");
                continue;
            }
            let handle = self.dispatch(&entry.record, true);
            tasks.entries.insert(
                url.to_string(),
                Entry {
                    record: entry.record,
                    handle,
                },
            );
            tracing::debug!(url, "download restarted");
        }
    }

    /// Registered URLs, in submission order.
    pub fn urls(&self) -> Vec<String> {
        self.lock_tasks().order.clone()
    }

    pub fn state(&self, url: &str) -> Option<DownloadState> {
        self.lock_tasks().get(url).map(Entry::state)
    }

    pub fn info(&self, url: &str) -> Option<DownloadInfo> {
        self.lock_tasks().get(url).map(Entry::info)
    }

    /// Snapshots of every task currently in one of `states`.
    pub fn infos_by_state(&self, states: &[DownloadState]) -> Vec<DownloadInfo> {
        self.lock_tasks()
            .iter()
            .map(Entry::info)
            .filter(|info| states.contains(&info.state))
            .collect()
    }

    /// Like [`Downloader::infos_by_state`] with state names (`"finished"`,
    /// `"cancelled_error"`, ...). Fails on the first unknown name before
    /// looking at any task.
    pub fn infos_by_state_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<DownloadInfo>> {
        let states = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<DownloadState>>>()?;
        Ok(self.infos_by_state(&states))
    }

    /// Tasks in a terminal state.
    pub fn count_done(&self) -> usize {
        self.lock_tasks()
            .iter()
            .filter(|entry| entry.state().is_terminal())
            .count()
    }

    pub fn count_total(&self) -> usize {
        self.lock_tasks().entries.len()
    }

    /// Blocks until every registered task is terminal.
    pub fn wait_all(&self) {
        self.wait_all_with(|_| {});
    }

    /// Blocks until every task registered at call time is terminal, calling
    /// `on_complete` for each task not reported before, in completion order.
    /// Tasks submitted while waiting are not waited for.
    pub fn wait_all_with<F>(&self, mut on_complete: F)
    where
        F: FnMut(DownloadInfo),
    {
        let mut pending = self.lock_tasks().snapshot();
        while !pending.is_empty() {
            let seen = self.signal.generation();
            // Only completions numbered before the horizon are delivered in
            // this pass; later ones wait for the next, keeping global order.
            let horizon = self.signal.issued();
            let (mut done, rest): (Vec<Entry>, Vec<Entry>) =
                pending.into_iter().partition(|e| {
                    e.handle
                        .completion_seq()
                        .is_some_and(|seq| seq < horizon)
                });
            pending = rest;

            done.sort_by_key(|e| e.handle.completion_seq());
            for entry in done {
                if entry.record.mark_notified() {
                    on_complete(entry.info());
                }
            }

            if !pending.is_empty() {
                self.signal.wait_past(seen);
            }
        }
    }
}

impl Drop for Downloader {
    fn drop(&mut self) {
        let entries = self.lock_tasks().snapshot();
        for entry in &entries {
            entry.record.request_cancel();
            entry.handle.try_cancel();
        }
        if !entries.is_empty() {
            tracing::debug!(tasks = entries.len(), "downloader dropped, tasks cancelled");
        }
    }
}
