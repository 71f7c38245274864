//! Worker routine: resolve the output name, then fetch and write with retry.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::retry::{FetchError, RetryDecision, RetryPolicy};
use crate::storage::StorageWriter;
use crate::task::TaskRecord;
use crate::transport::{ChunkFlow, ChunkSink, FetchOutcome, Transport};
use crate::url_model::NameReservations;

/// Everything a worker needs besides its record.
pub(crate) struct WorkerContext {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) retry: RetryPolicy,
    pub(crate) timeout: Duration,
    pub(crate) names: NameReservations,
}

/// How one run of the worker ended. Informational only: the record carries
/// everything callers observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunEnd {
    Finished,
    Cancelled,
    Failed,
}

/// Writes 2xx bodies to the task's output file, checking the cancellation
/// flag before opening the file and before every chunk.
struct FileSink<'a> {
    record: &'a TaskRecord,
    path: &'a Path,
    writer: Option<StorageWriter>,
}

impl ChunkSink for FileSink<'_> {
    fn open(&mut self) -> io::Result<ChunkFlow> {
        if self.record.is_cancelled() {
            return Ok(ChunkFlow::Stop);
        }
        self.writer = Some(StorageWriter::create(self.path)?);
        Ok(ChunkFlow::Continue)
    }

    fn chunk(&mut self, data: &[u8]) -> io::Result<ChunkFlow> {
        if self.record.is_cancelled() {
            return Ok(ChunkFlow::Stop);
        }
        match self.writer.as_mut() {
            Some(writer) => writer.write_chunk(data)?,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "body chunk received before the file was opened",
                ))
            }
        }
        Ok(ChunkFlow::Continue)
    }
}

/// Releases a claimed output path when the run ends, on every exit path.
struct Claim<'a> {
    names: &'a NameReservations,
    path: PathBuf,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.names.release(&self.path);
    }
}

/// Returns the output path, resolving and assigning the name unless a
/// restart (`rewrite` with a name already assigned) reuses the previous one.
fn output_path<'a>(
    ctx: &'a WorkerContext,
    record: &TaskRecord,
    rewrite: bool,
) -> io::Result<(PathBuf, Option<Claim<'a>>)> {
    if let (true, Some(path)) = (rewrite, record.path()) {
        return Ok((path, None));
    }
    let name = ctx.names.claim(record.output_dir(), record.url(), rewrite)?;
    let claim = (!rewrite).then(|| Claim {
        names: &ctx.names,
        path: record.output_dir().join(&name),
    });
    let name = record.assign_name(name);
    Ok((record.output_dir().join(name), claim))
}

fn attempt(
    ctx: &WorkerContext,
    record: &TaskRecord,
    path: &Path,
) -> Result<FetchOutcome, FetchError> {
    let mut sink = FileSink {
        record,
        path,
        writer: None,
    };
    let outcome = ctx.transport.get(record.url(), ctx.timeout, &mut sink)?;
    if let Some(writer) = sink.writer.take() {
        let bytes = writer.finish()?;
        tracing::trace!(url = record.url(), bytes, "output file closed");
    }
    Ok(outcome)
}

/// Runs one submission of `record` to completion.
///
/// Expected failures never escape: once the retry budget is spent the last
/// error is stored on the record.
pub(crate) fn run_download(ctx: &WorkerContext, record: &TaskRecord, rewrite: bool) -> RunEnd {
    let url = record.url();
    tracing::debug!(url, rewrite, "download started");

    let mut path: Option<PathBuf> = None;
    let mut _claim: Option<Claim<'_>> = None;
    let mut retries = 0u32;
    loop {
        if record.is_cancelled() {
            tracing::info!(url, "download cancelled");
            return RunEnd::Cancelled;
        }

        // Naming runs once per submission; retries reuse the resolved path.
        let target = match path.clone() {
            Some(p) => Ok(p),
            None => output_path(ctx, record, rewrite).map(|(p, claim)| {
                tracing::debug!(url, path = %p.display(), "output path resolved");
                path = Some(p.clone());
                _claim = claim;
                p
            }),
        };
        let result = target
            .map_err(FetchError::from)
            .and_then(|p| attempt(ctx, record, &p));

        match result {
            Ok(FetchOutcome::Completed) if !record.is_cancelled() => {
                tracing::info!(url, retries, "download finished");
                return RunEnd::Finished;
            }
            Ok(_) => {
                tracing::info!(url, "download cancelled");
                return RunEnd::Cancelled;
            }
            Err(e) if record.is_cancelled() => {
                tracing::info!(url, "download cancelled ({})", e);
                return RunEnd::Cancelled;
            }
            Err(e) => match ctx.retry.decide(retries) {
                RetryDecision::RetryAfter(delay) => {
                    retries += 1;
                    tracing::warn!(url, attempt = retries, "download failed, retrying: {}", e);
                    thread::sleep(delay);
                }
                RetryDecision::GiveUp => {
                    tracing::warn!(url, retries, "download failed, giving up: {}", e);
                    record.set_last_error(e);
                    return RunEnd::Failed;
                }
            },
        }
    }
}
