//! `tracing` setup for the `imgdl` binary.
//!
//! Events go to `$XDG_STATE_HOME/imgdl/imgdl.log`. `RUST_LOG` overrides the
//! default filter. Worker threads are named, so each line shows which
//! `imgdl-worker-N` emitted it.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,imgdl=debug,imgdl_core=debug";

/// Per-event writer: a duplicate of the log file handle, or stderr if the
/// handle could not be duplicated.
enum EventWriter {
    Log(File),
    Stderr,
}

impl Write for EventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            EventWriter::Log(f) => f.write(buf),
            EventWriter::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            EventWriter::Log(f) => f.flush(),
            EventWriter::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct AppendLog(File);

impl<'a> MakeWriter<'a> for AppendLog {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(f) => EventWriter::Log(f),
            Err(_) => EventWriter::Stderr,
        }
    }
}

/// Where [`init_logging`] writes.
pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgdl")?;
    Ok(xdg_dirs.get_state_home().join("imgdl.log"))
}

fn install(writer: BoxMakeWriter) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .init();
}

/// Logs to [`log_path`], appending. Errors leave no subscriber installed;
/// the caller then picks [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    install(BoxMakeWriter::new(AppendLog(file)));
    tracing::info!(log = %path.display(), "imgdl started");
    Ok(())
}

pub fn init_logging_stderr() {
    install(BoxMakeWriter::new(io::stderr));
}
