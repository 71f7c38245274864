//! Byte-level HTTP transport used by download workers.
//!
//! A transport performs one GET per call and pushes the body into a
//! [`ChunkSink`]. The sink is only opened for 2xx responses, so a failed
//! request never touches storage.

mod curl;

pub use self::curl::CurlTransport;

use crate::retry::FetchError;
use std::io;
use std::time::Duration;

/// Answer of a sink after accepting a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFlow {
    Continue,
    /// Abort the transfer; no more chunks are delivered.
    Stop,
}

/// How a GET that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The whole body was delivered.
    Completed,
    /// The sink asked to stop before the end of the body.
    Stopped,
}

/// Receiver of a response body.
pub trait ChunkSink {
    /// Called once when a 2xx response starts (also for an empty body),
    /// before the first chunk.
    fn open(&mut self) -> io::Result<ChunkFlow>;

    /// Called for every received chunk, in order.
    fn chunk(&mut self, data: &[u8]) -> io::Result<ChunkFlow>;
}

/// Streaming HTTP GET.
pub trait Transport: Send + Sync {
    /// Fetches `url`, delivering the body of a 2xx response to `sink`.
    ///
    /// Non-2xx responses yield [`FetchError::Http`]; sink I/O errors yield
    /// [`FetchError::Storage`]; connection problems and timeouts yield
    /// [`FetchError::Transport`].
    fn get(
        &self,
        url: &str,
        timeout: Duration,
        sink: &mut dyn ChunkSink,
    ) -> Result<FetchOutcome, FetchError>;
}
