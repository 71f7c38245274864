//! Single-stream GET over libcurl's easy interface.

use super::{ChunkFlow, ChunkSink, FetchOutcome, Transport};
use crate::retry::FetchError;
use curl::easy::Easy;
use std::cell::Cell;
use std::io;
use std::str;
use std::time::Duration;

const MAX_REDIRECTIONS: u32 = 10;

/// Default transport: one curl easy handle per attempt.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    buffer_size: Option<usize>,
}

impl CurlTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive buffer size, i.e. the upper bound of a chunk handed to the sink.
    pub fn with_buffer_size(mut self, bytes: Option<usize>) -> Self {
        self.buffer_size = bytes;
        self
    }
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Parses the status code out of a `HTTP/x.y CODE reason` header line.
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

impl Transport for CurlTransport {
    fn get(
        &self,
        url: &str,
        timeout: Duration,
        sink: &mut dyn ChunkSink,
    ) -> Result<FetchOutcome, FetchError> {
        let mut easy = Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTIONS)?;
        easy.connect_timeout(timeout)?;
        // A transfer that stalls below 1 B/s for `timeout` is a read timeout.
        easy.low_speed_limit(1)?;
        easy.low_speed_time(timeout)?;
        if let Some(size) = self.buffer_size {
            easy.buffer_size(size)?;
        }

        // Status of the most recent response; redirects produce several.
        let status: Cell<Option<u32>> = Cell::new(None);
        let mut opened = false;
        let mut stopped = false;
        let mut sink_error: Option<io::Error> = None;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|line| {
                if let Some(code) = parse_status_line(line) {
                    status.set(Some(code));
                }
                true
            })?;
            transfer.write_function(|data| {
                if !status.get().is_some_and(is_success) {
                    // Error page body: drain it, never store it.
                    return Ok(data.len());
                }
                let flow = if opened {
                    sink.chunk(data)
                } else {
                    opened = true;
                    sink.open().and_then(|flow| match flow {
                        ChunkFlow::Continue => sink.chunk(data),
                        ChunkFlow::Stop => Ok(ChunkFlow::Stop),
                    })
                };
                match flow {
                    Ok(ChunkFlow::Continue) => Ok(data.len()),
                    // Returning a short count makes curl abort the transfer.
                    Ok(ChunkFlow::Stop) => {
                        stopped = true;
                        Ok(0)
                    }
                    Err(e) => {
                        sink_error = Some(e);
                        Ok(0)
                    }
                }
            })?;
            transfer.perform()
        };

        if stopped {
            return Ok(FetchOutcome::Stopped);
        }
        if let Some(e) = sink_error {
            return Err(FetchError::Storage(e));
        }
        performed?;

        let code = easy.response_code()?;
        if !is_success(code) {
            return Err(FetchError::Http(code));
        }
        if !opened && sink.open()? == ChunkFlow::Stop {
            return Ok(FetchOutcome::Stopped);
        }
        Ok(FetchOutcome::Completed)
    }
}
