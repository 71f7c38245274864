//! Output files of downloads.
//!
//! A download writes its body sequentially from offset 0. The file is
//! truncated on open, so a retry or a restart overwrites earlier content
//! instead of appending to it.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Buffered writer for one download's output file. The handle is closed when
/// the writer is dropped, on every exit path.
pub struct StorageWriter {
    file: BufWriter<File>,
    written: u64,
}

impl StorageWriter {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            file: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Flush buffered data and close the file. Returns the total size written.
    pub fn finish(mut self) -> io::Result<u64> {
        self.file.flush()?;
        Ok(self.written)
    }
}
