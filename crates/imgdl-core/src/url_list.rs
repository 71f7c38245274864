//! Line-delimited URL lists.
//!
//! One URL per line; surrounding whitespace is ignored. Lines that are not
//! absolute URLs (including empty lines) are skipped and logged with their
//! zero-based line number.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// URLs extracted from a list, plus the lines that were rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlList {
    pub urls: Vec<String>,
    /// Zero-based numbers of rejected lines.
    pub rejected_lines: Vec<usize>,
}

/// Parses URL list text.
pub fn parse_urls(text: &str) -> UrlList {
    let mut list = UrlList::default();
    for (line_no, line) in text.lines().enumerate() {
        let candidate = line.trim();
        match url::Url::parse(candidate) {
            Ok(_) => list.urls.push(candidate.to_string()),
            Err(e) => {
                tracing::warn!(line = line_no, "line {} contains invalid URL: {}", line_no, e);
                list.rejected_lines.push(line_no);
            }
        }
    }
    list
}

/// Reads and parses the URL list at `path`.
pub fn read_urls(path: &Path) -> Result<UrlList> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read URL list {}", path.display()))?;
    Ok(parse_urls(&text))
}
