//! `imgdl check` – validate a URL list.

use anyhow::Result;
use imgdl_core::url_list;
use std::path::Path;

pub fn run_check(urls_file: &Path) -> Result<()> {
    let list = url_list::read_urls(urls_file)?;
    for url in &list.urls {
        println!("{}", url);
    }
    println!(
        "{} valid, {} rejected",
        list.urls.len(),
        list.rejected_lines.len()
    );
    if !list.rejected_lines.is_empty() {
        let lines: Vec<String> = list
            .rejected_lines
            .iter()
            .map(|n| n.to_string())
            .collect();
        println!("rejected lines (zero-based): {}", lines.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn check_accepts_mixed_list() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "https://example.com/a.png").unwrap();
        writeln!(f, "not a url").unwrap();
        assert!(run_check(f.path()).is_ok());
    }

    #[test]
    fn check_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_check(&dir.path().join("missing.txt")).is_err());
    }
}
