use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::derive_filename;

/// Splits `name` into base and extension; the extension keeps its dot.
/// Leading dots belong to the base (`.bashrc` has no extension).
pub fn split_extension(name: &str) -> (&str, &str) {
    let lead = name.len() - name.trim_start_matches('.').len();
    match name[lead..].rfind('.') {
        Some(i) => name.split_at(lead + i),
        None => (name, ""),
    }
}

/// `n`-th candidate for a name: `base.ext`, `base_2.ext`, `base_3.ext`, ...
pub fn numbered_name(base: &str, ext: &str, n: u32) -> String {
    if n <= 1 {
        format!("{base}{ext}")
    } else {
        format!("{base}_{n}{ext}")
    }
}

/// Output paths chosen by downloads that may not have created their file yet.
///
/// Naming probes the directory, but a download creates its file only when
/// the body starts. Claims cover that gap, so two tasks whose URLs end in
/// the same segment never pick the same free name.
#[derive(Debug, Default)]
pub struct NameReservations {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl NameReservations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the output filename for `url` inside `dir`.
    ///
    /// Creates `dir` when it is missing. Without `rewrite`, returns the first
    /// candidate of [`numbered_name`] that neither exists nor is claimed, and
    /// claims it until [`NameReservations::release`]. With `rewrite`, returns
    /// the plain name so an existing file gets overwritten.
    pub fn claim(&self, dir: &Path, url: &str, rewrite: bool) -> io::Result<String> {
        let full = derive_filename(url);
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        if rewrite {
            return Ok(full);
        }

        let (base, ext) = split_extension(&full);
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        let mut n = 1;
        loop {
            let candidate = numbered_name(base, ext, n);
            let path = dir.join(&candidate);
            if !path.exists() && !claimed.contains(&path) {
                claimed.insert(path);
                return Ok(candidate);
            }
            n += 1;
        }
    }

    pub fn release(&self, path: &Path) {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_like_splitext() {
        assert_eq!(split_extension("cat.png"), ("cat", ".png"));
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("..x.y"), ("..x", ".y"));
    }

    #[test]
    fn numbered_candidates() {
        assert_eq!(numbered_name("cat", ".png", 1), "cat.png");
        assert_eq!(numbered_name("cat", ".png", 2), "cat_2.png");
        assert_eq!(numbered_name("README", "", 3), "README_3");
    }

    #[test]
    fn missing_dir_is_created() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("out");
        let names = NameReservations::new();
        let name = names.claim(&dir, "https://example.com/cat.png", false).unwrap();
        assert_eq!(name, "cat.png");
        assert!(dir.is_dir());
    }

    #[test]
    fn probes_free_name_without_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cat.png"), b"1").unwrap();
        std::fs::write(dir.path().join("cat_2.png"), b"2").unwrap();
        let names = NameReservations::new();
        let name = names.claim(dir.path(), "https://example.com/cat.png", false).unwrap();
        assert_eq!(name, "cat_3.png");
    }

    #[test]
    fn rewrite_keeps_plain_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cat.png"), b"1").unwrap();
        let names = NameReservations::new();
        let name = names.claim(dir.path(), "https://example.com/cat.png", true).unwrap();
        assert_eq!(name, "cat.png");
    }

    #[test]
    fn claimed_name_is_skipped_until_released() {
        let dir = tempfile::tempdir().unwrap();
        let names = NameReservations::new();
        let first = names.claim(dir.path(), "https://one.example/x.png", false).unwrap();
        let second = names.claim(dir.path(), "https://two.example/x.png", false).unwrap();
        assert_eq!(first, "x.png");
        assert_eq!(second, "x_2.png");
        assert!(!dir.path().join("x.png").exists());

        names.release(&dir.path().join("x.png"));
        let third = names.claim(dir.path(), "https://three.example/x.png", false).unwrap();
        assert_eq!(third, "x.png");
    }
}
