//! Output file naming.
//!
//! Derives a filesystem-safe filename from the last path segment of a URL
//! and picks a free name in the output directory.

mod filename;
mod naming;

pub use filename::{filename_from_url, sanitize_filename};
pub use naming::{numbered_name, split_extension, NameReservations};

/// Filename used when the URL path yields nothing usable.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// Derives a safe filename for saving `url`.
///
/// - `derive_filename("https://example.com/img/cat.png")` → `"cat.png"`
/// - `derive_filename("https://example.com/")` → `"download.bin"`
pub fn derive_filename(url: &str) -> String {
    filename_from_url(url)
        .map(|raw| sanitize_filename(&raw))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_from_last_segment() {
        assert_eq!(
            derive_filename("https://habrastorage.org/webt/y0/nc/6i/y0nc6ianhueu.jpeg"),
            "y0nc6ianhueu.jpeg"
        );
        assert_eq!(derive_filename("https://example.com/a/b/file.png?w=100"), "file.png");
    }

    #[test]
    fn derive_decodes_and_sanitizes() {
        assert_eq!(derive_filename("https://example.com/my%20cat.png"), "my_cat.png");
    }

    #[test]
    fn derive_fallback() {
        assert_eq!(derive_filename("https://example.com/"), DEFAULT_FILENAME);
        assert_eq!(derive_filename("https://example.com"), DEFAULT_FILENAME);
        assert_eq!(derive_filename("https://example.com/.."), DEFAULT_FILENAME);
        assert_eq!(derive_filename("not a url"), DEFAULT_FILENAME);
    }
}
