/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Percent-decoded last non-empty path segment of `url`.
///
/// Query and fragment are not part of the path and never leak into the name.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    match decoded.as_str() {
        "." | ".." => None,
        _ => Some(decoded),
    }
}

/// Makes `name` safe to use as a single path component.
///
/// Separators, NUL, control characters and whitespace become `_` (runs are
/// collapsed); leading/trailing dots, spaces and underscores are trimmed and
/// the result is cut to 255 bytes on a char boundary.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let bad = c == '/' || c == '\\' || c == '\0' || c.is_control() || c.is_whitespace();
        if bad {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_segment() {
        assert_eq!(
            filename_from_url("https://example.com/a/b/file.deb").as_deref(),
            Some("file.deb")
        );
        assert_eq!(
            filename_from_url("https://example.com/dir/").as_deref(),
            Some("dir")
        );
    }

    #[test]
    fn root_has_no_name() {
        assert_eq!(filename_from_url("https://example.com/"), None);
        assert_eq!(filename_from_url("mailto:someone@example.com"), None);
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize_filename("a/b\\c.txt"), "a_b_c.txt");
        assert_eq!(sanitize_filename("a \t b.png"), "a_b.png");
        assert_eq!(sanitize_filename("x\0y"), "x_y");
    }

    #[test]
    fn sanitize_trims_edges() {
        assert_eq!(sanitize_filename("..hidden.."), "hidden");
        assert_eq!(sanitize_filename("  spaced  "), "spaced");
        assert_eq!(sanitize_filename("..."), "");
    }

    #[test]
    fn sanitize_limits_length() {
        let long = "é".repeat(200);
        let s = sanitize_filename(&long);
        assert!(s.len() <= NAME_MAX);
        assert!(s.chars().all(|c| c == 'é'));
    }
}
