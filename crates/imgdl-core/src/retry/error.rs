//! Error of a single download attempt.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, ...).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// Response status was not 2xx.
    #[error("HTTP {0}")]
    Http(u32),
    /// Creating the output directory or writing the file failed.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}

impl FetchError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn http_status(&self) -> Option<u32> {
        match self {
            FetchError::Http(code) => Some(*code),
            FetchError::Transport(_) | FetchError::Storage(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_http_status() {
        let e = FetchError::Http(404);
        assert_eq!(e.to_string(), "HTTP 404");
        assert_eq!(e.http_status(), Some(404));
    }

    #[test]
    fn storage_from_io() {
        let e: FetchError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(e.to_string().starts_with("storage: "));
        assert_eq!(e.http_status(), None);
    }
}
