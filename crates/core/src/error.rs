//! Error types for harvest operations.
//!
//! [`HarvestError`] covers the hard failures of a harvest call: fetching a
//! remote page, reading a local file, or decoding its bytes. Malformed
//! structured data inside a document is never an error; extractors report it
//! as a [`SkipReason`](crate::SkipReason) instead.
//!
//! # Example
//!
//! ```rust
//! use harvest_core::{HarvestError, Result};
//!
//! fn load(path: &str) -> Result<String> {
//!     if path.is_empty() {
//!         return Err(HarvestError::FileNotFound(path.into()));
//!     }
//!     // ... read the file
//!     # Ok(String::new())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for document acquisition.
///
/// Every variant aborts the call before any extractor runs.
///
/// # Example
///
/// ```rust
/// use harvest_core::{HarvestError, Harvester};
///
/// let harvester = Harvester::new();
/// match harvester.entities_from_file("/missing/page.html") {
///     Ok(entities) => println!("{} entities", entities.len()),
///     Err(HarvestError::FileNotFound(path)) => println!("no such file: {}", path.display()),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum HarvestError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// non-success status codes and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, in practice invalid CSS selectors.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The document bytes are not valid UTF-8.
    #[error("Invalid character encoding")]
    InvalidEncoding,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Other I/O errors while reading input.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for HarvestError.
///
/// This is a convenience alias for `std::result::Result<T, HarvestError>`.
pub type Result<T> = std::result::Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarvestError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_timeout_error() {
        let err = HarvestError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_file_not_found_error() {
        let err = HarvestError::FileNotFound(PathBuf::from("/tmp/nope.html"));
        assert!(err.to_string().contains("/tmp/nope.html"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: HarvestError = io.into();
        assert!(matches!(err, HarvestError::Io(_)));
    }
}
