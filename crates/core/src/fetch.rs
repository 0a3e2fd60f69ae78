//! Document acquisition from URLs, files, and stdin.
//!
//! These functions reduce an input source to HTML text. They are the only
//! place a harvest call can fail hard; extraction itself never does.

use std::fs;
use std::path::Path;
#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::Client;
#[cfg(feature = "fetch")]
use url::Url;

use crate::{HarvestError, Result};

/// HTTP client configuration for fetching web pages.
///
/// This struct controls timeout and user agent settings for HTTP requests.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: "Mozilla/5.0 (compatible; Harvest/1.0)".to_string() }
    }
}

impl FetchConfig {
    /// Returns a copy of this config with a different timeout.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches HTML content from a URL.
///
/// Performs an HTTP GET, follows redirects and fails on non-success status
/// codes. The whole request is bounded by `config.timeout`.
#[cfg(feature = "fetch")]
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = Url::parse(url).map_err(|e| HarvestError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(HarvestError::InvalidUrl(format!(
            "unsupported scheme '{}' (expected http or https)",
            parsed_url.scheme()
        )));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(HarvestError::HttpError)?;

    let timeout_error = |e: reqwest::Error| {
        if e.is_timeout() { HarvestError::Timeout { timeout: config.timeout } } else { HarvestError::HttpError(e) }
    };

    tracing::debug!(url = %parsed_url, timeout = config.timeout, "fetching document");

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(timeout_error)?
        .error_for_status()?;

    let content = response.text().await.map_err(timeout_error)?;

    Ok(content)
}

/// Reads HTML content from a local file, which must be UTF-8 encoded.
///
/// A leading byte order mark is dropped.
pub fn fetch_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(HarvestError::FileNotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path)?;
    decode_utf8(bytes)
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;

    decode_utf8(buffer)
}

fn decode_utf8(mut bytes: Vec<u8>) -> Result<String> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(..3);
    }
    String::from_utf8(bytes).map_err(|_| HarvestError::InvalidEncoding)
}
