//! HTTP client entry points
//!
//! The fetch logic itself lives in [`HttpFetcher`](crate::fetchers::HttpFetcher);
//! this module holds the options it is configured with and a one-shot helper.

use crate::error::FetchError;
use crate::fetchers::{Fetcher, HttpFetcher};
use crate::types::{FetchRequest, FetchResponse};
use serde::Deserialize;
use std::time::Duration;

/// Default bound on followed redirects
pub const MAX_REDIRECTS: usize = 20;

/// Fetch options, configurable from the config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Redirects followed before giving up
    pub max_redirects: usize,
    /// TCP/TLS connect timeout
    pub connect_timeout_secs: u64,
    /// Time allowed per hop until response headers arrive
    pub first_byte_timeout_secs: u64,
    /// Time allowed to receive the full body
    pub body_timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            max_redirects: MAX_REDIRECTS,
            connect_timeout_secs: 10,
            first_byte_timeout_secs: 30,
            body_timeout_secs: 60,
        }
    }
}

impl FetchOptions {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn first_byte_timeout(&self) -> Duration {
        Duration::from_secs(self.first_byte_timeout_secs)
    }

    pub fn body_timeout(&self) -> Duration {
        Duration::from_secs(self.body_timeout_secs)
    }
}

/// Fetch a URL with default options
///
/// Builds a fresh [`HttpFetcher`]; reuse one directly when fetching
/// many URLs.
pub async fn fetch(req: FetchRequest) -> Result<FetchResponse, FetchError> {
    fetch_with_options(req, FetchOptions::default()).await
}

/// Fetch a URL with custom options
pub async fn fetch_with_options(
    req: FetchRequest,
    options: FetchOptions,
) -> Result<FetchResponse, FetchError> {
    // Validate URL early
    if req.url.is_empty() {
        return Err(FetchError::MissingUrl);
    }

    let fetcher = HttpFetcher::new(options)?;
    fetcher.fetch(&req).await
}
