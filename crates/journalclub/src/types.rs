//! Core types

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Paper identifier, the full DOI URL as found on a source page
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap a raw identifier string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL path without the leading slash (the bare DOI for doi.org URLs)
    ///
    /// Falls back to the raw string when the identifier is not a URL.
    pub fn path(&self) -> String {
        match Url::parse(&self.0) {
            Ok(url) => url.path().trim_start_matches('/').to_string(),
            Err(_) => self.0.clone(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Bibliographic metadata kept for each identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// MLA-formatted citation
    pub mla: String,
}

impl MetadataRecord {
    pub fn new(mla: impl Into<String>) -> Self {
        Self { mla: mla.into() }
    }
}

/// Request to fetch a URL
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    /// The URL to fetch (must be http:// or https://)
    pub url: String,

    /// Extra request headers
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Add a request header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Response from a fetch
#[derive(Debug, Clone, Default)]
pub struct FetchResponse {
    /// URL of the terminal (non-redirect) response
    pub url: String,

    /// HTTP status code of the terminal response
    pub status_code: u16,

    /// Number of redirects followed
    pub redirects: usize,

    /// Full decoded body
    pub content: String,
}

impl FetchResponse {
    /// True for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
