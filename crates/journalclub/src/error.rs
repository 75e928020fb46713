//! Error types for the journal club curator

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching a URL
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request timed out waiting for the response head
    #[error("Request timed out: {url} did not respond in time")]
    FirstByteTimeout { url: String },

    /// Response body did not finish before the deadline
    #[error("Body timed out: {url} did not finish sending its body in time")]
    BodyTimeout { url: String },

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Redirect chain exceeded the configured bound
    #[error("Too many redirects: more than {limit} while fetching {url}")]
    TooManyRedirects { url: String, limit: usize },

    /// Location header could not be turned into a URL
    #[error("Invalid redirect from {url}: {location:?}")]
    InvalidRedirect { url: String, location: String },

    /// Terminal response was not a success where one is required
    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() {
            FetchError::ConnectError(err)
        } else {
            FetchError::RequestError(err.to_string())
        }
    }
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid dataset {path}: {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Identifier has no cached citation in the dataset
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// Detail markup had no `<title>` element
    #[error("No <title> found in detail markup for {0}")]
    TitleNotFound(String),

    /// Every dataset entry is already in the history
    #[error("Nothing to select: every dataset entry is already in the history")]
    NothingSelectable,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
