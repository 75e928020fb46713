//! Fetcher system
//!
//! Crawling and detail enrichment only ever talk to the network through
//! the [`Fetcher`] trait, so they can run against [`HttpFetcher`] in
//! production and against a canned fetcher in tests.

mod http;

pub use http::HttpFetcher;

use crate::error::FetchError;
use crate::types::{FetchRequest, FetchResponse};
use async_trait::async_trait;

/// Something that can GET a URL and return its full body as text
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Unique identifier for this fetcher (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Fetch the URL, following redirects, and return the terminal response
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError>;
}
