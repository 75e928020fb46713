//! Citation lookup: dataset cache first, DOI content negotiation otherwise

use crate::dataset::Dataset;
use crate::error::Result;
use crate::fetchers::Fetcher;
use crate::types::{FetchRequest, Identifier};
use tracing::{debug, warn};

/// Accept header asking the DOI resolver for an MLA bibliography entry
pub const MLA_ACCEPT: &str = "text/x-bibliography; style=modern-language-association";

pub struct MetadataResolver<'a> {
    fetcher: &'a dyn Fetcher,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self { fetcher }
    }

    /// Citation already stored in the dataset; never touches the network
    pub fn cached<'d>(dataset: &'d Dataset, id: &Identifier) -> Option<&'d str> {
        dataset.citation(id)
    }

    /// Cached citation, or a fresh one fetched from the identifier URL
    ///
    /// `Ok(None)` means no usable metadata (empty body or non-success
    /// status); only network failures are errors.
    pub async fn resolve(&self, dataset: &Dataset, id: &Identifier) -> Result<Option<String>> {
        if let Some(citation) = Self::cached(dataset, id) {
            return Ok(Some(citation.to_string()));
        }
        self.fetch_citation(id).await
    }

    async fn fetch_citation(&self, id: &Identifier) -> Result<Option<String>> {
        let request = FetchRequest::new(id.as_str()).header("Accept", MLA_ACCEPT);
        let response = self.fetcher.fetch(&request).await?;

        if !response.is_success() {
            warn!(id = %id, status = response.status_code, "No citation available");
            return Ok(None);
        }

        let citation = response.content.trim();
        if citation.is_empty() {
            debug!(id = %id, "Empty citation");
            return Ok(None);
        }
        Ok(Some(citation.to_string()))
    }
}
