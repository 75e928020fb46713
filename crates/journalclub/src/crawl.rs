//! Crawl reconciliation: merge identifiers found on source pages into the dataset
//!
//! Only the in-memory dataset is mutated here. Persisting it is the
//! caller's job, once every source has been processed, so a failed crawl
//! never leaves a partially merged dataset on disk.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::extract::{IdentifierExtractor, StopwordFilter};
use crate::fetchers::Fetcher;
use crate::metadata::MetadataResolver;
use crate::types::{FetchRequest, Identifier, MetadataRecord};
use std::collections::HashSet;
use tracing::{debug, info};

/// What a crawl changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Source pages fetched
    pub sources: usize,
    /// Distinct identifiers seen across all sources
    pub candidates: usize,
    /// Newly inserted identifiers
    pub added: Vec<Identifier>,
    /// Identifiers removed because their citation matched a stopword
    pub pruned: Vec<Identifier>,
    /// New identifiers without usable metadata
    pub skipped_empty: usize,
    /// New identifiers whose fresh citation matched a stopword
    pub skipped_stopword: usize,
}

impl CrawlReport {
    /// True if the dataset was mutated
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.pruned.is_empty()
    }
}

pub struct Crawler<'a> {
    fetcher: &'a dyn Fetcher,
    extractor: &'a IdentifierExtractor,
    stopwords: &'a StopwordFilter,
}

impl<'a> Crawler<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        extractor: &'a IdentifierExtractor,
        stopwords: &'a StopwordFilter,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            stopwords,
        }
    }

    /// Crawl every source and merge what it finds into `dataset`
    ///
    /// Any fetch failure aborts the crawl with the error; `dataset` may then
    /// hold a partial merge and must not be persisted.
    pub async fn crawl<S: AsRef<str>>(
        &self,
        sources: &[S],
        dataset: &mut Dataset,
    ) -> Result<CrawlReport> {
        let resolver = MetadataResolver::new(self.fetcher);
        let mut report = CrawlReport::default();

        // Stored citations are re-checked even when no source links them anymore
        report.pruned = dataset.prune(|id, record| {
            let hit = self.stopwords.matches(&record.mla);
            if hit {
                debug!(id = %id, "Pruning stopword match");
            }
            hit
        });
        let pruned: HashSet<&Identifier> = report.pruned.iter().collect();
        let mut seen = HashSet::new();

        for source in sources {
            let source = source.as_ref();
            let page = self.fetcher.fetch(&FetchRequest::new(source)).await?;
            report.sources += 1;

            let candidates = self.extractor.extract(&page.content);
            debug!(source, found = candidates.len(), "Fetched source");

            for id in candidates {
                if !seen.insert(id.clone()) {
                    continue;
                }
                if dataset.contains(&id) || pruned.contains(&id) {
                    continue;
                }

                let Some(citation) = resolver.resolve(dataset, &id).await? else {
                    report.skipped_empty += 1;
                    continue;
                };
                if self.stopwords.matches(&citation) {
                    debug!(id = %id, "Skipping stopword match");
                    report.skipped_stopword += 1;
                    continue;
                }

                dataset.insert(id.clone(), MetadataRecord::new(citation));
                report.added.push(id);
            }
        }

        report.candidates = seen.len();
        info!(
            sources = report.sources,
            candidates = report.candidates,
            added = report.added.len(),
            pruned = report.pruned.len(),
            "Crawl finished"
        );
        Ok(report)
    }
}
