//! The four curator actions: crawl, choose next, set next, regenerate page
//!
//! Each action loads what it needs from the [`Store`], computes its whole
//! result in memory and only then writes. A failure part-way through
//! leaves the files as they were.

use crate::config::Config;
use crate::crawl::{CrawlReport, Crawler};
use crate::dataset::Dataset;
use crate::detail::{notification_message, Detail, DetailEnricher};
use crate::error::{Error, Result};
use crate::extract::{IdentifierExtractor, StopwordFilter};
use crate::fetchers::{Fetcher, HttpFetcher};
use crate::page;
use crate::select;
use crate::store::Store;
use crate::types::Identifier;
use rand::Rng;
use tracing::info;

pub struct Curator<F: Fetcher = HttpFetcher> {
    config: Config,
    store: Store,
    fetcher: F,
}

impl Curator<HttpFetcher> {
    /// Curator fetching over HTTP with the configured options
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.fetch.clone())?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetcher> Curator<F> {
    pub fn with_fetcher(config: Config, fetcher: F) -> Self {
        let store = Store::new(config.paths.clone());
        Self {
            config,
            store,
            fetcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Crawl every source and persist the merged dataset once at the end
    pub async fn crawl(&self) -> Result<CrawlReport> {
        let sources = self.store.sources().await?;
        let stopwords = StopwordFilter::new(self.store.stopwords().await?)?;
        let extractor = IdentifierExtractor::new(&self.config.identifier_pattern)?;
        let mut dataset = self.store.dataset().await?;

        let crawler = Crawler::new(&self.fetcher, &extractor, &stopwords);
        let report = crawler.crawl(&sources, &mut dataset).await?;

        self.store.save_dataset(&dataset).await?;
        Ok(report)
    }

    /// Pick an unread paper at random and make it the next one
    pub async fn choose_next<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Detail> {
        let dataset = self.store.dataset().await?;
        let history = self.store.history().await?;

        let id = select::choose(&dataset, &history, rng)?;
        info!(id = %id, "Chose next paper");
        self.promote(&dataset, history, id).await
    }

    /// Make a specific paper the next one
    pub async fn set_next(&self, id: Identifier) -> Result<Detail> {
        let dataset = self.store.dataset().await?;
        if !dataset.contains(&id) {
            return Err(Error::UnknownIdentifier(id.to_string()));
        }
        let history = self.store.history().await?;

        info!(id = %id, "Setting next paper");
        self.promote(&dataset, history, id).await
    }

    /// Enrich, then write description, next and history together
    async fn promote(
        &self,
        dataset: &Dataset,
        mut history: Vec<Identifier>,
        id: Identifier,
    ) -> Result<Detail> {
        let enricher = DetailEnricher::new(&self.fetcher, &self.config.detail_url);
        let detail = enricher.enrich(dataset, &id).await?;

        let first_time = !history.contains(&id);
        if first_time {
            history.push(id.clone());
        }
        self.store
            .save_selection(&detail.render(), &id, first_time.then_some(history.as_slice()))
            .await?;
        Ok(detail)
    }

    /// Rewrite the next and history regions of the page
    ///
    /// Returns `true` if the page changed.
    pub async fn update_page(&self) -> Result<bool> {
        let document = self.store.page().await?;
        let dataset = self.store.dataset().await?;
        let next = self.store.next().await?;
        let history = self.store.history().await?;

        let updated = page::update_page(
            &document,
            &dataset,
            next.as_ref(),
            &history,
            &self.config.markers.next,
            &self.config.markers.history,
        );

        if updated == document {
            info!("Page already up to date");
            return Ok(false);
        }
        self.store.save_page(&updated).await?;
        info!(entries = history.len(), "Page updated");
        Ok(true)
    }

    /// Title and citation lines for the chat notification
    pub async fn message(&self) -> Result<Option<String>> {
        let description = self.store.description().await?;
        Ok(notification_message(&description))
    }
}
