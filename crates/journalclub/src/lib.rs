//! Journal Club - reading-list curation for a recurring paper meeting
//!
//! This crate crawls source pages for DOI links, keeps a dataset of MLA
//! citations, picks an unread paper at random and regenerates the page
//! that announces it.
//!
//! ## Pieces
//!
//! - [`HttpFetcher`] - GET with manual redirect following and deadlines
//! - [`IdentifierExtractor`] / [`StopwordFilter`] - find DOIs, reject citations
//! - [`MetadataResolver`] - cached citation or DOI content negotiation
//! - [`Crawler`] - merges crawl results into a [`Dataset`]
//! - [`select::choose`] - uniform choice among unread papers
//! - [`DetailEnricher`] - title and abstract from the Crossref record
//! - [`page`] - marker-delimited page splicing
//! - [`Curator`] - the actions, wired to the on-disk [`Store`]

pub mod client;
pub mod config;
pub mod crawl;
pub mod curator;
pub mod dataset;
pub mod detail;
mod error;
pub mod extract;
pub mod fetchers;
pub mod metadata;
pub mod page;
pub mod select;
pub mod store;
mod types;

pub use client::{fetch, fetch_with_options, FetchOptions, MAX_REDIRECTS};
pub use config::{Config, Markers, Paths};
pub use crawl::{CrawlReport, Crawler};
pub use curator::Curator;
pub use dataset::Dataset;
pub use detail::{notification_message, Detail, DetailEnricher, TitleMatch};
pub use error::{Error, FetchError, Result};
pub use extract::{IdentifierExtractor, StopwordFilter};
pub use fetchers::{Fetcher, HttpFetcher};
pub use metadata::MetadataResolver;
pub use page::MarkerPair;
pub use store::Store;
pub use types::{FetchRequest, FetchResponse, Identifier, MetadataRecord};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "JournalClub/0.1 (reading-list curator)";
