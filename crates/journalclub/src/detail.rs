//! Detail enrichment: title and abstract for a chosen paper
//!
//! Title and abstract come from the Crossref unixsd XML record of the DOI,
//! the citation from the dataset.

use crate::dataset::Dataset;
use crate::error::{Error, FetchError, Result};
use crate::fetchers::Fetcher;
use crate::metadata::MetadataResolver;
use crate::types::{FetchRequest, Identifier};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Default detail endpoint; `{doi}` is replaced by the identifier path
pub const DEFAULT_DETAIL_URL: &str =
    "https://api.crossref.org/works/{doi}/transform/application/vnd.crossref.unixsd+xml";

const ABSTRACT_OPEN: &str = "<jats:abstract";
const ABSTRACT_CLOSE: &str = "</jats:abstract>";

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title(?:\s[^>]*)?>(.*?)</title>").unwrap());
static CONTROL_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t\n\r\x0B\x0C]").unwrap());
static JATS_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?jats:[^>]*>").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Outcome of looking for a `<title>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleMatch {
    Found(String),
    NotFound,
}

/// First `<title>` element's inner text, on a single line
pub fn extract_title(markup: &str) -> TitleMatch {
    match TITLE.captures(markup).and_then(|c| c.get(1)) {
        Some(m) => {
            let title = WHITESPACE_RUN.replace_all(m.as_str(), " ");
            TitleMatch::Found(title.trim().to_string())
        }
        None => TitleMatch::NotFound,
    }
}

/// Plain text of the `<jats:abstract>` container, if there is one
///
/// An unterminated container runs to the end of the markup.
pub fn extract_abstract(markup: &str) -> Option<String> {
    let start = markup.find(ABSTRACT_OPEN)?;
    let rest = &markup[start..];
    let span = match rest.find(ABSTRACT_CLOSE) {
        Some(end) => &rest[..end + ABSTRACT_CLOSE.len()],
        None => rest,
    };

    let span = CONTROL_WHITESPACE.replace_all(span, "");
    let span = JATS_TAG.replace_all(&span, "");
    let span = WHITESPACE_RUN.replace_all(&span, " ");
    Some(span.trim().to_string())
}

/// Fill the `{doi}` placeholder of a detail URL template
pub fn detail_url(template: &str, id: &Identifier) -> String {
    template.replace("{doi}", &id.path())
}

/// Everything shown for the next paper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub id: Identifier,
    pub title: String,
    pub citation: String,
    /// Abstract text, or the identifier URL when the record has none
    pub abstract_text: String,
}

impl Detail {
    /// Title, citation and abstract, one per line
    pub fn render(&self) -> String {
        format!("{}\n{}\n{}", self.title, self.citation, self.abstract_text)
    }
}

/// The two-line chat message (title, citation) for a rendered description
pub fn notification_message(description: &str) -> Option<String> {
    let mut lines = description.lines();
    let title = lines.next()?.trim();
    let citation = lines.next()?.trim();
    if title.is_empty() || citation.is_empty() {
        return None;
    }
    Some(format!("{title}\n{citation}"))
}

pub struct DetailEnricher<'a> {
    fetcher: &'a dyn Fetcher,
    url_template: &'a str,
}

impl<'a> DetailEnricher<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, url_template: &'a str) -> Self {
        Self {
            fetcher,
            url_template,
        }
    }

    /// Build the detail for an identifier already in the dataset
    pub async fn enrich(&self, dataset: &Dataset, id: &Identifier) -> Result<Detail> {
        let citation = MetadataResolver::cached(dataset, id)
            .ok_or_else(|| Error::UnknownIdentifier(id.to_string()))?
            .to_string();

        let url = detail_url(self.url_template, id);
        debug!(id = %id, url = %url, "Fetching detail record");
        let response = self.fetcher.fetch(&FetchRequest::new(&url)).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status_code,
            }
            .into());
        }

        let title = match extract_title(&response.content) {
            TitleMatch::Found(title) => title,
            TitleMatch::NotFound => return Err(Error::TitleNotFound(id.to_string())),
        };
        let abstract_text =
            extract_abstract(&response.content).unwrap_or_else(|| id.to_string());

        Ok(Detail {
            id: id.clone(),
            title,
            citation,
            abstract_text,
        })
    }
}
