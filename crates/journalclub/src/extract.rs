//! Identifier extraction and stopword filtering

use crate::error::{Error, Result};
use crate::types::Identifier;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

/// Default identifier pattern: doi.org URLs
pub const DEFAULT_IDENTIFIER_PATTERN: &str =
    r"https?://(?:dx\.)?doi\.org/10\.\d{4,9}/[-._;()/:A-Za-z0-9]+";

static DEFAULT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_IDENTIFIER_PATTERN).unwrap());

/// Finds identifiers in fetched text
#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    pattern: Regex,
}

impl IdentifierExtractor {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Distinct identifiers occurring anywhere in `text`
    ///
    /// Trailing sentence punctuation picked up by the pattern is dropped,
    /// as is a closing parenthesis with no opening one inside the match.
    pub fn extract(&self, text: &str) -> BTreeSet<Identifier> {
        self.pattern
            .find_iter(text)
            .map(|m| trim_trailing(m.as_str()))
            .filter(|s| !s.is_empty())
            .map(Identifier::from)
            .collect()
    }
}

/// Strip trailing punctuation and unbalanced closing parentheses
fn trim_trailing(mut s: &str) -> &str {
    loop {
        s = s.trim_end_matches(['.', ',', ';', ':']);
        let unbalanced = s.matches(')').count() > s.matches('(').count();
        match s.strip_suffix(')') {
            Some(rest) if unbalanced => s = rest,
            _ => return s,
        }
    }
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}

/// Case-insensitive, multi-line patterns that exclude a citation
#[derive(Debug, Clone, Default)]
pub struct StopwordFilter {
    patterns: Vec<Regex>,
}

impl StopwordFilter {
    /// Compile the patterns; blank entries are skipped since they would match everything
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter(|p| !p.as_ref().trim().is_empty())
            .map(|p| {
                let p = p.as_ref();
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .multi_line(true)
                    .build()
                    .map_err(|source| Error::InvalidPattern {
                        pattern: p.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// True if any pattern matches anywhere in `subject`
    pub fn matches(&self, subject: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(subject))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
