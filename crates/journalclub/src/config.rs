//! Configuration
//!
//! Every file the curator touches lives under one data directory by
//! default. A TOML file can override any field; relative paths in it are
//! resolved against the data directory.

use crate::client::FetchOptions;
use crate::detail::DEFAULT_DETAIL_URL;
use crate::error::{Error, Result};
use crate::extract::DEFAULT_IDENTIFIER_PATTERN;
use crate::page::MarkerPair;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File locations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Newline-delimited source URLs
    pub sources: PathBuf,
    /// Newline-delimited stopword patterns
    pub stopwords: PathBuf,
    /// JSON dataset
    pub dataset: PathBuf,
    /// Newline-delimited past selections, oldest first
    pub history: PathBuf,
    /// Current selection
    pub next: PathBuf,
    /// Title, citation and abstract of the current selection
    pub description: PathBuf,
    /// Page regenerated by the `page` action
    pub page: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            sources: "sources.txt".into(),
            stopwords: "stopwords.txt".into(),
            dataset: "dataset.json".into(),
            history: "history.txt".into(),
            next: "next.txt".into(),
            description: "next_description.txt".into(),
            page: "index.md".into(),
        }
    }
}

impl Paths {
    /// Resolve every relative path against `dir`
    pub fn rooted_at(self, dir: &Path) -> Self {
        let root = |p: PathBuf| if p.is_absolute() { p } else { dir.join(p) };
        Self {
            sources: root(self.sources),
            stopwords: root(self.stopwords),
            dataset: root(self.dataset),
            history: root(self.history),
            next: root(self.next),
            description: root(self.description),
            page: root(self.page),
        }
    }
}

/// Marker pairs of the two page regions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub next: MarkerPair,
    pub history: MarkerPair,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            next: MarkerPair::next(),
            history: MarkerPair::history(),
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    /// Regex matching identifiers on source pages
    pub identifier_pattern: String,
    /// Detail record URL; `{doi}` is replaced by the identifier path
    pub detail_url: String,
    pub markers: Markers,
    pub fetch: FetchOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: Paths::default(),
            identifier_pattern: DEFAULT_IDENTIFIER_PATTERN.to_string(),
            detail_url: DEFAULT_DETAIL_URL.to_string(),
            markers: Markers::default(),
            fetch: FetchOptions::default(),
        }
    }
}

impl Config {
    /// Defaults with every file under `dir`
    pub fn for_dir(dir: impl AsRef<Path>) -> Self {
        let defaults = Self::default();
        Self {
            paths: defaults.paths.rooted_at(dir.as_ref()),
            ..defaults
        }
    }

    /// Parse TOML, rooting relative paths at `dir`
    pub fn from_toml(toml_str: &str, dir: &Path) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(toml_str)?;
        config.paths = config.paths.rooted_at(dir);
        Ok(config)
    }

    /// Load a TOML config file, rooting relative paths at `dir`
    pub fn load(path: &Path, dir: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&contents, dir).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
