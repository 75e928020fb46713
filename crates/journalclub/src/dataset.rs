//! The identifier → metadata dataset
//!
//! Kept as a sorted map so that serializing an unchanged dataset always
//! produces the same bytes.

use crate::types::{Identifier, MetadataRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    entries: BTreeMap<Identifier, MetadataRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.entries.contains_key(id)
    }

    /// Stored citation, if any
    pub fn citation(&self, id: &Identifier) -> Option<&str> {
        self.entries.get(id).map(|r| r.mla.as_str())
    }

    /// Insert a record, refusing empty citations
    ///
    /// Returns `true` if the record was stored.
    pub fn insert(&mut self, id: Identifier, record: MetadataRecord) -> bool {
        if record.mla.trim().is_empty() {
            return false;
        }
        self.entries.insert(id, record);
        true
    }

    /// Drop every entry the predicate rejects, returning the dropped identifiers
    pub fn prune<F>(&mut self, mut reject: F) -> Vec<Identifier>
    where
        F: FnMut(&Identifier, &MetadataRecord) -> bool,
    {
        let rejected: Vec<Identifier> = self
            .entries
            .iter()
            .filter(|(id, record)| reject(id, record))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &rejected {
            self.entries.remove(id);
        }
        rejected
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.entries.keys()
    }

    /// Parse the persisted JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

impl FromIterator<(Identifier, MetadataRecord)> for Dataset {
    fn from_iter<T: IntoIterator<Item = (Identifier, MetadataRecord)>>(iter: T) -> Self {
        let mut dataset = Dataset::new();
        for (id, record) in iter {
            dataset.insert(id, record);
        }
        dataset
    }
}
