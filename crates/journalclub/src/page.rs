//! Page regeneration by splicing between marker comments
//!
//! Only the text strictly between a start and end marker is replaced.
//! A document missing either marker comes back byte-for-byte unchanged.

use crate::dataset::Dataset;
use crate::types::Identifier;
use serde::Deserialize;
use tracing::warn;

/// Start/end delimiters of a replaceable region
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkerPair {
    pub start: String,
    pub end: String,
}

impl MarkerPair {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// `<!-- next_start -->` / `<!-- next_end -->`
    pub fn next() -> Self {
        Self::new("<!-- next_start -->", "<!-- next_end -->")
    }

    /// `<!-- prev_start -->` / `<!-- prev_end -->`
    pub fn history() -> Self {
        Self::new("<!-- prev_start -->", "<!-- prev_end -->")
    }
}

/// Replace the region between `markers` with `lines`, one per line
pub fn splice(document: &str, markers: &MarkerPair, lines: &[String]) -> String {
    let Some(start) = document.find(&markers.start) else {
        return document.to_string();
    };
    let head_end = start + markers.start.len();
    let Some(end) = document[head_end..].find(&markers.end) else {
        return document.to_string();
    };
    let tail_start = head_end + end;

    let mut out = String::with_capacity(document.len());
    out.push_str(&document[..head_end]);
    out.push('\n');
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&document[tail_start..]);
    out
}

/// Markdown link for one entry, the identifier itself when no citation is stored
pub fn render_entry(dataset: &Dataset, id: &Identifier) -> String {
    match dataset.citation(id) {
        Some(citation) => format!("[{citation}]({id})"),
        None => {
            warn!(id = %id, "No citation stored, linking bare identifier");
            format!("[{id}]({id})")
        }
    }
}

/// Render entries newest-first
///
/// `ids` is taken oldest-first; when `numbered`, each entry keeps its
/// 1-based position in `ids` as its ordinal, so the list reads `3. … 2. … 1. …`.
pub fn render_entries(ids: &[Identifier], dataset: &Dataset, numbered: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(ids.len());
    for (n, id) in ids.iter().enumerate() {
        let entry = render_entry(dataset, id);
        let line = if numbered {
            format!("{}. {entry}", n + 1)
        } else {
            entry
        };
        lines.insert(0, line);
    }
    lines
}

/// Regenerate both the next and the history regions of a page
///
/// The history region lists every past selection except the current one.
/// Without a current selection the next region is left as it is.
pub fn update_page(
    document: &str,
    dataset: &Dataset,
    next: Option<&Identifier>,
    history: &[Identifier],
    next_markers: &MarkerPair,
    history_markers: &MarkerPair,
) -> String {
    let document = match next {
        Some(next) => splice(
            document,
            next_markers,
            &render_entries(std::slice::from_ref(next), dataset, false),
        ),
        None => document.to_string(),
    };

    let past: Vec<Identifier> = history
        .iter()
        .filter(|id| Some(*id) != next)
        .cloned()
        .collect();
    splice(
        &document,
        history_markers,
        &render_entries(&past, dataset, true),
    )
}
