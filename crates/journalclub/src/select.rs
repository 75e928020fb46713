//! Random selection of an unread paper

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::types::Identifier;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Dataset identifiers not yet in the history, in dataset order
pub fn selectable<'d>(dataset: &'d Dataset, history: &[Identifier]) -> Vec<&'d Identifier> {
    let seen: HashSet<&Identifier> = history.iter().collect();
    dataset.identifiers().filter(|id| !seen.contains(id)).collect()
}

/// Uniformly pick one selectable identifier
pub fn choose<R: Rng + ?Sized>(
    dataset: &Dataset,
    history: &[Identifier],
    rng: &mut R,
) -> Result<Identifier> {
    selectable(dataset, history)
        .choose(rng)
        .map(|id| (*id).clone())
        .ok_or(Error::NothingSelectable)
}
