//! Query-filling loop shared by the search-space extension strategies.

use std::collections::HashSet;

use serde::Serialize;

use super::AugmentationIndex;
use crate::error::{IndagarError, Result};
use crate::pool::{Classifier, Dataset};
use crate::strategy::QueryStrategy;

/// Outcome of one query-filling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillResult {
    /// Exactly the requested number of distinct, unlabeled original ids,
    /// in resolution order.
    pub originals: Vec<usize>,
    /// Every augmented id collected while resolving the originals, in
    /// collection order.
    pub augmented: Vec<usize>,
}

/// Repeatedly queries `base` over a shrinking candidate pool until `n`
/// distinct unlabeled original ids have been resolved.
///
/// Each round the pool is the unlabeled ids minus everything already
/// surfaced: ids the base strategy returned before, augmented ids collected
/// through resolved families, and the resolved originals themselves.
/// Augmented picks are mapped to their origin through the index; an origin
/// that is already labeled never counts toward the quota (its family is
/// still collected so it cannot be re-surfaced).
///
/// Classifier inference runs once per round, so the round count is the
/// dominant cost of the extension strategies.
///
/// # Errors
///
/// Returns [`IndagarError::PoolExhausted`] when the candidate pool empties
/// before the quota is reached, and propagates base-strategy errors.
pub fn fill_query(
    base: &mut dyn QueryStrategy,
    index: &AugmentationIndex,
    clf: &dyn Classifier,
    dataset: &dyn Dataset,
    unlabeled: &[usize],
    labeled: &[usize],
    y: &[usize],
    n: usize,
) -> Result<FillResult> {
    let labeled_set: HashSet<usize> = labeled.iter().copied().collect();

    let mut originals: Vec<usize> = Vec::with_capacity(n);
    let mut resolved: HashSet<usize> = HashSet::new();
    let mut augmented: Vec<usize> = Vec::new();
    let mut collected: HashSet<usize> = HashSet::new();
    let mut excluded: HashSet<usize> = HashSet::new();

    while originals.len() < n {
        let pool: Vec<usize> = unlabeled
            .iter()
            .copied()
            .filter(|id| {
                !excluded.contains(id) && !collected.contains(id) && !resolved.contains(id)
            })
            .collect();
        if pool.is_empty() {
            return Err(IndagarError::PoolExhausted {
                requested: n,
                resolved: originals.len(),
            });
        }

        let raw = base.query(clf, dataset, &pool, labeled, y, n - originals.len())?;
        if raw.is_empty() {
            return Err(IndagarError::SelectionContract {
                detail: format!(
                    "base strategy returned no ids from a pool of {}",
                    pool.len()
                ),
            });
        }
        excluded.extend(raw.iter().copied());

        for id in raw {
            let origin = if index.is_augmented(id) {
                index.origin_of(id)?
            } else {
                id
            };
            if !resolved.insert(origin) {
                continue;
            }
            // Collect the family either way so its variants leave the pool.
            for &aug in index.augmented_of(origin) {
                if collected.insert(aug) {
                    augmented.push(aug);
                }
            }
            // An already-labeled origin cannot be queried again.
            if !labeled_set.contains(&origin) {
                originals.push(origin);
            }
        }
    }

    originals.truncate(n);
    Ok(FillResult {
        originals,
        augmented,
    })
}
