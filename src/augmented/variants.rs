//! The four augmentation-aware strategy variants and their factory.

use super::fill::fill_query;
use super::AugmentationIndex;
use crate::error::{IndagarError, Result};
use crate::pool::{Classifier, Dataset};
use crate::strategy::{rank_worst, BaseStrategy, ConfidenceStrategy, QueryStrategy};

/// Scores originals only, then extends the outcome with their variants.
///
/// Both pools are restricted to original ids before delegating, so the base
/// strategy never sees a synthetic sample. Every selected original then
/// brings its whole family into the answer: the result is exactly `n`
/// originals followed by all of their augmented ids, ready for the caller
/// to propagate each human label across the family.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use indagar::prelude::*;
///
/// struct Uniform;
/// impl Classifier for Uniform {
///     fn predict_proba(&self, dataset: &dyn Dataset) -> ProbaMatrix {
///         ProbaMatrix::from_rows(&vec![vec![0.5, 0.5]; dataset.len()]).unwrap()
///     }
/// }
///
/// let index = AugmentationIndex::from_map(BTreeMap::from([
///     (0, vec![10, 11]),
///     (1, vec![12, 13]),
/// ]))
/// .unwrap();
/// let mut strategy = OutcomeExtension::new(Box::new(BreakingTies::new()), index);
/// let ds = IdSpace::new(14);
/// let picked = strategy
///     .query(&Uniform, &ds, &[0, 1, 10, 11, 12, 13], &[], &[], 1)
///     .unwrap();
/// assert_eq!(picked, vec![0, 10, 11]);
/// ```
pub struct OutcomeExtension {
    base: Box<dyn QueryStrategy>,
    index: AugmentationIndex,
}

impl OutcomeExtension {
    /// Wraps a base strategy with outcome extension over `index`.
    #[must_use]
    pub fn new(base: Box<dyn QueryStrategy>, index: AugmentationIndex) -> Self {
        Self { base, index }
    }
}

impl QueryStrategy for OutcomeExtension {
    fn query(
        &mut self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        unlabeled: &[usize],
        labeled: &[usize],
        y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>> {
        let unlabeled_originals: Vec<usize> = unlabeled
            .iter()
            .copied()
            .filter(|&id| self.index.is_original(id))
            .collect();
        if unlabeled_originals.len() < n {
            return Err(IndagarError::PoolExhausted {
                requested: n,
                resolved: unlabeled_originals.len(),
            });
        }
        let labeled_originals: Vec<usize> = labeled
            .iter()
            .copied()
            .filter(|&id| self.index.is_original(id))
            .collect();

        let selected = self
            .base
            .query(clf, dataset, &unlabeled_originals, &labeled_originals, y, n)?;

        let mut result = selected.clone();
        for &id in &selected {
            result.extend_from_slice(self.index.augmented_of(id));
        }
        Ok(result)
    }
}

/// Lets the base strategy search the full pool but returns originals only.
///
/// Augmented ids pad the search space: when the base strategy picks one,
/// it is resolved to its origin and the origin counts toward the quota.
/// The variants themselves are discarded from the final answer, so the
/// result is always exactly `n` original ids.
pub struct SearchSpaceExtension {
    base: Box<dyn QueryStrategy>,
    index: AugmentationIndex,
}

impl SearchSpaceExtension {
    /// Wraps a base strategy with search-space extension over `index`.
    #[must_use]
    pub fn new(base: Box<dyn QueryStrategy>, index: AugmentationIndex) -> Self {
        Self { base, index }
    }
}

impl QueryStrategy for SearchSpaceExtension {
    fn query(
        &mut self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        unlabeled: &[usize],
        labeled: &[usize],
        y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>> {
        let fill = fill_query(
            self.base.as_mut(),
            &self.index,
            clf,
            dataset,
            unlabeled,
            labeled,
            y,
            n,
        )?;
        Ok(fill.originals)
    }
}

/// Search-space extension that keeps the collected variants in the answer.
///
/// Identical resolution mechanics to [`SearchSpaceExtension`]; the result
/// concatenates the `n` resolved originals with every augmented id
/// collected along the way.
pub struct SearchSpaceExtensionAndOutcome {
    base: Box<dyn QueryStrategy>,
    index: AugmentationIndex,
}

impl SearchSpaceExtensionAndOutcome {
    /// Wraps a base strategy with combined search-space and outcome
    /// extension over `index`.
    #[must_use]
    pub fn new(base: Box<dyn QueryStrategy>, index: AugmentationIndex) -> Self {
        Self { base, index }
    }
}

impl QueryStrategy for SearchSpaceExtensionAndOutcome {
    fn query(
        &mut self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        unlabeled: &[usize],
        labeled: &[usize],
        y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>> {
        let fill = fill_query(
            self.base.as_mut(),
            &self.index,
            clf,
            dataset,
            unlabeled,
            labeled,
            y,
            n,
        )?;
        let mut result = fill.originals;
        result.extend(fill.augmented);
        Ok(result)
    }
}

/// Replaces each original's confidence with its family mean.
///
/// For every original with augmentations, the confidence becomes the mean
/// over the original and all of its variants; each variant is then forced
/// to the worst value on the configured scale (1 when lower is better,
/// otherwise 0) so a plain top-`n` pass can never pick a variant directly.
/// Family information only flows into the ranking through the original's
/// smoothed score.
///
/// Requires a confidence-capable base strategy; the typed constructor
/// enforces that, and [`AugmentedVariant::build`] reports a configuration
/// error for capability mismatches. Since this type is itself a
/// [`ConfidenceStrategy`], it composes as the base of the extension
/// variants.
pub struct AverageAcrossAugmented {
    base: Box<dyn ConfidenceStrategy>,
    index: AugmentationIndex,
}

impl AverageAcrossAugmented {
    /// Wraps a confidence-capable base strategy over `index`.
    #[must_use]
    pub fn new(base: Box<dyn ConfidenceStrategy>, index: AugmentationIndex) -> Self {
        Self { base, index }
    }

    fn worst_value(&self) -> f32 {
        if self.base.lower_is_better() {
            1.0
        } else {
            0.0
        }
    }
}

impl ConfidenceStrategy for AverageAcrossAugmented {
    /// Base confidences with each family mean folded onto its original.
    ///
    /// # Panics
    ///
    /// Panics if the index mentions an id outside `0..dataset.len()`.
    /// Going through [`QueryStrategy::query`] reports that mismatch as an
    /// error instead.
    fn confidence(
        &self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        unlabeled: &[usize],
        labeled: &[usize],
        y: &[usize],
    ) -> Vec<f32> {
        let mut conf = self.base.confidence(clf, dataset, unlabeled, labeled, y);
        let worst = self.worst_value();
        for (origin, variants) in self.index.iter() {
            if variants.is_empty() {
                continue;
            }
            let mut sum = conf[origin];
            for &aug in variants {
                sum += conf[aug];
            }
            conf[origin] = sum / (variants.len() + 1) as f32;
            for &aug in variants {
                conf[aug] = worst;
            }
        }
        conf
    }

    fn lower_is_better(&self) -> bool {
        self.base.lower_is_better()
    }
}

impl QueryStrategy for AverageAcrossAugmented {
    fn query(
        &mut self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        unlabeled: &[usize],
        labeled: &[usize],
        y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>> {
        if let Some(max) = self.index.max_id() {
            if max >= dataset.len() {
                return Err(IndagarError::InvalidAugmentationMap {
                    id: max,
                    detail: format!("is outside the dataset of {} samples", dataset.len()),
                });
            }
        }
        let conf = self.confidence(clf, dataset, unlabeled, labeled, y);
        Ok(rank_worst(&conf, unlabeled, n, self.lower_is_better()))
    }
}

/// Tagged selection of an augmentation-aware strategy variant.
///
/// Pairs with [`BaseStrategy`] so experiment configuration can name both
/// halves of a strategy and have capability requirements checked at build
/// time rather than mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AugmentedVariant {
    /// [`OutcomeExtension`] semantics.
    OutcomeExtension,
    /// [`SearchSpaceExtension`] semantics.
    SearchSpaceExtension,
    /// [`SearchSpaceExtensionAndOutcome`] semantics.
    SearchSpaceExtensionAndOutcome,
    /// [`AverageAcrossAugmented`] semantics (needs a confidence-capable
    /// base strategy).
    AverageAcrossAugmented,
}

impl AugmentedVariant {
    /// Builds the selected variant around `base` and `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndagarError::MissingCapability`] when
    /// [`AugmentedVariant::AverageAcrossAugmented`] is paired with a base
    /// strategy that cannot score samples (random sampling).
    pub fn build(
        self,
        base: BaseStrategy,
        index: AugmentationIndex,
    ) -> Result<Box<dyn QueryStrategy>> {
        match self {
            AugmentedVariant::OutcomeExtension => {
                Ok(Box::new(OutcomeExtension::new(base.into_query(), index)))
            }
            AugmentedVariant::SearchSpaceExtension => {
                Ok(Box::new(SearchSpaceExtension::new(base.into_query(), index)))
            }
            AugmentedVariant::SearchSpaceExtensionAndOutcome => Ok(Box::new(
                SearchSpaceExtensionAndOutcome::new(base.into_query(), index),
            )),
            AugmentedVariant::AverageAcrossAugmented => {
                let name = base.name();
                let confident =
                    base.into_confidence()
                        .ok_or_else(|| IndagarError::MissingCapability {
                            variant: "AverageAcrossAugmented".to_string(),
                            required: format!("confidence scoring, which {name} lacks"),
                        })?;
                Ok(Box::new(AverageAcrossAugmented::new(confident, index)))
            }
        }
    }
}
