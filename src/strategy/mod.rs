//! Base query strategies and the capability traits they implement.
//!
//! Two capabilities exist:
//! - [`QueryStrategy`]: given the current pools and a budget, pick ids to
//!   label next (rank-by-uncertainty, random sampling, ...).
//! - [`ConfidenceStrategy`]: additionally score every sample in the dataset
//!   with a confidence value; the sort direction is a per-strategy flag.
//!
//! The augmentation-aware strategies in [`crate::augmented`] wrap any of
//! these; they depend only on the contracts here, never on a concrete
//! ranking algorithm.
//!
//! # Example
//!
//! ```
//! use indagar::prelude::*;
//!
//! struct Stub;
//! impl Classifier for Stub {
//!     fn predict_proba(&self, dataset: &dyn Dataset) -> ProbaMatrix {
//!         let rows: Vec<Vec<f32>> = (0..dataset.len())
//!             .map(|i| vec![0.5 + 0.1 * i as f32, 0.5 - 0.1 * i as f32])
//!             .collect();
//!         ProbaMatrix::from_rows(&rows).unwrap()
//!     }
//! }
//!
//! let mut strategy = BreakingTies::new();
//! let ds = IdSpace::new(4);
//! // Sample 0 has the smallest margin, so it is queried first.
//! let picked = strategy.query(&Stub, &ds, &[0, 1, 2, 3], &[], &[], 2).unwrap();
//! assert_eq!(picked, vec![0, 1]);
//! ```

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::Result;
use crate::pool::{Classifier, Dataset};

/// Capability: select ids to query from the unlabeled pool.
///
/// Contract: `query` returns exactly `min(n, unlabeled.len())` distinct ids,
/// all drawn from `unlabeled`. Implementations take `&mut self` so seeded
/// random strategies can advance their generator between rounds.
pub trait QueryStrategy {
    /// Selects up to `n` ids from `unlabeled` to be labeled next.
    ///
    /// `labeled` and `y` describe the already-labeled pool. `y` is indexed
    /// by sample id (aligned to the dataset, not to `labeled`), so wrappers
    /// that narrow `labeled` pass `y` through unchanged; entries for ids
    /// outside `labeled` carry no meaning. Confidence-based strategies
    /// ignore both, but they are part of the uniform contract so informed
    /// strategies can use them.
    ///
    /// # Errors
    ///
    /// Returns an error if selection cannot be carried out; base strategies
    /// themselves are infallible, the augmented wrappers are not.
    fn query(
        &mut self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        unlabeled: &[usize],
        labeled: &[usize],
        y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>>;
}

/// Capability: score every dataset sample with a confidence value.
///
/// Whether low or high scores mark the most query-worthy samples is a fixed
/// property of the strategy ([`ConfidenceStrategy::lower_is_better`]), never
/// a per-call parameter.
pub trait ConfidenceStrategy: QueryStrategy {
    /// Confidence value for every id in `0..dataset.len()`.
    fn confidence(
        &self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        unlabeled: &[usize],
        labeled: &[usize],
        y: &[usize],
    ) -> Vec<f32>;

    /// True if smaller confidence values mark the samples to query first.
    fn lower_is_better(&self) -> bool;
}

/// Picks the `budget` most query-worthy ids from `unlabeled` by confidence.
///
/// Partition-based (`select_nth_unstable_by`), so typical cost is O(n)
/// rather than a full sort. Ties break toward the smaller id, and the
/// returned ids are ordered most-query-worthy first.
///
/// Every id in `unlabeled` must be a valid index into `confidence`.
#[must_use]
pub fn rank_worst(
    confidence: &[f32],
    unlabeled: &[usize],
    budget: usize,
    lower_is_better: bool,
) -> Vec<usize> {
    let mut candidates: Vec<usize> = unlabeled.to_vec();
    let budget = budget.min(candidates.len());
    if budget == 0 {
        return Vec::new();
    }
    let cmp = |a: &usize, b: &usize| {
        let ord = if lower_is_better {
            confidence[*a].total_cmp(&confidence[*b])
        } else {
            confidence[*b].total_cmp(&confidence[*a])
        };
        ord.then_with(|| a.cmp(b))
    };
    if budget < candidates.len() {
        candidates.select_nth_unstable_by(budget - 1, cmp);
        candidates.truncate(budget);
    }
    candidates.sort_unstable_by(cmp);
    candidates
}

/// Uniform random sampling over the unlabeled pool.
///
/// The baseline every informed strategy is measured against. Seedable for
/// reproducible runs; the seed is per-instance configuration, there is no
/// process-global random state.
#[derive(Debug, Clone)]
pub struct RandomSampling {
    rng: StdRng,
}

impl RandomSampling {
    /// Creates a random sampler seeded from system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a random sampler with a fixed seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSampling {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryStrategy for RandomSampling {
    fn query(
        &mut self,
        _clf: &dyn Classifier,
        _dataset: &dyn Dataset,
        unlabeled: &[usize],
        _labeled: &[usize],
        _y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>> {
        Ok(unlabeled
            .choose_multiple(&mut self.rng, n.min(unlabeled.len()))
            .copied()
            .collect())
    }
}

/// Breaking-ties strategy: query where the top two classes are closest.
///
/// Confidence is the margin between the two largest class probabilities;
/// lower margins mean the classifier is torn, so lower is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakingTies;

impl BreakingTies {
    /// Creates a breaking-ties strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ConfidenceStrategy for BreakingTies {
    fn confidence(
        &self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        _unlabeled: &[usize],
        _labeled: &[usize],
        _y: &[usize],
    ) -> Vec<f32> {
        let proba = clf.predict_proba(dataset);
        (0..proba.n_samples()).map(|id| proba.margin(id)).collect()
    }

    fn lower_is_better(&self) -> bool {
        true
    }
}

impl QueryStrategy for BreakingTies {
    fn query(
        &mut self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        unlabeled: &[usize],
        labeled: &[usize],
        y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>> {
        let conf = self.confidence(clf, dataset, unlabeled, labeled, y);
        Ok(rank_worst(&conf, unlabeled, n, self.lower_is_better()))
    }
}

/// Least-confidence strategy: query where the best class is weakest.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastConfidence;

impl LeastConfidence {
    /// Creates a least-confidence strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ConfidenceStrategy for LeastConfidence {
    fn confidence(
        &self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        _unlabeled: &[usize],
        _labeled: &[usize],
        _y: &[usize],
    ) -> Vec<f32> {
        let proba = clf.predict_proba(dataset);
        (0..proba.n_samples())
            .map(|id| proba.max_proba(id))
            .collect()
    }

    fn lower_is_better(&self) -> bool {
        true
    }
}

impl QueryStrategy for LeastConfidence {
    fn query(
        &mut self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        unlabeled: &[usize],
        labeled: &[usize],
        y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>> {
        let conf = self.confidence(clf, dataset, unlabeled, labeled, y);
        Ok(rank_worst(&conf, unlabeled, n, self.lower_is_better()))
    }
}

/// Prediction-entropy strategy: query where the class distribution is
/// most spread out. Higher entropy means less confidence, so higher is
/// better on this scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionEntropy;

impl PredictionEntropy {
    /// Creates a prediction-entropy strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ConfidenceStrategy for PredictionEntropy {
    fn confidence(
        &self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        _unlabeled: &[usize],
        _labeled: &[usize],
        _y: &[usize],
    ) -> Vec<f32> {
        let proba = clf.predict_proba(dataset);
        (0..proba.n_samples()).map(|id| proba.entropy(id)).collect()
    }

    fn lower_is_better(&self) -> bool {
        false
    }
}

impl QueryStrategy for PredictionEntropy {
    fn query(
        &mut self,
        clf: &dyn Classifier,
        dataset: &dyn Dataset,
        unlabeled: &[usize],
        labeled: &[usize],
        y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>> {
        let conf = self.confidence(clf, dataset, unlabeled, labeled, y);
        Ok(rank_worst(&conf, unlabeled, n, self.lower_is_better()))
    }
}

/// Tagged selection of a concrete base strategy.
///
/// Used by the augmented-strategy factory so capability mismatches are
/// rejected when a strategy is built, not when it is first queried.
#[derive(Debug, Clone)]
pub enum BaseStrategy {
    /// Uniform random sampling (no confidence capability).
    Random(RandomSampling),
    /// Margin-based breaking ties.
    BreakingTies(BreakingTies),
    /// Least best-class probability.
    LeastConfidence(LeastConfidence),
    /// Prediction entropy.
    PredictionEntropy(PredictionEntropy),
}

impl BaseStrategy {
    /// Human-readable strategy name for error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BaseStrategy::Random(_) => "RandomSampling",
            BaseStrategy::BreakingTies(_) => "BreakingTies",
            BaseStrategy::LeastConfidence(_) => "LeastConfidence",
            BaseStrategy::PredictionEntropy(_) => "PredictionEntropy",
        }
    }

    /// Converts into a boxed [`QueryStrategy`]. Always possible.
    #[must_use]
    pub fn into_query(self) -> Box<dyn QueryStrategy> {
        match self {
            BaseStrategy::Random(s) => Box::new(s),
            BaseStrategy::BreakingTies(s) => Box::new(s),
            BaseStrategy::LeastConfidence(s) => Box::new(s),
            BaseStrategy::PredictionEntropy(s) => Box::new(s),
        }
    }

    /// Converts into a boxed [`ConfidenceStrategy`], if the strategy has
    /// that capability. Random sampling does not score samples.
    #[must_use]
    pub fn into_confidence(self) -> Option<Box<dyn ConfidenceStrategy>> {
        match self {
            BaseStrategy::Random(_) => None,
            BaseStrategy::BreakingTies(s) => Some(Box::new(s)),
            BaseStrategy::LeastConfidence(s) => Some(Box::new(s)),
            BaseStrategy::PredictionEntropy(s) => Some(Box::new(s)),
        }
    }
}
