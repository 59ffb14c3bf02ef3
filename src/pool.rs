//! Call-contract types shared by all query strategies.
//!
//! The active-learning loop owns the dataset, the classifier, and the
//! labeled/unlabeled pools; strategies only borrow them for the duration of a
//! single query call. Pools are plain `&[usize]` id slices and labels are a
//! `&[usize]` array aligned to the dataset, so any outer loop can drive the
//! strategies without adopting this crate's data structures.

use crate::proba::ProbaMatrix;

/// Opaque, indexable sample collection.
///
/// Query strategies never look inside samples; they only need to know how
/// many ids the dataset spans so confidence vectors can be sized.
pub trait Dataset {
    /// Number of samples (original plus augmented) in the dataset.
    fn len(&self) -> usize;

    /// Returns true if the dataset has no samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A classifier able to produce per-sample class probabilities.
///
/// One row per sample id, `0..dataset.len()`. Inference may be expensive
/// (the fill loop calls this once per iteration), so implementations should
/// batch internally.
pub trait Classifier {
    /// Predicts the class distribution for every sample in the dataset.
    fn predict_proba(&self, dataset: &dyn Dataset) -> ProbaMatrix;
}

/// Minimal dataset that only carries its own length.
///
/// Useful when the classifier already holds the features and the strategies
/// only need the id space, and as a stand-in for tests.
///
/// # Examples
///
/// ```
/// use indagar::pool::{Dataset, IdSpace};
///
/// let ds = IdSpace::new(6);
/// assert_eq!(ds.len(), 6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IdSpace {
    n_samples: usize,
}

impl IdSpace {
    /// Creates an id space covering `0..n_samples`.
    #[must_use]
    pub fn new(n_samples: usize) -> Self {
        Self { n_samples }
    }
}

impl Dataset for IdSpace {
    fn len(&self) -> usize {
        self.n_samples
    }
}
