//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use indagar::prelude::*;
//! ```

pub use crate::augmented::{
    AugmentationIndex, AugmentedVariant, AverageAcrossAugmented, OutcomeExtension,
    SearchSpaceExtension, SearchSpaceExtensionAndOutcome,
};
pub use crate::error::{IndagarError, Result};
pub use crate::pool::{Classifier, Dataset, IdSpace};
pub use crate::proba::ProbaMatrix;
pub use crate::strategy::{
    BaseStrategy, BreakingTies, ConfidenceStrategy, LeastConfidence, PredictionEntropy,
    QueryStrategy, RandomSampling,
};
