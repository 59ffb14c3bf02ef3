//! Indagar: augmentation-aware query strategies for pool-based active learning.
//!
//! In pool-based active learning a query strategy picks which unlabeled
//! samples to send to a human annotator each round. When the dataset has
//! been extended with synthetic variants of its samples (back-translation,
//! synonym replacement, ...), the variant structure can be exploited: score
//! more candidates, propagate one label across a whole sample family, or
//! smooth a family's confidence onto its original. This crate implements
//! that strategy layer; model training, text perturbation, and the outer
//! labeling loop stay with the caller.
//!
//! # Quick Start
//!
//! ```
//! use indagar::prelude::*;
//!
//! // The augmentation pass recorded which synthetic ids belong to which
//! // original; ids 4..12 are two augmented copies of originals 0..4.
//! let index = AugmentationIndex::contiguous(4, 2);
//!
//! // A classifier is anything that yields per-sample class probabilities.
//! struct Uniform;
//! impl Classifier for Uniform {
//!     fn predict_proba(&self, dataset: &dyn Dataset) -> ProbaMatrix {
//!         ProbaMatrix::from_rows(&vec![vec![0.5, 0.5]; dataset.len()]).unwrap()
//!     }
//! }
//!
//! let mut strategy = OutcomeExtension::new(Box::new(BreakingTies::new()), index);
//! let dataset = IdSpace::new(12);
//! let unlabeled: Vec<usize> = (0..12).collect();
//! let picked = strategy
//!     .query(&Uniform, &dataset, &unlabeled, &[], &[], 2)
//!     .unwrap();
//!
//! // Two originals plus both of their families.
//! assert_eq!(picked.len(), 6);
//! ```
//!
//! # Modules
//!
//! - [`augmented`]: the augmentation index and the four strategy variants
//! - [`strategy`]: base strategies and the query/confidence capabilities
//! - [`pool`]: the classifier/dataset call contract
//! - [`proba`]: class-probability matrix and per-sample uncertainty scores
//! - [`error`]: error taxonomy and `Result` alias

pub mod augmented;
pub mod error;
pub mod pool;
pub mod prelude;
pub mod proba;
pub mod strategy;

pub use error::{IndagarError, Result};
