//! Class-probability matrix produced by classifiers.
//!
//! A [`ProbaMatrix`] is the dense `n_samples x n_classes` output of
//! `predict_proba`, stored row-major. The per-row derived scores implemented
//! here (best-class probability, top-two margin, prediction entropy) are the
//! raw material the confidence-based query strategies rank by.

use crate::error::{IndagarError, Result};

/// Dense row-major matrix of per-sample class probabilities.
///
/// Row `i` holds the predicted class distribution for sample id `i`. Rows are
/// expected to be non-negative; they do not have to be perfectly normalized
/// (entropy and margin are computed on the values as given).
///
/// # Examples
///
/// ```
/// use indagar::proba::ProbaMatrix;
///
/// let p = ProbaMatrix::from_vec(2, 2, vec![0.9, 0.1, 0.5, 0.5]).unwrap();
/// assert_eq!(p.shape(), (2, 2));
/// assert!((p.max_proba(0) - 0.9).abs() < 1e-6);
/// assert!((p.margin(1) - 0.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProbaMatrix {
    n_samples: usize,
    n_classes: usize,
    data: Vec<f32>,
}

impl ProbaMatrix {
    /// Creates a probability matrix from row-major data.
    ///
    /// # Errors
    ///
    /// Returns an error if `data.len() != n_samples * n_classes` or if
    /// `n_classes` is zero while samples are present.
    pub fn from_vec(n_samples: usize, n_classes: usize, data: Vec<f32>) -> Result<Self> {
        if n_samples > 0 && n_classes == 0 {
            return Err(IndagarError::Other(
                "ProbaMatrix requires at least one class per sample".to_string(),
            ));
        }
        if data.len() != n_samples * n_classes {
            return Err(IndagarError::Other(format!(
                "ProbaMatrix data length {} does not match shape {n_samples}x{n_classes}",
                data.len()
            )));
        }
        Ok(Self {
            n_samples,
            n_classes,
            data,
        })
    }

    /// Creates a probability matrix from per-sample rows.
    ///
    /// # Errors
    ///
    /// Returns an error if rows have inconsistent lengths.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let n_samples = rows.len();
        let n_classes = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_samples * n_classes);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_classes {
                return Err(IndagarError::Other(format!(
                    "ProbaMatrix row {i} has {} classes, expected {n_classes}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(n_samples, n_classes, data)
    }

    /// Returns `(n_samples, n_classes)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_samples, self.n_classes)
    }

    /// Number of samples (rows).
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Class distribution for one sample.
    ///
    /// # Panics
    ///
    /// Panics if `id >= n_samples`.
    #[must_use]
    pub fn row(&self, id: usize) -> &[f32] {
        let start = id * self.n_classes;
        &self.data[start..start + self.n_classes]
    }

    /// Best-class probability for one sample.
    #[must_use]
    pub fn max_proba(&self, id: usize) -> f32 {
        self.row(id).iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Difference between the two largest class probabilities.
    ///
    /// A small margin means the classifier is torn between two classes.
    /// With a single class the margin equals that class's probability.
    #[must_use]
    pub fn margin(&self, id: usize) -> f32 {
        let mut best = f32::NEG_INFINITY;
        let mut second = f32::NEG_INFINITY;
        for &p in self.row(id) {
            if p > best {
                second = best;
                best = p;
            } else if p > second {
                second = p;
            }
        }
        if second == f32::NEG_INFINITY {
            best
        } else {
            best - second
        }
    }

    /// Shannon entropy of the class distribution, in nats.
    ///
    /// Zero-probability classes contribute nothing.
    #[must_use]
    pub fn entropy(&self, id: usize) -> f32 {
        self.row(id)
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| -p * p.ln())
            .sum()
    }
}
