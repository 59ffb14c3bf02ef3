//! Augmentation-aware query strategies.
//!
//! A text-augmentation pass turns every original sample into a family:
//! the original plus a handful of synthetic variants. [`AugmentationIndex`]
//! records that family structure, and the strategy wrappers in this module
//! exploit it in four different ways:
//!
//! - [`OutcomeExtension`]: score originals only, return them plus their
//!   variants so one human label can be propagated to the whole family.
//! - [`SearchSpaceExtension`]: let the base strategy roam the full pool
//!   (variants included), then resolve everything back to originals.
//! - [`SearchSpaceExtensionAndOutcome`]: same search, but the variants
//!   collected along the way stay in the answer.
//! - [`AverageAcrossAugmented`]: average each family's confidence onto the
//!   original and rank on the smoothed scores.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use indagar::augmented::AugmentationIndex;
//!
//! let mut map = BTreeMap::new();
//! map.insert(0, vec![10, 11]);
//! map.insert(1, vec![12, 13]);
//! let index = AugmentationIndex::from_map(map).unwrap();
//!
//! assert_eq!(index.origin_of(12).unwrap(), 1);
//! assert_eq!(index.augmented_of(0), &[10, 11]);
//! assert!(index.is_augmented(11));
//! assert!(!index.is_augmented(1));
//! ```

mod fill;
mod variants;

pub use fill::{fill_query, FillResult};
pub use variants::{
    AugmentedVariant, AverageAcrossAugmented, OutcomeExtension, SearchSpaceExtension,
    SearchSpaceExtensionAndOutcome,
};

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{IndagarError, Result};

/// Mapping from original sample ids to their augmented-variant ids.
///
/// Built once per augmentation pass and immutable afterwards. Construction
/// validates the partition invariant eagerly: no id may appear both as an
/// original and as a variant, and no variant may belong to two families.
/// The inverse map (variant -> origin) is precomputed, so [`origin_of`]
/// resolves in O(1).
///
/// [`origin_of`]: AugmentationIndex::origin_of
#[derive(Debug, Clone, Default)]
pub struct AugmentationIndex {
    map: BTreeMap<usize, Vec<usize>>,
    inverse: HashMap<usize, usize>,
    flattened: Vec<usize>,
}

impl AugmentationIndex {
    /// Builds an index from an `original -> variants` mapping.
    ///
    /// # Errors
    ///
    /// Returns [`IndagarError::InvalidAugmentationMap`] if an id appears
    /// both as a key and inside a value list, twice in one list, or in the
    /// lists of two different originals.
    pub fn from_map(map: BTreeMap<usize, Vec<usize>>) -> Result<Self> {
        let mut inverse = HashMap::new();
        for (&origin, variants) in &map {
            for &aug in variants {
                if map.contains_key(&aug) {
                    return Err(IndagarError::InvalidAugmentationMap {
                        id: aug,
                        detail: "appears as both an original and an augmented id".to_string(),
                    });
                }
                if let Some(prev) = inverse.insert(aug, origin) {
                    let detail = if prev == origin {
                        format!("appears twice in the augmentation list of {origin}")
                    } else {
                        format!("appears in the augmentation lists of both {prev} and {origin}")
                    };
                    return Err(IndagarError::InvalidAugmentationMap { id: aug, detail });
                }
            }
        }
        let mut flattened: Vec<usize> = inverse.keys().copied().collect();
        flattened.sort_unstable();
        Ok(Self {
            map,
            inverse,
            flattened,
        })
    }

    /// Builds the contiguous layout produced by concatenating `n` augmented
    /// copies of a dataset after the original rows.
    ///
    /// Original id `x` maps to `[x + num_rows, x + 2*num_rows, ...]`, one
    /// entry per augmentation round.
    #[must_use]
    pub fn contiguous(num_rows: usize, n_augmentations: usize) -> Self {
        let map: BTreeMap<usize, Vec<usize>> = (0..num_rows)
            .map(|x| {
                let variants = (0..n_augmentations)
                    .map(|k| x + num_rows * (k + 1))
                    .collect();
                (x, variants)
            })
            .collect();
        // The contiguous layout cannot collide, so validation never fails.
        Self::from_map(map).expect("contiguous layout is a valid partition")
    }

    /// Parses an index from its JSON interchange form: an object whose keys
    /// are stringified original ids and whose values are arrays of variant
    /// ids, e.g. `{"0": [10, 11], "1": [12, 13]}`.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed JSON or non-integer
    /// keys, and a configuration error if the parsed mapping violates the
    /// partition invariant.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<usize>> = serde_json::from_str(json)
            .map_err(|e| IndagarError::Serialization(e.to_string()))?;
        let mut map = BTreeMap::new();
        for (key, variants) in raw {
            let origin: usize = key.parse().map_err(|_| {
                IndagarError::Serialization(format!(
                    "augmentation map key '{key}' is not a non-negative integer"
                ))
            })?;
            map.insert(origin, variants);
        }
        Self::from_map(map)
    }

    /// Reads and parses an index from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise the same
    /// errors as [`AugmentationIndex::from_json_str`].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializes the index to its JSON interchange form.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if JSON encoding fails.
    pub fn to_json_string(&self) -> Result<String> {
        let raw: BTreeMap<String, &Vec<usize>> =
            self.map.iter().map(|(k, v)| (k.to_string(), v)).collect();
        serde_json::to_string(&raw).map_err(|e| IndagarError::Serialization(e.to_string()))
    }

    /// Resolves an augmented id to its owning original id.
    ///
    /// # Errors
    ///
    /// Returns [`IndagarError::UnknownAugmentedId`] if `aug_id` is not in
    /// the flattened augmented set. Callers holding a possibly-original id
    /// should check [`AugmentationIndex::is_augmented`] first.
    pub fn origin_of(&self, aug_id: usize) -> Result<usize> {
        self.inverse
            .get(&aug_id)
            .copied()
            .ok_or(IndagarError::UnknownAugmentedId { id: aug_id })
    }

    /// Augmented-variant ids of an original id, in insertion order.
    ///
    /// An id with no augmentations (or an unknown id) yields an empty
    /// slice; that is tolerated, not an error.
    #[must_use]
    pub fn augmented_of(&self, original_id: usize) -> &[usize] {
        self.map.get(&original_id).map_or(&[], Vec::as_slice)
    }

    /// True if `id` is an augmented id. O(1).
    #[must_use]
    pub fn is_augmented(&self, id: usize) -> bool {
        self.inverse.contains_key(&id)
    }

    /// True if `id` is an original id (a key of the mapping).
    #[must_use]
    pub fn is_original(&self, id: usize) -> bool {
        self.map.contains_key(&id)
    }

    /// Iterates original ids in ascending order.
    pub fn originals(&self) -> impl Iterator<Item = usize> + '_ {
        self.map.keys().copied()
    }

    /// Iterates `(original, variants)` pairs in ascending original order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.map.iter().map(|(&k, v)| (k, v.as_slice()))
    }

    /// Every augmented id across all families, sorted ascending.
    #[must_use]
    pub fn flattened_augmented(&self) -> &[usize] {
        &self.flattened
    }

    /// Largest id the index mentions, original or augmented.
    ///
    /// `None` for an empty index. Useful to check an index against the
    /// dataset it is supposed to describe.
    #[must_use]
    pub fn max_id(&self) -> Option<usize> {
        let max_origin = self.map.keys().next_back().copied();
        let max_aug = self.flattened.last().copied();
        max_origin.max(max_aug)
    }

    /// Number of original ids.
    #[must_use]
    pub fn n_originals(&self) -> usize {
        self.map.len()
    }

    /// Number of augmented ids.
    #[must_use]
    pub fn n_augmented(&self) -> usize {
        self.inverse.len()
    }

    /// True if the index maps nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Serializes as the JSON interchange object: string keys, integer-array
/// values.
impl Serialize for AugmentationIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let raw: BTreeMap<String, &Vec<usize>> =
            self.map.iter().map(|(k, v)| (k.to_string(), v)).collect();
        raw.serialize(serializer)
    }
}

/// Deserializes from the interchange object, parsing string keys back to
/// integer ids and re-validating the partition invariant.
impl<'de> Deserialize<'de> for AugmentationIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw: BTreeMap<String, Vec<usize>> = BTreeMap::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for (key, variants) in raw {
            let origin: usize = key.parse().map_err(|_| {
                D::Error::custom(format!(
                    "augmentation map key '{key}' is not a non-negative integer"
                ))
            })?;
            map.insert(origin, variants);
        }
        Self::from_map(map).map_err(D::Error::custom)
    }
}


#[cfg(test)]
#[path = "tests_contract.rs"]
mod tests_contract;
