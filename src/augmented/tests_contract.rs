//! Contract tests for the augmentation-aware strategy layer.
//!
//! Each test pins one externally observable guarantee of the index or of a
//! strategy variant, using deterministic stub base strategies so failures
//! point at the index bookkeeping rather than at ranking noise.

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;

use super::*;
use crate::error::{IndagarError, Result};
use crate::pool::{Classifier, Dataset, IdSpace};
use crate::strategy::tests::FixedClassifier;
use crate::strategy::{ConfidenceStrategy, QueryStrategy};

/// Deterministic stub: returns the lowest-numbered candidates first.
struct LowestFirst;

impl QueryStrategy for LowestFirst {
    fn query(
        &mut self,
        _clf: &dyn Classifier,
        _dataset: &dyn Dataset,
        unlabeled: &[usize],
        _labeled: &[usize],
        _y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>> {
        let mut pool = unlabeled.to_vec();
        pool.sort_unstable();
        pool.truncate(n.min(pool.len()));
        Ok(pool)
    }
}

/// Deterministic stub: returns the highest-numbered candidates first,
/// which steers selection toward augmented ids in the test layouts.
struct HighestFirst;

impl QueryStrategy for HighestFirst {
    fn query(
        &mut self,
        _clf: &dyn Classifier,
        _dataset: &dyn Dataset,
        unlabeled: &[usize],
        _labeled: &[usize],
        _y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>> {
        let mut pool = unlabeled.to_vec();
        pool.sort_unstable_by(|a, b| b.cmp(a));
        pool.truncate(n.min(pool.len()));
        Ok(pool)
    }
}

/// Stub that violates the selection contract by returning nothing.
struct ReturnsNothing;

impl QueryStrategy for ReturnsNothing {
    fn query(
        &mut self,
        _clf: &dyn Classifier,
        _dataset: &dyn Dataset,
        _unlabeled: &[usize],
        _labeled: &[usize],
        _y: &[usize],
        _n: usize,
    ) -> Result<Vec<usize>> {
        Ok(Vec::new())
    }
}

/// Stub that reads labels through the labeled ids, so it only passes when
/// `y` stays indexed by sample id after a wrapper narrows `labeled`.
struct LabelReader {
    expected: Vec<(usize, usize)>,
}

impl QueryStrategy for LabelReader {
    fn query(
        &mut self,
        _clf: &dyn Classifier,
        _dataset: &dyn Dataset,
        unlabeled: &[usize],
        labeled: &[usize],
        y: &[usize],
        n: usize,
    ) -> Result<Vec<usize>> {
        for &(id, label) in &self.expected {
            assert!(labeled.contains(&id), "labeled id {id} missing");
            assert_eq!(y[id], label, "label lookup by id {id} broken");
        }
        let mut pool = unlabeled.to_vec();
        pool.sort_unstable();
        pool.truncate(n.min(pool.len()));
        Ok(pool)
    }
}

/// Confidence stub with a fixed per-id score vector.
struct FixedConfidence {
    conf: Vec<f32>,
    lower: bool,
}

impl ConfidenceStrategy for FixedConfidence {
    fn confidence(
        &self,
        _clf: &dyn Classifier,
        _dataset: &dyn Dataset,
        _unlabeled: &[usize],
        _labeled: &[usize],
        _y: &[usize],
    ) -> Vec<f32> {
        self.conf.clone()
    }

    fn lower_is_better(&self) -> bool {
        self.lower
    }
}

impl QueryStrategy for FixedConfidence {
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
        Ok(crate::strategy::rank_worst(
            &conf,
            unlabeled,
            n,
            self.lower_is_better(),
        ))
    }
}

fn two_family_index() -> AugmentationIndex {
    AugmentationIndex::from_map(BTreeMap::from([(0, vec![10, 11]), (1, vec![12, 13])]))
        .expect("valid two-family map")
}

fn uniform_classifier(n: usize) -> FixedClassifier {
    FixedClassifier::from_rows(&vec![vec![0.5, 0.5]; n])
}

// P1: partition invariant over the derived views.
#[test]
fn contract_partition_families_disjoint() {
    let index = AugmentationIndex::contiguous(5, 3);
    let originals: Vec<usize> = index.originals().collect();
    for &a in &originals {
        for &b in &originals {
            if a == b {
                continue;
            }
            let fam_a: HashSet<usize> = index.augmented_of(a).iter().copied().collect();
            let fam_b: HashSet<usize> = index.augmented_of(b).iter().copied().collect();
            assert!(
                fam_a.is_disjoint(&fam_b),
                "families of {a} and {b} overlap"
            );
        }
    }
    for &aug in index.flattened_augmented() {
        assert!(
            !index.is_original(aug),
            "augmented id {aug} is also an original id"
        );
    }
}

// P2: OutcomeExtension sizing with uniform family size k.
#[test]
fn contract_outcome_extension_sizing() {
    let k = 2;
    let index = AugmentationIndex::contiguous(4, k);
    let clf = uniform_classifier(12);
    let ds = IdSpace::new(12);
    let unlabeled: Vec<usize> = (0..12).collect();

    let n = 2;
    let mut strategy = OutcomeExtension::new(Box::new(LowestFirst), index.clone());
    let result = strategy.query(&clf, &ds, &unlabeled, &[], &[], n).unwrap();
    assert_eq!(
        result.len(),
        n * (1 + k),
        "expected n*(1+k) ids, got {result:?}"
    );

    let originals: Vec<usize> = result
        .iter()
        .copied()
        .filter(|&id| index.is_original(id))
        .collect();
    assert_eq!(originals.len(), n, "exactly n originals expected");
    for &o in &originals {
        for &aug in index.augmented_of(o) {
            assert!(result.contains(&aug), "family of {o} incomplete in result");
        }
    }
}

// Scenario from the two-family layout: the stub restricted to {0, 1}
// picks 0, so the answer is 0 plus its family.
#[test]
fn contract_outcome_extension_scenario() {
    let clf = uniform_classifier(14);
    let ds = IdSpace::new(14);
    let mut strategy = OutcomeExtension::new(Box::new(LowestFirst), two_family_index());
    let result = strategy
        .query(&clf, &ds, &[0, 1, 10, 11, 12, 13], &[], &[], 1)
        .unwrap();
    assert_eq!(result, vec![0, 10, 11]);
}

// `y` is indexed by sample id, so the wrapper may drop augmented ids from
// `labeled` but must pass `y` through unsliced.
#[test]
fn contract_outcome_extension_keeps_labels_dataset_aligned() {
    let index = two_family_index();
    let clf = uniform_classifier(14);
    let ds = IdSpace::new(14);
    let mut y = vec![0usize; 14];
    y[1] = 7;

    let base = LabelReader {
        expected: vec![(1, 7)],
    };
    let mut strategy = OutcomeExtension::new(Box::new(base), index);
    // Original 1 and its variant 12 are labeled; the base must still see
    // label 7 at y[1] after 12 is filtered out of `labeled`.
    let picked = strategy
        .query(&clf, &ds, &[0, 10, 11], &[1, 12], &y, 1)
        .unwrap();
    assert_eq!(picked, vec![0, 10, 11]);
}

// P3: SearchSpaceExtension always returns exactly n original ids.
#[test]
fn contract_search_space_extension_quota() {
    let index = two_family_index();
    let clf = uniform_classifier(14);
    let ds = IdSpace::new(14);
    let unlabeled = [0, 1, 10, 11, 12, 13];

    // HighestFirst surfaces augmented ids first, so the loop has to resolve
    // them back to originals across several rounds.
    let mut strategy = SearchSpaceExtension::new(Box::new(HighestFirst), index.clone());
    let result = strategy.query(&clf, &ds, &unlabeled, &[], &[], 2).unwrap();

    assert_eq!(result.len(), 2, "quota must be met exactly");
    for &id in &result {
        assert!(
            !index.is_augmented(id),
            "augmented id {id} leaked into the outcome"
        );
    }
    let unique: HashSet<usize> = result.iter().copied().collect();
    assert_eq!(unique.len(), 2, "no duplicate originals");
}

// P4: SearchSpaceExtensionAndOutcome restricted to originals equals
// SearchSpaceExtension under the same inputs and base strategy.
#[test]
fn contract_extension_and_outcome_superset() {
    let index = two_family_index();
    let clf = uniform_classifier(14);
    let ds = IdSpace::new(14);
    let unlabeled = [0, 1, 10, 11, 12, 13];

    let mut search_only = SearchSpaceExtension::new(Box::new(HighestFirst), index.clone());
    let originals_only = search_only.query(&clf, &ds, &unlabeled, &[], &[], 2).unwrap();

    let mut combined = SearchSpaceExtensionAndOutcome::new(Box::new(HighestFirst), index.clone());
    let with_augmented = combined.query(&clf, &ds, &unlabeled, &[], &[], 2).unwrap();

    let restricted: Vec<usize> = with_augmented
        .iter()
        .copied()
        .filter(|&id| !index.is_augmented(id))
        .collect();
    assert_eq!(restricted, originals_only);

    // The collected families ride along after the originals.
    assert!(with_augmented.len() > originals_only.len());
    for &id in &with_augmented[restricted.len()..] {
        assert!(index.is_augmented(id));
    }
}

// P5: family-mean confidence and worst-value forcing.
#[test]
fn contract_average_across_augmented_confidence() {
    let index = AugmentationIndex::from_map(BTreeMap::from([(0, vec![1, 2])])).unwrap();
    let base = FixedConfidence {
        conf: vec![0.4, 0.2, 0.6],
        lower: false,
    };
    let strategy = AverageAcrossAugmented::new(Box::new(base), index);

    let clf = uniform_classifier(3);
    let ds = IdSpace::new(3);
    let conf = strategy.confidence(&clf, &ds, &[0, 1, 2], &[], &[]);

    assert!((conf[0] - 0.4).abs() < 1e-6, "mean(0.4, 0.2, 0.6) = 0.4");
    assert_eq!(conf[1], 0.0, "sibling forced to worst value");
    assert_eq!(conf[2], 0.0, "sibling forced to worst value");
    assert!(!strategy.lower_is_better());
}

#[test]
fn contract_average_across_augmented_never_ranks_siblings_first() {
    let index = AugmentationIndex::from_map(BTreeMap::from([(0, vec![1, 2])])).unwrap();
    // Siblings carry extreme raw scores on a higher-is-better scale.
    let base = FixedConfidence {
        conf: vec![0.1, 0.99, 0.95, 0.5],
        lower: false,
    };
    let mut strategy = AverageAcrossAugmented::new(Box::new(base), index);

    let clf = uniform_classifier(4);
    let ds = IdSpace::new(4);
    let picked = strategy.query(&clf, &ds, &[0, 1, 2, 3], &[], &[], 2).unwrap();
    // Family mean for 0 is (0.1+0.99+0.95)/3 = 0.68, above the lone 0.5.
    assert_eq!(picked, vec![0, 3]);
}

#[test]
fn contract_average_worst_value_on_lower_scale() {
    let index = AugmentationIndex::from_map(BTreeMap::from([(0, vec![1])])).unwrap();
    let base = FixedConfidence {
        conf: vec![0.4, 0.2],
        lower: true,
    };
    let strategy = AverageAcrossAugmented::new(Box::new(base), index);

    let clf = uniform_classifier(2);
    let ds = IdSpace::new(2);
    let conf = strategy.confidence(&clf, &ds, &[0, 1], &[], &[]);
    assert!((conf[0] - 0.3).abs() < 1e-6);
    assert_eq!(conf[1], 1.0, "worst value is 1.0 when lower is better");
}

// P6: the termination guard replaces the original unbounded loop.
#[test]
fn contract_pool_exhausted_instead_of_spinning() {
    let index = AugmentationIndex::from_map(BTreeMap::new()).unwrap();
    let clf = uniform_classifier(3);
    let ds = IdSpace::new(3);
    let mut strategy = SearchSpaceExtension::new(Box::new(LowestFirst), index);

    let err = strategy.query(&clf, &ds, &[0, 1, 2], &[], &[], 5).unwrap_err();
    match err {
        IndagarError::PoolExhausted {
            requested,
            resolved,
        } => {
            assert_eq!(requested, 5);
            assert_eq!(resolved, 3);
        }
        other => panic!("expected PoolExhausted, got {other:?}"),
    }
}

// Labeled originals never count toward the quota, and their families are
// still swept out of the candidate pool.
#[test]
fn contract_labeled_origin_excluded_from_quota() {
    let index = AugmentationIndex::from_map(BTreeMap::from([(0, vec![10, 11])])).unwrap();
    let clf = uniform_classifier(12);
    let ds = IdSpace::new(12);

    let mut strategy = SearchSpaceExtension::new(Box::new(HighestFirst), index);
    // 0 is already labeled; its variants are still unlabeled and ranked
    // first by the stub.
    let result = strategy
        .query(&clf, &ds, &[1, 2, 10, 11], &[0], &[0], 2)
        .unwrap();
    assert_eq!(result, vec![2, 1]);
}

#[test]
fn contract_fill_loop_rejects_empty_base_answer() {
    let index = two_family_index();
    let clf = uniform_classifier(14);
    let ds = IdSpace::new(14);
    let mut strategy = SearchSpaceExtension::new(Box::new(ReturnsNothing), index);

    let err = strategy
        .query(&clf, &ds, &[0, 1, 10, 11], &[], &[], 1)
        .unwrap_err();
    assert!(matches!(err, IndagarError::SelectionContract { .. }));
}

// AverageAcrossAugmented composes as the base of the extension variants,
// the way the original experiments stacked them.
#[test]
fn contract_average_composes_with_extension() {
    let index = two_family_index();
    let base = FixedConfidence {
        conf: vec![0.9, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.2, 0.2],
        lower: true,
    };
    let averaged = AverageAcrossAugmented::new(Box::new(base), index.clone());
    let mut stacked = SearchSpaceExtensionAndOutcome::new(Box::new(averaged), index.clone());

    let clf = uniform_classifier(14);
    let ds = IdSpace::new(14);
    let result = stacked
        .query(&clf, &ds, &[0, 1, 10, 11, 12, 13], &[], &[], 2)
        .unwrap();

    // Both originals resolved, followed by both full families.
    assert_eq!(result.len(), 6);
    let originals: Vec<usize> = result
        .iter()
        .copied()
        .filter(|&id| index.is_original(id))
        .collect();
    assert_eq!(originals.len(), 2);
}

// P7: construction from the same serialized mapping is idempotent.
#[test]
fn contract_idempotent_construction() {
    let json = r#"{"0": [10, 11], "1": [12, 13], "2": []}"#;
    let a = AugmentationIndex::from_json_str(json).unwrap();
    let b = AugmentationIndex::from_json_str(json).unwrap();

    for origin in a.originals() {
        assert_eq!(a.augmented_of(origin), b.augmented_of(origin));
    }
    for &aug in a.flattened_augmented() {
        assert_eq!(a.origin_of(aug).unwrap(), b.origin_of(aug).unwrap());
    }
    assert_eq!(a.flattened_augmented(), b.flattened_augmented());
}

proptest! {
    // P1 over arbitrary family sizes: sequentially allocated variant ids
    // always form a valid partition and the derived views agree.
    #[test]
    fn prop_partition_invariant(sizes in prop::collection::vec(0usize..5, 1..20)) {
        let n_originals = sizes.len();
        let mut next = n_originals;
        let mut map = BTreeMap::new();
        for (origin, &size) in sizes.iter().enumerate() {
            let variants: Vec<usize> = (0..size).map(|_| { let v = next; next += 1; v }).collect();
            map.insert(origin, variants);
        }

        let index = AugmentationIndex::from_map(map).expect("sequential layout is valid");
        prop_assert_eq!(index.n_originals(), n_originals);
        prop_assert_eq!(index.n_augmented(), sizes.iter().sum::<usize>());
        for &aug in index.flattened_augmented() {
            let origin = index.origin_of(aug).expect("flattened ids resolve");
            prop_assert!(index.augmented_of(origin).contains(&aug));
            prop_assert!(!index.is_original(aug));
        }
    }

    // P7 through the JSON interchange form.
    #[test]
    fn prop_json_round_trip(sizes in prop::collection::vec(0usize..4, 1..12)) {
        let n_originals = sizes.len();
        let mut next = n_originals;
        let mut map = BTreeMap::new();
        for (origin, &size) in sizes.iter().enumerate() {
            let variants: Vec<usize> = (0..size).map(|_| { let v = next; next += 1; v }).collect();
            map.insert(origin, variants);
        }
        let index = AugmentationIndex::from_map(map).expect("sequential layout is valid");

        let json = index.to_json_string().expect("serializes");
        let reparsed = AugmentationIndex::from_json_str(&json).expect("parses back");
        prop_assert_eq!(reparsed.flattened_augmented(), index.flattened_augmented());
        for origin in index.originals() {
            prop_assert_eq!(reparsed.augmented_of(origin), index.augmented_of(origin));
        }
    }
}
