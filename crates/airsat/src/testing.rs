//! Shared builders for tests.
//!
//! Small hand-built trees and classifiers with known predictions, used by
//! unit and integration tests.

use crate::model::{Classifier, ModelMeta, OutputTransform};
use crate::trees::{Forest, Tree};

/// A single split on `feature` at `threshold`: left leaf `left_value`,
/// right leaf `right_value`. Missing values go left.
pub fn stump(feature: u32, threshold: f32, left_value: f32, right_value: f32) -> Tree {
    Tree::new(
        vec![feature, 0, 0],
        vec![threshold, 0.0, 0.0],
        vec![1, 0, 0],
        vec![2, 0, 0],
        vec![true, true, true],
        vec![false, true, true],
        vec![0.0, left_value, right_value],
    )
}

/// A [`stump`] with cover statistics `[root, left, right]` attached.
pub fn stump_with_covers(
    feature: u32,
    threshold: f32,
    left_value: f32,
    right_value: f32,
    covers: [f32; 3],
) -> Tree {
    stump(feature, threshold, left_value, right_value).with_covers(covers.to_vec())
}

/// Assembles a sigmoid binary classifier over `trees` with the standard
/// satisfaction labels.
pub fn binary_classifier(
    trees: Vec<Tree>,
    base_score: f32,
    feature_names: &[&str],
) -> Classifier {
    let mut forest = Forest::new().with_base_score(base_score);
    for tree in trees {
        forest.push_tree(tree);
    }
    let meta = ModelMeta::new(
        "test-model",
        feature_names.iter().map(|s| s.to_string()).collect(),
        vec!["Not Satisfied".into(), "Satisfied".into()],
    );
    Classifier::new(forest, meta, OutputTransform::Sigmoid)
}
