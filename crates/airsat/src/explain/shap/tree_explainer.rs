//! Tree-ensemble attribution explainer.

use ndarray::ArrayView1;

use crate::explain::ExplainError;
use crate::explain::shap::{PathState, ShapValues};
use crate::trees::{Forest, NodeId, SampleRow, Tree};

/// Exact additive feature attributions for a tree ensemble.
///
/// Attributions are computed against the raw margin. The expected value is
/// the cover-weighted mean leaf value of every tree plus the base score, so
/// `base_value + Σ attributions` reconstructs the predicted margin exactly.
#[derive(Debug)]
pub struct TreeExplainer<'a> {
    forest: &'a Forest,
    base_value: f64,
}

impl<'a> TreeExplainer<'a> {
    /// Creates an explainer over `forest`.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::MissingNodeStats`] if any tree lacks cover
    /// statistics or has a non-positive cover; the subset weighting divides
    /// by covers.
    pub fn new(forest: &'a Forest) -> Result<Self, ExplainError> {
        for tree in forest.trees() {
            let covers = tree.covers().ok_or(ExplainError::MissingNodeStats(
                "cover statistics required for attribution",
            ))?;
            if covers.iter().any(|&c| !c.is_finite() || c <= 0.0) {
                return Err(ExplainError::MissingNodeStats(
                    "cover statistics must be positive",
                ));
            }
        }

        let base_value = compute_base_value(forest);
        Ok(Self { forest, base_value })
    }

    /// The expected margin over the training distribution.
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Computes attributions for a single sample.
    ///
    /// # Panics
    ///
    /// Panics if `sample` is shorter than the largest feature index any
    /// tree splits on; artifact validation guarantees this for loaded
    /// models.
    pub fn shap_values(&self, sample: ArrayView1<f32>) -> ShapValues {
        let mut shap = ShapValues::zeros(sample.len());
        let root_path = PathState::with_capacity(self.forest.max_depth() + 2);

        for tree in self.forest.trees() {
            // Covers were checked at construction.
            if let Some(covers) = tree.covers() {
                tree_shap(
                    tree,
                    covers,
                    &sample,
                    &mut shap,
                    0,
                    &root_path,
                    1.0,
                    1.0,
                    -1,
                );
            }
        }

        shap.set_base_value(self.base_value);
        shap
    }
}

/// Cover-weighted mean leaf value over all trees, plus the base score.
fn compute_base_value(forest: &Forest) -> f64 {
    let mut base = forest.base_score() as f64;
    for tree in forest.trees() {
        let Some(covers) = tree.covers() else {
            continue;
        };
        let mut weighted = 0.0;
        for node in 0..tree.n_nodes() as NodeId {
            if tree.is_leaf(node) {
                weighted += covers[node as usize] as f64 * tree.leaf_value(node) as f64;
            }
        }
        base += weighted / covers[0] as f64;
    }
    base
}

/// One recursion step: extend the path with the parent's split, then either
/// credit the leaf or descend both children.
///
/// The hot child is the one the sample actually follows; the cold child is
/// entered with `one_fraction = 0`. A repeated split on a feature already on
/// the path first unwinds the earlier occurrence and folds its fractions
/// into the incoming ones.
#[allow(clippy::too_many_arguments)]
fn tree_shap<S: SampleRow>(
    tree: &Tree,
    covers: &[f32],
    sample: &S,
    shap: &mut ShapValues,
    node: NodeId,
    parent_path: &PathState,
    zero_fraction: f64,
    one_fraction: f64,
    parent_feature: i32,
) {
    let mut path = parent_path.clone();
    path.extend(parent_feature, zero_fraction, one_fraction);

    if tree.is_leaf(node) {
        let leaf_value = tree.leaf_value(node) as f64;
        for i in 1..path.len() {
            let element = path.element(i);
            if element.feature >= 0 {
                let weight = path.unwound_sum(i);
                shap.add(
                    element.feature as usize,
                    weight * (element.one_fraction - element.zero_fraction) * leaf_value,
                );
            }
        }
        return;
    }

    let feature = tree.split_index(node);
    let left = tree.left_child(node);
    let right = tree.right_child(node);

    let value = sample.feature(feature as usize);
    let go_left = if value.is_nan() {
        tree.default_left(node)
    } else {
        value < tree.split_threshold(node)
    };
    let (hot, cold) = if go_left { (left, right) } else { (right, left) };

    let node_cover = covers[node as usize] as f64;
    let hot_zero_fraction = covers[hot as usize] as f64 / node_cover;
    let cold_zero_fraction = covers[cold as usize] as f64 / node_cover;

    let mut incoming_zero = 1.0;
    let mut incoming_one = 1.0;
    if let Some(existing) = path.find_feature(feature as i32) {
        let element = path.element(existing);
        incoming_zero = element.zero_fraction;
        incoming_one = element.one_fraction;
        path.unwind(existing);
    }

    tree_shap(
        tree,
        covers,
        sample,
        shap,
        hot,
        &path,
        hot_zero_fraction * incoming_zero,
        incoming_one,
        feature as i32,
    );
    tree_shap(
        tree,
        covers,
        sample,
        shap,
        cold,
        &path,
        cold_zero_fraction * incoming_zero,
        0.0,
        feature as i32,
    );
}
