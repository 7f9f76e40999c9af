//! Forest of decision trees with a shared base score.

use ndarray::ArrayView2;

use super::{SampleRow, Tree, tree::TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestValidationError {
    InvalidTree {
        tree_idx: usize,
        error: TreeValidationError,
    },
}

/// An additive ensemble of trees producing a single raw margin.
///
/// The margin for a sample is `base_score + Σ leaf values`, one leaf per
/// tree. A forest with a single tree models a plain decision tree.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    trees: Vec<Tree>,
    base_score: f32,
}

impl Forest {
    /// Creates an empty forest with base score 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base score (builder pattern).
    pub fn with_base_score(mut self, base_score: f32) -> Self {
        self.base_score = base_score;
        self
    }

    /// Adds a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Base score added to every margin.
    #[inline]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// A specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    /// Iterates over trees.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Maximum depth over all trees.
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(Tree::max_depth).max().unwrap_or(0)
    }

    /// Raw margin for a single sample.
    pub fn predict_row<S: SampleRow>(&self, sample: &S) -> f32 {
        let mut margin = self.base_score;
        for tree in &self.trees {
            margin += tree.predict_row(sample);
        }
        margin
    }

    /// Raw margins for a feature-major `[n_features, n_samples]` batch,
    /// written into `output`.
    ///
    /// # Panics
    ///
    /// Panics if `output.len() != features.ncols()`.
    pub fn predict_into(&self, features: ArrayView2<f32>, output: &mut [f32]) {
        let n_samples = features.ncols();
        assert_eq!(
            output.len(),
            n_samples,
            "output buffer must have length n_samples"
        );

        output.fill(self.base_score);
        for tree in &self.trees {
            for (j, out) in output.iter_mut().enumerate() {
                *out += tree.predict_row(&features.column(j));
            }
        }
    }

    /// Validates every tree in the forest.
    ///
    /// Intended for untrusted input such as model files.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ForestValidationError::InvalidTree { tree_idx: i, error: e })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn build_stump(threshold: f32, left_val: f32, right_val: f32) -> Tree {
        Tree::new(
            vec![0, 0, 0],
            vec![threshold, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true, true, true],
            vec![false, true, true],
            vec![0.0, left_val, right_val],
        )
    }

    #[test]
    fn empty_forest_predicts_base_score() {
        let forest = Forest::new().with_base_score(0.25);
        assert_eq!(forest.predict_row(&[1.0]), 0.25);
    }

    #[test]
    fn forest_sums_leaves_over_trees() {
        let mut forest = Forest::new().with_base_score(0.5);
        forest.push_tree(build_stump(0.5, 1.0, 2.0));
        forest.push_tree(build_stump(0.5, 0.5, 1.5));

        assert_eq!(forest.predict_row(&[0.3]), 2.0);
        assert_eq!(forest.predict_row(&[0.7]), 4.0);
    }

    #[test]
    fn predict_into_matches_predict_row() {
        let mut forest = Forest::new().with_base_score(0.1);
        forest.push_tree(build_stump(0.5, 1.0, 2.0));
        forest.push_tree(build_stump(0.2, 0.5, 1.0));

        // Feature-major: 1 feature, 3 samples.
        let features = array![[0.3f32, 0.7, 0.1]];
        let mut output = vec![0.0; 3];
        forest.predict_into(features.view(), &mut output);

        for (j, &margin) in output.iter().enumerate() {
            assert_eq!(margin, forest.predict_row(&features.column(j)));
        }
    }

    #[test]
    fn validate_reports_offending_tree() {
        let mut forest = Forest::new();
        forest.push_tree(build_stump(0.5, 1.0, 2.0));
        // Tree with an out-of-bounds child.
        forest.push_tree(Tree::new(
            vec![0, 0],
            vec![0.5, 0.0],
            vec![1, 0],
            vec![7, 0],
            vec![true, true],
            vec![false, true],
            vec![0.0, 1.0],
        ));

        assert!(matches!(
            forest.validate(),
            Err(ForestValidationError::InvalidTree { tree_idx: 1, .. })
        ));
    }

    #[test]
    fn max_depth_over_trees() {
        let mut forest = Forest::new();
        assert_eq!(forest.max_depth(), 0);
        forest.push_tree(build_stump(0.5, 1.0, 2.0));
        assert_eq!(forest.max_depth(), 1);
    }
}
