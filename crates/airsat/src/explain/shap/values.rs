//! Attribution values container.

/// Per-feature attributions for a single prediction.
///
/// Layout is `[n_features + 1]` with the expected value (base) stored at
/// index `n_features`. Attributions are in margin space: base plus the sum
/// of all feature values reconstructs the predicted margin.
#[derive(Clone, Debug)]
pub struct ShapValues {
    /// Flat storage: feature attributions, then the base value.
    values: Vec<f64>,
    n_features: usize,
}

impl ShapValues {
    /// Creates a container initialized to zeros.
    pub fn zeros(n_features: usize) -> Self {
        Self {
            values: vec![0.0; n_features + 1],
            n_features,
        }
    }

    /// Number of features (not including the base value).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Attribution for one feature.
    #[inline]
    pub fn value(&self, feature: usize) -> f64 {
        debug_assert!(feature < self.n_features);
        self.values[feature]
    }

    /// Adds to one feature's attribution.
    #[inline]
    pub fn add(&mut self, feature: usize, delta: f64) {
        debug_assert!(feature < self.n_features);
        self.values[feature] += delta;
    }

    /// The expected value of the model output.
    #[inline]
    pub fn base_value(&self) -> f64 {
        self.values[self.n_features]
    }

    /// Sets the expected value.
    #[inline]
    pub fn set_base_value(&mut self, value: f64) {
        self.values[self.n_features] = value;
    }

    /// Feature attributions only, excluding the base value.
    pub fn feature_values(&self) -> &[f64] {
        &self.values[..self.n_features]
    }

    /// Base value plus all feature attributions.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Checks the additivity property: base + attributions ≈ prediction.
    pub fn verify(&self, prediction: f64, tolerance: f64) -> bool {
        (self.sum() - prediction).abs() <= tolerance
    }

    /// Feature indices ordered by decreasing attribution magnitude.
    pub fn ranked_features(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.n_features).collect();
        order.sort_by(|&a, &b| {
            self.values[b]
                .abs()
                .total_cmp(&self.values[a].abs())
                .then(a.cmp(&b))
        });
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_layout() {
        let shap = ShapValues::zeros(5);
        assert_eq!(shap.n_features(), 5);
        assert_eq!(shap.feature_values().len(), 5);
        assert_eq!(shap.sum(), 0.0);
    }

    #[test]
    fn add_accumulates() {
        let mut shap = ShapValues::zeros(2);
        shap.add(0, 1.5);
        shap.add(0, 2.5);
        assert_eq!(shap.value(0), 4.0);
        assert_eq!(shap.value(1), 0.0);
    }

    #[test]
    fn base_value_is_separate_slot() {
        let mut shap = ShapValues::zeros(3);
        shap.set_base_value(0.5);
        assert_eq!(shap.base_value(), 0.5);
        assert_eq!(shap.feature_values(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn verify_checks_additivity() {
        let mut shap = ShapValues::zeros(2);
        shap.add(0, 1.0);
        shap.add(1, 2.0);
        shap.set_base_value(0.5);

        assert!(shap.verify(3.5, 1e-10));
        assert!(!shap.verify(5.0, 1e-10));
    }

    #[test]
    fn ranked_features_by_magnitude() {
        let mut shap = ShapValues::zeros(3);
        shap.add(0, 0.1);
        shap.add(1, -2.0);
        shap.add(2, 1.5);
        assert_eq!(shap.ranked_features(), vec![1, 2, 0]);
    }
}
