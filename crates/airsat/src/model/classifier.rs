//! Binary classifier over a tree ensemble.

use ndarray::ArrayView2;

use crate::trees::{Forest, SampleRow};

use super::{ModelMeta, OutputTransform};

/// A loaded binary classifier: forest, output transform, and metadata.
///
/// The forest produces a raw margin for the positive class; the transform
/// maps it to a probability. Labels come from `meta.class_names`, with the
/// positive class at index 1.
#[derive(Debug, Clone)]
pub struct Classifier {
    forest: Forest,
    meta: ModelMeta,
    transform: OutputTransform,
}

impl Classifier {
    /// Assembles a classifier from its parts.
    pub fn new(forest: Forest, meta: ModelMeta, transform: OutputTransform) -> Self {
        Self {
            forest,
            meta,
            transform,
        }
    }

    /// The underlying forest.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Model metadata.
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// The margin-to-score transform.
    pub fn transform(&self) -> OutputTransform {
        self.transform
    }

    /// Raw margin for a single sample.
    pub fn predict_margin<S: SampleRow>(&self, sample: &S) -> f32 {
        self.forest.predict_row(sample)
    }

    /// Positive-class probability for a single sample.
    pub fn predict_proba<S: SampleRow>(&self, sample: &S) -> f32 {
        self.transform.apply(self.predict_margin(sample))
    }

    /// Class label for a single sample.
    ///
    /// A tie at exactly 0.5 resolves to the negative class.
    pub fn predict_label<S: SampleRow>(&self, sample: &S) -> &str {
        if self.predict_proba(sample) > 0.5 {
            self.meta.positive_label()
        } else {
            self.meta.negative_label()
        }
    }

    /// Positive-class probabilities for a feature-major
    /// `[n_features, n_samples]` batch.
    pub fn predict_batch(&self, features: ArrayView2<f32>) -> Vec<f32> {
        let mut output = vec![0.0; features.ncols()];
        self.forest.predict_into(features, &mut output);
        self.transform.transform_inplace(&mut output);
        output
    }
}
