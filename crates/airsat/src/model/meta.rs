//! Model metadata.

use serde::{Deserialize, Serialize};

/// Metadata carried alongside a loaded classifier.
///
/// `class_names` holds exactly two labels: index 0 is the negative class,
/// index 1 the positive class the model's margin scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Human-readable model name.
    pub name: String,
    /// Number of features the model consumes.
    pub n_features: usize,
    /// Feature names in model order.
    pub feature_names: Vec<String>,
    /// Class labels, negative class first.
    pub class_names: Vec<String>,
}

impl ModelMeta {
    /// Creates metadata for a binary classifier.
    pub fn new(
        name: impl Into<String>,
        feature_names: Vec<String>,
        class_names: Vec<String>,
    ) -> Self {
        debug_assert_eq!(class_names.len(), 2);
        Self {
            name: name.into(),
            n_features: feature_names.len(),
            feature_names,
            class_names,
        }
    }

    /// Label reported when the positive-class probability is below the threshold.
    pub fn negative_label(&self) -> &str {
        &self.class_names[0]
    }

    /// Label reported when the positive-class probability reaches the threshold.
    pub fn positive_label(&self) -> &str {
        &self.class_names[1]
    }
}
