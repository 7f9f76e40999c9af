//! Output transformation for inference.
//!
//! The [`OutputTransform`] enum defines how raw margins are converted to
//! final scores. It is derived from the artifact's objective at load time so
//! that prediction does not need to know how the model was trained.

/// Inference-time output transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputTransform {
    /// No transformation; output = margin.
    #[default]
    Identity,

    /// Logistic sigmoid: output = 1 / (1 + exp(-margin)).
    /// Used for binary classification.
    Sigmoid,
}

impl OutputTransform {
    /// Transforms a single margin.
    ///
    /// # Numerical Stability
    ///
    /// Sigmoid clamps input to [-500, 500] to avoid overflow. NaN inputs
    /// propagate through without panics.
    #[inline]
    pub fn apply(&self, margin: f32) -> f32 {
        match self {
            OutputTransform::Identity => margin,
            OutputTransform::Sigmoid => sigmoid(margin),
        }
    }

    /// Transforms a margin buffer in place.
    #[inline]
    pub fn transform_inplace(&self, predictions: &mut [f32]) {
        match self {
            OutputTransform::Identity => {
                // No-op
            }
            OutputTransform::Sigmoid => {
                for x in predictions.iter_mut() {
                    *x = sigmoid(*x);
                }
            }
        }
    }
}

/// Numerically stable sigmoid.
/// Clamps input to [-500, 500] to prevent overflow.
#[inline]
fn sigmoid(x: f32) -> f32 {
    let clamped = x.clamp(-500.0, 500.0);
    if clamped >= 0.0 {
        1.0 / (1.0 + (-clamped).exp())
    } else {
        let e = clamped.exp();
        e / (1.0 + e)
    }
}
