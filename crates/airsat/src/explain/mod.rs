//! Local explanations for classifier predictions.
//!
//! # Overview
//!
//! Two complementary views of a single prediction:
//!
//! - [`TreeExplainer`] computes exact additive feature attributions for the
//!   raw margin; contributions plus the expected value reconstruct the
//!   prediction.
//! - [`LimeExplainer`] fits a weighted linear surrogate to the model's
//!   probability surface in a neighborhood sampled around the input.

pub mod lime;
pub mod shap;

pub use lime::{LimeConfig, LimeExplainer, LimeExplanation};
pub use shap::{ShapValues, TreeExplainer};

use thiserror::Error;

/// Errors from constructing or running an explainer.
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("{0}")]
    MissingNodeStats(&'static str),

    #[error("sample has {got} features, model expects {expected}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("surrogate system is singular; use more samples or stronger regularization")]
    SurrogateSingular,
}
