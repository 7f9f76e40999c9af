//! Exact additive feature attributions for tree ensembles.
//!
//! Implements the polynomial-time algorithm from Lundberg et al. (2020):
//! "From local explanations to global understanding with explainable AI for
//! trees". Attributions are computed in margin space; together with the
//! cover-weighted expected value they sum exactly to the predicted margin.

mod path;
mod tree_explainer;
mod values;

pub use tree_explainer::TreeExplainer;
pub use values::ShapValues;

pub(crate) use path::PathState;
