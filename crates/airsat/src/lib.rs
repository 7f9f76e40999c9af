//! airsat: flight-satisfaction prediction demo with explainable tree models.
//!
//! An interactive terminal application: the user enters flight-experience
//! ratings, picks one of two pretrained binary classifiers, and gets a
//! Satisfied / Not Satisfied prediction together with two local
//! explanations (additive per-feature contributions and a local surrogate
//! model fitted around the input).
//!
//! # Key Types
//!
//! - [`Table`] / [`Codebook`] - Tabular data and categorical encoding
//! - [`Pipeline`] / [`Fitted`] - Fit-once preprocessing into feature matrices
//! - [`Classifier`] - Tree-ensemble binary classifier loaded from an artifact
//! - [`TreeExplainer`] / [`LimeExplainer`] - Per-prediction explanations
//! - [`Session`] - Load-once application state and the request boundary
//!
//! # Data Flow
//!
//! reference CSV -> codebook fit -> pipeline fit; then per request:
//! input record -> codebook apply -> transform -> predict -> explain -> render.

pub mod app;
pub mod data;
pub mod explain;
pub mod model;
pub mod pipeline;
pub mod testing;
pub mod trees;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Tabular data and encoding
pub use data::{Codebook, ColumnValues, DataError, Table, encode_categorical};

// Preprocessing
pub use pipeline::{FeatureKind, FeatureStats, Fitted, Pipeline, PipelineError};

// Model types
pub use model::{ArtifactError, Classifier, ModelMeta, OutputTransform};

// Explanations
pub use explain::{ExplainError, LimeConfig, LimeExplainer, ShapValues, TreeExplainer};

// Application layer
pub use app::{Session, SessionConfig};
