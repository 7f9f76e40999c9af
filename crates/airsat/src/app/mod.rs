//! Interactive application layer.
//!
//! # Overview
//!
//! The shell is a thin loop over three pieces: a [`Session`] holding the
//! loaded models and fitted preprocessing, a command layer that parses and
//! executes one line at a time, and a renderer turning prediction reports
//! into text or JSON. Prediction failures never escape the `predict`
//! command; they are logged and replaced with a support message.

pub mod commands;
pub mod fields;
pub mod render;
pub mod repl;
pub mod session;

pub use fields::{FIELDS, FieldKind, FieldSpec, FlightRecord, InputError};
pub use render::{OutputFormat, Report};
pub use repl::Repl;
pub use session::{ModelChoice, Session, SessionConfig};

use thiserror::Error;

use crate::data::DataError;
use crate::explain::ExplainError;
use crate::model::ArtifactError;
use crate::pipeline::PipelineError;

/// Errors surfaced by the application layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Explain(#[from] ExplainError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    #[error("model '{model}' does not match the input fields")]
    FeatureNames { model: String },

    #[error("{message}. {suggestion}")]
    Usage { message: String, suggestion: String },
}
