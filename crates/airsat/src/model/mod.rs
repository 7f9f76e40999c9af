//! Classifier assembly, metadata, output transforms, and artifact IO.
//!
//! # Overview
//!
//! A [`Classifier`] bundles a validated [`Forest`](crate::trees::Forest)
//! with its [`ModelMeta`] and [`OutputTransform`]. Classifiers are loaded
//! from versioned JSON artifacts by [`load_classifier`]; every artifact is
//! validated structurally before first use.

mod artifact;
mod classifier;
mod meta;
mod transform;

pub use artifact::{
    ArtifactDoc, ArtifactError, FORMAT_VERSION, TreeDoc, from_json_str, load_classifier,
    save_classifier, to_json_string,
};
pub use classifier::Classifier;
pub use meta::ModelMeta;
pub use transform::OutputTransform;
