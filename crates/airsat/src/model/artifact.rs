//! Model artifact loading and saving.
//!
//! Artifacts are JSON documents carrying the forest as parallel node arrays
//! plus the metadata needed for inference (objective, feature names, class
//! names). Loading validates the document before any traversal: a version
//! gate, array-shape checks, feature-index bounds, and the structural tree
//! invariants from [`crate::trees`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trees::{Forest, ForestValidationError, Tree};

use super::{Classifier, ModelMeta, OutputTransform};

/// Artifact format version this build reads.
pub const FORMAT_VERSION: u32 = 1;

// =============================================================================
// Errors
// =============================================================================

/// Errors from reading, parsing, or validating a model artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported artifact version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("unknown objective '{objective}'")]
    UnknownObjective { objective: String },

    #[error("expected exactly 2 class names, got {got}")]
    ClassCount { got: usize },

    #[error("feature_names has {got} entries, n_features is {n_features}")]
    FeatureNamesLen { n_features: usize, got: usize },

    #[error("artifact contains no trees")]
    EmptyForest,

    #[error("tree {tree_idx}: '{field}' has {got} entries, expected {expected}")]
    ArrayLenMismatch {
        tree_idx: usize,
        field: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("tree {tree_idx} node {node}: feature {feature} out of range (n_features {n_features})")]
    FeatureOutOfRange {
        tree_idx: usize,
        node: usize,
        feature: u32,
        n_features: usize,
    },

    #[error("invalid tree structure: {0:?}")]
    Structure(ForestValidationError),
}

// =============================================================================
// Document types
// =============================================================================

/// One tree as parallel node arrays, mirroring [`Tree`] storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDoc {
    pub split_indices: Vec<u32>,
    pub split_thresholds: Vec<f32>,
    pub left_children: Vec<u32>,
    pub right_children: Vec<u32>,
    pub default_left: Vec<bool>,
    pub is_leaf: Vec<bool>,
    pub leaf_values: Vec<f32>,
    /// Training sample counts per node. Optional; required only for
    /// attribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covers: Option<Vec<f32>>,
}

/// Top-level artifact document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDoc {
    pub format_version: u32,
    pub name: String,
    pub objective: String,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
    pub base_score: f32,
    pub trees: Vec<TreeDoc>,
}

// =============================================================================
// Loading
// =============================================================================

/// Loads and validates a classifier from a JSON artifact file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, carries
/// an unsupported version, or fails structural validation.
pub fn load_classifier(path: impl AsRef<Path>) -> Result<Classifier, ArtifactError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let classifier = from_json_str(&json)?;
    log::info!(
        "loaded model '{}' from {}: {} trees, max depth {}",
        classifier.meta().name,
        path.display(),
        classifier.forest().n_trees(),
        classifier.forest().max_depth(),
    );
    Ok(classifier)
}

/// Parses and validates a classifier from artifact JSON.
pub fn from_json_str(json: &str) -> Result<Classifier, ArtifactError> {
    let doc: ArtifactDoc = serde_json::from_str(json)?;
    decode(doc)
}

fn decode(doc: ArtifactDoc) -> Result<Classifier, ArtifactError> {
    if doc.format_version != FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: doc.format_version,
            supported: FORMAT_VERSION,
        });
    }
    let transform = match doc.objective.as_str() {
        "binary_logistic" => OutputTransform::Sigmoid,
        _ => {
            return Err(ArtifactError::UnknownObjective {
                objective: doc.objective,
            });
        }
    };
    if doc.class_names.len() != 2 {
        return Err(ArtifactError::ClassCount {
            got: doc.class_names.len(),
        });
    }
    if doc.feature_names.len() != doc.n_features {
        return Err(ArtifactError::FeatureNamesLen {
            n_features: doc.n_features,
            got: doc.feature_names.len(),
        });
    }
    if doc.trees.is_empty() {
        return Err(ArtifactError::EmptyForest);
    }

    let mut forest = Forest::new().with_base_score(doc.base_score);
    for (tree_idx, tree_doc) in doc.trees.into_iter().enumerate() {
        forest.push_tree(decode_tree(tree_idx, tree_doc, doc.n_features)?);
    }
    forest.validate().map_err(ArtifactError::Structure)?;

    let meta = ModelMeta {
        name: doc.name,
        n_features: doc.n_features,
        feature_names: doc.feature_names,
        class_names: doc.class_names,
    };
    Ok(Classifier::new(forest, meta, transform))
}

fn decode_tree(
    tree_idx: usize,
    doc: TreeDoc,
    n_features: usize,
) -> Result<Tree, ArtifactError> {
    let n_nodes = doc.split_indices.len();
    let check = |field: &'static str, got: usize| {
        if got != n_nodes {
            Err(ArtifactError::ArrayLenMismatch {
                tree_idx,
                field,
                got,
                expected: n_nodes,
            })
        } else {
            Ok(())
        }
    };
    check("split_thresholds", doc.split_thresholds.len())?;
    check("left_children", doc.left_children.len())?;
    check("right_children", doc.right_children.len())?;
    check("default_left", doc.default_left.len())?;
    check("is_leaf", doc.is_leaf.len())?;
    check("leaf_values", doc.leaf_values.len())?;
    if let Some(covers) = &doc.covers {
        check("covers", covers.len())?;
    }

    for (node, (&feature, &leaf)) in doc.split_indices.iter().zip(&doc.is_leaf).enumerate() {
        if !leaf && feature as usize >= n_features {
            return Err(ArtifactError::FeatureOutOfRange {
                tree_idx,
                node,
                feature,
                n_features,
            });
        }
    }

    let mut tree = Tree::new(
        doc.split_indices,
        doc.split_thresholds,
        doc.left_children,
        doc.right_children,
        doc.default_left,
        doc.is_leaf,
        doc.leaf_values,
    );
    if let Some(covers) = doc.covers {
        tree = tree.with_covers(covers);
    }
    Ok(tree)
}

// =============================================================================
// Saving
// =============================================================================

/// Serializes a classifier back to artifact JSON.
pub fn to_json_string(classifier: &Classifier) -> Result<String, ArtifactError> {
    Ok(serde_json::to_string_pretty(&encode(classifier))?)
}

/// Writes a classifier to a JSON artifact file.
pub fn save_classifier(
    path: impl AsRef<Path>,
    classifier: &Classifier,
) -> Result<(), ArtifactError> {
    let path = path.as_ref();
    let json = to_json_string(classifier)?;
    fs::write(path, json).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn encode(classifier: &Classifier) -> ArtifactDoc {
    let meta = classifier.meta();
    let trees = classifier
        .forest()
        .trees()
        .map(|tree| {
            let n_nodes = tree.n_nodes();
            let mut doc = TreeDoc {
                split_indices: Vec::with_capacity(n_nodes),
                split_thresholds: Vec::with_capacity(n_nodes),
                left_children: Vec::with_capacity(n_nodes),
                right_children: Vec::with_capacity(n_nodes),
                default_left: Vec::with_capacity(n_nodes),
                is_leaf: Vec::with_capacity(n_nodes),
                leaf_values: Vec::with_capacity(n_nodes),
                covers: tree.covers().map(<[f32]>::to_vec),
            };
            for node in 0..n_nodes as u32 {
                doc.split_indices.push(tree.split_index(node));
                doc.split_thresholds.push(tree.split_threshold(node));
                doc.left_children.push(tree.left_child(node));
                doc.right_children.push(tree.right_child(node));
                doc.default_left.push(tree.default_left(node));
                doc.is_leaf.push(tree.is_leaf(node));
                doc.leaf_values.push(tree.leaf_value(node));
            }
            doc
        })
        .collect();

    ArtifactDoc {
        format_version: FORMAT_VERSION,
        name: meta.name.clone(),
        objective: "binary_logistic".to_string(),
        n_features: meta.n_features,
        feature_names: meta.feature_names.clone(),
        class_names: meta.class_names.clone(),
        base_score: classifier.forest().base_score(),
        trees,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump_doc() -> ArtifactDoc {
        ArtifactDoc {
            format_version: FORMAT_VERSION,
            name: "stump".into(),
            objective: "binary_logistic".into(),
            n_features: 2,
            feature_names: vec!["Age".into(), "Class".into()],
            class_names: vec!["Not Satisfied".into(), "Satisfied".into()],
            base_score: 0.1,
            trees: vec![TreeDoc {
                split_indices: vec![0, 0, 0],
                split_thresholds: vec![30.0, 0.0, 0.0],
                left_children: vec![1, 0, 0],
                right_children: vec![2, 0, 0],
                default_left: vec![true, true, true],
                is_leaf: vec![false, true, true],
                leaf_values: vec![0.0, -0.5, 0.5],
                covers: Some(vec![100.0, 60.0, 40.0]),
            }],
        }
    }

    fn parse(doc: &ArtifactDoc) -> Result<Classifier, ArtifactError> {
        from_json_str(&serde_json::to_string(doc).unwrap())
    }

    #[test]
    fn decodes_valid_artifact() {
        let clf = parse(&stump_doc()).unwrap();
        assert_eq!(clf.meta().name, "stump");
        assert_eq!(clf.forest().n_trees(), 1);
        assert_eq!(clf.transform(), OutputTransform::Sigmoid);
        // margin = base + leaf
        assert_eq!(clf.predict_margin(&[25.0, 0.0]), -0.4);
        assert_eq!(clf.predict_margin(&[35.0, 0.0]), 0.6);
    }

    #[test]
    fn roundtrip_preserves_predictions() {
        let clf = parse(&stump_doc()).unwrap();
        let json = to_json_string(&clf).unwrap();
        let restored = from_json_str(&json).unwrap();

        for sample in [[25.0f32, 0.0], [35.0, 1.0], [f32::NAN, 2.0]] {
            assert_eq!(
                clf.predict_proba(&sample),
                restored.predict_proba(&sample)
            );
        }
        assert_eq!(
            restored.forest().tree(0).covers().unwrap(),
            &[100.0, 60.0, 40.0]
        );
    }

    #[test]
    fn rejects_future_version() {
        let mut doc = stump_doc();
        doc.format_version = FORMAT_VERSION + 1;
        assert!(matches!(
            parse(&doc),
            Err(ArtifactError::UnsupportedVersion { found, .. }) if found == FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn rejects_unknown_objective() {
        let mut doc = stump_doc();
        doc.objective = "multi_softmax".into();
        assert!(matches!(
            parse(&doc),
            Err(ArtifactError::UnknownObjective { .. })
        ));
    }

    #[test]
    fn rejects_wrong_class_count() {
        let mut doc = stump_doc();
        doc.class_names.push("Maybe".into());
        assert!(matches!(parse(&doc), Err(ArtifactError::ClassCount { got: 3 })));
    }

    #[test]
    fn rejects_array_length_mismatch() {
        let mut doc = stump_doc();
        doc.trees[0].leaf_values.pop();
        assert!(matches!(
            parse(&doc),
            Err(ArtifactError::ArrayLenMismatch { field: "leaf_values", got: 2, expected: 3, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_feature() {
        let mut doc = stump_doc();
        doc.trees[0].split_indices[0] = 7;
        assert!(matches!(
            parse(&doc),
            Err(ArtifactError::FeatureOutOfRange { feature: 7, .. })
        ));
    }

    #[test]
    fn rejects_broken_tree_structure() {
        let mut doc = stump_doc();
        // Right child points back at the root.
        doc.trees[0].right_children[0] = 0;
        assert!(matches!(parse(&doc), Err(ArtifactError::Structure(_))));
    }

    #[test]
    fn rejects_empty_forest() {
        let mut doc = stump_doc();
        doc.trees.clear();
        assert!(matches!(parse(&doc), Err(ArtifactError::EmptyForest)));
    }

    #[test]
    fn covers_are_optional() {
        let mut doc = stump_doc();
        doc.trees[0].covers = None;
        let clf = parse(&doc).unwrap();
        assert!(clf.forest().tree(0).covers().is_none());
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            from_json_str("{ not json"),
            Err(ArtifactError::Json(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_classifier("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let clf = parse(&stump_doc()).unwrap();
        save_classifier(&path, &clf).unwrap();
        let restored = load_classifier(&path).unwrap();
        assert_eq!(restored.meta().name, "stump");
        assert_eq!(
            restored.predict_proba(&[25.0f32, 0.0]),
            clf.predict_proba(&[25.0f32, 0.0])
        );
    }
}
