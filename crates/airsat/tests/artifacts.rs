//! Tests over the model artifacts shipped in assets/.

use std::path::{Path, PathBuf};

use airsat::explain::{ExplainError, TreeExplainer};
use airsat::model::{ArtifactError, from_json_str, load_classifier};
use approx::assert_relative_eq;
use serde_json::Value;

fn asset(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets").join(rel)
}

fn load_boosted_value() -> Value {
    let bytes = std::fs::read(asset("models/boosted.json")).expect("read artifact");
    serde_json::from_slice(&bytes).expect("parse artifact json")
}

fn parse_err(v: Value) -> ArtifactError {
    let json = serde_json::to_string(&v).expect("serialize mutated json");
    from_json_str(&json).expect_err("expected error")
}

/// The shell's default inputs in model order: all ratings 3, age 18,
/// distance 100, business traveller, loyal, economy class.
const DEFAULT_RECORD: [f32; 10] = [3.0, 3.0, 3.0, 3.0, 3.0, 18.0, 100.0, 1.0, 1.0, 1.0];

#[test]
fn boosted_artifact_loads_and_scores_the_default_record() {
    let clf = load_classifier(asset("models/boosted.json")).expect("load boosted");
    assert_eq!(clf.meta().name, "flight-boosted");
    assert_eq!(clf.forest().n_trees(), 8);
    assert_eq!(clf.meta().feature_names.len(), 10);
    assert_eq!(clf.meta().positive_label(), "Satisfied");

    assert_relative_eq!(clf.predict_margin(&DEFAULT_RECORD), -0.52, epsilon = 1e-5);
    assert_eq!(clf.predict_label(&DEFAULT_RECORD), "Not Satisfied");
}

#[test]
fn boosted_artifact_rewards_high_ratings() {
    let clf = load_classifier(asset("models/boosted.json")).expect("load boosted");
    // All ratings maxed, short business-class trip.
    let record = [5.0, 5.0, 5.0, 5.0, 5.0, 18.0, 100.0, 1.0, 1.0, 0.0];
    assert_relative_eq!(clf.predict_margin(&record), 1.97, epsilon = 1e-5);
    assert_eq!(clf.predict_label(&record), "Satisfied");
}

#[test]
fn tree_artifact_loads_and_scores_the_default_record() {
    let clf = load_classifier(asset("models/tree.json")).expect("load tree");
    assert_eq!(clf.meta().name, "flight-tree");
    assert_eq!(clf.forest().n_trees(), 1);
    assert_eq!(clf.forest().max_depth(), 3);

    assert_relative_eq!(clf.predict_margin(&DEFAULT_RECORD), -0.5, epsilon = 1e-6);
    assert_eq!(clf.predict_label(&DEFAULT_RECORD), "Not Satisfied");
}

#[test]
fn artifacts_agree_on_features_and_classes() {
    let boosted = load_classifier(asset("models/boosted.json")).expect("load boosted");
    let tree = load_classifier(asset("models/tree.json")).expect("load tree");
    assert_eq!(boosted.meta().feature_names, tree.meta().feature_names);
    assert_eq!(boosted.meta().class_names, tree.meta().class_names);
}

#[test]
fn shipped_covers_support_additive_attribution() {
    let records = [
        DEFAULT_RECORD,
        [5.0, 5.0, 5.0, 5.0, 5.0, 18.0, 100.0, 1.0, 1.0, 0.0],
        [1.0, 1.0, 1.0, 1.0, 1.0, 60.0, 3000.0, 0.0, 0.0, 2.0],
        [2.0, 4.0, 3.0, 5.0, 1.0, 33.0, 900.0, 0.0, 1.0, 3.0],
    ];
    for name in ["models/boosted.json", "models/tree.json"] {
        let clf = load_classifier(asset(name)).expect("load artifact");
        let explainer = TreeExplainer::new(clf.forest()).expect("covers present");
        for record in records {
            let sample = ndarray::arr1(&record);
            let shap = explainer.shap_values(sample.view());
            let margin = f64::from(clf.predict_margin(&record));
            assert!(
                shap.verify(margin, 1e-4),
                "additivity failed for {name}: sum {} vs margin {margin}",
                shap.sum()
            );
        }
    }
}

#[test]
fn rejects_future_format_version() {
    let mut v = load_boosted_value();
    v["format_version"] = Value::from(99u32);
    let err = parse_err(v);
    assert!(
        matches!(err, ArtifactError::UnsupportedVersion { found: 99, .. }),
        "got: {err:?}"
    );
}

#[test]
fn rejects_unknown_objective() {
    let mut v = load_boosted_value();
    v["objective"] = Value::from("multi_softmax");
    let err = parse_err(v);
    assert!(matches!(err, ArtifactError::UnknownObjective { .. }), "got: {err:?}");
}

#[test]
fn rejects_mismatched_array_lengths() {
    let mut v = load_boosted_value();
    let thresholds = v
        .pointer_mut("/trees/0/split_thresholds")
        .and_then(|x| x.as_array_mut())
        .expect("split_thresholds array");
    thresholds.pop();

    let err = parse_err(v);
    assert!(
        matches!(err, ArtifactError::ArrayLenMismatch { field: "split_thresholds", .. }),
        "got: {err:?}"
    );
}

#[test]
fn rejects_out_of_bounds_child_index() {
    let mut v = load_boosted_value();
    let children = v
        .pointer_mut("/trees/0/left_children")
        .and_then(|x| x.as_array_mut())
        .expect("left_children array");
    children[0] = Value::from(9_999u32);

    let err = parse_err(v);
    assert!(matches!(err, ArtifactError::Structure(_)), "got: {err:?}");
}

#[test]
fn rejects_out_of_range_split_feature() {
    let mut v = load_boosted_value();
    let splits = v
        .pointer_mut("/trees/0/split_indices")
        .and_then(|x| x.as_array_mut())
        .expect("split_indices array");
    splits[0] = Value::from(10u32);

    let err = parse_err(v);
    assert!(
        matches!(err, ArtifactError::FeatureOutOfRange { feature: 10, .. }),
        "got: {err:?}"
    );
}

#[test]
fn artifact_without_covers_loads_but_cannot_explain() {
    let mut v = load_boosted_value();
    for tree in v["trees"].as_array_mut().expect("trees array") {
        tree.as_object_mut().expect("tree object").remove("covers");
    }

    let json = serde_json::to_string(&v).expect("serialize mutated json");
    let clf = from_json_str(&json).expect("covers are optional");
    assert_relative_eq!(clf.predict_margin(&DEFAULT_RECORD), -0.52, epsilon = 1e-5);

    let err = TreeExplainer::new(clf.forest()).expect_err("no node statistics");
    assert!(matches!(err, ExplainError::MissingNodeStats(_)), "got: {err:?}");
}
