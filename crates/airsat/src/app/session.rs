//! Session state: loaded models, fitted preprocessing, and the editable
//! input record.
//!
//! # Overview
//!
//! [`Session::open`] loads both model artifacts, reads the reference
//! dataset, fits the codebook and pipeline statistics once, and holds them
//! for the rest of the session. Every [`Session::predict`] call encodes
//! the current record with those fitted statistics, so repeated
//! predictions see identical codes regardless of what was entered in
//! between.

use std::path::{Path, PathBuf};

use ndarray::ArrayView1;

use crate::app::AppError;
use crate::app::fields::{FIELDS, FlightRecord};
use crate::app::render::{Contribution, OutputFormat, Report, Surrogate, SurrogateWeight};
use crate::data::{Codebook, read_csv};
use crate::explain::{LimeConfig, LimeExplainer, TreeExplainer};
use crate::model::{Classifier, load_classifier};
use crate::pipeline::{Fitted, Pipeline};

// =============================================================================
// Model selection
// =============================================================================

/// Which of the two loaded models scores predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelChoice {
    /// The boosted forest.
    #[default]
    Boosted,
    /// The single deep tree.
    SingleTree,
}

impl ModelChoice {
    /// Short token used in the prompt and the `model` command.
    pub fn label(self) -> &'static str {
        match self {
            ModelChoice::Boosted => "boosted",
            ModelChoice::SingleTree => "tree",
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Paths and tuning for [`Session::open`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Boosted model artifact.
    pub boosted_path: PathBuf,
    /// Single-tree model artifact.
    pub tree_path: PathBuf,
    /// Reference dataset CSV driving codebook and pipeline statistics.
    pub data_path: PathBuf,
    /// Surrogate explainer tuning.
    pub lime: LimeConfig,
    /// Report rendering format.
    pub format: OutputFormat,
}

impl Default for SessionConfig {
    /// Points at the artifacts shipped with the crate.
    fn default() -> Self {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        Self {
            boosted_path: assets.join("models").join("boosted.json"),
            tree_path: assets.join("models").join("tree.json"),
            data_path: assets.join("data").join("flight_sample.csv"),
            lime: LimeConfig::default(),
            format: OutputFormat::Human,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// All state behind the interactive shell.
#[derive(Debug)]
pub struct Session {
    boosted: Classifier,
    single_tree: Classifier,
    codebook: Codebook,
    fitted: Fitted,
    record: FlightRecord,
    active: ModelChoice,
    lime: LimeConfig,
    format: OutputFormat,
}

impl Session {
    /// Loads models and reference data, and fits the preprocessing
    /// statistics once.
    ///
    /// # Errors
    ///
    /// Returns an error if an artifact fails to load or validate, if a
    /// model's feature names do not match the input fields, or if the
    /// reference dataset cannot be read or lacks a feature column.
    pub fn open(config: SessionConfig) -> Result<Self, AppError> {
        let boosted = load_classifier(&config.boosted_path)?;
        let single_tree = load_classifier(&config.tree_path)?;
        check_feature_names(&boosted)?;
        check_feature_names(&single_tree)?;

        let mut reference = read_csv(&config.data_path)?;
        let codebook = Codebook::fit(&reference);
        codebook.apply(&mut reference)?;
        let pipeline = Pipeline::new(boosted.meta().feature_names.clone());
        let fitted = pipeline.fit(&reference, &codebook)?;

        log::info!(
            "session ready: {} reference rows, models '{}' and '{}'",
            reference.n_rows(),
            boosted.meta().name,
            single_tree.meta().name
        );

        Ok(Self {
            boosted,
            single_tree,
            codebook,
            fitted,
            record: FlightRecord::default(),
            active: ModelChoice::default(),
            lime: config.lime,
            format: config.format,
        })
    }

    /// The editable input record.
    pub fn record(&self) -> &FlightRecord {
        &self.record
    }

    /// Mutable access to the input record.
    pub fn record_mut(&mut self) -> &mut FlightRecord {
        &mut self.record
    }

    /// Restores all inputs to their defaults.
    pub fn reset(&mut self) {
        self.record = FlightRecord::default();
    }

    /// The currently selected model.
    pub fn active(&self) -> ModelChoice {
        self.active
    }

    /// Switches the model used by [`Session::predict`].
    pub fn set_active(&mut self, choice: ModelChoice) {
        self.active = choice;
    }

    /// Report rendering format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// The classifier behind the current [`ModelChoice`].
    pub fn classifier(&self) -> &Classifier {
        match self.active {
            ModelChoice::Boosted => &self.boosted,
            ModelChoice::SingleTree => &self.single_tree,
        }
    }

    /// Fitted preprocessing statistics.
    pub fn fitted(&self) -> &Fitted {
        &self.fitted
    }

    /// Encodes the current record with the session's fitted statistics and
    /// scores it with the active model, attaching both explanations.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or either explainer fails; callers at
    /// the command boundary collapse this into a single support message.
    pub fn predict(&self) -> Result<Report, AppError> {
        let mut table = self.record.to_table();
        self.codebook.apply(&mut table)?;
        let features = self.fitted.transform(&table)?;
        let classifier = self.classifier();

        let sample: ArrayView1<f32> = features.column(0);
        let label = classifier.predict_label(&sample).to_string();
        let probability = classifier.predict_proba(&sample);
        let margin = classifier.predict_margin(&sample);

        let shap = TreeExplainer::new(classifier.forest())?.shap_values(features.column(0));
        let lime = LimeExplainer::new(classifier, &self.fitted, self.lime.clone())?
            .explain(features.column(0))?;

        let meta = classifier.meta();
        log::debug!(
            "prediction: model='{}' margin={margin:.4} probability={probability:.4}",
            meta.name
        );

        let contributions = shap
            .ranked_features()
            .into_iter()
            .map(|idx| Contribution {
                feature: meta.feature_names[idx].clone(),
                value: self.record.display_value(idx),
                shap: shap.value(idx),
            })
            .collect();
        let surrogate = Surrogate {
            intercept: lime.intercept,
            local_prediction: lime.local_prediction,
            weights: lime
                .weights
                .into_iter()
                .map(|(idx, weight)| SurrogateWeight {
                    feature: meta.feature_names[idx].clone(),
                    weight,
                })
                .collect(),
        };

        Ok(Report {
            model: meta.name.clone(),
            label,
            probability,
            margin,
            base_value: shap.base_value(),
            contributions,
            surrogate,
        })
    }
}

/// Artifacts must list the input fields, in field order.
fn check_feature_names(classifier: &Classifier) -> Result<(), AppError> {
    let names = &classifier.meta().feature_names;
    let matches = names.len() == FIELDS.len()
        && names
            .iter()
            .zip(FIELDS)
            .all(|(name, field)| name == field.name);
    if !matches {
        return Err(AppError::FeatureNames {
            model: classifier.meta().name.clone(),
        });
    }
    Ok(())
}
