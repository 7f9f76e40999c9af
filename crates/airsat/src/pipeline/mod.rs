//! Fit-once preprocessing from tables to feature matrices.
//!
//! # Overview
//!
//! A [`Pipeline`] names the feature columns a model consumes, in model order.
//! Fitting it on an encoded reference [`Table`] produces a [`Fitted`]
//! transform that captures per-feature statistics (range, mean, spread,
//! median, and code frequencies for encoded columns). Transforming a table
//! yields a feature-major `[n_features, n_samples]` matrix with missing
//! cells imputed by the fitted median.
//!
//! The statistics also drive perturbation sampling for local surrogate
//! explanations, so they are computed for every feature even though
//! imputation only needs the median.
//!
//! # Example
//!
//! ```
//! use airsat::data::{Column, Table, encode_categorical};
//! use airsat::pipeline::Pipeline;
//!
//! let mut reference = Table::new();
//! reference.push_column(Column::numeric("Age", vec![20.0, 30.0, 40.0]))?;
//! reference.push_column(Column::text(
//!     "Class",
//!     vec![Some("Eco".into()), Some("Business".into()), Some("Eco".into())],
//! ))?;
//! let codebook = encode_categorical(&mut reference)?;
//!
//! let pipeline = Pipeline::new(vec!["Age".into(), "Class".into()]);
//! let fitted = pipeline.fit(&reference, &codebook)?;
//! let matrix = fitted.transform(&reference)?;
//! assert_eq!(matrix.shape(), &[2, 3]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use ndarray::Array2;
use thiserror::Error;

use crate::data::{Codebook, Table};

// =============================================================================
// Errors
// =============================================================================

/// Errors from fitting or applying the preprocessing pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("feature column '{name}' not found in table")]
    MissingColumn { name: String },

    #[error("feature column '{name}' is not numeric; encode categoricals first")]
    NotNumeric { name: String },

    #[error("feature column '{name}' has no observed values to fit on")]
    EmptyFeature { name: String },
}

// =============================================================================
// Feature statistics
// =============================================================================

/// How a feature column should be perturbed when sampling around an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Continuous column, sampled uniformly within the observed range.
    Numeric,
    /// Categorical code column, sampled by observed code frequency.
    Encoded,
}

/// Per-feature statistics captured at fit time.
///
/// All statistics ignore missing cells. `codes` is present only for
/// [`FeatureKind::Encoded`] features and holds `(code, relative frequency)`
/// pairs sorted by code.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStats {
    pub min: f32,
    pub max: f32,
    pub mean: f64,
    pub std: f64,
    pub median: f32,
    pub codes: Option<Vec<(f32, f64)>>,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Declares the feature columns a model consumes, in model order.
#[derive(Debug, Clone)]
pub struct Pipeline {
    feature_names: Vec<String>,
}

impl Pipeline {
    /// Creates a pipeline over the given feature columns.
    pub fn new(feature_names: Vec<String>) -> Self {
        Self { feature_names }
    }

    /// Fits per-feature statistics on an encoded reference table.
    ///
    /// Features covered by `codebook` are marked [`FeatureKind::Encoded`];
    /// all others are [`FeatureKind::Numeric`].
    ///
    /// # Errors
    ///
    /// Returns an error if a feature column is missing, still text, or has
    /// no observed values.
    pub fn fit(&self, table: &Table, codebook: &Codebook) -> Result<Fitted, PipelineError> {
        let mut kinds = Vec::with_capacity(self.feature_names.len());
        let mut stats = Vec::with_capacity(self.feature_names.len());

        for name in &self.feature_names {
            let values = feature_values(table, name)?;
            let kind = if codebook.categories(name).is_some() {
                FeatureKind::Encoded
            } else {
                FeatureKind::Numeric
            };
            stats.push(fit_feature(name, values, kind)?);
            kinds.push(kind);
        }

        Ok(Fitted {
            feature_names: self.feature_names.clone(),
            kinds,
            stats,
        })
    }
}

/// A fitted transform from encoded tables to feature matrices.
#[derive(Debug, Clone)]
pub struct Fitted {
    feature_names: Vec<String>,
    kinds: Vec<FeatureKind>,
    stats: Vec<FeatureStats>,
}

impl Fitted {
    /// Feature names in model order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Perturbation kind per feature, in model order.
    pub fn kinds(&self) -> &[FeatureKind] {
        &self.kinds
    }

    /// Fitted statistics per feature, in model order.
    pub fn stats(&self) -> &[FeatureStats] {
        &self.stats
    }

    /// Transforms an encoded table into a feature-major matrix.
    ///
    /// The result has shape `[n_features, n_samples]`. Missing cells are
    /// imputed with the median fitted for that feature.
    ///
    /// # Errors
    ///
    /// Returns an error if a feature column is missing or still text.
    pub fn transform(&self, table: &Table) -> Result<Array2<f32>, PipelineError> {
        let n_samples = table.n_rows();
        let mut matrix = Array2::zeros((self.n_features(), n_samples));

        for (i, name) in self.feature_names.iter().enumerate() {
            let values = feature_values(table, name)?;
            let median = self.stats[i].median;
            for (j, &value) in values.iter().enumerate() {
                matrix[[i, j]] = if value.is_nan() { median } else { value };
            }
        }
        Ok(matrix)
    }
}

fn feature_values<'t>(table: &'t Table, name: &str) -> Result<&'t [f32], PipelineError> {
    let column = table
        .column(name)
        .ok_or_else(|| PipelineError::MissingColumn {
            name: name.to_string(),
        })?;
    column
        .values()
        .as_numeric()
        .ok_or_else(|| PipelineError::NotNumeric {
            name: name.to_string(),
        })
}

fn fit_feature(
    name: &str,
    values: &[f32],
    kind: FeatureKind,
) -> Result<FeatureStats, PipelineError> {
    let mut observed: Vec<f32> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if observed.is_empty() {
        return Err(PipelineError::EmptyFeature {
            name: name.to_string(),
        });
    }
    observed.sort_by(|a, b| a.total_cmp(b));

    let n = observed.len();
    let min = observed[0];
    let max = observed[n - 1];
    let median = if n % 2 == 1 {
        observed[n / 2]
    } else {
        (observed[n / 2 - 1] + observed[n / 2]) / 2.0
    };

    let mean = observed.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let var = observed
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n as f64;
    let std = var.sqrt();

    let codes = match kind {
        FeatureKind::Numeric => None,
        FeatureKind::Encoded => Some(code_frequencies(&observed)),
    };

    Ok(FeatureStats {
        min,
        max,
        mean,
        std,
        median,
        codes,
    })
}

/// `(code, relative frequency)` pairs over a sorted slice of observed codes.
fn code_frequencies(sorted: &[f32]) -> Vec<(f32, f64)> {
    let total = sorted.len() as f64;
    let mut frequencies: Vec<(f32, f64)> = Vec::new();
    for &code in sorted {
        match frequencies.last_mut() {
            Some((last, count)) if *last == code => *count += 1.0,
            _ => frequencies.push((code, 1.0)),
        }
    }
    for (_, count) in &mut frequencies {
        *count /= total;
    }
    frequencies
}
