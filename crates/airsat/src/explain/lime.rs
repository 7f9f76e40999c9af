//! Local surrogate explanations.
//!
//! Fits a weighted ridge regression to the classifier's positive-class
//! probability over a neighborhood sampled around one input. Numeric
//! features are perturbed uniformly within their observed range and enter
//! the surrogate standardized by the fitted mean and spread; encoded
//! features are resampled by observed code frequency and enter as equality
//! indicators against the input. Samples are weighted by an exponential
//! kernel over distance in that interpretable space.
//!
//! Sampling is seeded, so one input explained twice with the same
//! configuration yields identical weights.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::explain::ExplainError;
use crate::model::Classifier;
use crate::pipeline::{FeatureKind, FeatureStats, Fitted};

// =============================================================================
// Configuration
// =============================================================================

/// Tuning knobs for the surrogate fit.
#[derive(Debug, Clone)]
pub struct LimeConfig {
    /// Neighborhood size, including the input itself.
    pub n_samples: usize,
    /// How many top-weighted features the explanation reports.
    pub num_features: usize,
    /// Kernel width; `None` picks `0.75 * sqrt(n_features)`.
    pub kernel_width: Option<f64>,
    /// Seed for neighborhood sampling.
    pub seed: u64,
    /// Ridge regularization strength.
    pub ridge: f64,
}

impl Default for LimeConfig {
    fn default() -> Self {
        Self {
            n_samples: 1000,
            num_features: 5,
            kernel_width: None,
            seed: 42,
            ridge: 1.0,
        }
    }
}

// =============================================================================
// Explanation
// =============================================================================

/// A fitted local surrogate around one input.
#[derive(Debug, Clone)]
pub struct LimeExplanation {
    /// Surrogate intercept in probability space.
    pub intercept: f64,
    /// `(feature index, surrogate weight)`, strongest magnitude first,
    /// truncated to `num_features`.
    pub weights: Vec<(usize, f64)>,
    /// Surrogate output at the input itself.
    pub local_prediction: f64,
}

// =============================================================================
// Explainer
// =============================================================================

/// Fits local surrogates against a classifier and its fitted preprocessing
/// statistics.
pub struct LimeExplainer<'a> {
    classifier: &'a Classifier,
    fitted: &'a Fitted,
    config: LimeConfig,
}

impl<'a> LimeExplainer<'a> {
    /// Creates an explainer.
    ///
    /// # Errors
    ///
    /// Returns an error if the fitted statistics do not cover the same
    /// features as the classifier.
    pub fn new(
        classifier: &'a Classifier,
        fitted: &'a Fitted,
        config: LimeConfig,
    ) -> Result<Self, ExplainError> {
        if fitted.n_features() != classifier.meta().n_features {
            return Err(ExplainError::FeatureCountMismatch {
                expected: classifier.meta().n_features,
                got: fitted.n_features(),
            });
        }
        Ok(Self {
            classifier,
            fitted,
            config,
        })
    }

    /// Explains one input, given in model space (encoded and imputed).
    ///
    /// # Errors
    ///
    /// Returns an error if the input length is wrong or the surrogate
    /// system cannot be solved.
    pub fn explain(&self, sample: ArrayView1<f32>) -> Result<LimeExplanation, ExplainError> {
        let n_features = self.fitted.n_features();
        if sample.len() != n_features {
            return Err(ExplainError::FeatureCountMismatch {
                expected: n_features,
                got: sample.len(),
            });
        }

        let n_samples = self.config.n_samples;
        let kinds = self.fitted.kinds();
        let stats = self.fitted.stats();
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        // Neighborhood in model space; column 0 is the input itself.
        let mut perturbed = Array2::<f32>::zeros((n_features, n_samples));
        for (i, &value) in sample.iter().enumerate() {
            perturbed[[i, 0]] = value;
        }
        for j in 1..n_samples {
            for i in 0..n_features {
                perturbed[[i, j]] = draw_feature(&mut rng, kinds[i], &stats[i]);
            }
        }

        let predictions: Vec<f64> = self
            .classifier
            .predict_batch(perturbed.view())
            .into_iter()
            .map(f64::from)
            .collect();

        // Interpretable representation: standardized numerics, equality
        // indicators for codes.
        let mut interp = Array2::<f64>::zeros((n_features, n_samples));
        for i in 0..n_features {
            match kinds[i] {
                FeatureKind::Numeric => {
                    let mean = stats[i].mean;
                    let scale = if stats[i].std > 0.0 { stats[i].std } else { 1.0 };
                    for j in 0..n_samples {
                        interp[[i, j]] = (perturbed[[i, j]] as f64 - mean) / scale;
                    }
                }
                FeatureKind::Encoded => {
                    let own = sample[i];
                    for j in 0..n_samples {
                        interp[[i, j]] = if perturbed[[i, j]] == own { 1.0 } else { 0.0 };
                    }
                }
            }
        }

        // Exponential kernel over distance to the input in interpretable
        // space.
        let width = self
            .config
            .kernel_width
            .unwrap_or_else(|| 0.75 * (n_features as f64).sqrt());
        let mut weights = vec![0.0; n_samples];
        for (j, weight) in weights.iter_mut().enumerate() {
            let mut dist_sq = 0.0;
            for i in 0..n_features {
                let d = interp[[i, j]] - interp[[i, 0]];
                dist_sq += d * d;
            }
            *weight = (-dist_sq / (width * width)).exp();
        }

        let (intercept, coefficients) =
            weighted_ridge(&interp, &predictions, &weights, self.config.ridge)?;

        let local_prediction = intercept
            + coefficients
                .iter()
                .enumerate()
                .map(|(i, c)| c * interp[[i, 0]])
                .sum::<f64>();

        let mut ranked: Vec<(usize, f64)> = coefficients.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()).then(a.0.cmp(&b.0)));
        ranked.truncate(self.config.num_features.min(n_features));

        Ok(LimeExplanation {
            intercept,
            weights: ranked,
            local_prediction,
        })
    }
}

/// One perturbed value for a feature.
fn draw_feature(rng: &mut StdRng, kind: FeatureKind, stats: &FeatureStats) -> f32 {
    match kind {
        FeatureKind::Numeric => {
            if stats.max > stats.min {
                rng.random_range(stats.min..=stats.max)
            } else {
                stats.min
            }
        }
        FeatureKind::Encoded => {
            let codes = stats.codes.as_deref().unwrap_or(&[]);
            let u: f64 = rng.random();
            let mut cumulative = 0.0;
            for &(code, frequency) in codes {
                cumulative += frequency;
                if u < cumulative {
                    return code;
                }
            }
            codes.last().map_or(f32::NAN, |&(code, _)| code)
        }
    }
}

/// Weighted ridge regression via centering and a Cholesky solve.
///
/// `interp` is `[n_features, n_samples]`. Returns `(intercept,
/// coefficients)`.
fn weighted_ridge(
    interp: &Array2<f64>,
    targets: &[f64],
    weights: &[f64],
    ridge: f64,
) -> Result<(f64, Vec<f64>), ExplainError> {
    let n_features = interp.nrows();
    let n_samples = interp.ncols();

    let weight_sum: f64 = weights.iter().sum();
    if !weight_sum.is_finite() || weight_sum <= 0.0 {
        return Err(ExplainError::SurrogateSingular);
    }

    let mut feature_means = vec![0.0; n_features];
    for i in 0..n_features {
        let mut acc = 0.0;
        for j in 0..n_samples {
            acc += weights[j] * interp[[i, j]];
        }
        feature_means[i] = acc / weight_sum;
    }
    let target_mean =
        weights.iter().zip(targets).map(|(w, y)| w * y).sum::<f64>() / weight_sum;

    // Normal equations on centered data: (Xc W Xc^T + ridge I) beta = Xc W yc.
    let mut gram = Array2::<f64>::zeros((n_features, n_features));
    let mut rhs = vec![0.0; n_features];
    for j in 0..n_samples {
        let w = weights[j];
        let yc = targets[j] - target_mean;
        for p in 0..n_features {
            let xp = interp[[p, j]] - feature_means[p];
            rhs[p] += w * xp * yc;
            for q in p..n_features {
                let xq = interp[[q, j]] - feature_means[q];
                gram[[p, q]] += w * xp * xq;
            }
        }
    }
    for p in 0..n_features {
        gram[[p, p]] += ridge;
        for q in 0..p {
            gram[[p, q]] = gram[[q, p]];
        }
    }

    let coefficients = cholesky_solve(gram, rhs)?;
    let intercept = target_mean
        - coefficients
            .iter()
            .zip(&feature_means)
            .map(|(c, m)| c * m)
            .sum::<f64>();
    Ok((intercept, coefficients))
}

/// Solves `A x = b` for symmetric positive-definite `A`.
fn cholesky_solve(mut a: Array2<f64>, mut b: Vec<f64>) -> Result<Vec<f64>, ExplainError> {
    let n = b.len();
    debug_assert_eq!(a.nrows(), n);
    debug_assert_eq!(a.ncols(), n);

    // In-place lower-triangular factorization. Pivots at roundoff scale
    // count as singular.
    for j in 0..n {
        let original = a[[j, j]].abs().max(1.0);
        let mut diag = a[[j, j]];
        for k in 0..j {
            diag -= a[[j, k]] * a[[j, k]];
        }
        if !diag.is_finite() || diag <= original * 1e-12 {
            return Err(ExplainError::SurrogateSingular);
        }
        let diag = diag.sqrt();
        a[[j, j]] = diag;
        for i in (j + 1)..n {
            let mut s = a[[i, j]];
            for k in 0..j {
                s -= a[[i, k]] * a[[j, k]];
            }
            a[[i, j]] = s / diag;
        }
    }

    // Forward then backward substitution, reusing b.
    for i in 0..n {
        for k in 0..i {
            let v = b[k];
            b[i] -= a[[i, k]] * v;
        }
        b[i] /= a[[i, i]];
    }
    for i in (0..n).rev() {
        for k in (i + 1)..n {
            let v = b[k];
            b[i] -= a[[k, i]] * v;
        }
        b[i] /= a[[i, i]];
    }
    Ok(b)
}
