//! Prediction reports and their rendering.

use serde::Serialize;

use crate::app::AppError;

/// How [`render`] formats a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned text with contribution bars.
    #[default]
    Human,
    /// Pretty-printed JSON.
    Json,
}

/// One scored input with both explanations attached.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Name of the model that produced the score.
    pub model: String,
    /// Predicted class label.
    pub label: String,
    /// Positive-class probability.
    pub probability: f32,
    /// Raw margin before the output transform.
    pub margin: f32,
    /// Expected margin over the model's training distribution.
    pub base_value: f64,
    /// Per-feature attributions, strongest magnitude first. Together with
    /// `base_value` they sum to `margin`.
    pub contributions: Vec<Contribution>,
    /// Local surrogate fit around this input.
    pub surrogate: Surrogate,
}

/// One feature's attribution.
#[derive(Debug, Clone, Serialize)]
pub struct Contribution {
    pub feature: String,
    /// The entered value, as displayed.
    pub value: String,
    /// Attribution in margin space.
    pub shap: f64,
}

/// Weighted linear fit of the model's probability around the input.
#[derive(Debug, Clone, Serialize)]
pub struct Surrogate {
    pub intercept: f64,
    /// Surrogate output at the input itself.
    pub local_prediction: f64,
    /// Top surrogate weights, strongest magnitude first.
    pub weights: Vec<SurrogateWeight>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SurrogateWeight {
    pub feature: String,
    pub weight: f64,
}

/// Renders a report in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(report: &Report, format: OutputFormat) -> Result<String, AppError> {
    match format {
        OutputFormat::Human => Ok(render_human(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

const BAR_WIDTH: f64 = 20.0;

fn render_human(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}: {} (p = {:.3})\n\n",
        report.model, report.label, report.probability
    ));

    let name_width = report
        .contributions
        .iter()
        .map(|c| c.feature.len())
        .chain(std::iter::once("base value".len()))
        .max()
        .unwrap_or(0);
    let max_abs = report
        .contributions
        .iter()
        .map(|c| c.shap.abs())
        .fold(0.0f64, f64::max);

    out.push_str("Feature contributions (margin):\n");
    for c in &report.contributions {
        let bar_len = if max_abs > 0.0 {
            ((c.shap.abs() / max_abs) * BAR_WIDTH).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "  {:<name_width$}  {:>9}  {:+8.4}  {}\n",
            c.feature,
            c.value,
            c.shap,
            "#".repeat(bar_len)
        ));
    }
    out.push_str(&format!(
        "  {:<name_width$}  {:>9}  {:+8.4}\n",
        "base value", "", report.base_value
    ));

    out.push_str("\nLocal surrogate (probability):\n");
    for w in &report.surrogate.weights {
        out.push_str(&format!("  {:<name_width$}  {:+.4}\n", w.feature, w.weight));
    }
    out.push_str(&format!(
        "  intercept {:+.4}, local prediction {:.4}\n",
        report.surrogate.intercept, report.surrogate.local_prediction
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        Report {
            model: "flight-boosted".to_string(),
            label: "Satisfied".to_string(),
            probability: 0.731,
            margin: 1.0,
            base_value: -0.2,
            contributions: vec![
                Contribution {
                    feature: "Online boarding".to_string(),
                    value: "5".to_string(),
                    shap: 0.8,
                },
                Contribution {
                    feature: "Age".to_string(),
                    value: "34".to_string(),
                    shap: 0.4,
                },
            ],
            surrogate: Surrogate {
                intercept: 0.41,
                local_prediction: 0.72,
                weights: vec![SurrogateWeight {
                    feature: "Online boarding".to_string(),
                    weight: 0.12,
                }],
            },
        }
    }

    #[test]
    fn human_report_lists_everything() {
        let text = render(&sample_report(), OutputFormat::Human).unwrap();
        assert!(text.contains("flight-boosted: Satisfied (p = 0.731)"));
        assert!(text.contains("Online boarding"));
        assert!(text.contains("base value"));
        assert!(text.contains("local prediction 0.7200"));
    }

    #[test]
    fn bars_scale_with_the_strongest_contribution() {
        let text = render(&sample_report(), OutputFormat::Human).unwrap();
        // 0.8 fills the bar; 0.4 fills half of it.
        assert!(text.contains(&"#".repeat(20)));
        let half_bars = text
            .lines()
            .filter(|l| l.contains("Age"))
            .filter(|l| l.contains(&"#".repeat(10)) && !l.contains(&"#".repeat(11)))
            .count();
        assert_eq!(half_bars, 1);
    }

    #[test]
    fn json_report_round_trips_as_a_value() {
        let text = render(&sample_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["model"], "flight-boosted");
        assert_eq!(value["label"], "Satisfied");
        assert_eq!(value["contributions"][0]["feature"], "Online boarding");
        assert_eq!(value["surrogate"]["weights"][0]["weight"], 0.12);
    }
}
