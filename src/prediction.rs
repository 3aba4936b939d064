//! ML status prediction view model.

use odonto_model::{CasoStatus, PredictionResponse};

use crate::http::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBar {
    pub label: String,
    pub probability: f64,
}

impl ProbabilityBar {
    /// Bar width in percent, clamped to `[0, 100]`
    pub fn width_percent(&self) -> f64 {
        (self.probability * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionView {
    Idle,
    Loading,
    Ready {
        predicted: String,
        bars: Vec<ProbabilityBar>,
    },
    Failed(String),
}

/// Readable label for a predicted status value
fn status_label(raw: &str) -> String {
    CasoStatus::parse(raw)
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| raw.to_string())
}

impl PredictionView {
    pub fn from_result(result: Result<PredictionResponse, ApiError>) -> Self {
        match result {
            Err(e) => Self::Failed(e.to_string()),
            Ok(PredictionResponse::Failure { error }) => Self::Failed(error),
            Ok(PredictionResponse::Prediction {
                predicted_status,
                probabilities,
            }) => {
                let mut bars: Vec<ProbabilityBar> = probabilities
                    .into_iter()
                    .map(|(label, probability)| ProbabilityBar {
                        label: status_label(&label),
                        probability,
                    })
                    .collect();
                bars.sort_by(|a, b| b.probability.total_cmp(&a.probability));
                Self::Ready {
                    predicted: status_label(&predicted_status),
                    bars,
                }
            }
        }
    }
}
