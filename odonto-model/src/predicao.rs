//! ML status prediction payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub tipo: String,
    pub local_do_caso: String,
}

/// Either a prediction or a server-reported error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PredictionResponse {
    Failure {
        error: String,
    },
    Prediction {
        predicted_status: String,
        #[serde(default)]
        probabilities: BTreeMap<String, f64>,
    },
}
