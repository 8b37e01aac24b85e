//! Prediction response shapes
//!
//! Probability fields are omitted (not null) when the classifier has no
//! probabilistic output.

use serde::{Deserialize, Serialize};

use crate::logic::model::RowPrediction;

/// Single-record result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: i64,
    pub prediction_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_of_prediction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f64>>,
}

impl From<RowPrediction> for PredictionResponse {
    fn from(row: RowPrediction) -> Self {
        Self {
            prediction: row.index,
            probability_of_prediction: row.top_probability(),
            prediction_label: row.label.into_string(),
            probabilities: row.probabilities,
        }
    }
}

/// Batch result: parallel sequences in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<i64>,
    pub prediction_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<Vec<f64>>>,
}

impl BatchPredictionResponse {
    pub fn from_rows(rows: Vec<RowPrediction>) -> Self {
        let mut predictions = Vec::with_capacity(rows.len());
        let mut prediction_labels = Vec::with_capacity(rows.len());
        let mut probabilities = Vec::with_capacity(rows.len());

        for row in rows {
            predictions.push(row.index);
            prediction_labels.push(row.label.into_string());
            probabilities.push(row.probabilities);
        }

        // all rows come from one classifier: either every row has a distribution or none does
        let probabilities = probabilities.into_iter().collect::<Option<Vec<_>>>();

        Self {
            predictions,
            prediction_labels,
            probabilities,
        }
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}
