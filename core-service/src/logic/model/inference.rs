//! Inference Engine - classifier over the encoded matrix
//!
//! Mỗi call là pure function của (records, loaded artifacts).
//! Probability output only exists when the classifier is probabilistic;
//! label decoding never fails a request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::api::{BatchPredictionResponse, EngineStatus, InferenceStats, PredictionResponse};
use crate::constants::{APP_VERSION, PROBABILITY_TOLERANCE};
use crate::error::{ChurnError, ChurnResult};
use crate::logic::artifacts::{ArtifactStore, LoadedArtifacts};
use crate::logic::config::{CoreConfig, NumericPolicy};
use crate::logic::features::{encode_with, EncodedMatrix, FeaturePipeline};
use crate::logic::record::CustomerRecord;

use super::classifier::{argmax, Classifier};
use super::label::Label;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prediction for one input row
#[derive(Debug, Clone, PartialEq)]
pub struct RowPrediction {
    pub index: i64,
    pub label: Label,
    /// Full distribution ordered by class index (probabilistic classifiers only)
    pub probabilities: Option<Vec<f64>>,
}

impl RowPrediction {
    /// Probability of the predicted class
    pub fn top_probability(&self) -> Option<f64> {
        let probs = self.probabilities.as_ref()?;
        usize::try_from(self.index).ok().and_then(|i| probs.get(i).copied())
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

/// A probability row must be finite, non-negative and sum to 1
fn check_distribution(probs: &[f64]) -> ChurnResult<()> {
    if probs.is_empty() || probs.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(ChurnError::Inference(format!(
            "classifier returned an invalid probability row {:?}",
            probs
        )));
    }
    let sum: f64 = probs.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(ChurnError::Inference(format!(
            "classifier probability row sums to {}",
            sum
        )));
    }
    Ok(())
}

/// Run the classifier over an encoded matrix and decode every row
pub fn predict_with(artifacts: &LoadedArtifacts<'_>, x: &EncodedMatrix) -> ChurnResult<Vec<RowPrediction>> {
    let rows = x.nrows();

    let predictions = match artifacts.classifier {
        Classifier::Probabilistic(model) => {
            let proba = model.predict_proba(x.view())?;
            if proba.nrows() != rows {
                return Err(ChurnError::Inference(format!(
                    "classifier returned {} probability rows for {} inputs",
                    proba.nrows(),
                    rows
                )));
            }

            proba
                .outer_iter()
                .map(|row| {
                    let probs = row.to_vec();
                    check_distribution(&probs).map_err(|e| {
                        log::error!("{} (model: {})", e, model.name());
                        e
                    })?;
                    let index = argmax(&probs) as i64;
                    Ok(RowPrediction {
                        index,
                        label: artifacts.label_decoder.decode(index),
                        probabilities: Some(probs),
                    })
                })
                .collect::<ChurnResult<Vec<_>>>()?
        }
        Classifier::Deterministic(model) => {
            let preds = model.predict(x.view())?;
            if preds.len() != rows {
                return Err(ChurnError::Inference(format!(
                    "classifier returned {} predictions for {} inputs",
                    preds.len(),
                    rows
                )));
            }

            preds
                .into_iter()
                .map(|index| RowPrediction {
                    index,
                    label: artifacts.label_decoder.decode(index),
                    probabilities: None,
                })
                .collect()
        }
    };

    Ok(predictions)
}

// ============================================================================
// ENGINE
// ============================================================================

/// Inference Engine bound to an artifact store
#[derive(Debug)]
pub struct InferenceEngine {
    pipeline: FeaturePipeline,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl InferenceEngine {
    pub fn new(store: Arc<ArtifactStore>, policy: NumericPolicy) -> Self {
        Self {
            pipeline: FeaturePipeline::new(store, policy),
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        let store = Arc::new(ArtifactStore::new(config.artifacts.clone()));
        Self::new(store, config.on_invalid_numeric)
    }

    pub fn store(&self) -> &Arc<ArtifactStore> {
        self.pipeline.store()
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    /// Predict 1..N records; results keep input order
    pub fn predict(&self, records: &[CustomerRecord]) -> ChurnResult<Vec<RowPrediction>> {
        let start_time = Instant::now();

        let artifacts = self.store().ensure_loaded()?;
        let x = encode_with(&artifacts, records, self.pipeline.policy())?;
        let predictions = predict_with(&artifacts, &x)?;

        // Track metrics
        self.latency_sum_us
            .fetch_add(start_time.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count
            .fetch_add(predictions.len() as u64, Ordering::Relaxed);

        Ok(predictions)
    }

    /// Single-record output shape
    pub fn predict_single(&self, record: &CustomerRecord) -> ChurnResult<PredictionResponse> {
        let mut rows = self.predict(std::slice::from_ref(record))?;
        let row = rows
            .pop()
            .ok_or_else(|| ChurnError::Inference("no prediction produced".to_string()))?;
        Ok(PredictionResponse::from(row))
    }

    /// Batch output shape (parallel sequences)
    pub fn predict_batch(&self, records: &[CustomerRecord]) -> ChurnResult<BatchPredictionResponse> {
        Ok(BatchPredictionResponse::from_rows(self.predict(records)?))
    }

    pub fn stats(&self) -> InferenceStats {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        InferenceStats {
            predictions: count,
            avg_latency_ms: avg,
        }
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            version: APP_VERSION.to_string(),
            numeric_policy: self.pipeline.policy(),
            artifacts: self.store().status(),
            inference: self.stats(),
        }
    }
}
