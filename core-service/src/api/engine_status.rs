use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::config::NumericPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub version: String,
    pub numeric_policy: NumericPolicy,

    pub artifacts: ArtifactStatus,
    pub inference: InferenceStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactStatus {
    pub loaded: bool,
    pub models_dir: String,
    pub classifier: Option<String>, // "logistic_regression" | "random_forest" | "linear_svc" | "onnx"
    pub probabilistic: Option<bool>,
    pub feature_count: Option<usize>,
    pub layout_hash: Option<u32>,
    pub classes: Vec<String>,
    pub load_count: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceStats {
    pub predictions: u64,
    pub avg_latency_ms: f32,
}
