//! Churn Prediction Core
//!
//! Inference pipeline cho telecom churn model:
//! raw customer record → feature pipeline → classifier → label.
//!
//! ## Layout
//! - `logic/artifacts/` - Artifact Store (lazy, load-once fitted objects)
//! - `logic/features/` - Feature Pipeline (coercion, scaling, one-hot)
//! - `logic/model/` - Classifiers, label decoder, Inference Engine
//! - `api/` - Response shapes consumed by the HTTP layer

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;

#[cfg(test)]
pub(crate) mod test_util;

pub use api::{BatchPredictionResponse, EngineStatus, PredictionResponse};
pub use error::{ArtifactKind, ChurnError, ChurnResult};
pub use logic::artifacts::{ArtifactPaths, ArtifactStore};
pub use logic::config::{CoreConfig, NumericPolicy};
pub use logic::features::FeaturePipeline;
pub use logic::model::{InferenceEngine, Label};
pub use logic::record::CustomerRecord;
