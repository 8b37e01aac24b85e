//! API Module
//!
//! Shapes handed to the HTTP layer:
//! - responses.rs: single / batch prediction output
//! - engine_status.rs: artifact + inference status for health checks

pub mod engine_status;
pub mod responses;

pub use engine_status::{ArtifactStatus, EngineStatus, InferenceStats};
pub use responses::{BatchPredictionResponse, PredictionResponse};
