//! Logic Module - Inference pipeline
//!
//! - `artifacts/` - Artifact Store (classifier, encoder, scaler, feature names, label decoder)
//! - `features/` - Feature Pipeline (record → encoded matrix)
//! - `model/` - Classifier variants, label decoder, Inference Engine

pub mod artifacts;
pub mod config;
pub mod features;
pub mod model;
pub mod record;
