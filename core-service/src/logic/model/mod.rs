//! Model Module - Classifiers & Inference Engine
//!
//! Tách logic inference khỏi feature encoding.
//! Classifier variant decides whether probabilities exist.

pub mod classifier;
pub mod inference;
pub mod label;
#[cfg(feature = "onnx")]
pub mod onnx;

// Re-export common types
pub use classifier::{Classifier, ClassifierSpec, DeterministicModel, ProbabilisticModel};
pub use inference::{predict_with, InferenceEngine, RowPrediction};
pub use label::{Label, LabelDecoder};
