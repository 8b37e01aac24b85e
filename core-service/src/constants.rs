//! Central Configuration Constants
//!
//! Single source of truth for artifact file names and env variable names.
//! To change where the fitted model lives, only edit this file.

/// Default artifact directory (relative to the working directory)
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Default artifact file names
pub const DEFAULT_MODEL_FILE: &str = "churn_model.json";
pub const DEFAULT_ENCODER_FILE: &str = "ohe_encoder.json";
pub const DEFAULT_SCALER_FILE: &str = "scaler.json";
pub const DEFAULT_FEATURES_FILE: &str = "feature_names.json";
pub const DEFAULT_LABEL_ENCODER_FILE: &str = "label_encoder.json";

/// Optional checksum manifest inside the artifact directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Tolerance for probability vectors summing to 1.0
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Crate version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Environment variable names
// ============================================

pub const ENV_MODELS_DIR: &str = "CHURN_MODELS_DIR";
pub const ENV_MODEL_FILE: &str = "CHURN_MODEL_FILE";
pub const ENV_ENCODER_FILE: &str = "CHURN_ENCODER_FILE";
pub const ENV_SCALER_FILE: &str = "CHURN_SCALER_FILE";
pub const ENV_FEATURES_FILE: &str = "CHURN_FEATURES_FILE";
pub const ENV_LABEL_ENCODER_FILE: &str = "CHURN_LABEL_ENCODER_FILE";
pub const ENV_ON_INVALID_NUMERIC: &str = "CHURN_ON_INVALID_NUMERIC";
