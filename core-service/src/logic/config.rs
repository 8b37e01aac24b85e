//! Core configuration
//!
//! Đọc từ environment, fallback về default trong `constants.rs`.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MODELS_DIR, ENV_MODELS_DIR, ENV_ON_INVALID_NUMERIC};

use super::artifacts::ArtifactPaths;

/// What to do when a lenient numeric field cannot be coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericPolicy {
    /// Substitute 0.0 and log a warning
    #[default]
    Zero,
    /// Fail the request with `InvalidNumeric`
    Reject,
}

impl FromStr for NumericPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(NumericPolicy::Zero),
            "reject" => Ok(NumericPolicy::Reject),
            other => Err(format!("unknown numeric policy: {}", other)),
        }
    }
}

/// Core configuration
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory holding the five artifacts
    pub models_dir: PathBuf,

    /// Resolved artifact paths
    pub artifacts: ArtifactPaths,

    /// Policy for unparseable lenient numeric fields
    pub on_invalid_numeric: NumericPolicy,
}

impl CoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let models_dir = env::var(ENV_MODELS_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODELS_DIR));

        let on_invalid_numeric = match env::var(ENV_ON_INVALID_NUMERIC) {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                log::warn!("{} - falling back to 'zero'", e);
                NumericPolicy::Zero
            }),
            Err(_) => NumericPolicy::Zero,
        };

        Self {
            artifacts: ArtifactPaths::from_env(&models_dir),
            models_dir,
            on_invalid_numeric,
        }
    }

    /// Configuration for an explicit artifact directory (default file names)
    pub fn with_models_dir(dir: impl Into<PathBuf>) -> Self {
        let models_dir = dir.into();
        Self {
            artifacts: ArtifactPaths::from_dir(&models_dir),
            models_dir,
            on_invalid_numeric: NumericPolicy::default(),
        }
    }

    pub fn numeric_policy(mut self, policy: NumericPolicy) -> Self {
        self.on_invalid_numeric = policy;
        self
    }
}
