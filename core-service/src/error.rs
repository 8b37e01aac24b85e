//! Error handling
//!
//! Artifact and category errors propagate to the request boundary with the
//! artifact name / offending field attached. Label decoding and lenient
//! numeric coercion never produce an error value.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub type ChurnResult<T> = Result<T, ChurnError>;

/// Identity of one of the five fitted artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Classifier,
    CategoricalEncoder,
    NumericScaler,
    FeatureNames,
    LabelDecoder,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Classifier,
        ArtifactKind::CategoricalEncoder,
        ArtifactKind::NumericScaler,
        ArtifactKind::FeatureNames,
        ArtifactKind::LabelDecoder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Classifier => "classifier",
            ArtifactKind::CategoricalEncoder => "categorical_encoder",
            ArtifactKind::NumericScaler => "numeric_scaler",
            ArtifactKind::FeatureNames => "feature_names",
            ArtifactKind::LabelDecoder => "label_decoder",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of an artifact load failure
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("file not found")]
    NotFound,

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("deserialization failed: {0}")]
    Format(#[from] serde_json::Error),

    #[error("checksum mismatch (expected {expected}, got {actual})")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("invalid artifact: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ChurnError {
    #[error("failed to load {artifact} from {}: {source}", path.display())]
    ArtifactLoad {
        artifact: ArtifactKind,
        path: PathBuf,
        #[source]
        source: ArtifactError,
    },

    #[error("feature layout mismatch: {0}")]
    LayoutMismatch(String),

    #[error("unknown category {value:?} for field {field}")]
    UnknownCategory { field: String, value: String },

    #[error("field {field} has non-numeric value {value}")]
    InvalidNumeric { field: String, value: String },

    #[error("missing required field {0}")]
    MissingField(String),

    #[error("no records to predict")]
    EmptyBatch,

    #[error("inference failed: {0}")]
    Inference(String),
}

impl ChurnError {
    pub(crate) fn artifact(artifact: ArtifactKind, path: impl Into<PathBuf>, source: ArtifactError) -> Self {
        ChurnError::ArtifactLoad {
            artifact,
            path: path.into(),
            source,
        }
    }

    /// Stable error kind for structured responses
    pub fn kind(&self) -> &'static str {
        match self {
            ChurnError::ArtifactLoad { .. } => "ArtifactLoadError",
            ChurnError::LayoutMismatch(_) => "LayoutMismatchError",
            ChurnError::UnknownCategory { .. } => "UnknownCategoryError",
            ChurnError::InvalidNumeric { .. } => "InvalidNumericError",
            ChurnError::MissingField(_) => "MissingFieldError",
            ChurnError::EmptyBatch => "EmptyBatchError",
            ChurnError::Inference(_) => "InferenceError",
        }
    }

    /// True when the input is at fault (semantically invalid for this model)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ChurnError::UnknownCategory { .. }
                | ChurnError::InvalidNumeric { .. }
                | ChurnError::MissingField(_)
                | ChurnError::EmptyBatch
        )
    }
}
