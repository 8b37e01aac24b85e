//! Artifact paths - one fixed file per fitted object

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_ENCODER_FILE, DEFAULT_FEATURES_FILE, DEFAULT_LABEL_ENCODER_FILE, DEFAULT_MODEL_FILE,
    DEFAULT_SCALER_FILE, ENV_ENCODER_FILE, ENV_FEATURES_FILE, ENV_LABEL_ENCODER_FILE, ENV_MODEL_FILE,
    ENV_SCALER_FILE,
};
use crate::error::ArtifactKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub classifier: PathBuf,
    pub encoder: PathBuf,
    pub scaler: PathBuf,
    pub feature_names: PathBuf,
    pub label_decoder: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            dir: dir.to_path_buf(),
            classifier: dir.join(DEFAULT_MODEL_FILE),
            encoder: dir.join(DEFAULT_ENCODER_FILE),
            scaler: dir.join(DEFAULT_SCALER_FILE),
            feature_names: dir.join(DEFAULT_FEATURES_FILE),
            label_decoder: dir.join(DEFAULT_LABEL_ENCODER_FILE),
        }
    }

    /// File names overridable per artifact, still resolved inside `dir`
    pub fn from_env(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let file = |var: &str, default: &str| dir.join(env::var(var).unwrap_or_else(|_| default.to_string()));

        Self {
            dir: dir.to_path_buf(),
            classifier: file(ENV_MODEL_FILE, DEFAULT_MODEL_FILE),
            encoder: file(ENV_ENCODER_FILE, DEFAULT_ENCODER_FILE),
            scaler: file(ENV_SCALER_FILE, DEFAULT_SCALER_FILE),
            feature_names: file(ENV_FEATURES_FILE, DEFAULT_FEATURES_FILE),
            label_decoder: file(ENV_LABEL_ENCODER_FILE, DEFAULT_LABEL_ENCODER_FILE),
        }
    }

    pub fn path(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Classifier => &self.classifier,
            ArtifactKind::CategoricalEncoder => &self.encoder,
            ArtifactKind::NumericScaler => &self.scaler,
            ArtifactKind::FeatureNames => &self.feature_names,
            ArtifactKind::LabelDecoder => &self.label_decoder,
        }
    }
}
