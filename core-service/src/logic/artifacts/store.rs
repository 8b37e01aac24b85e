//! Artifact Store - load-once cache of the fitted objects
//!
//! Mỗi artifact nằm trong một `OnceCell` riêng: load tối đa một lần,
//! kể cả khi nhiều request đầu tiên chạy song song.
//! A failed artifact is retried on the next call; loaded siblings are kept.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

use super::manifest::Manifest;
use super::paths::ArtifactPaths;
use crate::api::ArtifactStatus;
use crate::error::{ArtifactError, ArtifactKind, ChurnError, ChurnResult};
use crate::logic::features::layout::{validate_layout, LayoutInfo};
use crate::logic::features::{OneHotEncoder, StandardScaler};
use crate::logic::model::{Classifier, LabelDecoder};

/// Borrowed view of the five loaded artifacts plus the checked layout
#[derive(Debug, Clone, Copy)]
pub struct LoadedArtifacts<'a> {
    pub classifier: &'a Classifier,
    pub encoder: &'a OneHotEncoder,
    pub scaler: &'a StandardScaler,
    pub feature_names: &'a [String],
    pub label_decoder: &'a LabelDecoder,
    pub layout: &'a LayoutInfo,
}

#[derive(Debug)]
pub struct ArtifactStore {
    paths: ArtifactPaths,
    classifier: OnceCell<Classifier>,
    encoder: OnceCell<OneHotEncoder>,
    scaler: OnceCell<StandardScaler>,
    feature_names: OnceCell<Vec<String>>,
    label_decoder: OnceCell<LabelDecoder>,
    layout: OnceCell<LayoutInfo>,
    loaded_at: OnceCell<DateTime<Utc>>,
    load_count: AtomicUsize,
}

// ============================================================================
// PARSERS
// ============================================================================

fn parse_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, ArtifactError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn parse_scaler(bytes: &[u8], _: &Path) -> Result<StandardScaler, ArtifactError> {
    let scaler: StandardScaler = parse_json(bytes)?;
    scaler.validate().map_err(ArtifactError::Invalid)?;
    Ok(scaler)
}

fn parse_encoder(bytes: &[u8], _: &Path) -> Result<OneHotEncoder, ArtifactError> {
    let encoder: OneHotEncoder = parse_json(bytes)?;
    encoder.validate().map_err(ArtifactError::Invalid)?;
    Ok(encoder)
}

fn parse_feature_names(bytes: &[u8], _: &Path) -> Result<Vec<String>, ArtifactError> {
    let names: Vec<String> = parse_json(bytes)?;
    if names.is_empty() {
        return Err(ArtifactError::Invalid("feature name list is empty".to_string()));
    }
    Ok(names)
}

fn parse_label_decoder(bytes: &[u8], _: &Path) -> Result<LabelDecoder, ArtifactError> {
    let decoder: LabelDecoder = parse_json(bytes)?;
    decoder.validate().map_err(ArtifactError::Invalid)?;
    Ok(decoder)
}

// ============================================================================
// STORE
// ============================================================================

impl ArtifactStore {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            classifier: OnceCell::new(),
            encoder: OnceCell::new(),
            scaler: OnceCell::new(),
            feature_names: OnceCell::new(),
            label_decoder: OnceCell::new(),
            layout: OnceCell::new(),
            loaded_at: OnceCell::new(),
            load_count: AtomicUsize::new(0),
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Number of artifact deserializations performed so far
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        self.layout.get().is_some()
    }

    /// Read + checksum + parse one artifact
    fn load<T>(
        &self,
        kind: ArtifactKind,
        parse: impl FnOnce(&[u8], &Path) -> Result<T, ArtifactError>,
    ) -> ChurnResult<T> {
        let path = self.paths.path(kind);
        log::info!("Loading {} from {}", kind, path.display());

        let result = read_verified(path).and_then(|bytes| parse(&bytes, path));

        match result {
            Ok(value) => {
                self.load_count.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            }
            Err(e) => {
                log::error!("Error loading {} from {}: {}", kind, path.display(), e);
                Err(ChurnError::artifact(kind, path, e))
            }
        }
    }

    /// Load every artifact on first use, return the cached set afterwards
    pub fn ensure_loaded(&self) -> ChurnResult<LoadedArtifacts<'_>> {
        let classifier = self
            .classifier
            .get_or_try_init(|| self.load(ArtifactKind::Classifier, Classifier::from_artifact))?;
        let encoder = self
            .encoder
            .get_or_try_init(|| self.load(ArtifactKind::CategoricalEncoder, parse_encoder))?;
        let scaler = self
            .scaler
            .get_or_try_init(|| self.load(ArtifactKind::NumericScaler, parse_scaler))?;
        let feature_names = self
            .feature_names
            .get_or_try_init(|| self.load(ArtifactKind::FeatureNames, parse_feature_names))?;
        let label_decoder = self
            .label_decoder
            .get_or_try_init(|| self.load(ArtifactKind::LabelDecoder, parse_label_decoder))?;

        let layout = self
            .layout
            .get_or_try_init(|| check_layout(classifier, encoder, scaler, feature_names, label_decoder))?;
        self.loaded_at.get_or_init(|| {
            log::info!(
                "Artifacts ready: {} features (layout hash {:08x}), classifier {}",
                layout.feature_count,
                layout.hash,
                classifier.name()
            );
            Utc::now()
        });

        Ok(LoadedArtifacts {
            classifier,
            encoder,
            scaler,
            feature_names,
            label_decoder,
            layout,
        })
    }

    /// Eager load at startup so no request ever pays (or races) the first load
    pub fn preload(&self) -> ChurnResult<LayoutInfo> {
        self.ensure_loaded().map(|a| a.layout.clone())
    }

    /// Snapshot for health checks; never triggers a load
    pub fn status(&self) -> ArtifactStatus {
        let classifier = self.classifier.get();
        ArtifactStatus {
            loaded: self.is_loaded(),
            models_dir: self.paths.dir.display().to_string(),
            classifier: classifier.map(|c| c.name().to_string()),
            probabilistic: classifier.map(|c| c.is_probabilistic()),
            feature_count: self.layout.get().map(|l| l.feature_count),
            layout_hash: self.layout.get().map(|l| l.hash),
            classes: self
                .label_decoder
                .get()
                .map(|d| d.classes.clone())
                .unwrap_or_default(),
            load_count: self.load_count(),
            loaded_at: self.loaded_at.get().copied(),
        }
    }
}

fn read_verified(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound);
    }

    let bytes = fs::read(path)?;
    if let Some(manifest) = Manifest::for_artifact(path)? {
        manifest.verify(path, &bytes)?;
    }
    Ok(bytes)
}

/// Cross-artifact checks, run once after all five are loaded
fn check_layout(
    classifier: &Classifier,
    encoder: &OneHotEncoder,
    scaler: &StandardScaler,
    feature_names: &[String],
    label_decoder: &LabelDecoder,
) -> ChurnResult<LayoutInfo> {
    let info = validate_layout(
        &scaler.feature_names_in,
        &encoder.feature_names_in,
        &encoder.get_feature_names_out(),
        feature_names,
    )
    .map_err(|e| {
        log::error!("{}", e);
        e
    })?;

    if let Some(n) = classifier.n_features() {
        if n != info.feature_count {
            return Err(ChurnError::LayoutMismatch(format!(
                "classifier expects {} features, encoded matrix has {}",
                n, info.feature_count
            )));
        }
    }

    if let Classifier::Probabilistic(model) = classifier {
        let n_classes = model.n_classes();
        if n_classes > 0 && n_classes != label_decoder.n_classes() {
            log::warn!(
                "Classifier has {} classes but label decoder knows {} - unknown indices fall back to numbers",
                n_classes,
                label_decoder.n_classes()
            );
        }
    }

    Ok(info)
}
