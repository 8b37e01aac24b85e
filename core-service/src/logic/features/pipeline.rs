//! Feature Pipeline - records → encoded matrix
//!
//! One code path for single and batch input; only the row count differs.
//! Column order: scaled numerics first, then one-hot blocks.

use std::sync::Arc;

use ndarray::{concatenate, Array2, Axis};

use super::categorical::categorical_block;
use super::numeric::numeric_block;
use crate::error::{ChurnError, ChurnResult};
use crate::logic::artifacts::{ArtifactStore, LoadedArtifacts};
use crate::logic::config::NumericPolicy;
use crate::logic::record::CustomerRecord;

/// M rows × F columns, F fixed by the loaded artifacts
pub type EncodedMatrix = Array2<f64>;

/// Encode records against already-loaded artifacts
pub fn encode_with(
    artifacts: &LoadedArtifacts<'_>,
    records: &[CustomerRecord],
    policy: NumericPolicy,
) -> ChurnResult<EncodedMatrix> {
    if records.is_empty() {
        return Err(ChurnError::EmptyBatch);
    }

    // 1-2. numeric coercion + scaling
    let raw = numeric_block(records, policy)?;
    let scaled = artifacts.scaler.transform(&raw)?;

    // 3. categorical strings + one-hot
    let strings = categorical_block(records)?;
    let one_hot = artifacts.encoder.transform(&strings)?;

    // 4. numeric block first
    let matrix = concatenate(Axis(1), &[scaled.view(), one_hot.view()])
        .map_err(|e| ChurnError::Inference(format!("matrix assembly failed: {}", e)))?;

    debug_assert_eq!(matrix.ncols(), artifacts.layout.feature_count);
    Ok(matrix)
}

/// Feature Pipeline bound to an artifact store
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    store: Arc<ArtifactStore>,
    policy: NumericPolicy,
}

impl FeaturePipeline {
    pub fn new(store: Arc<ArtifactStore>, policy: NumericPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> NumericPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    /// Encode 1..N records into the classifier's input matrix
    pub fn encode(&self, records: &[CustomerRecord]) -> ChurnResult<EncodedMatrix> {
        let artifacts = self.store.ensure_loaded()?;
        encode_with(&artifacts, records, self.policy)
    }
}
