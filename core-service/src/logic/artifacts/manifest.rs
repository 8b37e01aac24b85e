//! Integrity manifest - SHA-256 per artifact file
//!
//! Optional `manifest.json` next to the artifacts:
//! `{"files": {"churn_model.json": "<sha256 hex>", ...}}`.
//! When present, every artifact must be listed and match.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::MANIFEST_FILE;
use crate::error::ArtifactError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: BTreeMap<String, String>,
}

/// Hex SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

impl Manifest {
    /// Manifest in the same directory as `artifact`, if one exists
    pub fn for_artifact(artifact: &Path) -> Result<Option<Self>, ArtifactError> {
        let dir = artifact.parent().unwrap_or_else(|| Path::new("."));
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path)?;
        let manifest: Manifest = serde_json::from_slice(&data)?;
        Ok(Some(manifest))
    }

    /// Check `bytes` against the digest recorded for `artifact`
    pub fn verify(&self, artifact: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
        let name = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ArtifactError::Invalid("artifact path has no file name".to_string()))?;

        let expected = self
            .files
            .get(name)
            .ok_or_else(|| ArtifactError::Invalid(format!("{} is not listed in {}", name, MANIFEST_FILE)))?;

        let actual = sha256_hex(bytes);
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(ArtifactError::ChecksumMismatch {
                expected: expected.clone(),
                actual,
            });
        }
        Ok(())
    }
}
