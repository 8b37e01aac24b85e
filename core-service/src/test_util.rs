//! Shared helpers for unit tests: Telco fixture artifacts + sample records

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

use crate::error::ArtifactKind;
use crate::logic::artifacts::ArtifactPaths;
use crate::logic::record::CustomerRecord;

pub(crate) fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/telco")
}

/// Copy of the fixture artifacts in a scratch dir, safe to mutate
pub(crate) fn fixture_copy() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let src = ArtifactPaths::from_dir(fixture_dir());
    let dst = ArtifactPaths::from_dir(dir.path());
    for kind in ArtifactKind::ALL {
        fs::copy(src.path(kind), dst.path(kind)).unwrap();
    }
    dir
}

/// The reference month-to-month fiber customer
pub(crate) fn sample_record() -> CustomerRecord {
    serde_json::from_value(json!({
        "SeniorCitizen": 0,
        "tenure": 12,
        "MonthlyCharges": 70.35,
        "TotalCharges": 845.5,
        "gender": "Female",
        "Partner": "Yes",
        "Dependents": "No",
        "PhoneService": "Yes",
        "MultipleLines": "No",
        "InternetService": "Fiber optic",
        "OnlineSecurity": "No",
        "OnlineBackup": "Yes",
        "DeviceProtection": "No",
        "TechSupport": "No",
        "StreamingTV": "Yes",
        "StreamingMovies": "No",
        "Contract": "Month-to-month",
        "PaperlessBilling": "Yes",
        "PaymentMethod": "Electronic check"
    }))
    .unwrap()
}
