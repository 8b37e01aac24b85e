//! Feature Layout - Centralized Input Schema
//!
//! **CRITICAL: This file controls the column order of the encoded matrix**
//!
//! ## Rules (NEVER break these):
//! 1. Column order = numeric block, then one-hot blocks in `CATEGORICAL_FIELDS` order
//! 2. The order must equal the order the scaler/encoder were fitted with
//! 3. Change a list here → re-export the artifacts and bump `LAYOUT_VERSION`
//!
//! The fitted artifacts carry their own copy of these names; `validate_layout`
//! checks both sides agree before any request is served.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::{ChurnError, ChurnResult};

// ============================================================================
// LAYOUT VERSION
// ============================================================================

/// Current input layout version
/// MUST be incremented when the field lists change
pub const LAYOUT_VERSION: u8 = 1;

// ============================================================================
// INPUT FIELDS (Authoritative source)
// ============================================================================

/// Numeric fields in exact scaler column order
pub const NUMERIC_FIELDS: &[&str] = &[
    "SeniorCitizen",  // 0: binary indicator (0/1)
    "tenure",         // 1: months as customer
    "MonthlyCharges", // 2: current monthly bill
    "TotalCharges",   // 3: lifetime billed amount
];

/// IMPORTANT: Must match NUMERIC_FIELDS.len()!
pub const NUMERIC_COUNT: usize = 4;

/// Numeric fields where missing/garbage input is repaired per `NumericPolicy`
/// instead of failing outright
pub const LENIENT_NUMERIC_FIELDS: &[&str] = &["SeniorCitizen", "TotalCharges"];

/// Numeric fields truncated to an integer after coercion
pub const INTEGER_NUMERIC_FIELDS: &[&str] = &["SeniorCitizen"];

/// Categorical fields in exact encoder column order
pub const CATEGORICAL_FIELDS: &[&str] = &[
    // === Demographics ===
    "gender",
    "Partner",
    "Dependents",
    // === Phone ===
    "PhoneService",
    "MultipleLines",
    // === Internet add-ons ===
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    // === Billing ===
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
];

/// IMPORTANT: Must match CATEGORICAL_FIELDS.len()!
pub const CATEGORICAL_COUNT: usize = 15;

pub fn is_lenient(field: &str) -> bool {
    LENIENT_NUMERIC_FIELDS.contains(&field)
}

pub fn is_integer(field: &str) -> bool {
    INTEGER_NUMERIC_FIELDS.contains(&field)
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the ordered output column names
/// Two deployments with equal hashes encode records identically
pub fn compute_layout_hash(feature_names: &[String]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[LAYOUT_VERSION]);

    for name in feature_names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Resolved layout of the encoded matrix for the loaded artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub numeric_count: usize,
    pub one_hot_count: usize,
    pub feature_names: Vec<String>,
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

fn expect_names(what: &str, expected: &[&str], actual: &[String]) -> ChurnResult<()> {
    let matches = expected.len() == actual.len() && expected.iter().zip(actual).all(|(e, a)| *e == a.as_str());
    if !matches {
        return Err(ChurnError::LayoutMismatch(format!(
            "{} fitted on {:?}, expected {:?}",
            what, actual, expected
        )));
    }
    Ok(())
}

/// Check that scaler, encoder and feature-name artifacts agree with each other
/// and with the input schema above
pub fn validate_layout(
    scaler_inputs: &[String],
    encoder_inputs: &[String],
    encoder_outputs: &[String],
    feature_names: &[String],
) -> ChurnResult<LayoutInfo> {
    expect_names("numeric scaler", NUMERIC_FIELDS, scaler_inputs)?;
    expect_names("categorical encoder", CATEGORICAL_FIELDS, encoder_inputs)?;

    let derived: Vec<&String> = scaler_inputs.iter().chain(encoder_outputs.iter()).collect();

    if derived.len() != feature_names.len() {
        return Err(ChurnError::LayoutMismatch(format!(
            "artifacts produce {} columns, feature list has {}",
            derived.len(),
            feature_names.len()
        )));
    }

    for (i, (derived, listed)) in derived.iter().zip(feature_names).enumerate() {
        if *derived != listed {
            return Err(ChurnError::LayoutMismatch(format!(
                "column {}: artifacts produce {:?}, feature list has {:?}",
                i, derived, listed
            )));
        }
    }

    Ok(LayoutInfo {
        version: LAYOUT_VERSION,
        hash: compute_layout_hash(feature_names),
        feature_count: feature_names.len(),
        numeric_count: scaler_inputs.len(),
        one_hot_count: encoder_outputs.len(),
        feature_names: feature_names.to_vec(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_field_counts() {
        assert_eq!(NUMERIC_FIELDS.len(), NUMERIC_COUNT);
        assert_eq!(CATEGORICAL_FIELDS.len(), CATEGORICAL_COUNT);
        assert!(NUMERIC_FIELDS.iter().all(|n| !CATEGORICAL_FIELDS.contains(n)));
    }

    #[test]
    fn test_lenient_fields_are_numeric() {
        assert!(LENIENT_NUMERIC_FIELDS.iter().all(|f| NUMERIC_FIELDS.contains(f)));
        assert!(is_lenient("TotalCharges"));
        assert!(!is_lenient("MonthlyCharges"));
        assert!(is_integer("SeniorCitizen"));
    }

    #[test]
    fn test_layout_hash_consistency() {
        let names = strings(&["a", "b"]);
        assert_eq!(compute_layout_hash(&names), compute_layout_hash(&names));
        assert_ne!(compute_layout_hash(&names), compute_layout_hash(&strings(&["b", "a"])));
        // separator keeps "ab" + "" distinct from "a" + "b"
        assert_ne!(compute_layout_hash(&names), compute_layout_hash(&strings(&["ab", ""])));
    }

    #[test]
    fn test_validate_layout_success() {
        let scaler = strings(NUMERIC_FIELDS);
        let encoder = strings(CATEGORICAL_FIELDS);
        let outputs = strings(&["gender_Female", "gender_Male"]);
        let mut features = scaler.clone();
        features.extend(outputs.iter().cloned());

        let info = validate_layout(&scaler, &encoder, &outputs, &features).unwrap();
        assert_eq!(info.feature_count, 6);
        assert_eq!(info.numeric_count, 4);
        assert_eq!(info.one_hot_count, 2);
        assert_eq!(info.hash, compute_layout_hash(&features));
    }

    #[test]
    fn test_validate_layout_reordered_numeric() {
        let scaler = strings(&["tenure", "SeniorCitizen", "MonthlyCharges", "TotalCharges"]);
        let encoder = strings(CATEGORICAL_FIELDS);
        let result = validate_layout(&scaler, &encoder, &[], &scaler);
        assert!(matches!(result, Err(ChurnError::LayoutMismatch(_))));
    }

    #[test]
    fn test_validate_layout_feature_list_mismatch() {
        let scaler = strings(NUMERIC_FIELDS);
        let encoder = strings(CATEGORICAL_FIELDS);
        let outputs = strings(&["gender_Female", "gender_Male"]);
        let mut features = scaler.clone();
        features.extend(strings(&["gender_Male", "gender_Female"]));

        let err = validate_layout(&scaler, &encoder, &outputs, &features).unwrap_err();
        assert!(err.to_string().contains("column 4"));
    }
}
