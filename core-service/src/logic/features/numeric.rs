//! Numeric Features - coercion + standard scaling
//!
//! Coerce 4 numeric fields về f64, rồi áp dụng scaler đã fit lúc training.
//! The scaler is never re-fit at request time.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::layout::{is_integer, is_lenient, NUMERIC_COUNT, NUMERIC_FIELDS};
use crate::error::{ChurnError, ChurnResult};
use crate::logic::config::NumericPolicy;
use crate::logic::record::CustomerRecord;

// ============================================================================
// COERCION
// ============================================================================

/// Best-effort conversion of a raw JSON value to a finite f64
///
/// Numbers pass through, numeric strings are trimmed and parsed, booleans
/// become 1.0/0.0. Everything else (null, blank, garbage, NaN/inf) is `None`.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Coerce one numeric field of a record, applying the lenient-field policy
pub fn coerce_field(record: &CustomerRecord, field: &str, policy: NumericPolicy) -> ChurnResult<f64> {
    let raw = record.get(field);
    let coerced = raw.and_then(coerce_numeric);

    let value = match (coerced, raw) {
        (Some(v), _) => v,
        (None, raw) if is_lenient(field) && policy == NumericPolicy::Zero => {
            log::warn!(
                "Numeric field {} has unusable value {} - substituting 0.0",
                field,
                raw.map(|v| v.to_string()).unwrap_or_else(|| "<missing>".to_string())
            );
            0.0
        }
        (None, None) | (None, Some(Value::Null)) => {
            return Err(ChurnError::MissingField(field.to_string()));
        }
        (None, Some(other)) => {
            return Err(ChurnError::InvalidNumeric {
                field: field.to_string(),
                value: other.to_string(),
            });
        }
    };

    Ok(if is_integer(field) { value.trunc() } else { value })
}

/// Build the raw (unscaled) numeric block, one row per record
pub fn numeric_block(records: &[CustomerRecord], policy: NumericPolicy) -> ChurnResult<Array2<f64>> {
    let mut block = Array2::<f64>::zeros((records.len(), NUMERIC_COUNT));

    for (mut row, record) in block.axis_iter_mut(Axis(0)).zip(records) {
        for (j, field) in NUMERIC_FIELDS.iter().enumerate() {
            row[j] = coerce_field(record, field, policy)?;
        }
    }

    Ok(block)
}

// ============================================================================
// STANDARD SCALER
// ============================================================================

fn default_true() -> bool {
    true
}

/// Fitted standard scaler: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Column names seen at fit time, in order
    pub feature_names_in: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default = "default_true")]
    pub with_mean: bool,
    #[serde(default = "default_true")]
    pub with_std: bool,
}

impl StandardScaler {
    pub fn n_features(&self) -> usize {
        self.feature_names_in.len()
    }

    /// Structural checks run once at load time
    pub fn validate(&self) -> Result<(), String> {
        let n = self.n_features();
        if self.mean.len() != n || self.scale.len() != n {
            return Err(format!(
                "scaler has {} names, {} means, {} scales",
                n,
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".to_string());
        }
        Ok(())
    }

    /// Apply the fitted transform to an (M x n_features) block
    pub fn transform(&self, x: &Array2<f64>) -> ChurnResult<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(ChurnError::Inference(format!(
                "scaler expects {} columns, got {}",
                self.n_features(),
                x.ncols()
            )));
        }

        let mut out = x.clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let mean = if self.with_mean { self.mean[j] } else { 0.0 };
            // zero variance columns were fitted with scale 1.0
            let scale = if self.with_std && self.scale[j] != 0.0 { self.scale[j] } else { 1.0 };
            column.mapv_inplace(|v| (v - mean) / scale);
        }
        Ok(out)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use serde_json::json;

    fn base_record() -> CustomerRecord {
        CustomerRecord::new()
            .with("SeniorCitizen", 0)
            .with("tenure", 12)
            .with("MonthlyCharges", 70.35)
            .with("TotalCharges", 845.5)
    }

    #[test]
    fn test_coerce_numeric_variants() {
        assert_eq!(coerce_numeric(&json!(3)), Some(3.0));
        assert_eq!(coerce_numeric(&json!(" 845.5 ")), Some(845.5));
        assert_eq!(coerce_numeric(&json!(true)), Some(1.0));
        assert_eq!(coerce_numeric(&json!("")), None);
        assert_eq!(coerce_numeric(&json!(" ")), None);
        assert_eq!(coerce_numeric(&json!("abc")), None);
        assert_eq!(coerce_numeric(&json!("NaN")), None);
        assert_eq!(coerce_numeric(&Value::Null), None);
    }

    #[test]
    fn test_lenient_field_zero_policy() {
        let record = base_record().with("TotalCharges", " ");
        let v = coerce_field(&record, "TotalCharges", NumericPolicy::Zero).unwrap();
        assert_eq!(v, 0.0);

        let mut record = base_record();
        record.remove("TotalCharges");
        assert_eq!(coerce_field(&record, "TotalCharges", NumericPolicy::Zero).unwrap(), 0.0);
    }

    #[test]
    fn test_lenient_field_reject_policy() {
        let record = base_record().with("TotalCharges", "n/a");
        let err = coerce_field(&record, "TotalCharges", NumericPolicy::Reject).unwrap_err();
        assert!(matches!(err, ChurnError::InvalidNumeric { ref field, .. } if field == "TotalCharges"));
    }

    #[test]
    fn test_strict_field_never_zero_filled() {
        let record = base_record().with("MonthlyCharges", "cheap");
        let err = coerce_field(&record, "MonthlyCharges", NumericPolicy::Zero).unwrap_err();
        assert_eq!(err.kind(), "InvalidNumericError");

        let mut record = base_record();
        record.remove("tenure");
        let err = coerce_field(&record, "tenure", NumericPolicy::Zero).unwrap_err();
        assert!(matches!(err, ChurnError::MissingField(ref f) if f == "tenure"));
    }

    #[test]
    fn test_senior_citizen_truncated() {
        let record = base_record().with("SeniorCitizen", "1.7");
        assert_eq!(coerce_field(&record, "SeniorCitizen", NumericPolicy::Zero).unwrap(), 1.0);
    }

    #[test]
    fn test_numeric_block_shape() {
        let records = vec![base_record(), base_record().with("tenure", "24")];
        let block = numeric_block(&records, NumericPolicy::Zero).unwrap();
        assert_eq!(block.dim(), (2, NUMERIC_COUNT));
        assert_eq!(block[[0, 1]], 12.0);
        assert_eq!(block[[1, 1]], 24.0);
        assert_eq!(block[[1, 3]], 845.5);
    }

    #[test]
    fn test_scaler_transform() {
        let scaler = StandardScaler {
            feature_names_in: vec!["a".into(), "b".into()],
            mean: vec![1.0, 10.0],
            scale: vec![2.0, 0.0],
            with_mean: true,
            with_std: true,
        };
        scaler.validate().unwrap();

        let out = scaler.transform(&array![[3.0, 12.0], [1.0, 10.0]]).unwrap();
        assert_eq!(out, array![[1.0, 2.0], [0.0, 0.0]]);
    }

    #[test]
    fn test_scaler_rejects_wrong_width() {
        let scaler = StandardScaler {
            feature_names_in: vec!["a".into()],
            mean: vec![0.0],
            scale: vec![1.0],
            with_mean: true,
            with_std: true,
        };
        assert!(scaler.transform(&array![[1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_scaler_validate_lengths() {
        let scaler: StandardScaler = serde_json::from_value(json!({
            "feature_names_in": ["a", "b"],
            "mean": [0.0],
            "scale": [1.0, 1.0]
        }))
        .unwrap();
        assert!(scaler.with_mean && scaler.with_std);
        assert!(scaler.validate().is_err());
    }
}
