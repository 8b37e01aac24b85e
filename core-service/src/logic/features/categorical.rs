//! Categorical Features - one-hot encoding
//!
//! Mỗi categorical field → indicator block theo vocabulary đã fit.
//! Unknown values always fail loud; `ignore` encoders are refused at load.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::layout::CATEGORICAL_FIELDS;
use crate::error::{ChurnError, ChurnResult};
use crate::logic::record::CustomerRecord;

// ============================================================================
// STRING COERCION
// ============================================================================

/// String form of a categorical value, as the training frame saw it
///
/// Numbers keep their JSON rendering (`1`, `1.5`), booleans become
/// `True`/`False`. Null counts as missing.
pub fn categorical_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        other => Some(other.to_string()),
    }
}

/// Build the string block (one Vec per record, CATEGORICAL_FIELDS order)
pub fn categorical_block(records: &[CustomerRecord]) -> ChurnResult<Vec<Vec<String>>> {
    records
        .iter()
        .map(|record| {
            CATEGORICAL_FIELDS
                .iter()
                .map(|field| {
                    record
                        .get(field)
                        .and_then(categorical_string)
                        .ok_or_else(|| ChurnError::MissingField(field.to_string()))
                })
                .collect()
        })
        .collect()
}

// ============================================================================
// ONE-HOT ENCODER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    /// Zero-fills unknown values; not accepted by `validate`
    Ignore,
}

/// Fitted one-hot encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Column names seen at fit time, in order
    pub feature_names_in: Vec<String>,
    /// Vocabulary per input column, in output order
    pub categories: Vec<Vec<String>>,
    /// Per column: index of the dropped category (if any)
    #[serde(default)]
    pub drop_idx: Option<Vec<Option<usize>>>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    pub fn n_features_in(&self) -> usize {
        self.feature_names_in.len()
    }

    fn dropped(&self, column: usize) -> Option<usize> {
        self.drop_idx.as_ref().and_then(|d| d.get(column).copied().flatten())
    }

    /// Output width of one input column
    fn block_width(&self, column: usize) -> usize {
        let n = self.categories[column].len();
        if self.dropped(column).is_some() {
            n - 1
        } else {
            n
        }
    }

    /// Total one-hot column count
    pub fn n_output_columns(&self) -> usize {
        (0..self.n_features_in()).map(|c| self.block_width(c)).sum()
    }

    /// Structural checks run once at load time
    pub fn validate(&self) -> Result<(), String> {
        if self.handle_unknown == HandleUnknown::Ignore {
            return Err("handle_unknown 'ignore' is not supported; unknown categories must fail".to_string());
        }

        if self.categories.len() != self.n_features_in() {
            return Err(format!(
                "encoder has {} input names but {} category lists",
                self.n_features_in(),
                self.categories.len()
            ));
        }

        for (name, cats) in self.feature_names_in.iter().zip(&self.categories) {
            if cats.is_empty() {
                return Err(format!("empty vocabulary for {}", name));
            }
            let mut sorted: Vec<&String> = cats.iter().collect();
            sorted.sort();
            sorted.dedup();
            if sorted.len() != cats.len() {
                return Err(format!("duplicate categories for {}", name));
            }
        }

        if let Some(drop_idx) = &self.drop_idx {
            if drop_idx.len() != self.n_features_in() {
                return Err("drop_idx length does not match input columns".to_string());
            }
            for (c, idx) in drop_idx.iter().enumerate() {
                if let Some(i) = idx {
                    if *i >= self.categories[c].len() {
                        return Err(format!("drop index {} out of range for {}", i, self.feature_names_in[c]));
                    }
                }
            }
        }

        Ok(())
    }

    /// Output column names, `{input}_{category}` per kept category
    pub fn get_feature_names_out(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_output_columns());
        for (c, (name, cats)) in self.feature_names_in.iter().zip(&self.categories).enumerate() {
            let dropped = self.dropped(c);
            for (i, cat) in cats.iter().enumerate() {
                if Some(i) != dropped {
                    names.push(format!("{}_{}", name, cat));
                }
            }
        }
        names
    }

    /// Encode one row of category strings into `out` (pre-zeroed, n_output_columns wide)
    fn encode_row(&self, values: &[String], out: &mut [f64]) -> ChurnResult<()> {
        let mut offset = 0;

        for (c, value) in values.iter().enumerate() {
            let cats = &self.categories[c];
            let dropped = self.dropped(c);

            match cats.iter().position(|cat| cat == value) {
                Some(i) if Some(i) == dropped => {}
                Some(i) => {
                    // shift past the dropped slot
                    let slot = match dropped {
                        Some(d) if i > d => i - 1,
                        _ => i,
                    };
                    out[offset + slot] = 1.0;
                }
                None => {
                    return Err(ChurnError::UnknownCategory {
                        field: self.feature_names_in[c].clone(),
                        value: value.clone(),
                    });
                }
            }

            offset += self.block_width(c);
        }

        Ok(())
    }

    /// One-hot encode an (M x n_features_in) block of strings
    pub fn transform(&self, rows: &[Vec<String>]) -> ChurnResult<Array2<f64>> {
        let width = self.n_output_columns();
        let mut out = Array2::<f64>::zeros((rows.len(), width));

        for (i, row) in rows.iter().enumerate() {
            if row.len() != self.n_features_in() {
                return Err(ChurnError::Inference(format!(
                    "encoder expects {} columns, got {}",
                    self.n_features_in(),
                    row.len()
                )));
            }
            let mut target = vec![0.0; width];
            self.encode_row(row, &mut target)?;
            for (j, v) in target.into_iter().enumerate() {
                out[[i, j]] = v;
            }
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

    fn encoder() -> OneHotEncoder {
        OneHotEncoder {
            feature_names_in: vec!["Contract".into(), "InternetService".into()],
            categories: vec![
                vec!["Month-to-month".into(), "One year".into(), "Two year".into()],
                vec!["DSL".into(), "Fiber optic".into(), "No".into()],
            ],
            drop_idx: None,
            handle_unknown: HandleUnknown::Error,
        }
    }

    fn row(a: &str, b: &str) -> Vec<String> {
        vec![a.to_string(), b.to_string()]
    }

    #[test]
    fn test_categorical_string() {
        assert_eq!(categorical_string(&json!("Yes")).as_deref(), Some("Yes"));
        assert_eq!(categorical_string(&json!(1)).as_deref(), Some("1"));
        assert_eq!(categorical_string(&json!(1.5)).as_deref(), Some("1.5"));
        assert_eq!(categorical_string(&json!(false)).as_deref(), Some("False"));
        assert_eq!(categorical_string(&Value::Null), None);
    }

    #[test]
    fn test_categorical_block_missing_field() {
        let record = CustomerRecord::new().with("gender", "Male");
        let err = categorical_block(&[record]).unwrap_err();
        assert!(matches!(err, ChurnError::MissingField(ref f) if f == "Partner"));
    }

    #[test]
    fn test_feature_names_out() {
        let names = encoder().get_feature_names_out();
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "Contract_Month-to-month");
        assert_eq!(names[4], "InternetService_Fiber optic");
    }

    #[test]
    fn test_transform() {
        let enc = encoder();
        enc.validate().unwrap();

        let out = enc.transform(&[row("One year", "No"), row("Month-to-month", "DSL")]).unwrap();
        assert_eq!(
            out,
            array![[0.0, 1.0, 0.0, 0.0, 0.0, 1.0], [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn test_unknown_category_fails_loud() {
        let err = encoder().transform(&[row("One year", "Satellite")]).unwrap_err();
        match err {
            ChurnError::UnknownCategory { field, value } => {
                assert_eq!(field, "InternetService");
                assert_eq!(value, "Satellite");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ignore_encoder_rejected() {
        let mut enc = encoder();
        enc.handle_unknown = HandleUnknown::Ignore;
        let err = enc.validate().unwrap_err();
        assert!(err.contains("handle_unknown"));

        // even if validation is skipped, unknowns never become a zero block
        let err = enc.transform(&[row("One year", "Satellite")]).unwrap_err();
        assert!(matches!(err, ChurnError::UnknownCategory { .. }));
    }

    #[test]
    fn test_drop_first() {
        let mut enc = encoder();
        enc.drop_idx = Some(vec![Some(0), None]);
        enc.validate().unwrap();

        assert_eq!(enc.n_output_columns(), 5);
        assert_eq!(enc.get_feature_names_out()[0], "Contract_One year");

        let out = enc
            .transform(&[row("Month-to-month", "DSL"), row("Two year", "No")])
            .unwrap();
        assert_eq!(out, array![[0.0, 0.0, 1.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut enc = encoder();
        enc.categories[1] = vec!["DSL".into(), "DSL".into()];
        assert!(enc.validate().is_err());
    }
}
