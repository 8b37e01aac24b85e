//! Label Decoder - class index → human label
//!
//! Decoding is best-effort: an index the decoder does not know becomes
//! `Label::Fallback` with the stringified index, never an error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fitted label encoder: `classes[i]` is the name of class `i`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDecoder {
    pub classes: Vec<String>,
}

/// Decoded label; `Fallback` marks an index unknown to the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Known(String),
    Fallback(String),
}

impl Label {
    pub fn as_str(&self) -> &str {
        match self {
            Label::Known(s) | Label::Fallback(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Label::Known(s) | Label::Fallback(s) => s,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Label::Fallback(_))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LabelDecoder {
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("label decoder has no classes".to_string());
        }
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn decode(&self, index: i64) -> Label {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(|name| Label::Known(name.clone()))
            .unwrap_or_else(|| {
                log::debug!("Class index {} unknown to label decoder - using fallback", index);
                Label::Fallback(index.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> LabelDecoder {
        LabelDecoder {
            classes: vec!["No".to_string(), "Yes".to_string()],
        }
    }

    #[test]
    fn test_decode_known() {
        assert_eq!(decoder().decode(1), Label::Known("Yes".to_string()));
        assert_eq!(decoder().decode(0).as_str(), "No");
    }

    #[test]
    fn test_decode_fallback() {
        let label = decoder().decode(7);
        assert!(label.is_fallback());
        assert_eq!(label.as_str(), "7");

        assert_eq!(decoder().decode(-1), Label::Fallback("-1".to_string()));
    }

    #[test]
    fn test_validate_empty() {
        assert!(LabelDecoder { classes: vec![] }.validate().is_err());
    }
}
