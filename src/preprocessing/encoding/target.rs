//! Binary target encoding.

use crate::error::{ChurnError, Result};

/// Maps the outcome column to `{0, 1}`.
///
/// Textual labels (`"Yes"`/`"No"` by default) are matched exactly.
/// Columns already stored as numbers pass through when they hold 0 or 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetEncoder {
    positive: String,
    negative: String,
}

impl Default for TargetEncoder {
    fn default() -> Self {
        Self::new("Yes", "No")
    }
}

impl TargetEncoder {
    pub fn new(positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    /// Encode one target cell.
    ///
    /// # Errors
    /// [`ChurnError::UnrecognizedLabel`] for anything outside the vocabulary.
    pub fn encode(&self, column: &str, value: &str) -> Result<u8> {
        if value == self.positive {
            return Ok(1);
        }
        if value == self.negative {
            return Ok(0);
        }
        match value.parse::<f64>() {
            Ok(v) if v == 1.0 => Ok(1),
            Ok(v) if v == 0.0 => Ok(0),
            _ => Err(ChurnError::UnrecognizedLabel {
                column: column.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Encode a whole column, failing on the first unrecognized value.
    pub fn encode_column<S: AsRef<str>>(&self, column: &str, values: &[S]) -> Result<Vec<u8>> {
        values
            .iter()
            .map(|v| self.encode(column, v.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textual_labels() {
        let enc = TargetEncoder::default();
        assert_eq!(enc.encode("Churn", "Yes").unwrap(), 1);
        assert_eq!(enc.encode("Churn", "No").unwrap(), 0);
    }

    #[test]
    fn test_numeric_labels() {
        let enc = TargetEncoder::default();
        assert_eq!(enc.encode("Churn", "1").unwrap(), 1);
        assert_eq!(enc.encode("Churn", "0.0").unwrap(), 0);
        assert_eq!(enc.encode("Churn", "1.0").unwrap(), 1);
    }

    #[test]
    fn test_unrecognized_label() {
        let enc = TargetEncoder::default();
        for bad in ["Maybe", "yes", "2", ""] {
            assert!(
                matches!(
                    enc.encode("Churn", bad),
                    Err(ChurnError::UnrecognizedLabel { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_encode_column() {
        let enc = TargetEncoder::default();
        assert_eq!(
            enc.encode_column("Churn", &["Yes", "No", "No"]).unwrap(),
            vec![1, 0, 0]
        );
        assert!(enc.encode_column("Churn", &["Yes", "Unknown"]).is_err());
    }

    #[test]
    fn test_custom_vocabulary() {
        let enc = TargetEncoder::new("Churned", "Stayed");
        assert_eq!(enc.encode("Status", "Churned").unwrap(), 1);
        assert!(enc.encode("Status", "Yes").is_err());
    }
}
