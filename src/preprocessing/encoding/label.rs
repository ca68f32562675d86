//! Label encoding for one categorical column.
//!
//! Maps string labels to integer codes `0..n_classes` in sorted label order.

use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Label encoder for a single categorical column.
///
/// Classes are sorted (byte-wise string order) and each label's code is its
/// index in that order, so fitting on the same vocabulary always yields the
/// same codes regardless of row order.
///
/// # Example
/// ```
/// use churn_predictor::preprocessing::LabelEncoder;
///
/// let fitted = LabelEncoder::new("Gender").fit(&["Male", "Female", "Male"]).unwrap();
/// assert_eq!(fitted.classes(), &["Female", "Male"]);
/// assert_eq!(fitted.transform("Male").unwrap(), 1);
/// assert_eq!(fitted.inverse_transform(0).unwrap(), "Female");
/// ```
#[derive(Clone, Debug)]
pub struct LabelEncoder {
    column: String,
}

impl LabelEncoder {
    /// Create an encoder for the column called `column`.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    /// Fit the encoder to the observed labels.
    pub fn fit<S: AsRef<str>>(&self, labels: &[S]) -> Result<FittedLabelEncoder> {
        if labels.is_empty() {
            return Err(ChurnError::EmptyData(format!(
                "Cannot fit LabelEncoder for column {:?} on empty data",
                self.column
            )));
        }

        let classes: BTreeSet<&str> = labels.iter().map(AsRef::as_ref).collect();
        let classes: Vec<String> = classes.into_iter().map(str::to_string).collect();

        Ok(FittedLabelEncoder::from_sorted_classes(
            self.column.clone(),
            classes,
        ))
    }

    /// Fit and encode in one step.
    pub fn fit_transform<S: AsRef<str>>(
        &self,
        labels: &[S],
    ) -> Result<(FittedLabelEncoder, Vec<usize>)> {
        let fitted = self.fit(labels)?;
        let codes = fitted.transform_all(labels)?;
        Ok((fitted, codes))
    }
}

/// Serializable parameters for a fitted [`LabelEncoder`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoderParams {
    pub column: String,
    /// Unique classes in sorted order.
    pub classes: Vec<String>,
}

/// Fitted label encoder: a bijection between labels and codes.
#[derive(Clone, Debug)]
pub struct FittedLabelEncoder {
    column: String,
    classes: Vec<String>,
    class_to_idx: HashMap<String, usize>,
}

impl FittedLabelEncoder {
    fn from_sorted_classes(column: String, classes: Vec<String>) -> Self {
        let class_to_idx = classes
            .iter()
            .enumerate()
            .map(|(idx, class)| (class.clone(), idx))
            .collect();
        Self {
            column,
            classes,
            class_to_idx,
        }
    }

    /// Name of the encoded column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Known labels, ordered by code.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.class_to_idx.contains_key(label)
    }

    /// Code of `label`.
    ///
    /// # Errors
    /// [`ChurnError::UnknownCategory`] when the label was not seen during fit.
    pub fn transform(&self, label: &str) -> Result<usize> {
        self.class_to_idx
            .get(label)
            .copied()
            .ok_or_else(|| ChurnError::UnknownCategory {
                column: self.column.clone(),
                value: label.to_string(),
            })
    }

    /// Encode every label, failing on the first unknown one.
    pub fn transform_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.transform(l.as_ref())).collect()
    }

    /// Label of `code`.
    pub fn inverse_transform(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| ChurnError::InvalidValue {
                field: self.column.clone(),
                value: format!("code {} out of range (n_classes = {})", code, self.n_classes()),
            })
    }

    pub fn extract_params(&self) -> LabelEncoderParams {
        LabelEncoderParams {
            column: self.column.clone(),
            classes: self.classes.clone(),
        }
    }

    /// Rebuild from parameters, checking the classes are strictly sorted.
    pub fn from_params(params: LabelEncoderParams) -> Result<Self> {
        if params.classes.is_empty() {
            return Err(ChurnError::Serialization(format!(
                "encoder for column {:?} has no classes",
                params.column
            )));
        }
        if !params.classes.windows(2).all(|w| w[0] < w[1]) {
            return Err(ChurnError::Serialization(format!(
                "encoder for column {:?} has unsorted or duplicate classes",
                params.column
            )));
        }
        Ok(Self::from_sorted_classes(params.column, params.classes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_label_encoder_sorted_codes() {
        let fitted = LabelEncoder::new("Subscription Type")
            .fit(&["Standard", "Basic", "Premium", "Basic"])
            .unwrap();

        assert_eq!(fitted.n_classes(), 3);
        assert_eq!(fitted.classes(), &["Basic", "Premium", "Standard"]);
        assert_eq!(fitted.transform("Basic").unwrap(), 0);
        assert_eq!(fitted.transform("Premium").unwrap(), 1);
        assert_eq!(fitted.transform("Standard").unwrap(), 2);
    }

    #[test]
    fn test_label_encoder_codes_ignore_row_order() {
        let a = LabelEncoder::new("c").fit(&["b", "a", "c"]).unwrap();
        let b = LabelEncoder::new("c").fit(&["c", "c", "b", "a"]).unwrap();
        assert_eq!(a.classes(), b.classes());
    }

    #[test]
    fn test_label_encoder_unknown_error() {
        let fitted = LabelEncoder::new("Gender").fit(&["Male", "Female"]).unwrap();

        let err = fitted.transform("Other").unwrap_err();
        match err {
            ChurnError::UnknownCategory { column, value } => {
                assert_eq!(column, "Gender");
                assert_eq!(value, "Other");
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }

    #[test]
    fn test_label_encoder_inverse_out_of_range() {
        let fitted = LabelEncoder::new("Gender").fit(&["Male", "Female"]).unwrap();
        assert!(fitted.inverse_transform(2).is_err());
    }

    #[test]
    fn test_label_encoder_empty_data() {
        let labels: [&str; 0] = [];
        assert!(matches!(
            LabelEncoder::new("Gender").fit(&labels),
            Err(ChurnError::EmptyData(_))
        ));
    }

    #[test]
    fn test_fit_transform() {
        let (fitted, codes) = LabelEncoder::new("Contract Length")
            .fit_transform(&["Monthly", "Annual", "Quarterly", "Monthly"])
            .unwrap();
        assert_eq!(fitted.classes(), &["Annual", "Monthly", "Quarterly"]);
        assert_eq!(codes, vec![1, 0, 2, 1]);
    }

    #[test]
    fn test_params_roundtrip() {
        let fitted = LabelEncoder::new("Gender").fit(&["Male", "Female"]).unwrap();
        let restored = FittedLabelEncoder::from_params(fitted.extract_params()).unwrap();

        assert_eq!(restored.column(), "Gender");
        assert_eq!(restored.classes(), fitted.classes());
        assert_eq!(restored.transform("Male").unwrap(), 1);
    }

    #[test]
    fn test_from_params_rejects_unsorted() {
        let params = LabelEncoderParams {
            column: "Gender".into(),
            classes: vec!["Male".into(), "Female".into()],
        };
        assert!(FittedLabelEncoder::from_params(params).is_err());
    }

    proptest! {
        #[test]
        fn prop_decode_encode_roundtrip(labels in prop::collection::vec("[A-Za-z ]{0,12}", 1..40)) {
            let fitted = LabelEncoder::new("col").fit(labels.as_slice()).unwrap();
            for label in &labels {
                let code = fitted.transform(label).unwrap();
                prop_assert!(code < fitted.n_classes());
                prop_assert_eq!(fitted.inverse_transform(code).unwrap(), label.as_str());
            }
        }
    }
}
