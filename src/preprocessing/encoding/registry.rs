//! The feature encoder registry shared by training and inference.

use crate::dataset::RawFrame;
use crate::error::{ChurnError, Result};
use crate::preprocessing::encoding::label::{FittedLabelEncoder, LabelEncoder, LabelEncoderParams};
use crate::serialization::SerializableParams;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One fitted [`LabelEncoder`] per categorical column.
///
/// Produced once by the preprocessing pipeline, persisted verbatim, and
/// reloaded read-only for serving. It is never refitted at inference time.
#[derive(Clone, Debug, Default)]
pub struct EncoderRegistry {
    encoders: BTreeMap<String, FittedLabelEncoder>,
}

/// Serializable form of an [`EncoderRegistry`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryParams {
    pub encoders: Vec<LabelEncoderParams>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit one encoder per named column on the rows of `frame`.
    pub fn fit(frame: &RawFrame, columns: &[String]) -> Result<Self> {
        let mut registry = Self::new();
        for column in columns {
            let values = frame.column(column)?;
            let encoder = LabelEncoder::new(column.as_str()).fit(values.as_slice())?;
            registry.insert(encoder);
        }
        Ok(registry)
    }

    /// Add or replace the encoder for its column.
    pub fn insert(&mut self, encoder: FittedLabelEncoder) {
        self.encoders.insert(encoder.column().to_string(), encoder);
    }

    pub fn get(&self, column: &str) -> Option<&FittedLabelEncoder> {
        self.encoders.get(column)
    }

    /// Whether `column` is categorical (has an encoder).
    pub fn contains(&self, column: &str) -> bool {
        self.encoders.contains_key(column)
    }

    /// Encoded column names, sorted.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Ordered labels of `column`, used to populate selectors.
    pub fn classes(&self, column: &str) -> Option<&[String]> {
        self.get(column).map(FittedLabelEncoder::classes)
    }

    /// Code of `label` in `column`.
    pub fn encode(&self, column: &str, label: &str) -> Result<usize> {
        self.encoder(column)?.transform(label)
    }

    /// Label of `code` in `column`.
    pub fn decode(&self, column: &str, code: usize) -> Result<&str> {
        self.encoder(column)?.inverse_transform(code)
    }

    fn encoder(&self, column: &str) -> Result<&FittedLabelEncoder> {
        self.get(column)
            .ok_or_else(|| ChurnError::MissingColumn(column.to_string()))
    }

    pub fn extract_params(&self) -> RegistryParams {
        RegistryParams {
            encoders: self
                .encoders
                .values()
                .map(FittedLabelEncoder::extract_params)
                .collect(),
        }
    }

    pub fn from_params(params: RegistryParams) -> Result<Self> {
        let mut registry = Self::new();
        for encoder in params.encoders {
            registry.insert(FittedLabelEncoder::from_params(encoder)?);
        }
        Ok(registry)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.extract_params().save_to_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_params(RegistryParams::load_from_file(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> RawFrame {
        RawFrame::from_reader(
            "Gender,Age,Contract Length\nMale,30,Monthly\nFemale,41,Annual\nMale,25,Quarterly\n"
                .as_bytes(),
        )
        .unwrap()
    }

    fn registry() -> EncoderRegistry {
        EncoderRegistry::fit(
            &frame(),
            &["Gender".to_string(), "Contract Length".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_fit_only_named_columns() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("Gender"));
        assert!(!registry.contains("Age"));
        assert_eq!(
            registry.columns().collect::<Vec<_>>(),
            vec!["Contract Length", "Gender"]
        );
    }

    #[test]
    fn test_encode_decode() {
        let registry = registry();
        assert_eq!(registry.encode("Gender", "Female").unwrap(), 0);
        assert_eq!(registry.encode("Gender", "Male").unwrap(), 1);
        assert_eq!(registry.decode("Contract Length", 2).unwrap(), "Quarterly");
        assert_eq!(
            registry.classes("Contract Length").unwrap(),
            &["Annual", "Monthly", "Quarterly"]
        );
    }

    #[test]
    fn test_encode_unknown_category() {
        let registry = registry();
        assert!(matches!(
            registry.encode("Gender", "Other"),
            Err(ChurnError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_encode_unregistered_column() {
        let registry = registry();
        assert!(matches!(
            registry.encode("Age", "30"),
            Err(ChurnError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_fit_missing_column() {
        let result = EncoderRegistry::fit(&frame(), &["Tenure".to_string()]);
        assert!(matches!(result, Err(ChurnError::MissingColumn(_))));
    }

    #[test]
    fn test_save_load_verbatim() {
        let registry = registry();
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("label_encoders.bin");

        registry.save_to_file(&path).unwrap();
        let loaded = EncoderRegistry::load_from_file(&path).unwrap();

        assert_eq!(loaded.extract_params(), registry.extract_params());
        assert_eq!(loaded.encode("Gender", "Male").unwrap(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let result = EncoderRegistry::load_from_file(tmp.path().join("absent.bin"));
        assert!(matches!(result, Err(ChurnError::MissingArtifact { .. })));
    }
}
