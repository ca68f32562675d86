//! Error types for the churn pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by preprocessing, training and inference.
#[derive(Debug, Error)]
pub enum ChurnError {
    /// A raw, processed or model artifact is absent.
    #[error("Missing artifact: {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// The target column holds a value outside the accepted vocabulary.
    #[error("Unrecognized label {value:?} in target column {column:?}")]
    UnrecognizedLabel { column: String, value: String },

    /// A categorical value was never seen when the encoder was fitted.
    #[error("Unknown category {value:?} for column {column:?}")]
    UnknownCategory { column: String, value: String },

    /// An inference request lacks a value for a feature.
    #[error("Missing value for field {0:?}")]
    MissingField(String),

    /// A value could not be interpreted for its field.
    #[error("Invalid value {value:?} for field {field:?}")]
    InvalidValue { field: String, value: String },

    /// A column required by the pipeline is not in the dataset.
    #[error("Column not found: {0}")]
    MissingColumn(String),

    /// Feature dimension or ordering disagrees with the recorded feature order.
    #[error("Feature mismatch: expected {expected}, got {got}")]
    FeatureMismatch { expected: String, got: String },

    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A dataset could not produce a batch.
    #[error("Data error: {0}")]
    Data(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dataset acquisition failed.
    #[error("Download error: {0}")]
    Download(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization of a binary artifact failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for ChurnError {
    fn from(err: bincode::Error) -> Self {
        ChurnError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ChurnError {
    fn from(err: serde_json::Error) -> Self {
        ChurnError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ChurnError {
    fn from(err: reqwest::Error) -> Self {
        ChurnError::Download(err.to_string())
    }
}

impl From<zip::result::ZipError> for ChurnError {
    fn from(err: zip::result::ZipError) -> Self {
        ChurnError::Download(format!("invalid archive: {}", err))
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ChurnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_artifact() {
        let err = ChurnError::MissingArtifact {
            path: PathBuf::from("models/churn_model.bin"),
        };
        assert!(err.to_string().contains("Missing artifact"));
        assert!(err.to_string().contains("churn_model.bin"));
    }

    #[test]
    fn test_error_display_unknown_category() {
        let err = ChurnError::UnknownCategory {
            column: "Gender".to_string(),
            value: "Other".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Unknown category"));
        assert!(msg.contains("Other"));
        assert!(msg.contains("Gender"));
    }

    #[test]
    fn test_error_display_unrecognized_label() {
        let err = ChurnError::UnrecognizedLabel {
            column: "Churn".to_string(),
            value: "Maybe".to_string(),
        };
        assert!(err.to_string().contains("Unrecognized label"));
    }

    #[test]
    fn test_error_display_feature_mismatch() {
        let err = ChurnError::FeatureMismatch {
            expected: "3 features".to_string(),
            got: "2 features".to_string(),
        };
        assert!(err.to_string().contains("Feature mismatch"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: ChurnError = io_err.into();
        assert!(matches!(err, ChurnError::Io(_)));
    }

    #[test]
    fn test_error_from_bincode_error() {
        let bad_bytes: &[u8] = &[0xff, 0xff, 0xff, 0xff];
        let result: std::result::Result<String, bincode::Error> = bincode::deserialize(bad_bytes);
        if let Err(e) = result {
            let err: ChurnError = e.into();
            assert!(matches!(err, ChurnError::Serialization(_)));
        }
    }

    #[test]
    fn test_error_is_std_error() {
        let err = ChurnError::EmptyData("no rows".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
