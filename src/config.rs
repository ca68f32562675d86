//! Pipeline configuration.
//!
//! All stages read their paths and hyperparameters from one
//! [`PipelineConfig`]. Defaults reproduce the stock layout (`data/raw`,
//! `data/processed`, `models`); a YAML file can override any field.
//!
//! ```yaml
//! target_column: Churn
//! test_size: 0.2
//! seed: 42
//! training:
//!   max_iter: 1000
//!   learning_rate: 0.5
//! ```

use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kaggle download endpoint for the customer churn dataset.
pub const DEFAULT_DATASET_URL: &str =
    "https://www.kaggle.com/api/v1/datasets/download/muhammadshahidazeem/customer-churn-dataset";

pub const X_TRAIN_FILE: &str = "X_train.csv";
pub const X_TEST_FILE: &str = "X_test.csv";
pub const Y_TRAIN_FILE: &str = "y_train.csv";
pub const Y_TEST_FILE: &str = "y_test.csv";
pub const FEATURE_NAMES_FILE: &str = "feature_names.csv";
pub const ENCODERS_FILE: &str = "label_encoders.bin";
pub const SCALER_FILE: &str = "scaler.bin";
pub const MODEL_FILE: &str = "churn_model.bin";
pub const METRICS_FILE: &str = "metrics.json";

/// Hyperparameters of the logistic-regression fit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Iteration cap; hitting it without converging is reported, not fatal.
    pub max_iter: usize,
    /// Stop once the mean loss changes by less than this between iterations.
    pub tol: f64,
    /// Gradient descent step size.
    pub learning_rate: f64,
    /// Inverse regularization strength (larger = weaker L2 penalty).
    pub c: f64,
    /// Mini-batch size; `None` trains on the full batch.
    pub batch_size: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.5,
            c: 1.0,
            batch_size: None,
        }
    }
}

/// Paths, column names and split parameters shared by every stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the downloaded CSV.
    pub raw_dir: PathBuf,
    /// Directory receiving the processed matrices and fitted transformers.
    pub processed_dir: PathBuf,
    /// Directory receiving the trained model and its metrics.
    pub model_dir: PathBuf,
    /// Source of the raw dataset.
    pub dataset_url: String,
    /// Binary outcome column.
    pub target_column: String,
    /// Columns whose lowercase name contains this marker are dropped.
    pub id_marker: String,
    /// Fraction of each class held out for evaluation.
    pub test_size: f64,
    /// Seed for the stratified shuffle.
    pub seed: u64,
    pub training: TrainingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            model_dir: PathBuf::from("models"),
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            target_column: "Churn".to_string(),
            id_marker: "id".to_string(),
            test_size: 0.2,
            seed: 42,
            training: TrainingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a YAML file and validate it.
    ///
    /// Fields absent from the file keep their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChurnError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse a configuration from YAML text and validate it.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(content)
            .map_err(|e| ChurnError::Config(format!("Failed to parse YAML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ChurnError::Config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.target_column.trim().is_empty() {
            return Err(ChurnError::Config("target_column must not be empty".into()));
        }
        if self.training.max_iter == 0 {
            return Err(ChurnError::Config("training.max_iter must be positive".into()));
        }
        if !(self.training.learning_rate > 0.0) {
            return Err(ChurnError::Config(format!(
                "training.learning_rate must be positive, got {}",
                self.training.learning_rate
            )));
        }
        if !(self.training.c > 0.0) {
            return Err(ChurnError::Config(format!(
                "training.c must be positive, got {}",
                self.training.c
            )));
        }
        if self.training.batch_size == Some(0) {
            return Err(ChurnError::Config("training.batch_size must be positive".into()));
        }
        Ok(())
    }

    pub fn x_train_path(&self) -> PathBuf {
        self.processed_dir.join(X_TRAIN_FILE)
    }

    pub fn x_test_path(&self) -> PathBuf {
        self.processed_dir.join(X_TEST_FILE)
    }

    pub fn y_train_path(&self) -> PathBuf {
        self.processed_dir.join(Y_TRAIN_FILE)
    }

    pub fn y_test_path(&self) -> PathBuf {
        self.processed_dir.join(Y_TEST_FILE)
    }

    pub fn feature_names_path(&self) -> PathBuf {
        self.processed_dir.join(FEATURE_NAMES_FILE)
    }

    pub fn encoders_path(&self) -> PathBuf {
        self.processed_dir.join(ENCODERS_FILE)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.processed_dir.join(SCALER_FILE)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.model_dir.join(METRICS_FILE)
    }
}
