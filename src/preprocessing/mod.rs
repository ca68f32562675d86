//! Data preprocessing for the churn pipeline.
//!
//! Transformers follow a fit/transform split: the unfitted value holds
//! configuration, fitting produces an immutable fitted value that only
//! transforms and serializes. Fitted transformers are what the inference
//! side reloads, so training and serving encode inputs identically.
//!
//! # Contents
//!
//! - [`encoding`]: string label encoding, the target encoder and the
//!   per-column [`EncoderRegistry`].
//! - [`scaling`]: [`StandardScaler`] (z-score normalization).
//! - [`pipeline`]: [`Preprocessor`], which turns a raw CSV into a
//!   [`ProcessedBundle`] of scaled train/test matrices.
//! - [`artifacts`]: flat-file reading and writing of the processed outputs.
//!
//! # Example
//!
//! ```no_run
//! use churn_predictor::config::PipelineConfig;
//! use churn_predictor::preprocessing::Preprocessor;
//!
//! let config = PipelineConfig::default();
//! let bundle = Preprocessor::new(config.clone()).run("data/raw/customer_churn.csv")?;
//! bundle.write_artifacts(&config.processed_dir)?;
//! # Ok::<(), churn_predictor::error::ChurnError>(())
//! ```

pub mod artifacts;
pub mod encoding;
pub mod pipeline;
pub mod scaling;
pub mod traits;

pub use encoding::{
    EncoderRegistry, FittedLabelEncoder, LabelEncoder, LabelEncoderParams, RegistryParams,
    TargetEncoder,
};
pub use pipeline::{Preprocessor, ProcessedBundle};
pub use scaling::{FittedStandardScaler, StandardScaler, StandardScalerConfig, StandardScalerParams};
pub use traits::{FittedTransformer, Transformer};
