//! # churn-predictor
//!
//! Customer churn prediction from a tabular dataset, from raw CSV to a
//! terminal form that scores one customer at a time.
//!
//! ## Core Design Principles
//!
//! - **One encoding, two consumers**: the encoder registry, feature order and
//!   scaler are fitted once by preprocessing, persisted, and reloaded verbatim
//!   by inference. Serving never refits anything.
//! - **Stateful Type Safety**: models carry their training state in the type
//!   system (`Unfitted` vs `Fitted`); only fitted models predict or serialize.
//! - **Training/Inference Separation**: the fitted model holds weights and
//!   bias only; loss, optimizer and regularizer live in the trainer.
//! - **No leakage**: category vocabularies and scaling statistics come from
//!   the training partition alone.
//!
//! ## Quick Start
//!
//! ```no_run
//! use churn_predictor::config::PipelineConfig;
//! use churn_predictor::inference::{FieldValue, Fields, InferenceContext};
//! use churn_predictor::preprocessing::Preprocessor;
//! use churn_predictor::trainer::train_from_artifacts;
//!
//! let config = PipelineConfig::default();
//! Preprocessor::new(config.clone())
//!     .run("data/raw/customer_churn.csv")?
//!     .write_artifacts(&config.processed_dir)?;
//! let summary = train_from_artifacts(&config)?;
//! println!("{}", summary.report);
//!
//! let ctx = InferenceContext::load(&config)?;
//! let mut fields = Fields::new();
//! fields.insert("Gender".into(), FieldValue::from("Male"));
//! fields.insert("Age".into(), FieldValue::from(40.0));
//! // ... every other feature in ctx.feature_order()
//! let prediction = ctx.predict(&fields)?;
//! println!("{}", prediction);
//! # Ok::<(), churn_predictor::error::ChurnError>(())
//! ```
//!
//! ## Module Structure
//!
//! - `config`: Paths, column names and hyperparameters (YAML-loadable)
//! - `fetch`: Dataset download and archive extraction
//! - `dataset`: Raw CSV frames, stratified splitting, batching
//! - `preprocessing`: Label encoding, scaling, the preprocessing pipeline
//! - `model`: Logistic regression with stateful type parameters
//! - `loss`, `optimizer`, `regularizers`: Training components
//! - `trainer`: Training loop, evaluation and the train stage
//! - `metrics`: Confusion matrix and classification report
//! - `inference`: Loaded serving context and single predictions
//! - `form`: Interactive terminal form

/// Pipeline configuration.
pub mod config;

/// Data loading utilities and dataset abstractions.
pub mod dataset;

/// Error taxonomy shared by every stage.
pub mod error;

/// Dataset acquisition over HTTP.
pub mod fetch;

/// Interactive prediction form.
pub mod form;

/// Serving-side feature encoding and prediction.
pub mod inference;

/// Differentiable loss functions for model training.
pub mod loss;

/// Classification metrics.
pub mod metrics;

/// Machine learning models with compile-time state safety.
pub mod model;

/// Optimization algorithms for parameter updates.
pub mod optimizer;

/// Data preprocessing transformers and the preprocessing pipeline.
pub mod preprocessing;

/// Weight regularization strategies to prevent overfitting.
pub mod regularizers;

/// Binary persistence of fitted parameters.
pub mod serialization;

/// High-level training loop orchestration.
pub mod trainer;

pub use config::PipelineConfig;
pub use error::{ChurnError, Result};
pub use inference::{FieldValue, Fields, InferenceContext, Prediction};
pub use preprocessing::{Preprocessor, ProcessedBundle};
pub use trainer::{train_from_artifacts, TrainingSummary};
