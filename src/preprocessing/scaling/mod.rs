//! Feature scaling.
//!
//! Only z-score standardization is needed by the churn model; the scaler is
//! fitted on the training partition and persisted next to the encoders.

mod standard;

pub use standard::{FittedStandardScaler, StandardScaler, StandardScalerConfig, StandardScalerParams};
