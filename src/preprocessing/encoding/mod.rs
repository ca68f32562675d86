//! Categorical encoding.
//!
//! - [`LabelEncoder`]: string labels of one feature column to integer codes,
//!   assigned in sorted label order.
//! - [`TargetEncoder`]: the binary outcome column to `{0, 1}`.
//! - [`EncoderRegistry`]: every fitted feature encoder, keyed by column name;
//!   this is the artifact serving reloads to encode form inputs.
//!
//! Unknown categories are always an error
//! ([`crate::error::ChurnError::UnknownCategory`]); there is no silent
//! fallback code.

mod label;
mod registry;
mod target;

pub use label::{FittedLabelEncoder, LabelEncoder, LabelEncoderParams};
pub use registry::{EncoderRegistry, RegistryParams};
pub use target::TargetEncoder;
