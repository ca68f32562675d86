//! Core traits for preprocessing transformers.
//!
//! - [`Transformer`]: configuration only; learns parameters in `fit`.
//! - [`FittedTransformer`]: learned parameters; transforms and serializes.

use crate::error::Result;
use crate::serialization::SerializableParams;
use std::path::Path;

/// Unfitted transformer holding hyperparameters.
///
/// # Example
/// ```
/// use churn_predictor::preprocessing::{FittedTransformer, StandardScaler, Transformer};
/// use ndarray::array;
///
/// let data = array![[0.0, 1.0], [2.0, 3.0]];
/// let fitted = StandardScaler::new().fit(&data).unwrap();
/// let scaled = fitted.transform(&data).unwrap();
/// assert_eq!(scaled.dim(), (2, 2));
/// ```
pub trait Transformer: Clone {
    /// Input data type for transformation.
    type Input;
    /// Output data type after transformation.
    type Output;
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;
    /// The fitted transformer type.
    type Fitted: FittedTransformer<Params = Self::Params, Input = Self::Input, Output = Self::Output>;

    /// Learn parameters from training data.
    ///
    /// # Errors
    /// Returns an error when the data is empty or contains non-finite values.
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted>;

    /// Fit and transform the same data in one step.
    fn fit_transform(&self, data: &Self::Input) -> Result<Self::Output> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// Fitted transformer ready for inference.
///
/// `extract_params()` followed by `from_params()` is a round-trip, so a
/// transformer saved after training behaves identically once reloaded.
pub trait FittedTransformer: Clone {
    /// Input data type for transformation.
    type Input;
    /// Output data type after transformation.
    type Output;
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Transform data using the learned parameters.
    ///
    /// # Errors
    /// Returns [`crate::error::ChurnError::FeatureMismatch`] when the input
    /// width differs from the width seen during fit.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output>;

    /// Reverse the transformation.
    fn inverse_transform(&self, data: &Self::Output) -> Result<Self::Input>;

    /// Extract learned parameters as a serializable value.
    fn extract_params(&self) -> Self::Params;

    /// Rebuild a fitted transformer from parameters.
    fn from_params(params: Self::Params) -> Result<Self>
    where
        Self: Sized;

    /// Number of features seen during fit.
    fn n_features_in(&self) -> usize;

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.extract_params().save_to_file(path)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>
    where
        Self: Sized,
    {
        let params = Self::Params::load_from_file(path)?;
        Self::from_params(params)
    }
}
