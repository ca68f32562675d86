pub mod linear;
pub mod state;

pub use linear::{sigmoid, LinearParams, LogisticModel, LogisticRegression, SerializableLinearParams};
pub use state::{Fitted, Unfitted};

use crate::error::Result;
use crate::serialization::SerializableParams;
use std::path::Path;

/// Training-side view of a model: forward pass, gradients and parameters.
pub trait TrainableModel {
    type Input;
    type Prediction;
    type Params;
    type Gradients;
    type Output;

    fn forward(&self, input: &Self::Input) -> Self::Prediction;
    fn backward(&self, input: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients;
    fn params(&self) -> &Self::Params;
    fn update_params(&mut self, new_params: &Self::Params);

    fn into_fitted(self) -> Self::Output;
}

/// Arithmetic the optimizer needs on parameter sets.
pub trait ParamOps: Clone {
    fn add(&self, other: &Self) -> Self;
    fn scale(&self, factor: f64) -> Self;
}

/// Inference-side view of a trained model.
pub trait InferenceModel: Sized {
    type InputSingle;
    type OutputSingle;
    type InputBatch;
    type OutputBatch;
    type ParamsRepr: SerializableParams;

    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle;
    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch;

    fn extract_params(&self) -> Self::ParamsRepr;
    fn from_params(params: Self::ParamsRepr) -> Result<Self>;

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.extract_params().save_to_file(path)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_params(Self::ParamsRepr::load_from_file(path)?)
    }
}
