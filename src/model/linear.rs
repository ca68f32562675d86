//! Logistic regression with compile-time state tracking.
//!
//! - [`LogisticRegression`] = `LogisticModel<Unfitted>`, used during training.
//! - [`LogisticModel<Fitted>`], the inference-only, serializable classifier.
//!
//! The fitted model is free from training hyperparameters: the trainer owns
//! the loss, optimizer and regularizer, and hands back only weights and bias.

use crate::error::{ChurnError, Result};
use crate::model::{Fitted, InferenceModel, ParamOps, TrainableModel, Unfitted};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Probability threshold; a probability exactly at it maps to label 0.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Trainable parameters of a linear model: weights and bias.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearParams {
    pub weights: Array1<f64>,
    pub bias: f64,
}

impl LinearParams {
    pub fn zeros(n_features: usize) -> Self {
        Self {
            weights: Array1::zeros(n_features),
            bias: 0.0,
        }
    }
}

impl ParamOps for LinearParams {
    fn add(&self, other: &Self) -> Self {
        Self {
            weights: &self.weights + &other.weights,
            bias: self.bias + other.bias,
        }
    }

    fn scale(&self, factor: f64) -> Self {
        Self {
            weights: &self.weights * factor,
            bias: self.bias * factor,
        }
    }
}

/// Serializable representation of linear model parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializableLinearParams {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl From<&LinearParams> for SerializableLinearParams {
    fn from(params: &LinearParams) -> Self {
        Self {
            weights: params.weights.to_vec(),
            bias: params.bias,
        }
    }
}

impl TryFrom<SerializableLinearParams> for LinearParams {
    type Error = ChurnError;

    fn try_from(value: SerializableLinearParams) -> Result<Self> {
        if value.weights.is_empty() {
            return Err(ChurnError::Serialization(
                "model has no weights".to_string(),
            ));
        }
        if !value.bias.is_finite() || value.weights.iter().any(|w| !w.is_finite()) {
            return Err(ChurnError::Serialization(
                "model parameters are not finite".to_string(),
            ));
        }
        Ok(Self {
            weights: Array1::from(value.weights),
            bias: value.bias,
        })
    }
}

/// A logistic model with state encoded at the type level.
///
/// - When `S = Unfitted`: implements [`TrainableModel`].
/// - When `S = Fitted`: implements [`InferenceModel`].
///
/// Calling `predict()` on an untrained model does not compile.
#[derive(Clone, Debug)]
pub struct LogisticModel<S> {
    params: LinearParams,
    _state: PhantomData<S>,
}

/// Alias for an **unfitted** logistic regression model.
pub type LogisticRegression = LogisticModel<Unfitted>;

impl<S> LogisticModel<S> {
    pub fn n_features(&self) -> usize {
        self.params.weights.len()
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.params.weights
    }

    pub fn bias(&self) -> f64 {
        self.params.bias
    }
}

impl LogisticRegression {
    /// Zero-initialized model over `n_features` inputs.
    pub fn new(n_features: usize) -> Self {
        Self::from_params(LinearParams::zeros(n_features))
    }

    /// Constructs a model from explicit parameters (warm start, tests).
    pub fn from_params(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }
}

/// Forward pass produces logits `X @ w + b`.
///
/// Backward pass: `∇w = Xᵀ · grad`, `∇b = Σ grad`.
impl TrainableModel for LogisticModel<Unfitted> {
    type Input = Array2<f64>;
    type Prediction = Array1<f64>;
    type Params = LinearParams;
    type Gradients = LinearParams;
    type Output = LogisticModel<Fitted>;

    fn forward(&self, x: &Self::Input) -> Self::Prediction {
        x.dot(&self.params.weights) + self.params.bias
    }

    fn backward(&self, x: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients {
        LinearParams {
            weights: x.t().dot(grad_output),
            bias: grad_output.sum(),
        }
    }

    fn params(&self) -> &Self::Params {
        &self.params
    }

    fn update_params(&mut self, params: &Self::Params) {
        self.params = params.clone();
    }

    fn into_fitted(self) -> LogisticModel<Fitted> {
        LogisticModel::<Fitted>::new(self.params)
    }
}

impl LogisticModel<Fitted> {
    pub fn new(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    /// Raw score `w · x + b` of one sample.
    pub fn decision_function(&self, x: &Array1<f64>) -> f64 {
        self.params.weights.dot(x) + self.params.bias
    }

    /// Probability of the positive class for one sample.
    pub fn predict_proba(&self, x: &Array1<f64>) -> f64 {
        sigmoid(self.decision_function(x))
    }

    /// `1` iff the positive-class probability exceeds 0.5.
    pub fn predict_label(&self, x: &Array1<f64>) -> u8 {
        u8::from(self.predict_proba(x) > DECISION_THRESHOLD)
    }

    /// Hard `0.0`/`1.0` labels for every row of `x`.
    pub fn predict_labels(&self, x: &Array2<f64>) -> Array1<f64> {
        self.predict_batch(x)
            .mapv(|p| if p > DECISION_THRESHOLD { 1.0 } else { 0.0 })
    }
}

/// Single and batch prediction return positive-class probabilities.
impl InferenceModel for LogisticModel<Fitted> {
    type InputSingle = Array1<f64>;
    type OutputSingle = f64;
    type InputBatch = Array2<f64>;
    type OutputBatch = Array1<f64>;
    type ParamsRepr = SerializableLinearParams;

    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle {
        self.predict_proba(input)
    }

    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch {
        (input.dot(&self.params.weights) + self.params.bias).mapv(sigmoid)
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        (&self.params).into()
    }

    fn from_params(params: Self::ParamsRepr) -> Result<Self> {
        Ok(Self::new(LinearParams::try_from(params)?))
    }
}
