use crate::model::{LinearParams, LogisticRegression, TrainableModel};
use ndarray::Array1;

/// Penalty term added to the training objective.
pub trait Regularizer<M: TrainableModel> {
    /// Penalty value and its gradient w.r.t. the model parameters.
    fn regularizer_penalty_grad(&self, model: &M) -> (f64, M::Gradients);
}

/// Squared L2 penalty on the weights, `λ · ‖w‖²`. The bias is not penalized.
#[derive(Clone, Debug)]
pub struct L2 {
    lambda: f64,
}

impl L2 {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }

    /// Penalty equivalent to an inverse regularization strength `c` over
    /// `n_samples` rows: minimizing `mean loss + ‖w‖² / (2·c·n)` is the same
    /// problem as `½‖w‖² + c · Σ loss`.
    pub fn from_inverse_strength(c: f64, n_samples: usize) -> Self {
        Self::new(1.0 / (2.0 * c * n_samples.max(1) as f64))
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl Regularizer<LogisticRegression> for L2 {
    fn regularizer_penalty_grad(&self, model: &LogisticRegression) -> (f64, LinearParams) {
        let params = model.params();
        let penalty = self.lambda * params.weights.dot(&params.weights);
        let grad = LinearParams {
            weights: &params.weights * (2.0 * self.lambda),
            bias: 0.0,
        };
        (penalty, grad)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoRegularizer;

impl Regularizer<LogisticRegression> for NoRegularizer {
    fn regularizer_penalty_grad(&self, model: &LogisticRegression) -> (f64, LinearParams) {
        let grad = LinearParams {
            weights: Array1::zeros(model.params().weights.len()),
            bias: 0.0,
        };
        (0.0, grad)
    }
}
