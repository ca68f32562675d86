use crate::model::sigmoid;
use ndarray::Array1;

/// A differentiable loss used during model training.
///
/// Implementors define the scalar loss value (for logging and convergence
/// checks) and its gradient w.r.t. the model's predictions, which is passed
/// to the model's `backward()`.
pub trait Loss {
    type Prediction;
    type Target;

    /// Mean loss over the batch.
    fn loss(&self, prediction: &Self::Prediction, target: &Self::Target) -> f64;

    /// Gradient of the mean loss w.r.t. the prediction: ∂L/∂pred.
    fn grad_wrt_prediction(
        &self,
        prediction: &Self::Prediction,
        target: &Self::Target,
    ) -> Self::Prediction;
}

/// Binary Cross-Entropy loss with logits input (numerically stable).
///
/// Computes: `L = -(t * log(σ(z)) + (1-t) * log(1 - σ(z)))`
/// using the stable formulation: `max(z,0) - z*t + log(1 + exp(-|z|))`
///
/// Gradient w.r.t. logits: `∂L/∂z = (σ(z) - t) / n`
#[derive(Clone, Copy, Debug, Default)]
pub struct BCEWithLogitsLoss;

impl Loss for BCEWithLogitsLoss {
    type Prediction = Array1<f64>;
    type Target = Array1<f64>;

    fn loss(&self, logits: &Self::Prediction, targets: &Self::Target) -> f64 {
        let n = logits.len();
        if n == 0 {
            return 0.0;
        }
        let total: f64 = logits
            .iter()
            .zip(targets.iter())
            .map(|(&z, &t)| z.max(0.0) - z * t + (-z.abs()).exp().ln_1p())
            .sum();
        total / n as f64
    }

    fn grad_wrt_prediction(&self, logits: &Self::Prediction, targets: &Self::Target) -> Self::Prediction {
        let n = logits.len().max(1) as f64;
        (logits.mapv(sigmoid) - targets) / n
    }
}
