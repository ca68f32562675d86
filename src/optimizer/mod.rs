use crate::model::{LinearParams, ParamOps};

/// Trait for gradient-based optimizers.
///
/// Training logic (`Trainer`) is decoupled from the parameter update rule,
/// so any model can be paired with any optimizer without dynamic dispatch.
pub trait Optimizer<P> {
    /// Return updated parameters; inputs are not mutated.
    fn step(&self, params: &P, gradients: &P) -> P;
}

/// Plain gradient descent: `θ ← θ - η · ∇L(θ)`.
///
/// Stateless (no momentum). Applied to full batches it is batch gradient
/// descent; with mini-batches it is SGD.
#[derive(Clone, Debug)]
pub struct SGD {
    lr: f64,
}

impl SGD {
    pub fn new(lr: f64) -> Self {
        Self { lr }
    }

    pub fn learning_rate(&self) -> f64 {
        self.lr
    }
}

impl Optimizer<LinearParams> for SGD {
    fn step(&self, params: &LinearParams, grads: &LinearParams) -> LinearParams {
        params.add(&grads.scale(-self.lr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sgd_step() {
        let params = LinearParams {
            weights: array![1.0, 2.0, 3.0],
            bias: 0.5,
        };
        let gradients = LinearParams {
            weights: array![0.5, -1.0, 0.0],
            bias: -0.25,
        };

        let updated = SGD::new(0.5).step(&params, &gradients);

        assert_eq!(updated.weights, array![0.75, 2.5, 3.0]);
        assert_eq!(updated.bias, 0.625);
    }

    #[test]
    fn test_zero_learning_rate_is_noop() {
        let params = LinearParams {
            weights: array![1.0],
            bias: 1.0,
        };
        let gradients = LinearParams {
            weights: array![10.0],
            bias: 10.0,
        };
        assert_eq!(SGD::new(0.0).step(&params, &gradients), params);
    }

    #[test]
    fn test_learning_rate_accessor() {
        assert_eq!(SGD::new(0.01).learning_rate(), 0.01);
    }
}
