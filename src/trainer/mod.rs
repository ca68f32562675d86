use crate::{
    config::PipelineConfig,
    dataset::{Dataset, InMemoryDataset},
    error::{ChurnError, Result},
    loss::{BCEWithLogitsLoss, Loss},
    metrics::ClassificationReport,
    model::{Fitted, InferenceModel, LogisticModel, LogisticRegression, ParamOps, TrainableModel},
    optimizer::{Optimizer, SGD},
    preprocessing::ProcessedBundle,
    regularizers::{Regularizer, L2},
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Orchestrates the training loop for a `TrainableModel`.
///
/// Combines a loss function, optimizer, and regularizer to fit a model on a dataset.
/// Once built via `TrainerBuilder`, it is immutable and can be reused across
/// multiple models of the same type.
pub struct Trainer<L, O, M, P, R>
where
    L: Loss,
    M: TrainableModel<Params = P, Gradients = P>,
    O: Optimizer<P>,
    R: Regularizer<M>,
{
    pub(crate) batch_size: Option<usize>,
    pub(crate) max_iter: usize,
    pub(crate) tol: f64,
    pub(crate) loss_fn: L,
    pub(crate) optimizer: O,
    pub(crate) regularizer: R,
    _phantom_model: PhantomData<M>,
    _phantom_params: PhantomData<P>,
}

/// Fluent builder for constructing a `Trainer` with custom hyperparameters.
///
/// Defaults:
/// - `batch_size`: `None` (full batch)
/// - `max_iter`: 1000
/// - `tol`: 1e-6
pub struct TrainerBuilder<L, O, M, P, R>
where
    L: Loss,
    M: TrainableModel<Params = P, Gradients = P>,
    O: Optimizer<P>,
    R: Regularizer<M>,
{
    batch_size: Option<usize>,
    max_iter: usize,
    tol: f64,
    loss_fn: L,
    optimizer: O,
    regularizer: R,
    _phantom_model: PhantomData<M>,
    _phantom_params: PhantomData<P>,
}

impl<L, O, M, P, R> TrainerBuilder<L, O, M, P, R>
where
    L: Loss,
    M: TrainableModel<Params = P, Gradients = P>,
    O: Optimizer<P>,
    R: Regularizer<M>,
{
    /// Creates a new `TrainerBuilder` with the given components.
    ///
    /// # Arguments
    /// * `loss_fn`: differentiable loss (e.g., `BCEWithLogitsLoss`)
    /// * `optimizer`: parameter updater (e.g., `SGD`)
    /// * `regularizer`: penalty term (`L2` or `NoRegularizer`)
    pub fn new(loss_fn: L, optimizer: O, regularizer: R) -> Self {
        Self {
            batch_size: None,
            max_iter: 1000,
            tol: 1e-6,
            loss_fn,
            optimizer,
            regularizer,
            _phantom_model: PhantomData,
            _phantom_params: PhantomData,
        }
    }

    /// Mini-batch size; `None` uses the whole dataset per iteration.
    pub fn batch_size(mut self, size: Option<usize>) -> Self {
        self.batch_size = size;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Convergence tolerance on the change of the mean loss.
    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn build(self) -> Trainer<L, O, M, P, R> {
        Trainer {
            batch_size: self.batch_size,
            max_iter: self.max_iter,
            tol: self.tol,
            loss_fn: self.loss_fn,
            optimizer: self.optimizer,
            regularizer: self.regularizer,
            _phantom_model: PhantomData,
            _phantom_params: PhantomData,
        }
    }
}

/// Result of [`Trainer::fit`].
///
/// A run that hits `max_iter` before converging still returns its model;
/// `converged` is then `false` and a convergence warning has been logged.
#[derive(Debug, Clone)]
pub struct TrainingOutcome<F> {
    pub model: F,
    pub iterations: usize,
    pub final_loss: f64,
    pub converged: bool,
}

impl<L, O, M, P, R> Trainer<L, O, M, P, R>
where
    L: Loss<Target = Array1<f64>, Prediction = Array1<f64>>,
    M: TrainableModel<Input = Array2<f64>, Prediction = Array1<f64>, Params = P, Gradients = P>,
    O: Optimizer<P>,
    R: Regularizer<M>,
    P: ParamOps,
{
    /// Trains the model until the mean loss stabilizes or `max_iter` passes.
    ///
    /// # Errors
    /// - The dataset is empty or its length is unknown.
    /// - A batch fails to load.
    /// - The loss becomes non-finite.
    pub fn fit<D>(&self, mut model: M, dataset: &D) -> Result<TrainingOutcome<M::Output>>
    where
        D: Dataset,
    {
        let n_total = dataset
            .len()
            .ok_or_else(|| ChurnError::Data("dataset length unknown".to_string()))?;
        if n_total == 0 {
            return Err(ChurnError::EmptyData("Dataset is empty".to_string()));
        }
        let batch_size = self.batch_size.unwrap_or(n_total);

        let mut previous: Option<f64> = None;
        let mut final_loss = f64::NAN;
        let mut iterations = 0;
        let mut converged = false;

        for iteration in 1..=self.max_iter {
            let mut total_loss = 0.0;
            for batch_result in dataset.batches(batch_size) {
                let (batch_x, batch_y) =
                    batch_result.map_err(|e| ChurnError::Data(format!("{:?}", e)))?;
                let rows = batch_y.len() as f64;

                let preds = model.forward(&batch_x);
                let (reg_penalty, reg_grad) = self.regularizer.regularizer_penalty_grad(&model);
                total_loss += (self.loss_fn.loss(&preds, &batch_y) + reg_penalty) * rows;

                let grad_preds = self.loss_fn.grad_wrt_prediction(&preds, &batch_y);
                let grads = model.backward(&batch_x, &grad_preds).add(&reg_grad);
                let new_params = self.optimizer.step(model.params(), &grads);
                model.update_params(&new_params);
            }

            let mean_loss = total_loss / n_total as f64;
            iterations = iteration;
            final_loss = mean_loss;
            debug!(iteration, loss = mean_loss, "training iteration");

            if !mean_loss.is_finite() {
                return Err(ChurnError::Data(format!(
                    "loss diverged at iteration {}",
                    iteration
                )));
            }
            if let Some(prev) = previous {
                if (prev - mean_loss).abs() < self.tol {
                    converged = true;
                    break;
                }
            }
            previous = Some(mean_loss);
        }

        if converged {
            info!(iterations, loss = final_loss, "training converged");
        } else {
            warn!(
                max_iter = self.max_iter,
                loss = final_loss,
                "ConvergenceWarning: iteration limit reached before the loss stabilized"
            );
        }

        Ok(TrainingOutcome {
            model: model.into_fitted(),
            iterations,
            final_loss,
            converged,
        })
    }
}

impl<L, O, M, P, R> Trainer<L, O, M, P, R>
where
    L: Loss,
    M: TrainableModel<Params = P, Gradients = P>,
    O: Optimizer<P>,
    R: Regularizer<M>,
{
    /// Convenience constructor that starts the builder pattern.
    ///
    /// Equivalent to `TrainerBuilder::new(...)`.
    pub fn builder(loss_fn: L, optimizer: O, regularizer: R) -> TrainerBuilder<L, O, M, P, R> {
        TrainerBuilder::new(loss_fn, optimizer, regularizer)
    }
}

/// Score `model` on held-out data.
pub fn evaluate(
    model: &LogisticModel<Fitted>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
) -> Result<ClassificationReport> {
    if x_test.ncols() != model.n_features() {
        return Err(ChurnError::FeatureMismatch {
            expected: format!("{} features", model.n_features()),
            got: format!("{} features", x_test.ncols()),
        });
    }
    ClassificationReport::from_labels(y_test, &model.predict_labels(x_test))
}

/// What a training run produced; also the content of `metrics.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub iterations: usize,
    pub final_loss: f64,
    pub converged: bool,
    pub n_train: usize,
    pub n_test: usize,
    pub features: Vec<String>,
    pub model_path: PathBuf,
    pub report: ClassificationReport,
}

/// Fit the churn model on the processed artifacts, evaluate it on the test
/// partition and persist the model and its metrics.
pub fn train_from_artifacts(config: &PipelineConfig) -> Result<TrainingSummary> {
    let ProcessedBundle {
        x_train,
        x_test,
        y_train,
        y_test,
        feature_order,
        ..
    } = ProcessedBundle::read_artifacts(&config.processed_dir)?;
    let n_train = x_train.nrows();
    let n_test = x_test.nrows();
    info!(n_train, n_test, n_features = feature_order.len(), "loaded training data");

    let dataset = InMemoryDataset::new(x_train, y_train)?;
    let params = &config.training;
    let trainer = Trainer::builder(
        BCEWithLogitsLoss,
        SGD::new(params.learning_rate),
        L2::from_inverse_strength(params.c, n_train),
    )
    .max_iter(params.max_iter)
    .tol(params.tol)
    .batch_size(params.batch_size)
    .build();

    let outcome = trainer.fit(LogisticRegression::new(feature_order.len()), &dataset)?;
    let report = evaluate(&outcome.model, &x_test, &y_test)?;
    info!(accuracy = report.accuracy, "evaluated on test partition");

    std::fs::create_dir_all(&config.model_dir)?;
    let model_path = config.model_path();
    outcome.model.save_to_file(&model_path)?;

    let summary = TrainingSummary {
        iterations: outcome.iterations,
        final_loss: outcome.final_loss,
        converged: outcome.converged,
        n_train,
        n_test,
        features: feature_order,
        model_path,
        report,
    };
    std::fs::write(config.metrics_path(), serde_json::to_string_pretty(&summary)?)?;
    info!(path = %config.metrics_path().display(), "wrote metrics");

    Ok(summary)
}
