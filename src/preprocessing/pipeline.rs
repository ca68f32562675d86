//! Raw CSV to scaled train/test matrices.

use crate::config::{
    PipelineConfig, ENCODERS_FILE, FEATURE_NAMES_FILE, SCALER_FILE, X_TEST_FILE, X_TRAIN_FILE,
    Y_TEST_FILE, Y_TRAIN_FILE,
};
use crate::dataset::{stratified_split, ColumnKind, RawFrame};
use crate::error::{ChurnError, Result};
use crate::preprocessing::artifacts;
use crate::preprocessing::encoding::{EncoderRegistry, TargetEncoder};
use crate::preprocessing::scaling::{FittedStandardScaler, StandardScaler};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array1, Array2};
use std::path::Path;
use tracing::{debug, info, warn};

/// Everything the trainer and the serving side need from preprocessing.
#[derive(Clone, Debug)]
pub struct ProcessedBundle {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    /// Feature columns in CSV order; the column order of both matrices.
    pub feature_order: Vec<String>,
    pub target_column: String,
    pub encoders: EncoderRegistry,
    pub scaler: FittedStandardScaler,
}

impl ProcessedBundle {
    pub fn n_features(&self) -> usize {
        self.feature_order.len()
    }

    /// Write all seven artifacts into `dir`, replacing earlier runs.
    pub fn write_artifacts<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        artifacts::write_matrix(&dir.join(X_TRAIN_FILE), &self.feature_order, &self.x_train)?;
        artifacts::write_matrix(&dir.join(X_TEST_FILE), &self.feature_order, &self.x_test)?;
        artifacts::write_labels(&dir.join(Y_TRAIN_FILE), &self.target_column, &self.y_train)?;
        artifacts::write_labels(&dir.join(Y_TEST_FILE), &self.target_column, &self.y_test)?;
        artifacts::write_feature_names(&dir.join(FEATURE_NAMES_FILE), &self.feature_order)?;
        self.encoders.save_to_file(dir.join(ENCODERS_FILE))?;
        self.scaler.save_to_file(dir.join(SCALER_FILE))?;

        info!(dir = %dir.display(), "wrote processed artifacts");
        Ok(())
    }

    /// Load the artifacts written by [`ProcessedBundle::write_artifacts`].
    ///
    /// # Errors
    /// - [`ChurnError::MissingArtifact`] when a file is absent.
    /// - [`ChurnError::FeatureMismatch`] when a matrix header disagrees with
    ///   `feature_names.csv` or a label vector has the wrong length.
    pub fn read_artifacts<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let feature_order = artifacts::read_feature_names(&dir.join(FEATURE_NAMES_FILE))?;

        let x_train = read_checked_matrix(&dir.join(X_TRAIN_FILE), &feature_order)?;
        let x_test = read_checked_matrix(&dir.join(X_TEST_FILE), &feature_order)?;
        let (target_column, y_train) = artifacts::read_labels(&dir.join(Y_TRAIN_FILE))?;
        let (_, y_test) = artifacts::read_labels(&dir.join(Y_TEST_FILE))?;
        check_rows("train", &x_train, &y_train)?;
        check_rows("test", &x_test, &y_test)?;

        let encoders = EncoderRegistry::load_from_file(dir.join(ENCODERS_FILE))?;
        let scaler = FittedStandardScaler::load_from_file(dir.join(SCALER_FILE))?;
        if scaler.n_features_in() != feature_order.len() {
            return Err(ChurnError::FeatureMismatch {
                expected: format!("{} scaler features", feature_order.len()),
                got: format!("{} scaler features", scaler.n_features_in()),
            });
        }

        Ok(Self {
            x_train,
            x_test,
            y_train,
            y_test,
            feature_order,
            target_column,
            encoders,
            scaler,
        })
    }
}

fn read_checked_matrix(path: &Path, feature_order: &[String]) -> Result<Array2<f64>> {
    let (headers, matrix) = artifacts::read_matrix(path)?;
    if headers != feature_order {
        return Err(ChurnError::FeatureMismatch {
            expected: feature_order.join(","),
            got: headers.join(","),
        });
    }
    Ok(matrix)
}

fn check_rows(partition: &str, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(ChurnError::FeatureMismatch {
            expected: format!("{} {} labels", x.nrows(), partition),
            got: format!("{} labels", y.len()),
        });
    }
    Ok(())
}

/// One feature column of the cleaned frame.
struct FeatureColumn {
    name: String,
    index: usize,
    kind: ColumnKind,
}

/// Runs the preprocessing stages in order on a raw churn CSV.
#[derive(Clone, Debug)]
pub struct Preprocessor {
    config: PipelineConfig,
    target_encoder: TargetEncoder,
}

impl Preprocessor {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            target_encoder: TargetEncoder::default(),
        }
    }

    /// Replace the `"Yes"`/`"No"` target vocabulary.
    pub fn with_target_encoder(mut self, target_encoder: TargetEncoder) -> Self {
        self.target_encoder = target_encoder;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read the CSV at `raw_path` and process it.
    pub fn run<P: AsRef<Path>>(&self, raw_path: P) -> Result<ProcessedBundle> {
        let raw_path = raw_path.as_ref();
        info!(path = %raw_path.display(), "loading raw dataset");
        let frame = RawFrame::from_path(raw_path)?;
        self.process(frame)
    }

    /// Clean, encode, split and scale an in-memory frame.
    pub fn process(&self, mut frame: RawFrame) -> Result<ProcessedBundle> {
        let target = self.config.target_column.as_str();
        frame.column_index(target)?;

        let dropped = frame.drop_columns_containing(&self.config.id_marker, target);
        if !dropped.is_empty() {
            info!(columns = ?dropped, "dropped identifier columns");
        }

        let incomplete = frame.drop_incomplete_rows();
        if incomplete > 0 {
            warn!(rows = incomplete, "dropped rows with missing values");
        }
        if frame.n_rows() == 0 {
            return Err(ChurnError::EmptyData(
                "no complete rows left after cleaning".to_string(),
            ));
        }

        let target_values = frame.column(target)?;
        let labels = self
            .target_encoder
            .encode_column(target, target_values.as_slice())?;

        let features: Vec<FeatureColumn> = frame
            .headers()
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() != target)
            .map(|(index, name)| {
                Ok(FeatureColumn {
                    name: name.clone(),
                    index,
                    kind: frame.column_kind(index)?,
                })
            })
            .collect::<Result<_>>()?;
        if features.is_empty() {
            return Err(ChurnError::EmptyData(
                "no feature columns besides the target".to_string(),
            ));
        }
        let feature_order: Vec<String> = features.iter().map(|f| f.name.clone()).collect();
        let categorical: Vec<String> = features
            .iter()
            .filter(|f| f.kind == ColumnKind::Categorical)
            .map(|f| f.name.clone())
            .collect();
        debug!(features = ?feature_order, categorical = ?categorical, "feature layout");

        let split = stratified_split(&labels, self.config.test_size, self.config.seed)?;
        info!(
            train = split.train.len(),
            test = split.test.len(),
            "stratified split"
        );

        // Categories are learned from training rows only
        let encoders = EncoderRegistry::fit(&frame.select_rows(&split.train), &categorical)?;

        let (x_train, y_train) =
            encode_partition(&frame, &split.train, &features, &encoders, &labels, "train")?;
        let (x_test, y_test) =
            encode_partition(&frame, &split.test, &features, &encoders, &labels, "test")?;
        if x_test.nrows() == 0 {
            return Err(ChurnError::EmptyData(
                "every test row carried an unseen category".to_string(),
            ));
        }

        let scaler = StandardScaler::new().fit(&x_train)?;
        let x_train = scaler.transform(&x_train)?;
        let x_test = scaler.transform(&x_test)?;

        Ok(ProcessedBundle {
            x_train,
            x_test,
            y_train,
            y_test,
            feature_order,
            target_column: target.to_string(),
            encoders,
            scaler,
        })
    }
}

/// Encode the rows at `indices` into an unscaled matrix and label vector.
///
/// Rows holding a category unknown to `encoders` are skipped with a warning.
fn encode_partition(
    frame: &RawFrame,
    indices: &[usize],
    features: &[FeatureColumn],
    encoders: &EncoderRegistry,
    labels: &[u8],
    partition: &str,
) -> Result<(Array2<f64>, Array1<f64>)> {
    let mut values = Vec::with_capacity(indices.len() * features.len());
    let mut targets = Vec::with_capacity(indices.len());
    let mut skipped = 0usize;

    'rows: for &i in indices {
        let row = &frame.rows()[i];
        let mut encoded = Vec::with_capacity(features.len());
        for feature in features {
            let cell = row[feature.index].as_str();
            let value = match feature.kind {
                ColumnKind::Categorical => match encoders.encode(&feature.name, cell) {
                    Ok(code) => code as f64,
                    Err(ChurnError::UnknownCategory { .. }) => {
                        skipped += 1;
                        continue 'rows;
                    }
                    Err(e) => return Err(e),
                },
                ColumnKind::Numeric => {
                    cell.parse::<f64>()
                        .map_err(|_| ChurnError::InvalidValue {
                            field: feature.name.clone(),
                            value: cell.to_string(),
                        })?
                }
            };
            encoded.push(value);
        }
        values.extend(encoded);
        targets.push(f64::from(labels[i]));
    }

    if skipped > 0 {
        warn!(
            partition,
            rows = skipped,
            "dropped rows with categories unseen during training"
        );
    }

    let matrix = Array2::from_shape_vec((targets.len(), features.len()), values).map_err(|e| {
        ChurnError::FeatureMismatch {
            expected: format!("{} x {} matrix", targets.len(), features.len()),
            got: e.to_string(),
        }
    })?;
    Ok((matrix, Array1::from(targets)))
}
