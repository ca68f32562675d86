//! Standard Scaler (Z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the per-feature mean of the training samples and `s` their
//! population standard deviation (ddof = 0). Constant features get `s = 1`.
//!
//! The statistics are learned once, on the training partition, and frozen:
//! the test partition and every inference row reuse them unchanged.

use crate::error::{ChurnError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Configuration for StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// Center the data before scaling.
    pub with_mean: bool,
    /// Scale the data to unit variance.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }
}

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    pub config: StandardScalerConfig,
    /// Mean of each feature (zeros if `with_mean` is false).
    pub mean: Vec<f64>,
    /// Standard deviation of each feature (ones if `with_std` is false).
    pub std: Vec<f64>,
    pub n_features: usize,
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    config: StandardScalerConfig,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self
    }

    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }
}

impl Transformer for StandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = StandardScalerParams;
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted> {
        let (rows, cols) = data.dim();

        if rows == 0 {
            return Err(ChurnError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ChurnError::InvalidValue {
                field: "StandardScaler input".to_string(),
                value: "non-finite value".to_string(),
            });
        }

        let mean = if self.config.with_mean {
            data.mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::zeros(cols))
        } else {
            Array1::zeros(cols)
        };

        let std = if self.config.with_std {
            // Constant features would divide by zero
            data.std_axis(Axis(0), 0.0)
                .mapv(|s| if s == 0.0 { 1.0 } else { s })
        } else {
            Array1::ones(cols)
        };

        Ok(FittedStandardScaler {
            config: self.config.clone(),
            mean,
            std,
        })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug)]
pub struct FittedStandardScaler {
    config: StandardScalerConfig,
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl FittedStandardScaler {
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }

    /// Scale a single feature vector with the frozen statistics.
    pub fn transform_row(&self, row: &Array1<f64>) -> Result<Array1<f64>> {
        self.check_width(row.len())?;
        Ok((row - &self.mean) / &self.std)
    }

    fn check_width(&self, cols: usize) -> Result<()> {
        if cols != self.n_features_in() {
            return Err(ChurnError::FeatureMismatch {
                expected: format!("{} features", self.n_features_in()),
                got: format!("{} features", cols),
            });
        }
        Ok(())
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = StandardScalerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output> {
        self.check_width(data.ncols())?;
        Ok((data - &self.mean) / &self.std)
    }

    fn inverse_transform(&self, data: &Self::Output) -> Result<Self::Input> {
        self.check_width(data.ncols())?;
        Ok(data * &self.std + &self.mean)
    }

    fn extract_params(&self) -> Self::Params {
        StandardScalerParams {
            config: self.config.clone(),
            mean: self.mean.to_vec(),
            std: self.std.to_vec(),
            n_features: self.mean.len(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if params.mean.len() != params.n_features || params.std.len() != params.n_features {
            return Err(ChurnError::Serialization(format!(
                "scaler declares {} features but stores {} means and {} stds",
                params.n_features,
                params.mean.len(),
                params.std.len()
            )));
        }
        Ok(Self {
            config: params.config,
            mean: Array1::from(params.mean),
            std: Array1::from(params.std),
        })
    }

    fn n_features_in(&self) -> usize {
        self.mean.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn create_test_data() -> Array2<f64> {
        array![[0.0, 1.0], [0.0, 1.0], [1.0, 3.0]]
    }

    #[test]
    fn test_standard_scaler_fit() {
        let fitted = StandardScaler::new().fit(&create_test_data()).unwrap();

        let mean = fitted.mean();
        assert_abs_diff_eq!(mean[0], 1.0 / 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(mean[1], 5.0 / 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_standard_scaler_transform_unit_variance() {
        let data = create_test_data();
        let transformed = StandardScaler::new().fit_transform(&data).unwrap();

        for col in transformed.axis_iter(Axis(1)) {
            assert_abs_diff_eq!(col.mean().unwrap(), 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(col.std(0.0), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_constant_feature_std_is_one() {
        let data = array![[5.0, 1.0], [5.0, 2.0]];
        let fitted = StandardScaler::new().fit(&data).unwrap();

        assert_eq!(fitted.std()[0], 1.0);
        let transformed = fitted.transform(&data).unwrap();
        assert_eq!(transformed.column(0).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_without_mean_and_std_is_identity() {
        let data = create_test_data();
        let transformed = StandardScaler::new()
            .with_mean(false)
            .with_std(false)
            .fit_transform(&data)
            .unwrap();
        assert_eq!(transformed, data);
    }

    #[test]
    fn test_inverse_transform() {
        let data = create_test_data();
        let fitted = StandardScaler::new().fit(&data).unwrap();
        let restored = fitted
            .inverse_transform(&fitted.transform(&data).unwrap())
            .unwrap();

        for (a, b) in data.iter().zip(restored.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_transform_row_matches_matrix_transform() {
        let data = create_test_data();
        let fitted = StandardScaler::new().fit(&data).unwrap();

        let row = fitted.transform_row(&array![1.0, 3.0]).unwrap();
        let matrix = fitted.transform(&array![[1.0, 3.0]]).unwrap();

        assert_eq!(row.to_vec(), matrix.row(0).to_vec());
    }

    #[test]
    fn test_statistics_frozen_after_fit() {
        let train = create_test_data();
        let fitted = StandardScaler::new().fit(&train).unwrap();
        let before = fitted.extract_params();

        // Transforming wildly different data never changes the statistics
        let _ = fitted.transform(&array![[1000.0, -1000.0]]).unwrap();

        assert_eq!(fitted.extract_params(), before);
    }

    #[test]
    fn test_feature_mismatch() {
        let fitted = StandardScaler::new().fit(&create_test_data()).unwrap();
        assert!(matches!(
            fitted.transform(&array![[1.0, 2.0, 3.0]]),
            Err(ChurnError::FeatureMismatch { .. })
        ));
        assert!(fitted.transform_row(&array![1.0]).is_err());
    }

    #[test]
    fn test_empty_data() {
        let result = StandardScaler::new().fit(&Array2::zeros((0, 2)));
        assert!(matches!(result, Err(ChurnError::EmptyData(_))));
    }

    #[test]
    fn test_non_finite_rejected() {
        let result = StandardScaler::new().fit(&array![[f64::NAN, 1.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let fitted = StandardScaler::new().fit(&create_test_data()).unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scaler.bin");

        fitted.save_to_file(&path).unwrap();
        let loaded = FittedStandardScaler::load_from_file(&path).unwrap();

        assert_eq!(loaded.extract_params(), fitted.extract_params());
        assert_eq!(loaded.n_features_in(), 2);
    }

    #[test]
    fn test_from_params_length_check() {
        let params = StandardScalerParams {
            config: StandardScalerConfig::default(),
            mean: vec![0.0],
            std: vec![1.0, 1.0],
            n_features: 2,
        };
        assert!(FittedStandardScaler::from_params(params).is_err());
    }
}
