use crate::dataset::Dataset;
use crate::error::{ChurnError, Result};
use ndarray::{s, Array1, Array2};
use std::ops::Range;

/// Feature matrix and labels held in memory.
#[derive(Clone, Debug)]
pub struct InMemoryDataset {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl InMemoryDataset {
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(ChurnError::FeatureMismatch {
                expected: format!("{} labels", x.nrows()),
                got: format!("{} labels", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(ChurnError::EmptyData("Dataset is empty".into()));
        }
        Ok(Self { x, y })
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn labels(&self) -> &Array1<f64> {
        &self.y
    }
}

impl Dataset for InMemoryDataset {
    type Error = std::convert::Infallible;

    fn len(&self) -> Option<usize> {
        Some(self.x.nrows())
    }

    fn n_features(&self) -> usize {
        self.x.ncols()
    }

    fn get_batch(
        &self,
        range: Range<usize>,
    ) -> std::result::Result<(Array2<f64>, Array1<f64>), Self::Error> {
        let batch_x = self.x.slice(s![range.clone(), ..]).to_owned();
        let batch_y = self.y.slice(s![range]).to_owned();
        Ok((batch_x, batch_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_rejects_length_mismatch() {
        let result = InMemoryDataset::new(array![[1.0], [2.0]], array![1.0]);
        assert!(matches!(result, Err(ChurnError::FeatureMismatch { .. })));
    }

    #[test]
    fn test_new_rejects_empty() {
        let result = InMemoryDataset::new(Array2::zeros((0, 3)), Array1::zeros(0));
        assert!(matches!(result, Err(ChurnError::EmptyData(_))));
    }

    #[test]
    fn test_get_batch_slices_rows() {
        let ds = InMemoryDataset::new(
            array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]],
            array![0.0, 1.0, 0.0],
        )
        .unwrap();

        let (x, y) = ds.get_batch(1..3).unwrap();

        assert_eq!(x, array![[2.0, 20.0], [3.0, 30.0]]);
        assert_eq!(y, array![1.0, 0.0]);
        assert_eq!(ds.n_features(), 2);
    }
}
