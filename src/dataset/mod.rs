//! Dataset abstractions for the churn pipeline.
//!
//! - [`RawFrame`]: the raw CSV as string cells, before any encoding.
//! - [`stratified_split`]: seeded, class-preserving train/test partition.
//! - [`Dataset`]: a source of `(X, y)` batches consumed by the trainer,
//!   with [`InMemoryDataset`] as the ndarray-backed implementation.
//!
//! # Example
//!
//! ```rust
//! use churn_predictor::dataset::{Dataset, InMemoryDataset};
//! use ndarray::array;
//!
//! let x = array![[1.0], [2.0]];
//! let y = array![0.0, 1.0];
//! let dataset = InMemoryDataset::new(x, y).unwrap();
//!
//! for batch in dataset.batches(1) {
//!     let (x_batch, y_batch) = batch.unwrap();
//!     assert_eq!(x_batch.nrows(), y_batch.len());
//! }
//! ```

use ndarray::{Array1, Array2};
use std::{fmt::Debug, ops::Range};

pub mod frame;
pub mod memory;
pub mod split;

pub use self::frame::{ColumnKind, RawFrame};
pub use self::memory::InMemoryDataset;
pub use self::split::{stratified_split, SplitIndices};

/// Abstract interface for a training dataset.
///
/// - `X`: feature matrix with shape `(n_samples, n_features)`
/// - `y`: target vector with shape `(n_samples,)`
pub trait Dataset {
    /// Error type returned when accessing data.
    type Error: Debug + 'static;

    /// Total number of samples, if known.
    fn len(&self) -> Option<usize>;

    /// Number of feature columns.
    fn n_features(&self) -> usize;

    /// Checks whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Creates an iterator over fixed-size batches (the last one may be smaller).
    fn batches(&self, batch_size: usize) -> DatasetBatchIter<'_, Self>
    where
        Self: Sized,
    {
        DatasetBatchIter {
            dataset: self,
            batch_size: batch_size.max(1),
            current: 0,
        }
    }

    /// Loads the samples in `range` as an owned `(X, y)` pair.
    fn get_batch(&self, range: Range<usize>) -> Result<(Array2<f64>, Array1<f64>), Self::Error>;
}

/// Iterator over dataset batches, created by [`Dataset::batches`].
///
/// Data is fetched lazily; errors from `get_batch` are yielded as `Some(Err(_))`.
pub struct DatasetBatchIter<'a, D: ?Sized> {
    dataset: &'a D,
    batch_size: usize,
    /// Index of the next sample to yield.
    current: usize,
}

impl<'a, D: Dataset> Iterator for DatasetBatchIter<'a, D> {
    type Item = Result<(Array2<f64>, Array1<f64>), D::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.dataset.len()?;
        if self.current >= total {
            return None;
        }

        let end = (self.current + self.batch_size).min(total);
        let range = self.current..end;
        self.current = end;

        Some(self.dataset.get_batch(range))
    }
}
