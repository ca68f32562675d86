//! Stratified train/test splitting.

use crate::error::{ChurnError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Row indices of the two partitions, each in ascending corpus order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split rows into train/test partitions preserving class ratios.
///
/// Each class is shuffled independently with a `ChaCha8Rng` seeded from
/// `seed`, and `round(class_len * test_size)` of its rows go to the test
/// partition. The same labels, ratio and seed always yield the same split.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> Result<SplitIndices> {
    if labels.is_empty() {
        return Err(ChurnError::EmptyData("Cannot split an empty dataset".into()));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ChurnError::Config(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();
    for indices in by_class.values_mut() {
        indices.shuffle(&mut rng);
        let n_test = (indices.len() as f64 * test_size).round() as usize;
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    if train.is_empty() || test.is_empty() {
        return Err(ChurnError::EmptyData(format!(
            "Split of {} rows with test_size {} leaves an empty partition",
            labels.len(),
            test_size
        )));
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}
