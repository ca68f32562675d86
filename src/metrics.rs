//! Evaluation metrics for the binary churn classifier.
//!
//! [`ClassificationReport`] mirrors the familiar per-class table: precision,
//! recall, f1 and support for each class, overall accuracy, and macro and
//! support-weighted averages.

use crate::error::{ChurnError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confusion matrix for binary classification; class 1 is "churned".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally paired actual/predicted `0.0`/`1.0` labels.
    pub fn from_labels(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(ChurnError::FeatureMismatch {
                expected: format!("{} predictions", actual.len()),
                got: format!("{} predictions", predicted.len()),
            });
        }
        let mut cm = Self::new();
        for (&a, &p) in actual.iter().zip(predicted.iter()) {
            cm.record(a > 0.5, p > 0.5);
        }
        Ok(cm)
    }

    /// Record a prediction.
    pub fn record(&mut self, actual_positive: bool, predicted_positive: bool) {
        match (actual_positive, predicted_positive) {
            (true, true) => self.tp += 1,
            (false, false) => self.tn += 1,
            (false, true) => self.fp += 1,
            (true, false) => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    pub fn actual_positive(&self) -> usize {
        self.tp + self.fn_
    }

    pub fn actual_negative(&self) -> usize {
        self.tn + self.fp
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }
}

/// Precision, recall, f1 and support of one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassMetrics {
    fn new(true_pos: usize, false_pos: usize, false_neg: usize) -> Self {
        let precision = ratio(true_pos, true_pos + false_pos);
        let recall = ratio(true_pos, true_pos + false_neg);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
            support: true_pos + false_neg,
        }
    }
}

/// Per-class and averaged metrics on the held-out partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Class 0 (retained customers).
    pub negative: ClassMetrics,
    /// Class 1 (churned customers).
    pub positive: ClassMetrics,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub confusion_matrix: ConfusionMatrix,
}

impl ClassificationReport {
    pub fn from_labels(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<Self> {
        Ok(Self::from_confusion_matrix(&ConfusionMatrix::from_labels(
            actual, predicted,
        )?))
    }

    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let positive = ClassMetrics::new(cm.tp, cm.fp, cm.fn_);
        let negative = ClassMetrics::new(cm.tn, cm.fn_, cm.fp);
        let total = cm.total();

        let macro_avg = ClassMetrics {
            precision: (positive.precision + negative.precision) / 2.0,
            recall: (positive.recall + negative.recall) / 2.0,
            f1: (positive.f1 + negative.f1) / 2.0,
            support: total,
        };

        let weight = |neg: f64, pos: f64| {
            if total == 0 {
                0.0
            } else {
                (neg * negative.support as f64 + pos * positive.support as f64) / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weight(negative.precision, positive.precision),
            recall: weight(negative.recall, positive.recall),
            f1: weight(negative.f1, positive.f1),
            support: total,
        };

        Self {
            negative,
            positive,
            accuracy: cm.accuracy(),
            macro_avg,
            weighted_avg,
            confusion_matrix: cm.clone(),
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, m) in [("0", &self.negative), ("1", &self.positive)] {
            write_row(f, name, m)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
        name, m.precision, m.recall, m.f1, m.support
    )
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
