//! Shared fixtures for the churn-predictor benchmarks.
//!
//! Generates reproducible synthetic customers shaped like the Kaggle churn
//! dataset, so the benches run without downloading anything.

use churn_predictor::dataset::{InMemoryDataset, RawFrame};
use churn_predictor::loss::BCEWithLogitsLoss;
use churn_predictor::model::LogisticRegression;
use churn_predictor::optimizer::SGD;
use churn_predictor::regularizers::L2;
use churn_predictor::trainer::Trainer;
use churn_predictor::{FieldValue, Fields, InferenceContext, PipelineConfig, Preprocessor, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const HEADER: [&str; 12] = [
    "CustomerID",
    "Age",
    "Gender",
    "Tenure",
    "Usage Frequency",
    "Support Calls",
    "Payment Delay",
    "Subscription Type",
    "Contract Length",
    "Total Spend",
    "Last Interaction",
    "Churn",
];

const GENDERS: [&str; 2] = ["Female", "Male"];
const SUBSCRIPTIONS: [&str; 3] = ["Basic", "Standard", "Premium"];
const CONTRACTS: [&str; 3] = ["Monthly", "Quarterly", "Annual"];

/// One synthetic customer, every field keyed by its column name.
pub fn random_customer<R: Rng>(rng: &mut R) -> Fields {
    let mut fields = Fields::new();
    fields.insert("Age".into(), FieldValue::from(rng.gen_range(18..=65) as i64));
    fields.insert("Gender".into(), FieldValue::from(GENDERS[rng.gen_range(0..2)]));
    fields.insert("Tenure".into(), FieldValue::from(rng.gen_range(1..=60) as i64));
    fields.insert("Usage Frequency".into(), FieldValue::from(rng.gen_range(1..=30) as i64));
    fields.insert("Support Calls".into(), FieldValue::from(rng.gen_range(0..=10) as i64));
    fields.insert("Payment Delay".into(), FieldValue::from(rng.gen_range(0..=30) as i64));
    fields.insert(
        "Subscription Type".into(),
        FieldValue::from(SUBSCRIPTIONS[rng.gen_range(0..3)]),
    );
    fields.insert(
        "Contract Length".into(),
        FieldValue::from(CONTRACTS[rng.gen_range(0..3)]),
    );
    fields.insert("Total Spend".into(), FieldValue::from(rng.gen_range(100..=1000) as i64));
    fields.insert("Last Interaction".into(), FieldValue::from(rng.gen_range(1..=30) as i64));
    fields
}

fn churn_label<R: Rng>(fields: &Fields, rng: &mut R) -> &'static str {
    let number = |name: &str| match fields.get(name) {
        Some(FieldValue::Number(v)) => *v,
        _ => 0.0,
    };
    let score = 0.4 * number("Support Calls") + 0.1 * number("Payment Delay")
        - 0.03 * number("Tenure")
        + rng.gen_range(-1.5..1.5);
    if score > 2.0 {
        "1"
    } else {
        "0"
    }
}

/// Raw CSV text with `n_rows` customers.
pub fn synthetic_churn_csv(n_rows: usize, seed: u64) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut csv = HEADER.join(",");
    csv.push('\n');
    for id in 0..n_rows {
        let fields = random_customer(&mut rng);
        let churn = churn_label(&fields, &mut rng);
        let mut row = vec![id.to_string()];
        row.extend(
            HEADER[1..HEADER.len() - 1]
                .iter()
                .map(|name| fields.get(*name).map(|v| v.to_string()).unwrap_or_default()),
        );
        row.push(churn.to_string());
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    csv
}

pub fn synthetic_frame(n_rows: usize, seed: u64) -> Result<RawFrame> {
    RawFrame::from_reader(synthetic_churn_csv(n_rows, seed).as_bytes())
}

/// Preprocess and train in memory, returning a ready serving context.
pub fn fitted_context(n_rows: usize, seed: u64) -> Result<InferenceContext> {
    let config = PipelineConfig::default();
    let bundle = Preprocessor::new(config.clone()).process(synthetic_frame(n_rows, seed)?)?;

    let n_train = bundle.x_train.nrows();
    let dataset = InMemoryDataset::new(bundle.x_train.clone(), bundle.y_train.clone())?;
    let trainer = Trainer::builder(
        BCEWithLogitsLoss,
        SGD::new(config.training.learning_rate),
        L2::from_inverse_strength(config.training.c, n_train),
    )
    .max_iter(200)
    .build();
    let outcome = trainer.fit(LogisticRegression::new(bundle.n_features()), &dataset)?;

    InferenceContext::new(bundle.encoders, bundle.feature_order, bundle.scaler, outcome.model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_csv_shape() {
        let frame = synthetic_frame(50, 7).unwrap();
        assert_eq!(frame.n_rows(), 50);
        assert_eq!(frame.n_columns(), HEADER.len());
    }

    #[test]
    fn test_synthetic_csv_is_reproducible() {
        assert_eq!(synthetic_churn_csv(20, 3), synthetic_churn_csv(20, 3));
    }
}
