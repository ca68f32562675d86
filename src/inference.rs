//! Single-customer prediction from named field values.
//!
//! [`InferenceContext`] bundles everything serving needs, loaded once from
//! the training artifacts: the encoder registry, the feature order, the
//! frozen scaler and the fitted model. It is never mutated after loading,
//! so one context can back any number of predictions.

use crate::config::PipelineConfig;
use crate::error::{ChurnError, Result};
use crate::model::{Fitted, InferenceModel, LogisticModel};
use crate::preprocessing::artifacts::read_feature_names;
use crate::preprocessing::{EncoderRegistry, FittedStandardScaler, FittedTransformer};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::info;

/// A raw value supplied for one feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(v) if v.is_finite() && v.fract() == 0.0 => {
                write!(f, "{}", *v as i64)
            }
            FieldValue::Number(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Number(v as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// Field name to value, as collected by the form or the CLI.
pub type Fields = HashMap<String, FieldValue>;

/// Outcome of one prediction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// `1` if the customer is predicted to churn.
    pub label: u8,
    /// Probability of churn.
    pub probability: f64,
}

impl Prediction {
    pub fn churned(&self) -> bool {
        self.label == 1
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.churned() {
            "is likely to churn"
        } else {
            "is not likely to churn"
        };
        write!(
            f,
            "This customer {}. Estimated probability: {:.2}",
            verdict, self.probability
        )
    }
}

/// Loaded serving artifacts.
#[derive(Clone, Debug)]
pub struct InferenceContext {
    encoders: EncoderRegistry,
    feature_order: Vec<String>,
    scaler: FittedStandardScaler,
    model: LogisticModel<Fitted>,
}

impl InferenceContext {
    /// Assemble a context, checking that every part agrees on the width.
    pub fn new(
        encoders: EncoderRegistry,
        feature_order: Vec<String>,
        scaler: FittedStandardScaler,
        model: LogisticModel<Fitted>,
    ) -> Result<Self> {
        let width = feature_order.len();
        for (what, got) in [
            ("scaler", scaler.n_features_in()),
            ("model", model.n_features()),
        ] {
            if got != width {
                return Err(ChurnError::FeatureMismatch {
                    expected: format!("{} features", width),
                    got: format!("{} {} features", got, what),
                });
            }
        }
        if let Some(column) = encoders.columns().find(|c| !feature_order.iter().any(|f| f == c)) {
            return Err(ChurnError::FeatureMismatch {
                expected: format!("encoders for columns in [{}]", feature_order.join(", ")),
                got: format!("encoder for {}", column),
            });
        }
        Ok(Self {
            encoders,
            feature_order,
            scaler,
            model,
        })
    }

    /// Read the registry, feature order, scaler and model written by the
    /// preprocess and train stages.
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        let encoders = EncoderRegistry::load_from_file(config.encoders_path())?;
        let feature_order = read_feature_names(&config.feature_names_path())?;
        let scaler = FittedStandardScaler::load_from_file(config.scaler_path())?;
        let model = LogisticModel::<Fitted>::load_from_file(config.model_path())?;
        info!(features = feature_order.len(), "loaded inference context");
        Self::new(encoders, feature_order, scaler, model)
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    pub fn encoders(&self) -> &EncoderRegistry {
        &self.encoders
    }

    pub fn is_categorical(&self, field: &str) -> bool {
        self.encoders.contains(field)
    }

    /// Encode `fields` into an unscaled vector laid out in feature order.
    ///
    /// # Errors
    /// - [`ChurnError::MissingField`] when a feature has no value.
    /// - [`ChurnError::UnknownCategory`] for a label the registry never saw.
    /// - [`ChurnError::InvalidValue`] for a numeric feature given non-numeric
    ///   text or a non-finite number.
    pub fn build_feature_vector(&self, fields: &Fields) -> Result<Array1<f64>> {
        let mut vector = Vec::with_capacity(self.feature_order.len());
        for name in &self.feature_order {
            let value = fields
                .get(name)
                .ok_or_else(|| ChurnError::MissingField(name.clone()))?;
            vector.push(self.encode_field(name, value)?);
        }
        Ok(Array1::from(vector))
    }

    fn encode_field(&self, name: &str, value: &FieldValue) -> Result<f64> {
        if self.encoders.contains(name) {
            let label = value.to_string();
            return Ok(self.encoders.encode(name, label.trim())? as f64);
        }
        let number = match value {
            FieldValue::Number(v) => *v,
            FieldValue::Text(s) => s.trim().parse::<f64>().map_err(|_| invalid(name, value))?,
        };
        if !number.is_finite() {
            return Err(invalid(name, value));
        }
        Ok(number)
    }

    /// Encode, scale and score one customer.
    pub fn predict(&self, fields: &Fields) -> Result<Prediction> {
        let raw = self.build_feature_vector(fields)?;
        let scaled = self.scaler.transform_row(&raw)?;
        let probability = self.model.predict(&scaled);
        Ok(Prediction {
            label: self.model.predict_label(&scaled),
            probability,
        })
    }
}

fn invalid(field: &str, value: &FieldValue) -> ChurnError {
    ChurnError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RawFrame;
    use crate::model::LinearParams;
    use crate::preprocessing::{StandardScaler, Transformer};
    use ndarray::array;

    fn registry() -> EncoderRegistry {
        let frame =
            RawFrame::from_reader("Gender,Plan\nMale,1\nFemale,2\n".as_bytes()).unwrap();
        EncoderRegistry::fit(&frame, &["Gender".to_string()]).unwrap()
    }

    fn identity_scaler(width: usize) -> FittedStandardScaler {
        StandardScaler::new()
            .with_mean(false)
            .with_std(false)
            .fit(&ndarray::Array2::zeros((1, width)))
            .unwrap()
    }

    fn context(weights: Array1<f64>, bias: f64) -> InferenceContext {
        InferenceContext::new(
            registry(),
            vec!["Gender".to_string(), "Age".to_string()],
            identity_scaler(2),
            LogisticModel::<Fitted>::new(LinearParams { weights, bias }),
        )
        .unwrap()
    }

    fn fields(pairs: &[(&str, FieldValue)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_feature_vector_in_feature_order() {
        let ctx = context(array![0.0, 0.0], 0.0);
        let input = fields(&[("Gender", "Male".into()), ("Age", 40.0.into())]);

        assert_eq!(ctx.build_feature_vector(&input).unwrap(), array![1.0, 40.0]);
    }

    #[test]
    fn test_field_insertion_order_is_irrelevant() {
        let ctx = context(array![0.0, 0.0], 0.0);
        let a = fields(&[("Gender", "Female".into()), ("Age", 33.0.into())]);
        let b = fields(&[("Age", 33.0.into()), ("Gender", "Female".into())]);

        assert_eq!(
            ctx.build_feature_vector(&a).unwrap(),
            ctx.build_feature_vector(&b).unwrap()
        );
    }

    #[test]
    fn test_unknown_category() {
        let ctx = context(array![0.0, 0.0], 0.0);
        let input = fields(&[("Gender", "Other".into()), ("Age", 40.0.into())]);

        assert!(matches!(
            ctx.build_feature_vector(&input),
            Err(ChurnError::UnknownCategory { ref value, .. }) if value == "Other"
        ));
    }

    #[test]
    fn test_missing_field() {
        let ctx = context(array![0.0, 0.0], 0.0);
        let input = fields(&[("Gender", "Male".into())]);

        assert!(matches!(
            ctx.build_feature_vector(&input),
            Err(ChurnError::MissingField(ref name)) if name == "Age"
        ));
    }

    #[test]
    fn test_numeric_text_accepted_and_garbage_rejected() {
        let ctx = context(array![0.0, 0.0], 0.0);
        let ok = fields(&[("Gender", "Male".into()), ("Age", " 41 ".into())]);
        assert_eq!(ctx.build_feature_vector(&ok).unwrap(), array![1.0, 41.0]);

        let bad = fields(&[("Gender", "Male".into()), ("Age", "forty".into())]);
        assert!(matches!(
            ctx.build_feature_vector(&bad),
            Err(ChurnError::InvalidValue { .. })
        ));

        let nan = fields(&[("Gender", "Male".into()), ("Age", f64::NAN.into())]);
        assert!(ctx.build_feature_vector(&nan).is_err());
    }

    #[test]
    fn test_number_for_categorical_rendered_as_text() {
        let frame = RawFrame::from_reader("Plan,Age\n1,30\n2,40\n".as_bytes()).unwrap();
        let encoders = EncoderRegistry::fit(&frame, &["Plan".to_string()]).unwrap();
        let ctx = InferenceContext::new(
            encoders,
            vec!["Plan".to_string(), "Age".to_string()],
            identity_scaler(2),
            LogisticModel::<Fitted>::new(LinearParams::zeros(2)),
        )
        .unwrap();

        let input = fields(&[("Plan", 2.0.into()), ("Age", 30.0.into())]);
        assert_eq!(ctx.build_feature_vector(&input).unwrap(), array![1.0, 30.0]);
    }

    #[test]
    fn test_numeric_looking_class_kept_verbatim() {
        let frame = RawFrame::from_reader("Plan,Age\n1.0,30\nA,40\n".as_bytes()).unwrap();
        let encoders = EncoderRegistry::fit(&frame, &["Plan".to_string()]).unwrap();
        assert_eq!(encoders.classes("Plan").unwrap(), &["1.0", "A"]);
        let ctx = InferenceContext::new(
            encoders,
            vec!["Plan".to_string(), "Age".to_string()],
            identity_scaler(2),
            LogisticModel::<Fitted>::new(LinearParams::zeros(2)),
        )
        .unwrap();

        let input = fields(&[("Plan", "1.0".into()), ("Age", "30".into())]);
        assert_eq!(ctx.build_feature_vector(&input).unwrap(), array![0.0, 30.0]);
    }

    #[test]
    fn test_predict_half_probability_maps_to_zero() {
        let ctx = context(array![0.0, 0.0], 0.0);
        let input = fields(&[("Gender", "Male".into()), ("Age", 40.0.into())]);

        let prediction = ctx.predict(&input).unwrap();
        assert_eq!(prediction.probability, 0.5);
        assert_eq!(prediction.label, 0);
        assert!(!prediction.churned());
    }

    #[test]
    fn test_predict_uses_scaler() {
        let scaler = StandardScaler::new()
            .fit(&array![[0.0, 30.0], [1.0, 50.0]])
            .unwrap();
        let ctx = InferenceContext::new(
            registry(),
            vec!["Gender".to_string(), "Age".to_string()],
            scaler,
            LogisticModel::<Fitted>::new(LinearParams {
                weights: array![0.0, 1.0],
                bias: 0.0,
            }),
        )
        .unwrap();

        // Age 40 is the training mean: scaled to 0, probability exactly 0.5
        let at_mean = fields(&[("Gender", "Male".into()), ("Age", 40.0.into())]);
        assert_eq!(ctx.predict(&at_mean).unwrap().probability, 0.5);

        let older = fields(&[("Gender", "Male".into()), ("Age", 60.0.into())]);
        let prediction = ctx.predict(&older).unwrap();
        assert_eq!(prediction.label, 1);
        assert!(prediction.probability > 0.85);
    }

    #[test]
    fn test_new_rejects_width_mismatch() {
        let result = InferenceContext::new(
            registry(),
            vec!["Gender".to_string(), "Age".to_string()],
            identity_scaler(3),
            LogisticModel::<Fitted>::new(LinearParams::zeros(2)),
        );
        assert!(matches!(result, Err(ChurnError::FeatureMismatch { .. })));
    }

    #[test]
    fn test_load_missing_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            processed_dir: tmp.path().join("processed"),
            model_dir: tmp.path().join("models"),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            InferenceContext::load(&config),
            Err(ChurnError::MissingArtifact { .. })
        ));
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::from(" Basic ").to_string(), " Basic ");
        assert_eq!(FieldValue::Number(42.0).to_string(), "42");
        assert_eq!(FieldValue::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_field_values_deserialize_untagged() {
        let parsed: Fields = serde_json::from_str(r#"{"Gender":"Male","Age":40}"#).unwrap();
        assert_eq!(parsed["Gender"], FieldValue::Text("Male".into()));
        assert_eq!(parsed["Age"], FieldValue::Number(40.0));
    }

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InferenceContext>();
    }
}
