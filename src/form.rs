//! Interactive terminal form for single-customer predictions.
//!
//! Each feature is presented with a label, a help text and a widget. The
//! widget kind comes from a lookup table keyed by feature name; features the
//! encoder registry knows are always selectors over its classes.

use crate::error::{ChurnError, Result};
use crate::inference::{FieldValue, Fields, InferenceContext};
use std::fmt;
use std::io::{BufRead, Write};
use tracing::debug;

/// Presentation record of one known feature.
///
/// `widget` is the numeric input used when the feature is not encoded;
/// categorical features leave it `None` and always get a selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMeta {
    pub name: &'static str,
    pub label: &'static str,
    pub help: &'static str,
    pub widget: Option<Widget>,
}

const fn slider(min: i64, max: i64, default: i64) -> Option<Widget> {
    Some(Widget::Slider {
        min,
        max,
        default,
        step: 1,
    })
}

/// The known churn features.
pub const FIELD_META: &[FieldMeta] = &[
    FieldMeta {
        name: "Age",
        label: "Customer Age",
        help: "Age of the customer in years",
        widget: slider(18, 100, 30),
    },
    FieldMeta {
        name: "Gender",
        label: "Gender",
        help: "Gender of the customer",
        widget: None,
    },
    FieldMeta {
        name: "Tenure",
        label: "Tenure (Months)",
        help: "How long the customer has been using the service",
        widget: slider(0, 120, 12),
    },
    FieldMeta {
        name: "Usage Frequency",
        label: "Usage Frequency",
        help: "How frequently the customer uses the service",
        widget: Some(COUNTER),
    },
    FieldMeta {
        name: "Support Calls",
        label: "Support Calls",
        help: "Number of times the customer contacted customer support",
        widget: Some(COUNTER),
    },
    FieldMeta {
        name: "Payment Delay",
        label: "Payment Delay",
        help: "Number of times the customer delayed payments",
        widget: Some(COUNTER),
    },
    FieldMeta {
        name: "Subscription Type",
        label: "Subscription Type",
        help: "Type of subscription plan chosen by the customer",
        widget: None,
    },
    FieldMeta {
        name: "Contract Length",
        label: "Contract Length",
        help: "Duration of the customer contract",
        widget: None,
    },
    FieldMeta {
        name: "Total Spend",
        label: "Total Spend",
        help: "Total amount spent by the customer so far",
        widget: slider(100, 1000, 500),
    },
    FieldMeta {
        name: "Last Interaction",
        label: "Last Interaction (Days)",
        help: "Days since the customer last interacted with the service",
        widget: Some(COUNTER),
    },
];

const DEFAULT_HELP: &str = "Enter customer information";

const COUNTER: Widget = Widget::BoundedInteger {
    min: 0,
    default: 0,
    step: 1,
};

/// Record of `name` in [`FIELD_META`].
pub fn field_meta(name: &str) -> Option<&'static FieldMeta> {
    FIELD_META.iter().find(|meta| meta.name == name)
}

/// Input control of one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Widget {
    /// Pick one of the encoder's classes; the first is the default.
    Selector { options: Vec<String> },
    /// Integer `>= min`, in multiples of `step` from `min`.
    BoundedInteger { min: i64, default: i64, step: i64 },
    /// Integer in `min..=max`, in multiples of `step` from `min`.
    Slider {
        min: i64,
        max: i64,
        default: i64,
        step: i64,
    },
}

impl Widget {
    /// Validate raw input for the field `name`; empty input takes the default.
    ///
    /// Selectors accept an option verbatim or its 1-based position.
    pub fn parse(&self, name: &str, input: &str) -> Result<FieldValue> {
        let input = input.trim();
        match self {
            Widget::Selector { options } => {
                let first = options.first().ok_or_else(|| {
                    ChurnError::EmptyData(format!("no options for {}", name))
                })?;
                if input.is_empty() {
                    return Ok(FieldValue::Text(first.clone()));
                }
                if let Some(option) = options.iter().find(|o| o.as_str() == input) {
                    return Ok(FieldValue::Text(option.clone()));
                }
                match input.parse::<usize>() {
                    Ok(i) if (1..=options.len()).contains(&i) => {
                        Ok(FieldValue::Text(options[i - 1].clone()))
                    }
                    _ => Err(ChurnError::UnknownCategory {
                        column: name.to_string(),
                        value: input.to_string(),
                    }),
                }
            }
            Widget::BoundedInteger { min, default, step } => {
                let value = parse_integer(name, input, *default)?;
                check_range(name, input, value, *min, None, *step)?;
                Ok(FieldValue::Number(value as f64))
            }
            Widget::Slider {
                min,
                max,
                default,
                step,
            } => {
                let value = parse_integer(name, input, *default)?;
                check_range(name, input, value, *min, Some(*max), *step)?;
                Ok(FieldValue::Number(value as f64))
            }
        }
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Widget::Selector { options } => {
                let listed: Vec<String> = options
                    .iter()
                    .enumerate()
                    .map(|(i, o)| format!("{}) {}", i + 1, o))
                    .collect();
                write!(f, "[{}]", listed.join(", "))
            }
            Widget::BoundedInteger { min, default, .. } => {
                write!(f, "[>= {}, default {}]", min, default)
            }
            Widget::Slider {
                min, max, default, ..
            } => write!(f, "[{}-{}, default {}]", min, max, default),
        }
    }
}

fn parse_integer(name: &str, input: &str, default: i64) -> Result<i64> {
    if input.is_empty() {
        return Ok(default);
    }
    input.parse::<i64>().map_err(|_| ChurnError::InvalidValue {
        field: name.to_string(),
        value: input.to_string(),
    })
}

fn check_range(
    name: &str,
    input: &str,
    value: i64,
    min: i64,
    max: Option<i64>,
    step: i64,
) -> Result<()> {
    let above_max = max.map_or(false, |max| value > max);
    let off_step = step > 1 && (value - min) % step != 0;
    if value < min || above_max || off_step {
        return Err(ChurnError::InvalidValue {
            field: name.to_string(),
            value: input.to_string(),
        });
    }
    Ok(())
}

/// How one feature is shown and read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPresentation {
    pub name: String,
    pub label: String,
    pub help: String,
    pub widget: Widget,
}

impl FieldPresentation {
    /// Presentation of `name`; `classes` is set when the feature is categorical.
    pub fn new(name: &str, classes: Option<&[String]>) -> Self {
        let meta = field_meta(name);
        let (label, help) = meta.map_or((name, DEFAULT_HELP), |m| (m.label, m.help));
        let widget = match classes {
            Some(options) => Widget::Selector {
                options: options.to_vec(),
            },
            None => meta.and_then(|m| m.widget.clone()).unwrap_or(COUNTER),
        };
        Self {
            name: name.to_string(),
            label: label.to_string(),
            help: help.to_string(),
            widget,
        }
    }
}

/// One presentation per feature, in feature order.
pub fn presentation_table(ctx: &InferenceContext) -> Vec<FieldPresentation> {
    ctx.feature_order()
        .iter()
        .map(|name| FieldPresentation::new(name, ctx.encoders().classes(name)))
        .collect()
}

/// A prompt-and-predict loop over a reader and a writer.
pub struct FormSession<'a> {
    ctx: &'a InferenceContext,
    fields: Vec<FieldPresentation>,
}

impl<'a> FormSession<'a> {
    pub fn new(ctx: &'a InferenceContext) -> Self {
        Self {
            ctx,
            fields: presentation_table(ctx),
        }
    }

    pub fn fields(&self) -> &[FieldPresentation] {
        &self.fields
    }

    /// Prompt for customers until end of input or `q`.
    ///
    /// Invalid answers are reported and asked again; prediction errors are
    /// reported and the next customer is started. Returns how many
    /// predictions were made.
    pub fn run<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<usize> {
        writeln!(writer, "Customer Churn Prediction")?;
        writeln!(
            writer,
            "Fill in customer details to predict whether the customer is likely to leave the service."
        )?;

        let mut predictions = 0;
        loop {
            writeln!(writer)?;
            writeln!(writer, "Customer Information (q to quit)")?;

            let mut values = Fields::new();
            for field in &self.fields {
                match self.read_field(field, &mut reader, &mut writer)? {
                    Some(value) => {
                        values.insert(field.name.clone(), value);
                    }
                    None => return Ok(predictions),
                }
            }

            match self.ctx.predict(&values) {
                Ok(prediction) => {
                    debug!(
                        label = prediction.label,
                        probability = prediction.probability,
                        "form prediction"
                    );
                    writeln!(writer, "{}", prediction)?;
                    predictions += 1;
                }
                Err(e) => writeln!(writer, "Prediction failed: {}", e)?,
            }
        }
    }

    /// Ask until the answer is valid; `None` means the user left.
    fn read_field<R: BufRead, W: Write>(
        &self,
        field: &FieldPresentation,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<Option<FieldValue>> {
        loop {
            write!(
                writer,
                "{} ({}) {}: ",
                field.label, field.help, field.widget
            )?;
            writer.flush()?;

            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let input = line.trim();
            if input.eq_ignore_ascii_case("q") {
                return Ok(None);
            }

            match field.widget.parse(&field.name, input) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => writeln!(writer, "Invalid input: {}", e)?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RawFrame;
    use crate::model::{Fitted, LinearParams, LogisticModel};
    use crate::preprocessing::{EncoderRegistry, StandardScaler, Transformer};
    use ndarray::{array, Array2};
    use std::io::Cursor;

    fn context() -> InferenceContext {
        let frame = RawFrame::from_reader("Gender\nMale\nFemale\n".as_bytes()).unwrap();
        let encoders = EncoderRegistry::fit(&frame, &["Gender".to_string()]).unwrap();
        let scaler = StandardScaler::new()
            .with_mean(false)
            .with_std(false)
            .fit(&Array2::zeros((1, 3)))
            .unwrap();
        let model = LogisticModel::<Fitted>::new(LinearParams {
            weights: array![2.0, 0.1, 0.0],
            bias: -6.0,
        });
        InferenceContext::new(
            encoders,
            vec![
                "Gender".to_string(),
                "Age".to_string(),
                "Support Calls".to_string(),
            ],
            scaler,
            model,
        )
        .unwrap()
    }

    fn run(input: &str) -> (usize, String) {
        let ctx = context();
        let session = FormSession::new(&ctx);
        let mut out = Vec::new();
        let n = session.run(Cursor::new(input), &mut out).unwrap();
        (n, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_presentation_table() {
        let ctx = context();
        let table = presentation_table(&ctx);

        assert_eq!(table.len(), 3);
        assert_eq!(table[0].label, "Gender");
        assert_eq!(
            table[0].widget,
            Widget::Selector {
                options: vec!["Female".to_string(), "Male".to_string()]
            }
        );
        assert_eq!(table[1].label, "Customer Age");
        assert_eq!(
            table[1].widget,
            Widget::Slider {
                min: 18,
                max: 100,
                default: 30,
                step: 1
            }
        );
        assert_eq!(table[2].widget, COUNTER);
    }

    #[test]
    fn test_field_meta_table() {
        assert_eq!(FIELD_META.len(), 10);
        assert_eq!(field_meta("Tenure").unwrap().label, "Tenure (Months)");
        assert_eq!(field_meta("Gender").unwrap().widget, None);
        assert_eq!(field_meta("Payment Delay").unwrap().widget, Some(COUNTER));
        assert!(field_meta("Referrals").is_none());

        // a categorical field without classes still gets a usable widget
        assert_eq!(FieldPresentation::new("Gender", None).widget, COUNTER);
    }

    #[test]
    fn test_unknown_field_falls_back() {
        let p = FieldPresentation::new("Referrals", None);
        assert_eq!(p.label, "Referrals");
        assert_eq!(p.help, DEFAULT_HELP);
        assert_eq!(p.widget, COUNTER);
    }

    #[test]
    fn test_encoded_field_is_always_selector() {
        let classes = vec!["18-30".to_string(), "31+".to_string()];
        let p = FieldPresentation::new("Age", Some(&classes));
        assert!(matches!(p.widget, Widget::Selector { .. }));
        assert_eq!(p.label, "Customer Age");
    }

    #[test]
    fn test_widget_parse() {
        let age = FieldPresentation::new("Age", None).widget;
        assert_eq!(age.parse("Age", "").unwrap(), FieldValue::Number(30.0));
        assert_eq!(age.parse("Age", "45").unwrap(), FieldValue::Number(45.0));
        assert!(age.parse("Age", "17").is_err());
        assert!(age.parse("Age", "101").is_err());
        assert!(age.parse("Age", "abc").is_err());

        assert_eq!(
            FieldPresentation::new("Total Spend", None)
                .widget
                .parse("Total Spend", "")
                .unwrap(),
            FieldValue::Number(500.0)
        );
        assert!(COUNTER.parse("Support Calls", "-1").is_err());
        assert_eq!(
            COUNTER.parse("Support Calls", "12").unwrap(),
            FieldValue::Number(12.0)
        );
    }

    #[test]
    fn test_widget_step() {
        let w = Widget::BoundedInteger {
            min: 0,
            default: 0,
            step: 5,
        };
        assert!(w.parse("x", "10").is_ok());
        assert!(w.parse("x", "7").is_err());
    }

    #[test]
    fn test_selector_parse() {
        let w = Widget::Selector {
            options: vec!["Basic".to_string(), "Premium".to_string()],
        };
        assert_eq!(w.parse("Plan", "").unwrap(), FieldValue::Text("Basic".into()));
        assert_eq!(
            w.parse("Plan", "Premium").unwrap(),
            FieldValue::Text("Premium".into())
        );
        assert_eq!(w.parse("Plan", "2").unwrap(), FieldValue::Text("Premium".into()));
        assert!(matches!(
            w.parse("Plan", "Gold"),
            Err(ChurnError::UnknownCategory { .. })
        ));
        assert!(w.parse("Plan", "3").is_err());
    }

    #[test]
    fn test_session_single_prediction() {
        let (n, out) = run("Male\n60\n2\nq\n");
        assert_eq!(n, 1);
        // 2*1 + 0.1*60 - 6 = 2 -> churn
        assert!(out.contains("This customer is likely to churn"));
        assert!(out.contains("Customer Age (Age of the customer in years) [18-100, default 30]: "));
    }

    #[test]
    fn test_session_defaults_on_empty_input() {
        let (n, out) = run("\n\n\n");
        assert_eq!(n, 1);
        // Female, 30, 0: 0 + 3 - 6 < 0
        assert!(out.contains("This customer is not likely to churn"));
    }

    #[test]
    fn test_session_reprompts_invalid_input() {
        let (n, out) = run("Other\nMale\n150\n40\n0\n");
        assert_eq!(n, 1);
        assert_eq!(out.matches("Invalid input").count(), 2);
    }

    #[test]
    fn test_session_multiple_customers_until_eof() {
        let (n, _) = run("Male\n60\n0\nFemale\n20\n0\nMale\n");
        assert_eq!(n, 2);
    }

    #[test]
    fn test_session_quit_immediately() {
        let (n, out) = run("q\n");
        assert_eq!(n, 0);
        assert!(!out.contains("probability"));
    }
}
