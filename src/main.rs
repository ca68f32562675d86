//! `churn` command line entry point.
//!
//! Subcommands:
//!   fetch       -- Download the raw dataset
//!   preprocess  -- Clean, encode, split and scale the raw CSV
//!   train       -- Fit and evaluate the model on the processed artifacts
//!   run         -- preprocess followed by train
//!   predict     -- Score one customer given as NAME=VALUE pairs
//!   serve       -- Interactive prediction form on the terminal

use anyhow::Context;
use churn_predictor::config::PipelineConfig;
use churn_predictor::fetch::{fetch_dataset, find_raw_csv};
use churn_predictor::form::FormSession;
use churn_predictor::inference::{FieldValue, Fields, InferenceContext};
use churn_predictor::preprocessing::Preprocessor;
use churn_predictor::trainer::{train_from_artifacts, TrainingSummary};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "churn", about = "Customer churn prediction pipeline")]
struct Cli {
    /// YAML configuration file; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the raw CSV.
    #[arg(long, global = true)]
    raw_dir: Option<PathBuf>,

    /// Directory for processed matrices and fitted transformers.
    #[arg(long, global = true)]
    processed_dir: Option<PathBuf>,

    /// Directory for the trained model and metrics.
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the dataset into the raw data directory.
    Fetch,

    /// Turn the raw CSV into processed training artifacts.
    Preprocess {
        /// Raw CSV; defaults to the first CSV in the raw data directory.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Train and evaluate the model.
    Train {
        /// Iteration cap.
        #[arg(long)]
        max_iter: Option<usize>,

        /// Gradient descent step size.
        #[arg(long)]
        learning_rate: Option<f64>,
    },

    /// Preprocess and train in one go.
    Run {
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Predict churn for one customer.
    Predict {
        /// Feature value, repeatable: --field "Gender=Male" --field Age=40
        #[arg(long = "field", value_parser = parse_field, required = true)]
        fields: Vec<(String, FieldValue)>,

        /// Print the prediction as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive prediction form on stdin/stdout.
    Serve,
}

fn parse_field(raw: &str) -> Result<(String, FieldValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty field name in {:?}", raw));
    }
    // Kept verbatim: a categorical class such as "1.0" must reach the registry unchanged
    Ok((name.to_string(), FieldValue::Text(value.trim().to_string())))
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_yaml_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &cli.raw_dir {
        config.raw_dir = dir.clone();
    }
    if let Some(dir) = &cli.processed_dir {
        config.processed_dir = dir.clone();
    }
    if let Some(dir) = &cli.model_dir {
        config.model_dir = dir.clone();
    }
    Ok(config)
}

fn preprocess(config: &PipelineConfig, input: Option<&Path>) -> anyhow::Result<()> {
    let raw = match input {
        Some(path) => path.to_path_buf(),
        None => find_raw_csv(&config.raw_dir)
            .context("no raw dataset found; run `churn fetch` first")?,
    };
    let bundle = Preprocessor::new(config.clone()).run(&raw)?;
    bundle.write_artifacts(&config.processed_dir)?;
    info!(
        train = bundle.y_train.len(),
        test = bundle.y_test.len(),
        features = ?bundle.feature_order,
        "preprocessing complete"
    );
    Ok(())
}

fn train(config: &PipelineConfig) -> anyhow::Result<TrainingSummary> {
    let summary = train_from_artifacts(config)?;
    println!("Accuracy: {:.4}", summary.report.accuracy);
    println!();
    println!("Classification Report:");
    println!("{}", summary.report);
    if !summary.converged {
        println!(
            "Warning: training stopped after {} iterations without converging",
            summary.iterations
        );
    }
    println!("Model saved to {}", summary.model_path.display());
    Ok(summary)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Fetch => {
            let path = fetch_dataset(&config)?;
            println!("Dataset saved to {}", path.display());
        }
        Command::Preprocess { input } => preprocess(&config, input.as_deref())?,
        Command::Train {
            max_iter,
            learning_rate,
        } => {
            if let Some(max_iter) = max_iter {
                config.training.max_iter = max_iter;
            }
            if let Some(lr) = learning_rate {
                config.training.learning_rate = lr;
            }
            config.validate()?;
            train(&config)?;
        }
        Command::Run { input } => {
            preprocess(&config, input.as_deref())?;
            train(&config)?;
        }
        Command::Predict { fields, json } => {
            let ctx = InferenceContext::load(&config)?;
            let fields: Fields = fields.into_iter().collect();
            let prediction = ctx.predict(&fields)?;
            if json {
                println!("{}", serde_json::to_string(&prediction)?);
            } else {
                println!("{}", prediction);
            }
        }
        Command::Serve => {
            let ctx = InferenceContext::load(&config)?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let made = FormSession::new(&ctx).run(stdin.lock(), stdout.lock())?;
            info!(predictions = made, "session ended");
        }
    }

    Ok(())
}
