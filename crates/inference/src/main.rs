use clap::Parser;
use inference::{BackendVariant, InferenceAdapter, InferenceConfig, logging::setup_logging};
use std::path::Path;

/// Classify images or feature rows with a saved model
#[derive(Parser, Debug)]
#[command(name = "classify")]
struct Args {
    /// Model file (.pkl, .joblib, .h5 or .tflite); overrides MODEL_PATH
    #[arg(short, long)]
    model: Option<String>,

    /// Image paths (tflite models) or comma-separated feature rows
    #[arg(required = true)]
    inputs: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = InferenceConfig::from_env();
    if let Some(model) = args.model {
        config.model_path = model;
    }
    setup_logging(&config);

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    tracing::info!("Loading model");
    let mut adapter =
        InferenceAdapter::load_model(&config.model_path)?.with_label_map(config.label_map());
    tracing::info!(variant = %adapter.variant(), "Model loaded successfully");

    for input in &args.inputs {
        if let Err(e) = classify(&mut adapter, input) {
            tracing::error!(input = %input, error = %e, "Prediction failed");
        }
    }

    Ok(())
}

fn classify(adapter: &mut InferenceAdapter, input: &str) -> anyhow::Result<()> {
    let path = Path::new(input);

    if adapter.variant() == BackendVariant::TfliteLike && path.is_file() {
        let label = adapter.predict_from_image(path)?;
        tracing::info!(input = %input, label = %label, "Image classified");
        return Ok(());
    }

    let row = parse_row(input)?;
    let prediction = adapter.predict_from_tabular_data(row)?;
    tracing::info!(input = %input, prediction = ?prediction, "Tabular prediction");
    Ok(())
}

fn parse_row(input: &str) -> anyhow::Result<Vec<f64>> {
    input
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| anyhow::anyhow!("'{}' is not a number: {}", v.trim(), e))
        })
        .collect()
}
