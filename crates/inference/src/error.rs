use crate::format::{BackendVariant, ModelFormat};
use preprocess::PreprocessError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InferenceError>;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error(
        "Model format '{extension}' not supported. Please use '.pkl', '.joblib', '.h5', or '.tflite'"
    )]
    UnsupportedFormat { extension: String },

    #[error("{operation} is not supported for {variant} models")]
    UnsupportedOperation {
        operation: &'static str,
        variant: BackendVariant,
    },

    #[error("Data format not supported: {0}")]
    UnsupportedDataFormat(String),

    #[error("Unsupported scaler type: '{0}'. Use 'standard' or 'minmax'")]
    UnsupportedScalerType(String),

    #[error("Image decode failed: {0}")]
    ImageDecode(#[from] PreprocessError),

    #[error("Invalid {format} artifact {}: {reason}", path.display())]
    InvalidArtifact {
        path: PathBuf,
        format: ModelFormat,
        reason: String,
    },

    #[error("No runtime available for {}: {reason}", path.display())]
    RuntimeUnavailable { path: PathBuf, reason: String },

    #[error("Unexpected model output shape {shape:?}")]
    UnexpectedOutput { shape: Vec<usize> },

    #[error("Pipeline must be fit before it can transform data")]
    PipelineNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl From<ndarray::ShapeError> for InferenceError {
    fn from(e: ndarray::ShapeError) -> Self {
        InferenceError::UnsupportedDataFormat(e.to_string())
    }
}
