use crate::error::{InferenceError, Result};
use crate::format::{BackendVariant, ModelFormat};
use crate::tabular::TabularFrame;
use crate::tensor::{InputDetails, InputTensor};
use ndarray::ArrayD;
use std::path::{Path, PathBuf};

#[cfg(feature = "ort-backend")]
pub mod ort;

#[cfg(feature = "tflite-backend")]
pub mod tract;

/// Classical estimator (sklearn-like): named-column frame in, class ids out.
pub trait Estimator: Send {
    fn predict(&mut self, frame: &TabularFrame) -> anyhow::Result<Vec<i64>>;
}

/// Neural network (keras-like): float batch in, raw float output out.
pub trait Network: Send {
    fn predict(&mut self, input: &ArrayD<f32>) -> anyhow::Result<ArrayD<f32>>;
}

/// Lightweight interpreter (tflite-like) with a single typed input slot.
///
/// Tensors are allocated when the interpreter is constructed.
pub trait Interpreter: Send {
    fn input_details(&self) -> &InputDetails;

    /// Bind `input` to the input slot, run one forward pass and read the
    /// first output slot as floats.
    fn invoke(&mut self, input: &InputTensor) -> anyhow::Result<ArrayD<f32>>;
}

/// The runtime object a [`crate::ModelHandle`] owns.
pub enum Backend {
    Estimator(Box<dyn Estimator>),
    Network(Box<dyn Network>),
    Interpreter(Box<dyn Interpreter>),
}

impl Backend {
    pub fn variant(&self) -> BackendVariant {
        match self {
            Backend::Estimator(_) => BackendVariant::SklearnLike,
            Backend::Network(_) => BackendVariant::KerasLike,
            Backend::Interpreter(_) => BackendVariant::TfliteLike,
        }
    }
}

/// Turns model files into runtime objects, one method per backend family.
pub trait ModelLoader {
    fn load_estimator(&self, path: &Path, format: ModelFormat) -> Result<Box<dyn Estimator>>;

    fn load_network(&self, path: &Path) -> Result<Box<dyn Network>>;

    fn load_interpreter(&self, path: &Path) -> Result<Box<dyn Interpreter>>;
}

/// Loader backed by the runtimes compiled into this crate.
///
/// Pickle, joblib and HDF5 artifacts are validated, then executed through
/// their ONNX conversion stored next to them (`model.pkl` -> `model.onnx`).
/// TFLite files are interpreted directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLoader;

impl ModelLoader for DefaultLoader {
    fn load_estimator(&self, path: &Path, format: ModelFormat) -> Result<Box<dyn Estimator>> {
        format.validate_artifact(path)?;
        let onnx_path = onnx_sibling(path)?;
        onnx_estimator(&onnx_path)
    }

    fn load_network(&self, path: &Path) -> Result<Box<dyn Network>> {
        ModelFormat::Hdf5.validate_artifact(path)?;
        let onnx_path = onnx_sibling(path)?;
        onnx_network(&onnx_path)
    }

    fn load_interpreter(&self, path: &Path) -> Result<Box<dyn Interpreter>> {
        ModelFormat::Tflite.validate_artifact(path)?;
        tflite_interpreter(path)
    }
}

#[cfg(feature = "ort-backend")]
fn onnx_estimator(onnx_path: &Path) -> Result<Box<dyn Estimator>> {
    Ok(Box::new(ort::OrtEstimator::load(onnx_path)?))
}

#[cfg(not(feature = "ort-backend"))]
fn onnx_estimator(onnx_path: &Path) -> Result<Box<dyn Estimator>> {
    Err(runtime_disabled(onnx_path, "ort-backend"))
}

#[cfg(feature = "ort-backend")]
fn onnx_network(onnx_path: &Path) -> Result<Box<dyn Network>> {
    Ok(Box::new(ort::OrtNetwork::load(onnx_path)?))
}

#[cfg(not(feature = "ort-backend"))]
fn onnx_network(onnx_path: &Path) -> Result<Box<dyn Network>> {
    Err(runtime_disabled(onnx_path, "ort-backend"))
}

#[cfg(feature = "tflite-backend")]
fn tflite_interpreter(path: &Path) -> Result<Box<dyn Interpreter>> {
    Ok(Box::new(tract::TractInterpreter::load(path)?))
}

#[cfg(not(feature = "tflite-backend"))]
fn tflite_interpreter(path: &Path) -> Result<Box<dyn Interpreter>> {
    Err(runtime_disabled(path, "tflite-backend"))
}

/// Path of the ONNX conversion that accompanies a serialized model.
pub fn onnx_sibling(path: &Path) -> Result<PathBuf> {
    let onnx_path = path.with_extension("onnx");
    if !onnx_path.is_file() {
        return Err(InferenceError::RuntimeUnavailable {
            path: path.to_path_buf(),
            reason: format!("expected ONNX conversion at {}", onnx_path.display()),
        });
    }
    Ok(onnx_path)
}

#[cfg(not(all(feature = "ort-backend", feature = "tflite-backend")))]
fn runtime_disabled(path: &Path, feature: &str) -> InferenceError {
    InferenceError::RuntimeUnavailable {
        path: path.to_path_buf(),
        reason: format!("built without the '{}' feature", feature),
    }
}
