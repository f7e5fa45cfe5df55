use super::{Estimator, Network};
use crate::tabular::TabularFrame;
use ndarray::ArrayD;
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionProvider {
    Cpu,
    Cuda,
}

impl Default for ExecutionProvider {
    fn default() -> Self {
        if cfg!(feature = "cuda") {
            ExecutionProvider::Cuda
        } else {
            ExecutionProvider::Cpu
        }
    }
}

/// Build an ONNX Runtime session for `path` on the given provider.
pub fn build_session(path: &Path, provider: ExecutionProvider) -> anyhow::Result<Session> {
    // Initialize ORT environment (idempotent)
    let _ = ort::init().commit();

    let mut builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?;

    match provider {
        ExecutionProvider::Cuda => {
            tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
            builder = builder.with_execution_providers([
                ort::execution_providers::CUDAExecutionProvider::default()
                    .with_device_id(0)
                    .build()
                    .error_on_failure(),
            ])?;
        }
        ExecutionProvider::Cpu => {
            tracing::info!("Initializing ONNX Runtime with CPU execution provider");
        }
    }

    let session = builder.commit_from_file(path)?;

    tracing::info!("ONNX model loaded from {}", path.display());
    Ok(session)
}

/// sklearn-like classifier converted with skl2onnx.
///
/// Feeds the frame as a float32 matrix and reads the predicted labels from
/// the first (int64 `label`) output.
pub struct OrtEstimator {
    session: Session,
}

impl OrtEstimator {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let session = build_session(path, ExecutionProvider::default())?;
        Ok(Self { session })
    }
}

impl Estimator for OrtEstimator {
    fn predict(&mut self, frame: &TabularFrame) -> anyhow::Result<Vec<i64>> {
        let features = frame.values().mapv(|v| v as f32).into_dyn();

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(features.view())?])?;

        let labels = outputs[0].try_extract_array::<i64>()?;
        Ok(labels.iter().copied().collect())
    }
}

/// keras-like network converted with tf2onnx.
pub struct OrtNetwork {
    session: Session,
}

impl OrtNetwork {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let session = build_session(path, ExecutionProvider::default())?;
        Ok(Self { session })
    }
}

impl Network for OrtNetwork {
    fn predict(&mut self, input: &ArrayD<f32>) -> anyhow::Result<ArrayD<f32>> {
        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let scores = outputs[0].try_extract_array::<f32>()?;
        Ok(scores.into_owned())
    }
}
