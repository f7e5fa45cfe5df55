use crate::backend::{Backend, Interpreter, ModelLoader};
use crate::error::{InferenceError, Result};
use crate::format::BackendVariant;
use crate::model::ModelHandle;
use crate::pipeline::{ColumnTransformer, Pipeline, ScalerType};
use crate::postprocessing::{ImageLabel, LabelMap, argmax_rows, decode_image_output};
use crate::tabular::TabularInput;
use crate::tensor::InputTensor;
use common::{span, span_debug};
use ndarray::ArrayD;
use preprocess::{ImageInput, PreProcessor};
use std::path::Path;

/// Result of a tabular prediction; the shape depends on the backend variant.
#[derive(Debug, Clone, PartialEq)]
pub enum TabularPrediction {
    /// sklearn-like, single row
    Label(String),
    /// sklearn-like, one label per frame row
    Labels(Vec<String>),
    /// keras-like raw output, shape and values as the network produced them
    Scores(ArrayD<f32>),
    /// tflite-like arg-max per batch row
    ClassIndices(Vec<usize>),
}

/// Single entry point over a loaded model.
///
/// Image inputs are resized and normalized before reaching the interpreter;
/// tabular inputs are normalized per backend variant. Every predict call
/// needs exclusive access since the runtimes hold mutable session state.
pub struct InferenceAdapter {
    handle: ModelHandle,
    preprocessor: PreProcessor,
    labels: LabelMap,
}

impl InferenceAdapter {
    pub fn load_model(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_handle(ModelHandle::load(path)?))
    }

    pub fn load_model_with(path: impl AsRef<Path>, loader: &dyn ModelLoader) -> Result<Self> {
        Ok(Self::from_handle(ModelHandle::load_with(path, loader)?))
    }

    pub fn from_handle(handle: ModelHandle) -> Self {
        Self {
            handle,
            preprocessor: PreProcessor::default(),
            labels: LabelMap::default(),
        }
    }

    /// Replace the class-index mapping used for sklearn-like predictions.
    pub fn with_label_map(mut self, labels: LabelMap) -> Self {
        self.labels = labels;
        self
    }

    pub fn variant(&self) -> BackendVariant {
        self.handle.variant()
    }

    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    pub fn label_map(&self) -> &LabelMap {
        &self.labels
    }

    /// Classify one image as organic or recyclable. Interpreter models only.
    pub fn predict_from_image(&mut self, image: impl Into<ImageInput>) -> Result<ImageLabel> {
        let _s = span!("predict_from_image");

        let interpreter = match self.handle.backend_mut() {
            Backend::Interpreter(interpreter) => interpreter,
            other => {
                return Err(InferenceError::UnsupportedOperation {
                    operation: "predict_from_image",
                    variant: other.variant(),
                });
            }
        };

        let buffer = self.preprocessor.preprocess(image.into())?.into_dyn();
        let input = InputTensor::quantize(&buffer, interpreter.input_details());

        let output = invoke(interpreter.as_mut(), &input)?;
        let label = decode_image_output(&output)?;

        tracing::debug!(output_shape = ?output.shape(), label = %label, "Image classified");
        Ok(label)
    }

    /// Run a tabular prediction, normalizing `data` for the bound backend.
    pub fn predict_from_tabular_data(
        &mut self,
        data: impl Into<TabularInput>,
    ) -> Result<TabularPrediction> {
        let _s = span!("predict_from_tabular_data");
        let data = data.into();

        let prediction = match self.handle.backend_mut() {
            Backend::Estimator(estimator) => {
                let frame = data.into_frame()?;
                let classes = estimator.predict(&frame)?;
                let mut labels: Vec<String> = classes
                    .into_iter()
                    .map(|c| self.labels.label(c).to_string())
                    .collect();

                if labels.len() == 1 {
                    TabularPrediction::Label(labels.remove(0))
                } else {
                    TabularPrediction::Labels(labels)
                }
            }
            Backend::Network(network) => {
                let input = data.into_batched_array()?.mapv(|v| v as f32);
                TabularPrediction::Scores(network.predict(&input)?)
            }
            Backend::Interpreter(interpreter) => {
                let values = data.into_batched_array()?;
                let input = InputTensor::cast(&values, interpreter.input_details().element_type);
                let output = invoke(interpreter.as_mut(), &input)?;
                TabularPrediction::ClassIndices(argmax_rows(&output)?)
            }
        };

        tracing::debug!(prediction = ?prediction, "Tabular prediction");
        Ok(prediction)
    }

    /// Build a scaling + model composite without running it.
    ///
    /// `numerical_features` are scaled with `scaler_type` ("standard" or
    /// "minmax"), every other column passes through. sklearn-like models only.
    pub fn data_pipeline(
        &mut self,
        numerical_features: &[&str],
        scaler_type: &str,
    ) -> Result<Pipeline<'_>> {
        let estimator = match self.handle.backend_mut() {
            Backend::Estimator(estimator) => estimator,
            other => {
                return Err(InferenceError::UnsupportedOperation {
                    operation: "data_pipeline",
                    variant: other.variant(),
                });
            }
        };
        let scaler: ScalerType = scaler_type.parse()?;

        let transformer = ColumnTransformer::new(
            numerical_features.iter().map(|s| s.to_string()).collect(),
            scaler,
        );

        tracing::debug!(
            features = ?numerical_features,
            scaler = scaler.as_str(),
            "Data pipeline built"
        );
        Ok(Pipeline::new(transformer, estimator.as_mut(), &self.labels))
    }
}

fn invoke(interpreter: &mut dyn Interpreter, input: &InputTensor) -> Result<ArrayD<f32>> {
    let _s = span_debug!("invoke_interpreter");
    tracing::trace!(
        element_type = %input.element_type(),
        shape = ?input.shape(),
        "Invoking interpreter"
    );
    Ok(interpreter.invoke(input)?)
}
