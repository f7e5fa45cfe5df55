use super::Interpreter;
use crate::tensor::{ElementType, InputDetails, InputTensor, QuantizationParams};
use anyhow::Context;
use ndarray::{ArrayD, IxDyn};
use std::path::Path;
use tract_core::prelude::*;

/// TFLite flatbuffer executed by tract.
///
/// The execution plan is optimized and built at load time, which is where
/// the interpreter's tensors get allocated.
pub struct TractInterpreter {
    plan: TypedRunnableModel<TypedModel>,
    input_datum: DatumType,
    details: InputDetails,
}

impl TractInterpreter {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let model = tract_tflite::tflite()
            .model_for_path(path)
            .with_context(|| format!("Failed to parse TFLite model {}", path.display()))?;

        let fact = model.input_fact(0)?.clone();
        let details = input_details(&fact)?;

        let plan = model.into_optimized()?.into_runnable()?;

        tracing::info!(
            path = %path.display(),
            element_type = %details.element_type,
            shape = ?details.shape,
            scale = details.quantization.scale,
            zero_point = details.quantization.zero_point,
            "TFLite model loaded"
        );

        Ok(Self {
            plan,
            input_datum: fact.datum_type,
            details,
        })
    }
}

impl Interpreter for TractInterpreter {
    fn input_details(&self) -> &InputDetails {
        &self.details
    }

    fn invoke(&mut self, input: &InputTensor) -> anyhow::Result<ArrayD<f32>> {
        let mut tensor = to_tract_tensor(input)?;
        if self.input_datum.is_quantized() {
            // SAFETY: the buffer already holds the unquantized storage type of
            // `input_datum`, only the quantization parameters are attached.
            unsafe { tensor.set_datum_type(self.input_datum) };
        }

        let outputs = self.plan.run(tvec!(tensor.into_tvalue()))?;
        let output = outputs.first().context("Model produced no outputs")?;

        let output = output.cast_to::<f32>()?;
        let view = output.to_array_view::<f32>()?;

        Ok(ArrayD::from_shape_vec(
            IxDyn(view.shape()),
            view.iter().copied().collect(),
        )?)
    }
}

fn input_details(fact: &TypedFact) -> anyhow::Result<InputDetails> {
    let element_type = match fact.datum_type.unquantized() {
        DatumType::F32 => ElementType::F32,
        DatumType::U8 => ElementType::U8,
        DatumType::I8 => ElementType::I8,
        DatumType::I16 => ElementType::I16,
        DatumType::I32 => ElementType::I32,
        DatumType::I64 => ElementType::I64,
        other => anyhow::bail!("Unsupported input datum type {:?}", other),
    };

    let quantization = fact
        .datum_type
        .qparams()
        .map(|q| {
            let (zero_point, scale) = q.zp_scale();
            QuantizationParams { scale, zero_point }
        })
        .unwrap_or_default();

    let shape = fact
        .shape
        .as_concrete()
        .map(|s| s.to_vec())
        .unwrap_or_default();

    Ok(InputDetails {
        element_type,
        shape,
        quantization,
    })
}

fn to_tract_tensor(input: &InputTensor) -> TractResult<Tensor> {
    fn from_array<T: Datum + Copy>(array: &ArrayD<T>) -> TractResult<Tensor> {
        let data: Vec<T> = array.iter().copied().collect();
        Tensor::from_shape(array.shape(), &data)
    }

    match input {
        InputTensor::F32(a) => from_array(a),
        InputTensor::U8(a) => from_array(a),
        InputTensor::I8(a) => from_array(a),
        InputTensor::I16(a) => from_array(a),
        InputTensor::I32(a) => from_array(a),
        InputTensor::I64(a) => from_array(a),
    }
}
