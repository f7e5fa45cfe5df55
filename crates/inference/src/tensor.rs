use ndarray::ArrayD;
use std::fmt;

/// Element type an interpreter declares for its input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    F32,
    U8,
    I8,
    I16,
    I32,
    I64,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::F32 => "float32",
            ElementType::U8 => "uint8",
            ElementType::I8 => "int8",
            ElementType::I16 => "int16",
            ElementType::I32 => "int32",
            ElementType::I64 => "int64",
        };
        f.write_str(name)
    }
}

/// Affine quantization: `real = (quantized - zero_point) * scale`.
///
/// A zero scale means the input is not quantized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuantizationParams {
    pub scale: f32,
    pub zero_point: i32,
}

impl QuantizationParams {
    pub fn is_quantized(&self) -> bool {
        self.scale != 0.0
    }
}

/// What an interpreter expects in its (single) input slot.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDetails {
    pub element_type: ElementType,
    pub shape: Vec<usize>,
    pub quantization: QuantizationParams,
}

/// Typed buffer bound to an interpreter input slot.
#[derive(Debug, Clone, PartialEq)]
pub enum InputTensor {
    F32(ArrayD<f32>),
    U8(ArrayD<u8>),
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
}

impl InputTensor {
    /// Cast values to `element_type` without rescaling.
    ///
    /// Float to integer casts truncate toward zero and saturate at the
    /// type's bounds.
    pub fn cast(values: &ArrayD<f64>, element_type: ElementType) -> Self {
        match element_type {
            ElementType::F32 => InputTensor::F32(values.mapv(|v| v as f32)),
            ElementType::U8 => InputTensor::U8(values.mapv(|v| v as u8)),
            ElementType::I8 => InputTensor::I8(values.mapv(|v| v as i8)),
            ElementType::I16 => InputTensor::I16(values.mapv(|v| v as i16)),
            ElementType::I32 => InputTensor::I32(values.mapv(|v| v as i32)),
            ElementType::I64 => InputTensor::I64(values.mapv(|v| v as i64)),
        }
    }

    /// Prepare a float buffer for the declared input.
    ///
    /// Quantized inputs get `round(v / scale + zero_point)`; everything else is
    /// cast directly.
    pub fn quantize(values: &ArrayD<f32>, details: &InputDetails) -> Self {
        let q = details.quantization;
        let values = if q.is_quantized() {
            let scale = q.scale as f64;
            let zero_point = q.zero_point as f64;
            values.mapv(|v| (v as f64 / scale + zero_point).round())
        } else {
            values.mapv(|v| v as f64)
        };
        Self::cast(&values, details.element_type)
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            InputTensor::F32(_) => ElementType::F32,
            InputTensor::U8(_) => ElementType::U8,
            InputTensor::I8(_) => ElementType::I8,
            InputTensor::I16(_) => ElementType::I16,
            InputTensor::I32(_) => ElementType::I32,
            InputTensor::I64(_) => ElementType::I64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            InputTensor::F32(a) => a.shape(),
            InputTensor::U8(a) => a.shape(),
            InputTensor::I8(a) => a.shape(),
            InputTensor::I16(a) => a.shape(),
            InputTensor::I32(a) => a.shape(),
            InputTensor::I64(a) => a.shape(),
        }
    }
}
