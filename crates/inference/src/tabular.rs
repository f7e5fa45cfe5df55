//! Canonical tabular representation.
//!
//! Rows, batches, arrays, frames and records all arrive through
//! [`TabularInput`] and are normalized here, before any backend sees them.

use crate::error::{InferenceError, Result};
use ndarray::{Array1, Array2, ArrayD, Axis};
use std::collections::BTreeMap;

/// Column-named, row-major table of numeric features.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularFrame {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl TabularFrame {
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if columns.len() != values.ncols() {
            return Err(InferenceError::UnsupportedDataFormat(format!(
                "{} column names for {} columns",
                columns.len(),
                values.ncols()
            )));
        }
        Ok(Self { columns, values })
    }

    /// Build a frame from equally sized rows.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let values = rows_to_array(rows, columns.len())?;
        Self::new(columns, values)
    }

    /// Frame with positional column names `"0"`, `"1"`, ...
    pub fn positional(values: Array2<f64>) -> Self {
        let columns = (0..values.ncols()).map(|i| i.to_string()).collect();
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Tabular data in any of the shapes callers hand over.
#[derive(Debug, Clone, PartialEq)]
pub enum TabularInput {
    /// One row of features in column order
    Row(Vec<f64>),
    /// Batch of rows
    Rows(Vec<Vec<f64>>),
    /// Numeric array of any rank
    Array(ArrayD<f64>),
    Frame(TabularFrame),
    /// Single named-value record
    Record(BTreeMap<String, f64>),
}

impl TabularInput {
    fn kind(&self) -> &'static str {
        match self {
            TabularInput::Row(_) => "row",
            TabularInput::Rows(_) => "batch of rows",
            TabularInput::Array(_) => "array",
            TabularInput::Frame(_) => "frame",
            TabularInput::Record(_) => "record",
        }
    }

    /// Normalize for estimators that consume named columns.
    ///
    /// Single rows (as a sequence or array) become a one-row positional frame;
    /// frames pass through. Records and multi-row batches are rejected.
    pub fn into_frame(self) -> Result<TabularFrame> {
        match self {
            TabularInput::Frame(frame) => Ok(frame),
            TabularInput::Row(row) => Ok(TabularFrame::positional(single_row(row))),
            TabularInput::Rows(mut rows) if rows.len() == 1 => {
                Ok(TabularFrame::positional(single_row(rows.remove(0))))
            }
            TabularInput::Array(array) => match array.ndim() {
                1 => Ok(TabularFrame::positional(
                    array.insert_axis(Axis(0)).into_dimensionality()?,
                )),
                2 if array.shape()[0] == 1 => {
                    Ok(TabularFrame::positional(array.into_dimensionality()?))
                }
                _ => Err(unsupported(format!(
                    "array of shape {:?} is not a single row; pass a frame for batches",
                    array.shape()
                ))),
            },
            other => Err(unsupported(format!(
                "{} is not supported for sklearn-like models; use a row, an array, or a frame",
                other.kind()
            ))),
        }
    }

    /// Normalize into a numeric array with a leading batch dimension.
    ///
    /// 1-D data becomes a single-row batch; higher ranks are kept as given.
    pub fn into_batched_array(self) -> Result<ArrayD<f64>> {
        let array = match self {
            TabularInput::Row(row) => Array1::from(row).into_dyn(),
            TabularInput::Rows(rows) => {
                let width = rows.first().map(Vec::len).unwrap_or(0);
                rows_to_array(rows, width)?.into_dyn()
            }
            TabularInput::Array(array) => array,
            TabularInput::Frame(frame) => frame.values.into_dyn(),
            TabularInput::Record(_) => {
                return Err(unsupported(
                    "named-value records have no column order; use a frame".to_string(),
                ));
            }
        };

        match array.ndim() {
            0 => Err(unsupported("scalar input has no features".to_string())),
            1 => Ok(array.insert_axis(Axis(0))),
            _ => Ok(array),
        }
    }
}

impl From<Vec<f64>> for TabularInput {
    fn from(row: Vec<f64>) -> Self {
        TabularInput::Row(row)
    }
}

impl From<&[f64]> for TabularInput {
    fn from(row: &[f64]) -> Self {
        TabularInput::Row(row.to_vec())
    }
}

impl From<Vec<Vec<f64>>> for TabularInput {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        TabularInput::Rows(rows)
    }
}

impl From<ArrayD<f64>> for TabularInput {
    fn from(array: ArrayD<f64>) -> Self {
        TabularInput::Array(array)
    }
}

impl From<Array1<f64>> for TabularInput {
    fn from(array: Array1<f64>) -> Self {
        TabularInput::Array(array.into_dyn())
    }
}

impl From<Array2<f64>> for TabularInput {
    fn from(array: Array2<f64>) -> Self {
        TabularInput::Array(array.into_dyn())
    }
}

impl From<TabularFrame> for TabularInput {
    fn from(frame: TabularFrame) -> Self {
        TabularInput::Frame(frame)
    }
}

impl From<BTreeMap<String, f64>> for TabularInput {
    fn from(record: BTreeMap<String, f64>) -> Self {
        TabularInput::Record(record)
    }
}

fn single_row(row: Vec<f64>) -> Array2<f64> {
    Array1::from(row).insert_axis(Axis(0))
}

fn rows_to_array(rows: Vec<Vec<f64>>, width: usize) -> Result<Array2<f64>> {
    let height = rows.len();
    let mut flat = Vec::with_capacity(height * width);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != width {
            return Err(unsupported(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                width
            )));
        }
        flat.extend(row);
    }
    Ok(Array2::from_shape_vec((height, width), flat)?)
}

fn unsupported(reason: String) -> InferenceError {
    InferenceError::UnsupportedDataFormat(reason)
}
