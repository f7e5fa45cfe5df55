use crate::error::{InferenceError, Result};
use ndarray::{ArrayD, Axis};
use std::fmt;

/// Sigmoid outputs below this are organic.
const SIGMOID_THRESHOLD: f32 = 0.5;

/// Waste category predicted from an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLabel {
    Organik,
    NonOrganik,
}

impl ImageLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageLabel::Organik => "organik",
            ImageLabel::NonOrganik => "non-organik",
        }
    }

    /// Class index 0 is organic; every other index is recyclable.
    fn from_index(index: usize) -> Self {
        if index == 0 {
            ImageLabel::Organik
        } else {
            ImageLabel::NonOrganik
        }
    }
}

impl fmt::Display for ImageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode a classifier output into a waste label.
///
/// `(n, 1)` outputs are a sigmoid probability of "recyclable", `(n, 2)`
/// outputs are (organic, recyclable) scores, anything else is arg-maxed
/// after flattening. Only the first batch row is looked at.
pub fn decode_image_output(output: &ArrayD<f32>) -> Result<ImageLabel> {
    let shape = output.shape();

    if let [_, 1] = shape {
        let probability = output
            .get([0, 0])
            .ok_or_else(|| unexpected(output))?;
        return Ok(if *probability < SIGMOID_THRESHOLD {
            ImageLabel::Organik
        } else {
            ImageLabel::NonOrganik
        });
    }

    if let [_, 2] = shape {
        let (organik, non_organik) = match (output.get([0, 0]), output.get([0, 1])) {
            (Some(o), Some(r)) => (*o, *r),
            _ => return Err(unexpected(output)),
        };
        return Ok(if organik > non_organik {
            ImageLabel::Organik
        } else {
            ImageLabel::NonOrganik
        });
    }

    let index = argmax(output.iter().copied()).ok_or_else(|| unexpected(output))?;
    Ok(ImageLabel::from_index(index))
}

/// Arg-max along the class axis for every batch row.
///
/// A 1-D output counts as a single row.
pub fn argmax_rows(output: &ArrayD<f32>) -> Result<Vec<usize>> {
    match output.ndim() {
        1 => argmax(output.iter().copied())
            .map(|i| vec![i])
            .ok_or_else(|| unexpected(output)),
        2 => output
            .axis_iter(Axis(0))
            .map(|row| argmax(row.iter().copied()).ok_or_else(|| unexpected(output)))
            .collect(),
        _ => Err(unexpected(output)),
    }
}

/// Index of the first maximum, `None` for an empty sequence.
fn argmax(values: impl Iterator<Item = f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, v) in values.enumerate() {
        match best {
            Some((_, max)) if v <= max => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn unexpected(output: &ArrayD<f32>) -> InferenceError {
    InferenceError::UnexpectedOutput {
        shape: output.shape().to_vec(),
    }
}

/// Class-index to label mapping for tabular classifiers.
///
/// Indices past the explicit labels (and negative ones) decode to the
/// fallback label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap {
    labels: Vec<String>,
    fallback: String,
}

impl LabelMap {
    pub fn new(labels: Vec<String>, fallback: impl Into<String>) -> Self {
        Self {
            labels,
            fallback: fallback.into(),
        }
    }

    /// Use the last label as the fallback for every index from its position on.
    pub fn from_labels(mut labels: Vec<String>) -> Option<Self> {
        let fallback = labels.pop()?;
        Some(Self::new(labels, fallback))
    }

    /// Three-class iris demonstration mapping.
    pub fn iris() -> Self {
        Self::new(
            vec!["setosa".to_string(), "versicolor".to_string()],
            "virginica",
        )
    }

    pub fn label(&self, class: i64) -> &str {
        usize::try_from(class)
            .ok()
            .and_then(|i| self.labels.get(i))
            .unwrap_or(&self.fallback)
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::iris()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{IxDyn, arr2};

    fn output(shape: &[usize], values: Vec<f32>) -> ArrayD<f32> {
        ArrayD::from_shape_vec(IxDyn(shape), values).unwrap()
    }

    #[test]
    fn test_sigmoid_output_threshold() {
        assert_eq!(
            decode_image_output(&output(&[1, 1], vec![0.3])).unwrap(),
            ImageLabel::Organik
        );
        assert_eq!(
            decode_image_output(&output(&[1, 1], vec![0.7])).unwrap(),
            ImageLabel::NonOrganik
        );
        // Boundary belongs to the not-less-than branch
        assert_eq!(
            decode_image_output(&output(&[1, 1], vec![0.5])).unwrap(),
            ImageLabel::NonOrganik
        );
    }

    #[test]
    fn test_two_column_softmax_output() {
        assert_eq!(
            decode_image_output(&arr2(&[[0.9f32, 0.1]]).into_dyn()).unwrap(),
            ImageLabel::Organik
        );
        assert_eq!(
            decode_image_output(&arr2(&[[0.2f32, 0.8]]).into_dyn()).unwrap(),
            ImageLabel::NonOrganik
        );
        // Ties go to non-organik
        assert_eq!(
            decode_image_output(&arr2(&[[0.5f32, 0.5]]).into_dyn()).unwrap(),
            ImageLabel::NonOrganik
        );
    }

    #[test]
    fn test_other_shapes_use_flattened_argmax() {
        assert_eq!(
            decode_image_output(&output(&[1, 3], vec![0.6, 0.3, 0.1])).unwrap(),
            ImageLabel::Organik
        );
        assert_eq!(
            decode_image_output(&output(&[1, 3], vec![0.1, 0.3, 0.6])).unwrap(),
            ImageLabel::NonOrganik
        );
        assert_eq!(
            decode_image_output(&output(&[2], vec![0.2, 0.8])).unwrap(),
            ImageLabel::NonOrganik
        );
        assert_eq!(
            decode_image_output(&output(&[1, 1, 2], vec![0.9, 0.1])).unwrap(),
            ImageLabel::Organik
        );
    }

    #[test]
    fn test_empty_output_is_rejected() {
        assert!(matches!(
            decode_image_output(&output(&[0, 1], vec![])),
            Err(InferenceError::UnexpectedOutput { .. })
        ));
        assert!(matches!(
            decode_image_output(&output(&[0], vec![])),
            Err(InferenceError::UnexpectedOutput { .. })
        ));
    }

    #[test]
    fn test_label_strings() {
        assert_eq!(ImageLabel::Organik.to_string(), "organik");
        assert_eq!(ImageLabel::NonOrganik.to_string(), "non-organik");
    }

    #[test]
    fn test_argmax_rows_per_batch_row() {
        let logits = arr2(&[[0.1f32, 0.7, 0.2], [0.9, 0.05, 0.05], [0.2, 0.2, 0.6]]).into_dyn();
        assert_eq!(argmax_rows(&logits).unwrap(), vec![1, 0, 2]);

        // First maximum wins on ties
        let tied = arr2(&[[0.5f32, 0.5]]).into_dyn();
        assert_eq!(argmax_rows(&tied).unwrap(), vec![0]);

        let cube = output(&[1, 1, 2], vec![0.0, 1.0]);
        assert!(argmax_rows(&cube).is_err());
    }

    #[test]
    fn test_iris_label_map() {
        let labels = LabelMap::default();
        assert_eq!(labels.label(0), "setosa");
        assert_eq!(labels.label(1), "versicolor");
        assert_eq!(labels.label(2), "virginica");
        assert_eq!(labels.label(7), "virginica");
        assert_eq!(labels.label(-1), "virginica");
    }

    #[test]
    fn test_label_map_from_labels() {
        let labels = LabelMap::from_labels(vec!["cat".into(), "dog".into()]).unwrap();
        assert_eq!(labels.label(0), "cat");
        assert_eq!(labels.label(1), "dog");
        assert_eq!(labels.label(5), "dog");

        assert!(LabelMap::from_labels(Vec::new()).is_none());
    }
}
