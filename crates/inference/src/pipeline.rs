//! Scaling + estimator composite returned by the adapter's `data_pipeline`.

use crate::backend::Estimator;
use crate::error::{InferenceError, Result};
use crate::postprocessing::LabelMap;
use crate::tabular::TabularFrame;
use ndarray::{Array1, Array2, Axis, concatenate};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalerType {
    /// Zero mean, unit (population) variance
    Standard,
    /// Rescale into [0, 1]
    MinMax,
}

impl ScalerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalerType::Standard => "standard",
            ScalerType::MinMax => "minmax",
        }
    }
}

impl FromStr for ScalerType {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(ScalerType::Standard),
            "minmax" => Ok(ScalerType::MinMax),
            other => Err(InferenceError::UnsupportedScalerType(other.to_string())),
        }
    }
}

/// Per-column `(x - offset) / scale` learned by [`ColumnTransformer::fit`].
#[derive(Debug, Clone, PartialEq)]
struct FittedScaler {
    indices: Vec<usize>,
    offset: Array1<f64>,
    scale: Array1<f64>,
}

/// Scales the named numerical columns and passes every other column through.
///
/// Output columns are the scaled ones first, in the order they were named,
/// followed by the untouched columns in their original order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTransformer {
    numerical_features: Vec<String>,
    scaler: ScalerType,
    fitted: Option<FittedScaler>,
}

impl ColumnTransformer {
    pub fn new(numerical_features: Vec<String>, scaler: ScalerType) -> Self {
        Self {
            numerical_features,
            scaler,
            fitted: None,
        }
    }

    pub fn numerical_features(&self) -> &[String] {
        &self.numerical_features
    }

    pub fn scaler(&self) -> ScalerType {
        self.scaler
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn fit(&mut self, frame: &TabularFrame) -> Result<()> {
        let indices = self.resolve(frame)?;
        if frame.n_rows() == 0 && !indices.is_empty() {
            return Err(InferenceError::UnsupportedDataFormat(
                "cannot fit a scaler on an empty frame".to_string(),
            ));
        }

        let selected = frame.values().select(Axis(1), &indices);
        let (offset, scale) = match self.scaler {
            ScalerType::Standard => {
                let mean = selected
                    .mean_axis(Axis(0))
                    .unwrap_or_else(|| Array1::zeros(indices.len()));
                let std = selected.std_axis(Axis(0), 0.0);
                (mean, std)
            }
            ScalerType::MinMax => {
                let min = selected.fold_axis(Axis(0), f64::INFINITY, |acc, &v| acc.min(v));
                let max = selected.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &v| acc.max(v));
                let range = &max - &min;
                (min, range)
            }
        };
        // Constant columns keep their centered values instead of dividing by zero
        let scale = scale.mapv(|s| if s == 0.0 { 1.0 } else { s });

        tracing::debug!(
            scaler = self.scaler.as_str(),
            columns = ?self.numerical_features,
            rows = frame.n_rows(),
            "Column transformer fitted"
        );

        self.fitted = Some(FittedScaler {
            indices,
            offset,
            scale,
        });
        Ok(())
    }

    pub fn transform(&self, frame: &TabularFrame) -> Result<TabularFrame> {
        let fitted = self.fitted.as_ref().ok_or(InferenceError::PipelineNotFitted)?;

        // Column positions may differ from the fitting frame; names are the contract
        let indices = self.resolve(frame)?;
        let passthrough: Vec<usize> = (0..frame.columns().len())
            .filter(|i| !indices.contains(i))
            .collect();

        let scaled = (&frame.values().select(Axis(1), &indices) - &fitted.offset) / &fitted.scale;
        let kept = frame.values().select(Axis(1), &passthrough);
        let values: Array2<f64> = concatenate(Axis(1), &[scaled.view(), kept.view()])?;

        let columns = indices
            .iter()
            .chain(passthrough.iter())
            .map(|&i| frame.columns()[i].clone())
            .collect();

        TabularFrame::new(columns, values)
    }

    pub fn fit_transform(&mut self, frame: &TabularFrame) -> Result<TabularFrame> {
        self.fit(frame)?;
        self.transform(frame)
    }

    fn resolve(&self, frame: &TabularFrame) -> Result<Vec<usize>> {
        self.numerical_features
            .iter()
            .map(|name| {
                frame.column_index(name).ok_or_else(|| {
                    InferenceError::UnsupportedDataFormat(format!(
                        "numerical feature '{}' not found in columns {:?}",
                        name,
                        frame.columns()
                    ))
                })
            })
            .collect()
    }
}

/// Column transformer followed by the loaded estimator.
///
/// Building one never runs the model; the estimator stays borrowed from the
/// adapter that produced it.
pub struct Pipeline<'a> {
    preprocessor: ColumnTransformer,
    model: &'a mut dyn Estimator,
    labels: &'a LabelMap,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        preprocessor: ColumnTransformer,
        model: &'a mut dyn Estimator,
        labels: &'a LabelMap,
    ) -> Self {
        Self {
            preprocessor,
            model,
            labels,
        }
    }

    pub fn preprocessor(&self) -> &ColumnTransformer {
        &self.preprocessor
    }

    /// Fit the scaling step. The estimator is already trained.
    pub fn fit(&mut self, frame: &TabularFrame) -> Result<()> {
        self.preprocessor.fit(frame)
    }

    pub fn transform(&self, frame: &TabularFrame) -> Result<TabularFrame> {
        self.preprocessor.transform(frame)
    }

    /// Scale `frame`, run the estimator and map each class to its label.
    pub fn predict(&mut self, frame: &TabularFrame) -> Result<Vec<String>> {
        let transformed = self.preprocessor.transform(frame)?;
        let classes = self.model.predict(&transformed)?;
        Ok(classes
            .into_iter()
            .map(|c| self.labels.label(c).to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    const EPS: f64 = 1e-9;

    fn iris_frame() -> TabularFrame {
        TabularFrame::from_rows(
            vec![
                "sepal_length".into(),
                "species_code".into(),
                "petal_length".into(),
            ],
            vec![
                vec![1.0, 7.0, 10.0],
                vec![3.0, 8.0, 10.0],
                vec![5.0, 9.0, 10.0],
            ],
        )
        .unwrap()
    }

    fn assert_close(actual: &Array2<f64>, expected: &Array2<f64>) {
        assert_eq!(actual.shape(), expected.shape());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < EPS, "{} != {}", a, e);
        }
    }

    #[test]
    fn test_scaler_type_parsing() {
        assert_eq!("standard".parse::<ScalerType>().unwrap(), ScalerType::Standard);
        assert_eq!("minmax".parse::<ScalerType>().unwrap(), ScalerType::MinMax);

        match "Standard".parse::<ScalerType>() {
            Err(InferenceError::UnsupportedScalerType(s)) => assert_eq!(s, "Standard"),
            other => panic!("Expected UnsupportedScalerType, got {:?}", other),
        }
    }

    #[test]
    fn test_standard_scaling_uses_population_std() {
        let mut transformer =
            ColumnTransformer::new(vec!["sepal_length".into()], ScalerType::Standard);

        let out = transformer.fit_transform(&iris_frame()).unwrap();

        // mean 3, population std sqrt(8/3)
        let std = (8.0f64 / 3.0).sqrt();
        assert_close(
            out.values(),
            &arr2(&[
                [-2.0 / std, 7.0, 10.0],
                [0.0, 8.0, 10.0],
                [2.0 / std, 9.0, 10.0],
            ]),
        );
    }

    #[test]
    fn test_minmax_scaling_and_column_order() {
        let mut transformer = ColumnTransformer::new(
            vec!["petal_length".into(), "sepal_length".into()],
            ScalerType::MinMax,
        );

        let out = transformer.fit_transform(&iris_frame()).unwrap();

        assert_eq!(
            out.columns(),
            &["petal_length", "sepal_length", "species_code"]
        );
        // petal_length is constant: range 0 scales by 1
        assert_close(
            out.values(),
            &arr2(&[[0.0, 0.0, 7.0], [0.0, 0.5, 8.0], [0.0, 1.0, 9.0]]),
        );
    }

    #[test]
    fn test_empty_feature_list_is_passthrough() {
        let mut transformer = ColumnTransformer::new(vec![], ScalerType::Standard);
        let frame = iris_frame();

        let out = transformer.fit_transform(&frame).unwrap();

        assert_eq!(out, frame);
    }

    #[test]
    fn test_unknown_feature_fails_at_fit() {
        let mut transformer = ColumnTransformer::new(vec!["wingspan".into()], ScalerType::MinMax);

        let result = transformer.fit(&iris_frame());

        assert!(matches!(result, Err(InferenceError::UnsupportedDataFormat(_))));
        assert!(!transformer.is_fitted());
    }

    #[test]
    fn test_transform_requires_fit() {
        let transformer =
            ColumnTransformer::new(vec!["sepal_length".into()], ScalerType::Standard);

        let result = transformer.transform(&iris_frame());

        assert!(matches!(result, Err(InferenceError::PipelineNotFitted)));
    }

    struct FirstColumnSign;

    impl Estimator for FirstColumnSign {
        fn predict(&mut self, frame: &TabularFrame) -> anyhow::Result<Vec<i64>> {
            Ok(frame
                .values()
                .column(0)
                .iter()
                .map(|&v| if v < 0.0 { 0 } else if v == 0.0 { 1 } else { 2 })
                .collect())
        }
    }

    #[test]
    fn test_pipeline_predicts_on_scaled_frame() {
        let mut model = FirstColumnSign;
        let labels = LabelMap::iris();
        let transformer =
            ColumnTransformer::new(vec!["sepal_length".into()], ScalerType::Standard);
        let mut pipeline = Pipeline::new(transformer, &mut model, &labels);

        let frame = iris_frame();
        pipeline.fit(&frame).unwrap();

        assert_eq!(
            pipeline.predict(&frame).unwrap(),
            vec!["setosa", "versicolor", "virginica"]
        );
    }
}
