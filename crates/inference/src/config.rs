use std::env;

use crate::postprocessing::LabelMap;
pub use common::Environment;

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub environment: Environment,
    pub model_path: String,
    /// Class labels in index order; the last one also covers any higher index
    pub class_labels: Option<Vec<String>>,
}

impl InferenceConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let environment = Environment::from_env();

        let model_path = common::env_or("MODEL_PATH", "models/model.tflite".to_string());

        let class_labels = env::var("CLASS_LABELS")
            .ok()
            .map(|s| parse_labels(&s))
            .filter(|labels| !labels.is_empty());

        Self {
            environment,
            model_path,
            class_labels,
        }
    }

    pub fn label_map(&self) -> LabelMap {
        self.class_labels
            .clone()
            .and_then(LabelMap::from_labels)
            .unwrap_or_default()
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            model_path: "models/model.tflite".to_string(),
            class_labels: None,
        }
    }
}

fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        unsafe {
            env::remove_var("MODEL_PATH");
            env::remove_var("CLASS_LABELS");
        }

        let config = InferenceConfig::from_env();

        assert_eq!(config.model_path, "models/model.tflite");
        assert!(config.class_labels.is_none());
        assert_eq!(config.label_map(), LabelMap::iris());
    }

    #[test]
    #[serial]
    fn test_class_labels_from_env() {
        unsafe {
            env::set_var("MODEL_PATH", "/models/iris.joblib");
            env::set_var("CLASS_LABELS", "cat, dog,,bird");
        }

        let config = InferenceConfig::from_env();
        let labels = config.label_map();

        assert_eq!(config.model_path, "/models/iris.joblib");
        assert_eq!(labels.label(0), "cat");
        assert_eq!(labels.label(1), "dog");
        assert_eq!(labels.label(2), "bird");
        assert_eq!(labels.label(7), "bird");

        unsafe {
            env::remove_var("MODEL_PATH");
            env::remove_var("CLASS_LABELS");
        }
    }

    #[test]
    fn test_test_default_uses_iris_labels() {
        let config = InferenceConfig::test_default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.label_map(), LabelMap::iris());
    }
}
