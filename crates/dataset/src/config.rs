pub use common::Environment;

#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub environment: Environment,
    pub dataset_dir: String,
    /// File names listed per class
    pub sample_size: usize,
}

impl InspectConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        Self {
            environment: Environment::from_env(),
            dataset_dir: common::env_or("DATASET_DIR", "PA-KB".to_string()),
            sample_size: common::env_or("SAMPLE_SIZE", 5),
        }
    }
}
