pub mod adapter;
pub mod backend;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod postprocessing;
pub mod tabular;
pub mod tensor;

// Re-export commonly used types for convenience
pub use adapter::{InferenceAdapter, TabularPrediction};
pub use backend::{Backend, DefaultLoader, Estimator, Interpreter, ModelLoader, Network};
pub use config::InferenceConfig;
pub use error::{InferenceError, Result};
pub use format::{BackendVariant, ModelFormat};
pub use model::ModelHandle;
pub use pipeline::{ColumnTransformer, Pipeline, ScalerType};
pub use postprocessing::{ImageLabel, LabelMap};
pub use tabular::{TabularFrame, TabularInput};
pub use tensor::{ElementType, InputDetails, InputTensor, QuantizationParams};
