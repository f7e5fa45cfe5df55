//! Image normalization for the waste classifier.
//!
//! Turns a path, a raw pixel array or an already decoded image into the
//! `(1, 128, 128, 3)` RGB float tensor the classifier expects.

pub mod config;
pub mod cpu;
pub mod error;
pub mod source;

pub use config::DEFAULT_INPUT_SIZE;
pub use cpu::CpuPreProcessor;
pub use error::PreprocessError;
pub use source::{ImageInput, PixelArray};

// Re-export under the shorter name used by callers
pub use cpu::CpuPreProcessor as PreProcessor;
