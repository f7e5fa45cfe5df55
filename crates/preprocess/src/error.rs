use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Unsupported pixel array shape {shape:?}")]
    UnsupportedShape { shape: Vec<usize> },

    #[error("Buffer size mismatch: expected {expected}, got {actual} bytes")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Resize failed: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("Invalid image buffer: {0}")]
    ImageBuffer(#[from] fast_image_resize::ImageBufferError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        let err = PreprocessError::UnsupportedShape {
            shape: vec![4, 4, 5],
        };
        assert_eq!(err.to_string(), "Unsupported pixel array shape [4, 4, 5]");

        let err = PreprocessError::SizeMismatch {
            expected: 12,
            actual: 10,
        };
        assert_eq!(
            err.to_string(),
            "Buffer size mismatch: expected 12, got 10 bytes"
        );
    }

    #[test]
    fn test_error_conversion_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing.jpg");
        let err: PreprocessError = io_err.into();
        assert!(matches!(err, PreprocessError::IoError(_)));
        assert_eq!(err.to_string(), "IO error: missing.jpg");
    }
}
