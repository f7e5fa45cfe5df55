use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset root {} does not exist", .0.display())]
    MissingRoot(PathBuf),

    #[error("Class directory {} does not exist", .0.display())]
    MissingClassDir(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        let err = DatasetError::MissingRoot(PathBuf::from("PA-KB"));
        assert_eq!(err.to_string(), "Dataset root PA-KB does not exist");

        let err = DatasetError::MissingClassDir(PathBuf::from("PA-KB/TEST/R"));
        assert_eq!(err.to_string(), "Class directory PA-KB/TEST/R does not exist");
    }
}
