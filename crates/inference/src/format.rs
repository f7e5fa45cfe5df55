use crate::error::{InferenceError, Result};
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

const PICKLE_PROTO: u8 = 0x80;
/// Opcodes a protocol 0/1 stream of an object graph starts with
/// (MARK, GLOBAL, EMPTY_LIST, EMPTY_DICT, EMPTY_TUPLE).
const PICKLE_LEGACY_OPENERS: &[u8] = b"(c]})";
const PICKLE_STOP: u8 = b'.';
const HDF5_SIGNATURE: [u8; 8] = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1a, b'\n'];
const TFLITE_IDENTIFIER: &[u8; 4] = b"TFL3";

/// Container prefixes joblib writes when compression is enabled.
const JOBLIB_COMPRESSED_MAGIC: [&[u8]; 7] = [
    b"\x78",                     // zlib
    b"\x1f\x8b",                 // gzip
    b"BZh",                      // bz2
    b"\xfd7zXZ\x00",             // xz
    b"\x5d\x00\x00",             // lzma
    b"\x04\x22\x4d\x18",         // lz4
    b"ZF",                       // legacy joblib zlib
];

/// Runtime family a model is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendVariant {
    SklearnLike,
    KerasLike,
    TfliteLike,
}

impl BackendVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendVariant::SklearnLike => "sklearn-like",
            BackendVariant::KerasLike => "keras-like",
            BackendVariant::TfliteLike => "tflite-like",
        }
    }
}

impl fmt::Display for BackendVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized model format, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFormat {
    Pickle,
    Joblib,
    Hdf5,
    Tflite,
}

impl ModelFormat {
    /// Select the format from the path's suffix (exact, case-sensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path.to_string_lossy();

        if name.ends_with(".pkl") {
            Ok(ModelFormat::Pickle)
        } else if name.ends_with(".joblib") {
            Ok(ModelFormat::Joblib)
        } else if name.ends_with(".h5") {
            Ok(ModelFormat::Hdf5)
        } else if name.ends_with(".tflite") {
            Ok(ModelFormat::Tflite)
        } else {
            Err(InferenceError::UnsupportedFormat {
                extension: extension_of(path),
            })
        }
    }

    pub fn variant(&self) -> BackendVariant {
        match self {
            ModelFormat::Pickle | ModelFormat::Joblib => BackendVariant::SklearnLike,
            ModelFormat::Hdf5 => BackendVariant::KerasLike,
            ModelFormat::Tflite => BackendVariant::TfliteLike,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFormat::Pickle => "pickle",
            ModelFormat::Joblib => "joblib",
            ModelFormat::Hdf5 => "hdf5",
            ModelFormat::Tflite => "tflite",
        }
    }

    /// Check the file header matches what this format writes.
    pub fn validate_artifact(&self, path: &Path) -> Result<()> {
        let mut header = [0u8; 8];
        let mut file = File::open(path)?;
        let read = read_up_to(&mut file, &mut header)?;
        let header = &header[..read];

        let valid = match self {
            ModelFormat::Pickle => is_pickle(&mut file, header)?,
            ModelFormat::Joblib => {
                is_pickle(&mut file, header)?
                    || JOBLIB_COMPRESSED_MAGIC
                        .iter()
                        .any(|magic| header.starts_with(magic))
            }
            ModelFormat::Hdf5 => header == HDF5_SIGNATURE,
            ModelFormat::Tflite => header.get(4..8) == Some(TFLITE_IDENTIFIER.as_slice()),
        };

        if !valid {
            return Err(InferenceError::InvalidArtifact {
                path: path.to_path_buf(),
                format: *self,
                reason: format!("unrecognized header {:02x?}", header),
            });
        }

        tracing::debug!(path = %path.display(), format = %self, "Artifact header validated");
        Ok(())
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text after the final dot of the file name, or the whole name without one.
fn extension_of(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_string(),
        None => name,
    }
}

/// Protocol 2+ streams open with PROTO. Older ones have no marker, so they
/// must open with an object-building opcode and end with STOP.
fn is_pickle(file: &mut File, header: &[u8]) -> std::io::Result<bool> {
    match header.first() {
        Some(&PICKLE_PROTO) => Ok(true),
        Some(first) if PICKLE_LEGACY_OPENERS.contains(first) => {
            file.seek(SeekFrom::End(-1))?;
            let mut last = [0u8; 1];
            file.read_exact(&mut last)?;
            Ok(last[0] == PICKLE_STOP)
        }
        _ => Ok(false),
    }
}

fn read_up_to(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_extension_selects_variant() {
        let cases = [
            ("models/iris.pkl", ModelFormat::Pickle, BackendVariant::SklearnLike),
            ("models/iris.joblib", ModelFormat::Joblib, BackendVariant::SklearnLike),
            ("models/waste.h5", ModelFormat::Hdf5, BackendVariant::KerasLike),
            ("models/waste.tflite", ModelFormat::Tflite, BackendVariant::TfliteLike),
        ];

        for (path, format, variant) in cases {
            let detected = ModelFormat::from_path(Path::new(path)).unwrap();
            assert_eq!(detected, format, "format for {}", path);
            assert_eq!(detected.variant(), variant, "variant for {}", path);
        }
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        match ModelFormat::from_path(Path::new("models/waste.onnx")) {
            Err(InferenceError::UnsupportedFormat { extension }) => assert_eq!(extension, "onnx"),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        match ModelFormat::from_path(Path::new("WASTE.TFLITE")) {
            Err(InferenceError::UnsupportedFormat { extension }) => {
                assert_eq!(extension, "TFLITE")
            }
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_extension_reports_file_name() {
        match ModelFormat::from_path(&PathBuf::from("/models/classifier")) {
            Err(InferenceError::UnsupportedFormat { extension }) => {
                assert_eq!(extension, "classifier")
            }
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    fn write_artifact(name: &str, bytes: &[u8]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        (dir, path)
    }

    #[test]
    fn test_pickle_header_validation() {
        let (_dir, good) = write_artifact("good.pkl", b"\x80\x04\x95\x00\x00");
        assert!(ModelFormat::Pickle.validate_artifact(&good).is_ok());

        let (_dir, bad) = write_artifact("bad.pkl", b"{\"not\": \"a pickle\"}");
        assert!(matches!(
            ModelFormat::Pickle.validate_artifact(&bad),
            Err(InferenceError::InvalidArtifact {
                format: ModelFormat::Pickle,
                ..
            })
        ));
    }

    #[test]
    fn test_pickle_protocol_zero_and_one_accepted() {
        // protocol 0: GLOBAL sklearn class, ..., STOP
        let (_dir, p0) = write_artifact(
            "p0.pkl",
            b"csklearn.linear_model._logistic\nLogisticRegression\np0\n(tRp1\n.",
        );
        assert!(ModelFormat::Pickle.validate_artifact(&p0).is_ok());

        // protocol 1: EMPTY_DICT, ..., STOP
        let (_dir, p1) = write_artifact("p1.pkl", b"}q\x00.");
        assert!(ModelFormat::Joblib.validate_artifact(&p1).is_ok());

        // legacy opener without a STOP at the end is not a pickle
        let (_dir, truncated) = write_artifact("truncated.pkl", b"(lp0\nI1\na");
        assert!(matches!(
            ModelFormat::Pickle.validate_artifact(&truncated),
            Err(InferenceError::InvalidArtifact { .. })
        ));
    }

    #[test]
    fn test_joblib_accepts_compressed_containers() {
        let (_dir, plain) = write_artifact("plain.joblib", b"\x80\x04\x95");
        assert!(ModelFormat::Joblib.validate_artifact(&plain).is_ok());

        let (_dir, zlib) = write_artifact("zlib.joblib", b"\x78\x9c\x01\x02");
        assert!(ModelFormat::Joblib.validate_artifact(&zlib).is_ok());

        let (_dir, gzip) = write_artifact("gzip.joblib", b"\x1f\x8b\x08\x00");
        assert!(ModelFormat::Joblib.validate_artifact(&gzip).is_ok());

        let (_dir, text) = write_artifact("text.joblib", b"hello");
        assert!(ModelFormat::Joblib.validate_artifact(&text).is_err());
    }

    #[test]
    fn test_hdf5_and_tflite_signatures() {
        let (_dir, h5) = write_artifact("model.h5", &HDF5_SIGNATURE);
        assert!(ModelFormat::Hdf5.validate_artifact(&h5).is_ok());

        let (_dir, short_h5) = write_artifact("short.h5", b"\x89HDF");
        assert!(ModelFormat::Hdf5.validate_artifact(&short_h5).is_err());

        let (_dir, tflite) = write_artifact("model.tflite", b"\x1c\x00\x00\x00TFL3\x00\x00");
        assert!(ModelFormat::Tflite.validate_artifact(&tflite).is_ok());

        let (_dir, bogus) = write_artifact("bogus.tflite", b"\x1c\x00\x00\x00ONNX");
        assert!(ModelFormat::Tflite.validate_artifact(&bogus).is_err());
    }

    #[test]
    fn test_missing_artifact_is_io_error() {
        let result = ModelFormat::Pickle.validate_artifact(Path::new("/nonexistent/model.pkl"));
        assert!(matches!(result, Err(InferenceError::IoError(_))));
    }
}
