use crate::backend::{Backend, DefaultLoader, ModelLoader};
use crate::error::Result;
use crate::format::{BackendVariant, ModelFormat};
use std::path::{Path, PathBuf};

/// A loaded model bound to one runtime for its whole lifetime.
///
/// Dropping the handle releases the runtime.
pub struct ModelHandle {
    path: PathBuf,
    format: ModelFormat,
    backend: Backend,
}

impl ModelHandle {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &DefaultLoader)
    }

    /// Load through a caller-supplied loader. The format, and with it the
    /// backend variant, is still decided by the file extension.
    pub fn load_with(path: impl AsRef<Path>, loader: &dyn ModelLoader) -> Result<Self> {
        let path = path.as_ref();
        let format = ModelFormat::from_path(path)?;

        let backend = match format.variant() {
            BackendVariant::SklearnLike => Backend::Estimator(loader.load_estimator(path, format)?),
            BackendVariant::KerasLike => Backend::Network(loader.load_network(path)?),
            BackendVariant::TfliteLike => Backend::Interpreter(loader.load_interpreter(path)?),
        };

        tracing::info!(
            path = %path.display(),
            format = %format,
            variant = %backend.variant(),
            "Model loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            format,
            backend,
        })
    }

    pub fn variant(&self) -> BackendVariant {
        self.backend.variant()
    }

    pub fn format(&self) -> ModelFormat {
        self.format
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn backend_mut(&mut self) -> &mut Backend {
        &mut self.backend
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("variant", &self.variant())
            .finish()
    }
}
