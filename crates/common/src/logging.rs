use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber with pretty formatting for development
/// and JSON formatting for production.
///
/// Uses RUST_LOG environment variable for filtering (defaults to "info" if not set).
/// Calling it twice is harmless: the second registration is ignored.
pub fn setup_logging(environment: Environment) {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match environment {
        Environment::Production => registry
            .with(tracing_subscriber::fmt::layer().json().with_level(true))
            .try_init(),
        Environment::Development => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_ansi(true))
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}
