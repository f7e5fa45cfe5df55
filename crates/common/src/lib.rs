pub mod config;
pub mod logging;
mod span;

pub use config::{Environment, env_or};
pub use logging::setup_logging;
