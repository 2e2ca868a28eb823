mod config;
mod error;

pub use config::{RegistryConfig, RegistryConfigExt};
pub use error::ConfigError;
