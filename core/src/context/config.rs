//! Registry configuration
//!
//! This module re-exports the shared `RegistryConfig` type from
//! countdown-types and provides its persistence.

use std::path::{Path, PathBuf};

pub use countdown_types::RegistryConfig;

use super::error::ConfigError;

const APP_NAME: &str = "countdown";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// RegistryConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for RegistryConfig persistence
pub trait RegistryConfigExt: Sized {
    fn load() -> Result<Self, ConfigError>;
    fn load_or_default() -> Self;
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn config_path() -> Result<PathBuf, ConfigError>;
}

impl RegistryConfigExt for RegistryConfig {
    fn load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    /// Load the stored config, falling back to defaults if it is unreadable
    fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Using default registry config");
            Self::default()
        })
    }

    /// Load from an explicit file; a missing file is created with defaults
    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Ok(confy::load_path(path)?)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(ConfigError::Path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir()
            .join(format!("countdown-config-{}", std::process::id()))
            .join("config.toml");

        let config = RegistryConfig::load_from(&path).unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert!(path.exists(), "Defaults are written back");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn stored_values_are_read_back() {
        let dir = std::env::temp_dir().join(format!("countdown-config-rb-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "tick_interval_ms = 250\nreject_negative_counts = true\n").unwrap();

        let config = RegistryConfig::load_from(&path).unwrap();
        assert_eq!(config.tick_interval_ms, 250);
        assert!(config.reject_negative_counts);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
