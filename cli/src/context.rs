use std::path::Path;

use countdown_core::{RegistryConfig, RegistryConfigExt, TimerRegistry};

/// Holds all shared state for the CLI application.
#[derive(Clone)]
pub struct CliContext {
    pub config: RegistryConfig,
    pub registry: TimerRegistry,
}

impl CliContext {
    /// Load the config (from `config_path` if given) and build the registry on
    /// the current runtime. `tick_ms` overrides the configured interval.
    pub fn new(config_path: Option<&Path>, tick_ms: Option<u64>) -> Result<Self, String> {
        let mut config = match config_path {
            Some(path) => RegistryConfig::load_from(path).map_err(|e| e.to_string())?,
            None => RegistryConfig::load_or_default(),
        };
        if let Some(ms) = tick_ms {
            config.tick_interval_ms = ms;
        }

        let registry = TimerRegistry::new(config.clone()).map_err(|e| e.to_string())?;
        Ok(Self { config, registry })
    }
}
