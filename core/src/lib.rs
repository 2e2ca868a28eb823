pub mod context;
pub mod timers;

// Re-exports for convenience
pub use context::{ConfigError, RegistryConfig, RegistryConfigExt};
pub use countdown_types::{CountdownKey, SessionSnapshot, SessionStatus};
pub use timers::{Callback, RegistryError, TimerKey, TimerRegistry};
