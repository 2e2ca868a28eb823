//! Shared types for the countdown registry
//!
//! This crate contains the serializable key, status, and configuration types
//! shared between the registry (countdown-core) and its hosts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Keys
// ─────────────────────────────────────────────────────────────────────────────

/// Known countdown identifiers.
///
/// Add a variant here (and to `ALL`) whenever a new countdown is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownKey {
    Test1,
    Test2,
}

impl CountdownKey {
    pub const ALL: &'static [CountdownKey] = &[CountdownKey::Test1, CountdownKey::Test2];

    pub fn as_str(&self) -> &'static str {
        match self {
            CountdownKey::Test1 => "test1",
            CountdownKey::Test2 => "test2",
        }
    }
}

impl fmt::Display for CountdownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountdownKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown countdown key '{s}'"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session State
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle state of a countdown session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// A driver is ticking the session down
    Running,
    /// Halted by `stop`; remaining count is preserved
    Stopped,
    /// Reached zero; no further ticks until restarted
    Finished,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Stopped => "stopped",
            SessionStatus::Finished => "finished",
        }
    }
}

/// Point-in-time view of one session, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot<K> {
    pub key: K,
    pub remaining: u64,
    pub status: SessionStatus,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

fn default_tick_interval_ms() -> u64 {
    1000
}

/// Registry behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Milliseconds between ticks (one decrement per tick)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Fail `start` with a negative count instead of finishing immediately
    pub reject_negative_counts: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            reject_negative_counts: false,
        }
    }
}

impl RegistryConfig {
    /// Tick period, never shorter than one millisecond.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_parses_case_insensitively() {
        assert_eq!("test1".parse::<CountdownKey>(), Ok(CountdownKey::Test1));
        assert_eq!("TEST2".parse::<CountdownKey>(), Ok(CountdownKey::Test2));
        assert!("test3".parse::<CountdownKey>().is_err());
    }

    #[test]
    fn zero_tick_interval_is_clamped() {
        let config = RegistryConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.tick_interval(), std::time::Duration::from_millis(1));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: RegistryConfig = toml::from_str("reject_negative_counts = true").unwrap();
        assert_eq!(config.tick_interval_ms, 1000);
        assert!(config.reject_negative_counts);
    }
}
