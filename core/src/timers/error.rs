//! Error types for countdown operations

use thiserror::Error;

/// Errors reported by [`TimerRegistry`](super::TimerRegistry) operations
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("countdown key {key} is not registered")]
    UnknownKey { key: String },

    #[error("invalid countdown count {count}")]
    InvalidCount { count: i64 },

    #[error("no countdown session for {key}")]
    NoActiveSession { key: String },

    #[error("countdown {key} has already finished")]
    AlreadyFinished { key: String },

    #[error("countdown registry requires a tokio runtime")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),
}

impl RegistryError {
    pub(crate) fn unknown_key(key: impl std::fmt::Debug) -> Self {
        Self::UnknownKey {
            key: format!("{key:?}"),
        }
    }

    pub(crate) fn no_active_session(key: impl std::fmt::Debug) -> Self {
        Self::NoActiveSession {
            key: format!("{key:?}"),
        }
    }

    pub(crate) fn already_finished(key: impl std::fmt::Debug) -> Self {
        Self::AlreadyFinished {
            key: format!("{key:?}"),
        }
    }
}
