//! Countdown timer system
//!
//! This module provides:
//! - **Keys**: Closed enumerations naming independent countdowns
//! - **Sessions**: Remaining count and status for one key
//! - **Drivers**: Generation-tagged tokio tasks that tick a session down
//! - **Registry**: The key → session table and its operations
//!
//! # Lifecycle
//!
//! ```text
//!   start ──► Running ──tick──► … ──tick (0)──► Finished
//!               │   ▲
//!          stop │   │ resume
//!               ▼   │
//!             Stopped
//! ```
//!
//! A new `start` replaces whatever session the key had, in any state.

mod driver;
mod error;
mod key;
mod manager;
mod session;


pub use error::RegistryError;
pub use key::TimerKey;
pub use manager::TimerRegistry;
pub use session::Callback;
