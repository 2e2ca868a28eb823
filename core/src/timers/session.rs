//! Countdown session state
//!
//! A `Session` is the registry's record for one key. The callback itself lives
//! in the driver's delivery gate, so a session without a driver has no
//! callback attached.

use std::sync::Arc;

use countdown_types::SessionStatus;

use super::driver::Driver;

/// Progress handler: `(remaining, finished)`
pub type Callback = Arc<dyn Fn(u64, bool) + Send + Sync>;

pub(crate) struct Session {
    pub remaining: u64,
    pub status: SessionStatus,
    /// Generation of the driver allowed to tick this session
    pub generation: u64,
    pub driver: Option<Driver>,
}

impl Session {
    pub fn running(remaining: u64, generation: u64, driver: Driver) -> Self {
        Self {
            remaining,
            status: SessionStatus::Running,
            generation,
            driver: Some(driver),
        }
    }

    pub fn finished(generation: u64) -> Self {
        Self {
            remaining: 0,
            status: SessionStatus::Finished,
            generation,
            driver: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Stop ticking, keeping `remaining`. Returns the driver to cancel.
    pub fn halt(&mut self, generation: u64) -> Option<Driver> {
        self.status = SessionStatus::Stopped;
        self.generation = generation;
        self.driver.take()
    }

    /// Drop the driver tagged `generation` after its callback failed.
    /// A running session becomes Stopped with `remaining` kept.
    pub fn abandon(&mut self, generation: u64) -> Option<Driver> {
        if self.generation != generation || !self.is_running() {
            return None;
        }
        self.status = SessionStatus::Stopped;
        self.driver.take()
    }

    /// Consume one tick. Returns `None` if `generation` is stale or the
    /// session is not running.
    pub fn advance(&mut self, generation: u64) -> Option<Tick> {
        if self.generation != generation || !self.is_running() {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(1);
        let finished = self.remaining == 0;
        if finished {
            self.status = SessionStatus::Finished;
            self.driver = None;
        }

        Some(Tick {
            remaining: self.remaining,
            finished,
        })
    }
}

/// One decrement, as delivered to the callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tick {
    pub remaining: u64,
    pub finished: bool,
}
