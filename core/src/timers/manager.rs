//! Countdown registry
//!
//! Owns the key → session table and the per-key drivers. A registry is built
//! once by the host and shared by cloning its handle; every clone sees the same
//! sessions. Dropping the last handle aborts all drivers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use countdown_types::{CountdownKey, RegistryConfig, SessionSnapshot, SessionStatus};
use hashbrown::{HashMap, HashSet};
use tokio::runtime::Handle;

use super::driver::Driver;
use super::error::RegistryError;
use super::key::TimerKey;
use super::session::{Callback, Session, Tick};

struct Table<K> {
    sessions: HashMap<K, Session>,
    next_generation: u64,
}

impl<K> Table<K> {
    fn issue_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

/// State shared between registry handles and their drivers
pub(crate) struct Shared<K: TimerKey> {
    table: Mutex<Table<K>>,
    known: HashSet<K>,
    config: RegistryConfig,
    runtime: Handle,
}

impl<K: TimerKey> Shared<K> {
    fn lock(&self) -> MutexGuard<'_, Table<K>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consume one tick for `key` on behalf of the driver tagged `generation`.
    pub(crate) fn advance(&self, key: K, generation: u64) -> Option<Tick> {
        self.lock().sessions.get_mut(&key)?.advance(generation)
    }

    /// Take `key` out of Running after the driver tagged `generation` failed.
    pub(crate) fn abandon(&self, key: K, generation: u64) {
        let driver = self
            .lock()
            .sessions
            .get_mut(&key)
            .and_then(|session| session.abandon(generation));
        // The driver is the caller's own task; dropping detaches it.
        drop(driver);
    }
}

impl<K: TimerKey> Drop for Shared<K> {
    fn drop(&mut self) {
        let table = self.table.get_mut().unwrap_or_else(PoisonError::into_inner);
        for session in table.sessions.values() {
            if let Some(driver) = &session.driver {
                driver.abort();
            }
        }
    }
}

/// Registry of per-key countdowns.
///
/// Operations do not await ticks; ticks are delivered on the runtime the
/// registry was built with. The one wait is for a callback already running
/// for a driver being cancelled (see [`TimerRegistry::start`]). Callbacks may
/// call back into the registry.
pub struct TimerRegistry<K: TimerKey = CountdownKey> {
    shared: Arc<Shared<K>>,
}

impl<K: TimerKey> Clone for TimerRegistry<K> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K: TimerKey> TimerRegistry<K> {
    /// Build a registry on the current tokio runtime, recognizing every key.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let runtime = Handle::try_current().map_err(RegistryError::NoRuntime)?;
        Ok(Self::with_handle(runtime, config))
    }

    /// Build a registry that spawns drivers on `runtime`.
    pub fn with_handle(runtime: Handle, config: RegistryConfig) -> Self {
        Self::build(runtime, config, K::all().iter().copied())
    }

    /// Build a registry on the current runtime that only accepts `keys`.
    pub fn with_keys(
        config: RegistryConfig,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<Self, RegistryError> {
        let runtime = Handle::try_current().map_err(RegistryError::NoRuntime)?;
        Ok(Self::build(runtime, config, keys))
    }

    fn build(runtime: Handle, config: RegistryConfig, keys: impl IntoIterator<Item = K>) -> Self {
        Self {
            shared: Arc::new(Shared {
                table: Mutex::new(Table {
                    sessions: HashMap::new(),
                    next_generation: 0,
                }),
                known: keys.into_iter().collect(),
                config,
                runtime,
            }),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.shared.config
    }

    fn check_key(&self, key: K) -> Result<(), RegistryError> {
        if self.shared.known.contains(&key) {
            Ok(())
        } else {
            Err(RegistryError::unknown_key(key))
        }
    }

    fn spawn_driver(&self, key: K, generation: u64, callback: Callback) -> Driver {
        Driver::spawn(
            &self.shared.runtime,
            Arc::downgrade(&self.shared),
            key,
            generation,
            self.shared.config.tick_interval(),
            callback,
        )
    }

    // ─── Operations ─────────────────────────────────────────────────────────

    /// Start (or restart) the countdown for `key` from `count`.
    ///
    /// Any existing session for the key is replaced; once this returns none of
    /// its ticks will be delivered. A count of zero or less finishes at once:
    /// the callback gets a single `(0, true)` on the calling thread.
    ///
    /// If the replaced driver's callback is running on another thread at the
    /// time of the call, this blocks until that callback returns. A slow
    /// callback therefore delays the caller. Calls made from inside a callback
    /// never wait on their own delivery.
    pub fn start<F>(&self, key: K, count: i64, callback: F) -> Result<(), RegistryError>
    where
        F: Fn(u64, bool) + Send + Sync + 'static,
    {
        self.check_key(key)?;

        if count < 0 && self.shared.config.reject_negative_counts {
            return Err(RegistryError::InvalidCount { count });
        }

        let callback: Callback = Arc::new(callback);
        let superseded = {
            let mut table = self.shared.lock();
            let generation = table.issue_generation();
            let session = if count > 0 {
                let driver = self.spawn_driver(key, generation, Arc::clone(&callback));
                Session::running(count as u64, generation, driver)
            } else {
                Session::finished(generation)
            };
            table.sessions.insert(key, session)
        };

        if let Some(driver) = superseded.and_then(|session| session.driver) {
            tracing::debug!(key = ?key, "Cancelled superseded countdown");
            driver.cancel();
        }

        if count <= 0 {
            if count < 0 {
                tracing::warn!(key = ?key, count, "Negative countdown treated as finished");
            }
            tracing::debug!(key = ?key, "Countdown finished immediately");
            callback(0, true);
        } else {
            tracing::debug!(key = ?key, count, "Countdown started");
        }

        Ok(())
    }

    /// Pause the countdown for `key`, keeping its remaining count.
    ///
    /// The callback is released; `resume` must supply a new one. Stopping a
    /// missing, stopped, or finished session does nothing.
    ///
    /// Like `start`, this blocks until an in-flight callback of the stopped
    /// driver returns, so no tick is delivered after `stop` returns.
    pub fn stop(&self, key: K) -> Result<(), RegistryError> {
        self.check_key(key)?;

        let driver = {
            let mut table = self.shared.lock();
            let generation = table.issue_generation();
            match table.sessions.get_mut(&key) {
                Some(session) if session.is_running() => session.halt(generation),
                _ => return Ok(()),
            }
        };

        if let Some(driver) = driver {
            driver.cancel();
        }
        tracing::debug!(key = ?key, "Countdown stopped");
        Ok(())
    }

    /// Continue the countdown for `key` from its remaining count with a new
    /// callback. A running session has its driver replaced.
    ///
    /// Like `start`, this waits for a callback of the replaced driver that is
    /// already running on another thread.
    pub fn resume<F>(&self, key: K, callback: F) -> Result<(), RegistryError>
    where
        F: Fn(u64, bool) + Send + Sync + 'static,
    {
        self.check_key(key)?;
        self.resume_session(key, Arc::new(callback), false).map(|_| ())
    }

    /// Reattach `callback` and spawn a new driver. With `only_stopped`, a
    /// session that is not Stopped is left alone and `Ok(false)` returned.
    fn resume_session(
        &self,
        key: K,
        callback: Callback,
        only_stopped: bool,
    ) -> Result<bool, RegistryError> {
        let (previous, remaining) = {
            let mut table = self.shared.lock();
            let generation = table.issue_generation();
            let Some(session) = table.sessions.get_mut(&key) else {
                return Err(RegistryError::no_active_session(key));
            };
            if session.status == SessionStatus::Finished || session.remaining == 0 {
                return Err(RegistryError::already_finished(key));
            }
            if only_stopped && session.status != SessionStatus::Stopped {
                return Ok(false);
            }

            let driver = self.spawn_driver(key, generation, callback);
            session.status = SessionStatus::Running;
            session.generation = generation;
            (session.driver.replace(driver), session.remaining)
        };

        if let Some(driver) = previous {
            driver.cancel();
        }
        tracing::debug!(key = ?key, remaining, "Countdown resumed");
        Ok(true)
    }

    /// Whether the countdown for `key` has run to zero.
    pub fn is_finished(&self, key: K) -> Result<bool, RegistryError> {
        Ok(self.status(key)? == Some(SessionStatus::Finished))
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    pub fn status(&self, key: K) -> Result<Option<SessionStatus>, RegistryError> {
        self.check_key(key)?;
        Ok(self.shared.lock().sessions.get(&key).map(|s| s.status))
    }

    pub fn remaining(&self, key: K) -> Result<Option<u64>, RegistryError> {
        self.check_key(key)?;
        Ok(self.shared.lock().sessions.get(&key).map(|s| s.remaining))
    }

    /// All sessions, in `K::all()` order.
    pub fn snapshot(&self) -> Vec<SessionSnapshot<K>> {
        let table = self.shared.lock();
        K::all()
            .iter()
            .filter_map(|key| {
                table.sessions.get(key).map(|session| SessionSnapshot {
                    key: *key,
                    remaining: session.remaining,
                    status: session.status,
                })
            })
            .collect()
    }

    // ─── Bulk ───────────────────────────────────────────────────────────────

    /// Stop every running countdown. Returns the keys that were stopped.
    pub fn stop_all(&self) -> Vec<K> {
        let mut stopped = Vec::new();
        let mut drivers = Vec::new();
        {
            let mut table = self.shared.lock();
            let generation = table.issue_generation();
            for key in K::all() {
                match table.sessions.get_mut(key) {
                    Some(session) if session.is_running() => {
                        drivers.extend(session.halt(generation));
                        stopped.push(*key);
                    }
                    _ => {}
                }
            }
        }

        for driver in drivers {
            driver.cancel();
        }
        tracing::debug!(count = stopped.len(), "Stopped all countdowns");
        stopped
    }

    /// Resume every stopped countdown with a callback built per key.
    /// Returns the keys that were resumed. A key restarted or resumed
    /// elsewhere after it was picked is skipped.
    pub fn resume_all<F>(&self, mut callback_for: impl FnMut(K) -> F) -> Vec<K>
    where
        F: Fn(u64, bool) + Send + Sync + 'static,
    {
        let candidates: Vec<K> = self
            .snapshot()
            .into_iter()
            .filter(|s| s.status == SessionStatus::Stopped && s.remaining > 0)
            .map(|s| s.key)
            .collect();

        candidates
            .into_iter()
            .filter(|key| {
                let callback: Callback = Arc::new(callback_for(*key));
                match self.resume_session(*key, callback, true) {
                    Ok(resumed) => resumed,
                    Err(e) => {
                        tracing::debug!(key = ?key, error = %e, "Skipped resume");
                        false
                    }
                }
            })
            .collect()
    }
}
