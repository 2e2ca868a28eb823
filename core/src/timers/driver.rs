//! Periodic countdown driver
//!
//! Each running session owns one driver: a tokio task that wakes once per tick
//! interval and advances its session. A driver is tagged with the session
//! generation it was spawned for; a tick whose generation no longer matches is
//! dropped and the task exits.
//!
//! Callbacks are invoked through a [`DeliveryGate`]. A tick holds the gate
//! across the generation check and the callback call, and cancellation closes
//! the gate, so once a cancel returns the superseded driver can deliver nothing.
//!
//! A panicking callback ends its driver; the session is moved to Stopped
//! (or stays Finished on the last tick) instead of being left Running.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::key::TimerKey;
use super::manager::Shared;
use super::session::Callback;

thread_local! {
    /// Address of the gate whose callback is running on this thread (0 = none)
    static DELIVERING: Cell<usize> = const { Cell::new(0) };
}

/// Serializes callback delivery against cancellation
pub(crate) struct DeliveryGate {
    callback: Mutex<Option<Callback>>,
}

impl DeliveryGate {
    fn new(callback: Callback) -> Arc<Self> {
        Arc::new(Self {
            callback: Mutex::new(Some(callback)),
        })
    }

    fn id(&self) -> usize {
        self as *const Self as usize
    }

    fn lock(&self) -> MutexGuard<'_, Option<Callback>> {
        self.callback.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait out any in-flight delivery and drop the callback.
    ///
    /// Called from inside a callback (reentrant registry use) this never
    /// blocks: the gate being delivered on this thread is left to the
    /// generation check, and other gates are only closed if free.
    fn close(&self) {
        let delivering = DELIVERING.with(Cell::get);
        if delivering == self.id() {
            return;
        }

        if delivering != 0 {
            match self.callback.try_lock() {
                Ok(mut slot) => drop(slot.take()),
                Err(TryLockError::Poisoned(poisoned)) => drop(poisoned.into_inner().take()),
                Err(TryLockError::WouldBlock) => {}
            }
            return;
        }

        drop(self.lock().take());
    }
}

/// Marks the current thread as delivering a gate's callback
struct DeliveryMarker {
    previous: usize,
}

impl DeliveryMarker {
    fn enter(gate: &DeliveryGate) -> Self {
        let previous = DELIVERING.with(|d| d.replace(gate.id()));
        Self { previous }
    }
}

impl Drop for DeliveryMarker {
    fn drop(&mut self) {
        DELIVERING.with(|d| d.set(self.previous));
    }
}

/// Handle to a live driver task
pub(crate) struct Driver {
    task: JoinHandle<()>,
    gate: Arc<DeliveryGate>,
}

impl Driver {
    pub fn spawn<K: TimerKey>(
        runtime: &Handle,
        registry: Weak<Shared<K>>,
        key: K,
        generation: u64,
        period: Duration,
        callback: Callback,
    ) -> Self {
        let gate = DeliveryGate::new(callback);
        let task = runtime.spawn(run(registry, key, generation, period, Arc::clone(&gate)));
        Self { task, gate }
    }

    /// Stop the task and block until no callback of this driver is running.
    pub fn cancel(self) {
        self.task.abort();
        self.gate.close();
    }

    /// Stop the task without waiting on the gate.
    pub fn abort(&self) {
        self.task.abort();
    }
}

async fn run<K: TimerKey>(
    registry: Weak<Shared<K>>,
    key: K,
    generation: u64,
    period: Duration,
    gate: Arc<DeliveryGate>,
) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if !deliver(&registry, key, generation, &gate) {
            break;
        }
    }

    tracing::trace!(key = ?key, generation, "Countdown driver exited");
}

/// Advance the session by one tick and invoke the callback.
/// Returns false once the driver should stop.
fn deliver<K: TimerKey>(
    registry: &Weak<Shared<K>>,
    key: K,
    generation: u64,
    gate: &DeliveryGate,
) -> bool {
    let Some(shared) = registry.upgrade() else {
        return false;
    };

    let slot = gate.lock();
    let Some(tick) = shared.advance(key, generation) else {
        return false;
    };

    tracing::trace!(key = ?key, remaining = tick.remaining, "Countdown tick");

    let panicked = match slot.as_ref() {
        Some(callback) => {
            let _marker = DeliveryMarker::enter(gate);
            panic::catch_unwind(AssertUnwindSafe(|| callback(tick.remaining, tick.finished)))
                .is_err()
        }
        None => false,
    };
    drop(slot);

    if panicked {
        tracing::error!(key = ?key, remaining = tick.remaining, "Countdown callback panicked");
        shared.abandon(key, generation);
        return false;
    }

    if tick.finished {
        tracing::debug!(key = ?key, generation, "Countdown finished");
    }

    !tick.finished
}
