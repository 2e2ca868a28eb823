//! Countdown keys
//!
//! A key names one independent countdown. Keys are closed enumerations so the
//! full set is known up front; the registry uses [`TimerKey::all`] as its
//! default set of recognized keys.

use std::fmt::Debug;
use std::hash::Hash;

use countdown_types::CountdownKey;

/// Identifier for one countdown session
pub trait TimerKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every value of the enumeration, in display order
    fn all() -> &'static [Self];
}

impl TimerKey for CountdownKey {
    fn all() -> &'static [Self] {
        CountdownKey::ALL
    }
}
