//! Injectable time source.
//!
//! Fireplace accounting runs on wall-clock ticks (100 ns units) so that
//! persisted `lastTime` values survive restarts and agree between
//! participants. Hosts implement [`Clock`]; tests and the harness use
//! [`ManualClock`].

use std::cell::Cell;

use crate::constants::TICKS_PER_SECOND;

/// Timestamp in 100 ns ticks.
pub type Ticks = i64;

/// Source of the current network time.
pub trait Clock {
    fn now_ticks(&self) -> Ticks;

    /// Current time in seconds (lossy; for timers, not persistence).
    fn now_seconds(&self) -> f64 {
        ticks_to_seconds(self.now_ticks())
    }
}

/// Convert a tick span to seconds.
pub fn ticks_to_seconds(ticks: Ticks) -> f64 {
    ticks as f64 / TICKS_PER_SECOND as f64
}

/// Convert seconds to ticks, rounding to the nearest tick.
pub fn seconds_to_ticks(seconds: f64) -> Ticks {
    (seconds * TICKS_PER_SECOND as f64).round() as Ticks
}

/// Convert a microsecond timestamp (SpacetimeDB's resolution) to ticks.
pub fn micros_to_ticks(micros: i64) -> Ticks {
    micros.saturating_mul(10)
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Ticks>,
}

impl ManualClock {
    pub fn new(start: Ticks) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, ticks: Ticks) {
        self.now.set(ticks);
    }

    pub fn advance_seconds(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds_to_ticks(seconds));
    }
}

impl Clock for ManualClock {
    fn now_ticks(&self) -> Ticks {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ticks(&self) -> Ticks {
        (**self).now_ticks()
    }
}
