//! Wall-clock sources for the race session.
//!
//! The session reads time through `Clock` for the start time, finish times,
//! recorder timestamps, countdown and ghost playback. Physics itself always
//! advances by the fixed tick passed to `RaceSession::tick`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonic time source, in seconds.
pub trait Clock: Send {
    fn now(&self) -> f64;
}

/// Real time, measured from clock creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for headless races and tests.
///
/// Clones share the same time, so a scheduler can advance the clock the
/// session reads from.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock starting at `secs`.
    pub fn starting_at(secs: f64) -> Self {
        let clock = Self::new();
        clock.set(secs);
        clock
    }

    pub fn set(&self, secs: f64) {
        self.bits.store(secs.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, secs: f64) {
        self.set(self.now() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}
