//! Records the player's distance over time for ghost replays.

use dragrace_core::types::{CarPhysicsState, GhostDataPoint};

/// Collects `{t, d}` samples, strictly ascending in `t`.
#[derive(Debug, Default)]
pub struct RaceRecorder {
    samples: Vec<GhostDataPoint>,
}

impl RaceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample `car` at clock time `now`. Finished cars are not sampled, and a
    /// sample that does not move time forward is dropped. Returns whether a
    /// sample was stored.
    pub fn sample(&mut self, car: &CarPhysicsState, now: f64) -> bool {
        if car.finished {
            return false;
        }
        let t = now - car.start_time;
        if let Some(last) = self.samples.last() {
            if !(t > last.t) {
                return false;
            }
        }
        self.samples.push(GhostDataPoint { t, d: car.distance });
        true
    }

    pub fn samples(&self) -> &[GhostDataPoint] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Take the trace, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<GhostDataPoint> {
        std::mem::take(&mut self.samples)
    }
}
