//! Ghost playback: drives the opponent lane from a recorded trace.
//!
//! Playback reads elapsed clock time only and never runs physics.

use dragrace_core::constants::TRACK_LENGTH;
use dragrace_core::types::{CarPhysicsState, GhostDataPoint, GhostReplay};

/// Interpolated ghost position at some elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostSample {
    pub distance: f64,
    /// Slope of the bracketing interval (m/s). Zero outside the trace.
    pub speed: f64,
}

/// Position along `data` at `elapsed` seconds.
///
/// Before the first sample the first distance is held, at or after the last
/// sample the last distance is held. Samples sharing a timestamp resolve to
/// the later one. A zero-width interval yields its first point.
pub fn sample_at(data: &[GhostDataPoint], elapsed: f64) -> GhostSample {
    let (first, last) = match (data.first(), data.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return GhostSample {
                distance: 0.0,
                speed: 0.0,
            }
        }
    };
    if elapsed < first.t {
        return GhostSample {
            distance: first.d,
            speed: 0.0,
        };
    }
    if elapsed >= last.t {
        return GhostSample {
            distance: last.d,
            speed: 0.0,
        };
    }

    // First index with t > elapsed; the bracket is [idx - 1, idx].
    let idx = data.partition_point(|p| p.t <= elapsed);
    let p1 = data[idx - 1];
    let p2 = data[idx];
    let span = p2.t - p1.t;
    if span <= 0.0 {
        return GhostSample {
            distance: p1.d,
            speed: 0.0,
        };
    }
    let frac = (elapsed - p1.t) / span;
    GhostSample {
        distance: p1.d + (p2.d - p1.d) * frac,
        speed: (p2.d - p1.d) / span,
    }
}

/// Distance along `data` at `elapsed` seconds.
pub fn distance_at(data: &[GhostDataPoint], elapsed: f64) -> f64 {
    sample_at(data, elapsed).distance
}

/// Move the ghost car to where `replay` was at clock time `now`.
///
/// Once the replay's total time has passed the car sits on the line,
/// finished at the recorded time. An empty trace finishes immediately at 0 m.
pub fn run(car: &mut CarPhysicsState, replay: &GhostReplay, now: f64) {
    if car.finished {
        return;
    }

    if replay.data.is_empty() {
        car.distance = 0.0;
        car.speed = 0.0;
        car.finish(replay.total_time);
        return;
    }

    let elapsed = now - car.start_time;
    if elapsed >= replay.total_time {
        car.distance = TRACK_LENGTH;
        car.speed = 0.0;
        car.finish(replay.total_time);
        return;
    }

    let sample = sample_at(&replay.data, elapsed);
    car.distance = sample.distance;
    car.speed = sample.speed;
}
