//! Snapshot builder: turns session state into a `RaceSnapshot`.

use dragrace_core::constants::MS_TO_KMH;
use dragrace_core::enums::RacePhase;
use dragrace_core::events::{RaceEvent, ShiftFeedback};
use dragrace_core::state::{CarView, RaceSnapshot};
use dragrace_core::types::CarPhysicsState;

/// Dashboard view of one car.
pub fn car_view(car: &CarPhysicsState) -> CarView {
    CarView {
        distance: car.distance,
        progress: car.progress(),
        speed_kmh: car.speed * MS_TO_KMH,
        rpm: car.rpm,
        gear: car.gear,
        wheel_spinning: car.wheel_spinning,
        finished: car.finished,
        finish_time: car.finish_time,
    }
}

/// Build the snapshot for the current tick.
pub fn build_snapshot(
    tick: u64,
    phase: RacePhase,
    elapsed_secs: f64,
    player: &CarPhysicsState,
    opponent: &CarPhysicsState,
    shift_feedback: Option<ShiftFeedback>,
    events: Vec<RaceEvent>,
) -> RaceSnapshot {
    RaceSnapshot {
        tick,
        phase,
        elapsed_secs,
        player: car_view(player),
        opponent: car_view(opponent),
        shift_feedback,
        events,
    }
}
