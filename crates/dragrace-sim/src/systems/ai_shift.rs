//! AI shift system: applies the opponent shift policy to a car.

use rand::RngCore;

use dragrace_core::types::CarPhysicsState;
use dragrace_opponent::policy::{decide, ShiftContext};

/// Roll a shift point and upshift `car` if it is past it. Returns whether a
/// shift happened.
pub fn run(car: &mut CarPhysicsState, difficulty: f64, rng: &mut dyn RngCore) -> bool {
    let ctx = ShiftContext {
        rpm: car.rpm,
        gear: car.gear,
        difficulty,
    };
    let decision = decide(&ctx, rng);
    if decision.upshift {
        tracing::trace!(
            gear = decision.new_gear,
            shift_point = decision.shift_point,
            "AI upshift"
        );
        car.gear = decision.new_gear;
        car.rpm = decision.new_rpm;
    }
    decision.upshift
}
