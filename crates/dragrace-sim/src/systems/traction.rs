//! Tire traction and aerodynamic loads.
//!
//! drag      = 0.5 * rho * Cd * A * v^2
//! downforce = 0.5 * rho * Cl * A * v^2
//! traction  = (m * g * rear_bias + downforce) * mu

use dragrace_core::constants::*;
use dragrace_core::types::CarStats;

/// Downforce coefficient for a grip stat.
pub fn downforce_coefficient(grip: u8) -> f64 {
    DOWNFORCE_BASE + CarStats::normalized(grip) * DOWNFORCE_SPAN
}

/// Tire friction coefficient for a grip stat.
pub fn friction_coefficient(grip: u8) -> f64 {
    FRICTION_BASE + CarStats::normalized(grip) * FRICTION_SPAN
}

/// Aerodynamic drag (N) at `speed` (m/s).
pub fn aero_drag(speed: f64) -> f64 {
    0.5 * AIR_DENSITY * DRAG_COEFFICIENT * FRONTAL_AREA * speed * speed
}

/// Aerodynamic downforce (N) at `speed` (m/s).
pub fn aero_downforce(stats: &CarStats, speed: f64) -> f64 {
    0.5 * AIR_DENSITY * downforce_coefficient(stats.grip) * FRONTAL_AREA * speed * speed
}

/// Maximum force the rear tires can transmit (N).
pub fn max_traction(stats: &CarStats, speed: f64) -> f64 {
    let rear_load = BASE_WEIGHT * GRAVITY * REAR_WEIGHT_BIAS + aero_downforce(stats, speed);
    rear_load * friction_coefficient(stats.grip)
}

/// Result of checking a requested drive force against the traction limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TractionOutcome {
    pub max_traction: f64,
    /// Force actually delivered to the road.
    pub applied_force: f64,
    pub wheel_spinning: bool,
}

/// Clamp `requested_force` to what the tires can hold.
///
/// A request above the limit spins the wheels and delivers only
/// `WHEELSPIN_FORCE_FACTOR` of the limit.
pub fn apply(stats: &CarStats, speed: f64, requested_force: f64) -> TractionOutcome {
    let limit = max_traction(stats, speed);
    if requested_force > limit {
        TractionOutcome {
            max_traction: limit,
            applied_force: limit * WHEELSPIN_FORCE_FACTOR,
            wheel_spinning: true,
        }
    } else {
        TractionOutcome {
            max_traction: limit,
            applied_force: requested_force,
            wheel_spinning: false,
        }
    }
}
