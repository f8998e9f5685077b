//! Per-tick vehicle physics.
//!
//! Integrates one car forward by `dt`: drivetrain force, traction clamp,
//! aero drag, rpm model, rev limiter, optional AI shift, finish check.

use rand::RngCore;

use dragrace_core::constants::*;
use dragrace_core::types::{CarPhysicsState, CarStats};

use super::{ai_shift, drivetrain, traction};

/// Shift control for a computer-driven car.
pub struct AiDriver<'a> {
    pub rng: &'a mut dyn RngCore,
    pub difficulty: f64,
}

/// What happened during one step. All zero for a finished car.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    pub engine_torque: f64,
    /// Force delivered to the road after the traction clamp (N).
    pub drive_force: f64,
    pub max_traction: f64,
    pub drag: f64,
    pub wheel_spinning: bool,
    pub limiter_hit: bool,
    /// Speed just before the limiter bounce.
    pub speed_before_limiter: f64,
    pub ai_shifted: bool,
    /// The car crossed the line during this step.
    pub finished: bool,
}

/// Advance `car` by `dt` seconds. `now` is the clock time used for the
/// finish time. Does nothing once the car has finished.
pub fn step(
    car: &mut CarPhysicsState,
    stats: &CarStats,
    dt: f64,
    now: f64,
    ai: Option<AiDriver<'_>>,
) -> StepReport {
    if car.finished {
        return StepReport::default();
    }

    let drive = drivetrain::evaluate(stats, car.gear, car.rpm);
    let drag = traction::aero_drag(car.speed);
    let grip = traction::apply(stats, car.speed, drive.drive_force);
    car.wheel_spinning = grip.wheel_spinning;

    let accel = (grip.applied_force - drag) / BASE_WEIGHT;
    car.speed = (car.speed + accel * dt).max(0.0);
    car.distance += car.speed * dt;

    if car.wheel_spinning {
        car.rpm += WHEELSPIN_RPM_RATE * dt;
    } else {
        let target = drivetrain::target_rpm(stats, car.gear, car.speed);
        car.rpm = RPM_SMOOTHING * car.rpm + (1.0 - RPM_SMOOTHING) * target.max(IDLE_RPM);
    }

    let speed_before_limiter = car.speed;
    let limiter_hit = car.rpm > REDLINE_RPM;
    if limiter_hit {
        car.rpm = REDLINE_RPM - REV_LIMITER_CUT;
        car.speed = (car.speed - REV_LIMITER_SPEED_LOSS).max(0.0);
    }

    let ai_shifted = match ai {
        Some(driver) => ai_shift::run(car, driver.difficulty, driver.rng),
        None => false,
    };

    let finished = car.distance >= TRACK_LENGTH;
    if finished {
        car.finish(now - car.start_time);
    }

    StepReport {
        engine_torque: drive.engine_torque,
        drive_force: grip.applied_force,
        max_traction: grip.max_traction,
        drag,
        wheel_spinning: grip.wheel_spinning,
        limiter_hit,
        speed_before_limiter,
        ai_shifted,
        finished,
    }
}
