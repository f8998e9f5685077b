//! Engine torque and gearing.
//!
//! Torque follows a normalized parabola over engine speed, peaking near
//! 40% of redline and falling to zero at redline.

use std::f64::consts::PI;

use dragrace_core::constants::*;
use dragrace_core::types::CarStats;

/// Torque multiplier for an acceleration stat (1.0 - 1.8).
pub fn torque_multiplier(acceleration: u8) -> f64 {
    1.0 + CarStats::normalized(acceleration) * TORQUE_MULTIPLIER_SPAN
}

/// Final drive ratio for a top speed stat (4.5 - 2.5). Higher top speed
/// gives taller gearing.
pub fn final_drive(top_speed: u8) -> f64 {
    FINAL_DRIVE_MAX - CarStats::normalized(top_speed) * FINAL_DRIVE_SPAN
}

/// Ratio of `gear`, clamped to the gearbox.
pub fn gear_ratio(gear: u8) -> f64 {
    GEAR_RATIOS[gear.clamp(1, MAX_GEAR) as usize - 1]
}

/// Normalized torque curve value at `rpm`. Zero above redline.
pub fn torque_curve(rpm: f64) -> f64 {
    if rpm > REDLINE_RPM {
        return 0.0;
    }
    let n = rpm / REDLINE_RPM;
    (0.5 + 2.0 * n - 2.5 * n * n).max(0.0)
}

/// Engine torque at `rpm`.
pub fn engine_torque(stats: &CarStats, rpm: f64) -> f64 {
    BASE_HORSEPOWER * torque_multiplier(stats.acceleration) * torque_curve(rpm)
}

/// Force at the contact patch for a given engine torque (N).
pub fn drive_force(stats: &CarStats, gear: u8, torque: f64) -> f64 {
    torque * gear_ratio(gear) * final_drive(stats.top_speed) / WHEEL_RADIUS
}

/// Engine speed the wheels would impose at `speed` without slip.
pub fn target_rpm(stats: &CarStats, gear: u8, speed: f64) -> f64 {
    let wheel_rps = speed / (2.0 * PI * WHEEL_RADIUS);
    wheel_rps * gear_ratio(gear) * final_drive(stats.top_speed) * 60.0
}

/// Drivetrain outputs for one car state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveOutput {
    pub engine_torque: f64,
    pub drive_force: f64,
}

/// Evaluate the drivetrain at the given gear and rpm.
pub fn evaluate(stats: &CarStats, gear: u8, rpm: f64) -> DriveOutput {
    let torque = engine_torque(stats, rpm);
    DriveOutput {
        engine_torque: torque,
        drive_force: drive_force(stats, gear, torque),
    }
}
