//! Autonomous shift policy.
//!
//! Pure functions that decide whether an AI car upshifts this tick.
//! Randomness is supplied by the caller so runs stay reproducible.

use rand::Rng;

use dragrace_core::constants::*;

/// Input to the shift policy for one car.
#[derive(Debug, Clone, Copy)]
pub struct ShiftContext {
    pub rpm: f64,
    pub gear: u8,
    /// Opponent difficulty multiplier.
    pub difficulty: f64,
}

/// Output of the shift policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftDecision {
    pub upshift: bool,
    pub new_gear: u8,
    pub new_rpm: f64,
    /// Shift point rolled for this tick.
    pub shift_point: f64,
}

/// Shift point for a uniform `jitter` in [0, 1).
pub fn shift_point(jitter: f64, difficulty: f64) -> f64 {
    AI_SHIFT_BASE_RPM + jitter * AI_SHIFT_JITTER_RPM * difficulty
}

/// Evaluate the policy with an explicit jitter in [0, 1).
pub fn evaluate(ctx: &ShiftContext, jitter: f64) -> ShiftDecision {
    let point = shift_point(jitter, ctx.difficulty);

    if ctx.rpm > point && ctx.gear < MAX_GEAR {
        ShiftDecision {
            upshift: true,
            new_gear: ctx.gear + 1,
            new_rpm: ctx.rpm - AI_SHIFT_RPM_DROP,
            shift_point: point,
        }
    } else {
        ShiftDecision {
            upshift: false,
            new_gear: ctx.gear,
            new_rpm: ctx.rpm,
            shift_point: point,
        }
    }
}

/// Roll a fresh shift point from `rng` and evaluate the policy.
pub fn decide<R: Rng + ?Sized>(ctx: &ShiftContext, rng: &mut R) -> ShiftDecision {
    let jitter: f64 = rng.gen();
    evaluate(ctx, jitter)
}
