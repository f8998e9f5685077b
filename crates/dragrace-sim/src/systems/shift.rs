//! Manual shift grading for the player's car.

use dragrace_core::constants::*;
use dragrace_core::enums::ShiftGrade;
use dragrace_core::events::ShiftFeedback;
use dragrace_core::types::CarPhysicsState;

/// Grade an upshift made at `rpm`.
pub fn grade(rpm: f64) -> ShiftGrade {
    if rpm > LATE_SHIFT_RPM {
        ShiftGrade::Late
    } else if (PERFECT_SHIFT_MIN_RPM..PERFECT_SHIFT_MAX_RPM).contains(&rpm) {
        ShiftGrade::Perfect
    } else if rpm < EARLY_SHIFT_RPM {
        ShiftGrade::Early
    } else {
        ShiftGrade::Good
    }
}

/// Grades player upshifts and keeps the perfect shift tally.
#[derive(Debug, Default)]
pub struct ShiftController {
    perfect_shifts: u32,
    last_feedback: Option<ShiftFeedback>,
}

impl ShiftController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grade and apply an upshift. A finished car is left untouched.
    ///
    /// The grade uses the rpm before the shift. The gear and rpm change
    /// even for a shift out of sixth, which stays in sixth.
    pub fn upshift(&mut self, car: &mut CarPhysicsState, now: f64) -> Option<ShiftFeedback> {
        if car.finished {
            return None;
        }

        let kind = grade(car.rpm);
        if kind == ShiftGrade::Perfect {
            self.perfect_shifts += 1;
            car.speed += PERFECT_SHIFT_BONUS;
        }
        car.gear = (car.gear + 1).min(MAX_GEAR);
        car.rpm *= MANUAL_SHIFT_RPM_FACTOR;

        let feedback = ShiftFeedback {
            kind,
            issued_at: now,
        };
        self.last_feedback = Some(feedback);
        Some(feedback)
    }

    pub fn perfect_shifts(&self) -> u32 {
        self.perfect_shifts
    }

    pub fn last_feedback(&self) -> Option<ShiftFeedback> {
        self.last_feedback
    }

    /// Latest feedback if it is still on screen at `now`.
    pub fn visible_feedback(&self, now: f64) -> Option<ShiftFeedback> {
        self.last_feedback.filter(|f| f.is_visible_at(now))
    }
}
