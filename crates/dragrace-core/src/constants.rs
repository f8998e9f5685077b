//! Simulation constants.
//!
//! The vehicle model values below are part of the race contract: changing any
//! of them changes race outcomes and invalidates stored ghosts.

/// Nominal tick rate (Hz) of the driving scheduler.
pub const TICK_RATE: u32 = 60;

/// Seconds per tick. Physics always advances by this fixed amount.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Quarter mile, in meters.
pub const TRACK_LENGTH: f64 = 402.0;

// --- Car stats ---

/// Lowest allowed value of a car stat.
pub const STAT_MIN: u8 = 1;

/// Highest allowed value of a car stat.
pub const STAT_MAX: u8 = 10;

/// Span used to normalize a stat into [0, 1]: (stat - 1) / 9.
pub const STAT_SPAN: f64 = (STAT_MAX - STAT_MIN) as f64;

// --- Chassis ---

/// Vehicle mass (kg).
pub const BASE_WEIGHT: f64 = 1200.0;

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Fraction of static weight on the driven (rear) axle.
pub const REAR_WEIGHT_BIAS: f64 = 0.60;

/// Driven wheel radius (m).
pub const WHEEL_RADIUS: f64 = 0.33;

// --- Aerodynamics ---

/// Air density at sea level (kg/m³).
pub const AIR_DENSITY: f64 = 1.225;

/// Drag coefficient, identical for every car.
pub const DRAG_COEFFICIENT: f64 = 0.32;

/// Frontal area (m²).
pub const FRONTAL_AREA: f64 = 2.2;

/// Downforce coefficient at grip 1.
pub const DOWNFORCE_BASE: f64 = 0.1;

/// Downforce coefficient added between grip 1 and grip 10.
pub const DOWNFORCE_SPAN: f64 = 0.7;

// --- Tires ---

/// Tire friction coefficient at grip 1.
pub const FRICTION_BASE: f64 = 0.9;

/// Friction coefficient added between grip 1 and grip 10.
pub const FRICTION_SPAN: f64 = 0.7;

/// Fraction of the traction limit delivered while the wheels spin.
pub const WHEELSPIN_FORCE_FACTOR: f64 = 0.8;

/// Rpm gained per second while the wheels spin.
pub const WHEELSPIN_RPM_RATE: f64 = 8000.0;

// --- Engine ---

/// Base engine torque scale ("horsepower" in tuning terms).
pub const BASE_HORSEPOWER: f64 = 250.0;

/// Torque multiplier added between acceleration 1 and acceleration 10.
pub const TORQUE_MULTIPLIER_SPAN: f64 = 0.8;

/// Maximum engine speed. Torque is zero above it.
pub const REDLINE_RPM: f64 = 8000.0;

/// Engine idle speed; the rpm model never settles below it.
pub const IDLE_RPM: f64 = 1000.0;

/// Weight of the previous rpm in the smoothing filter.
pub const RPM_SMOOTHING: f64 = 0.8;

/// Rpm the limiter cuts back below redline.
pub const REV_LIMITER_CUT: f64 = 50.0;

/// Speed lost (m/s) on every limiter bounce.
pub const REV_LIMITER_SPEED_LOSS: f64 = 0.05;

// --- Gearing ---

/// Per-gear ratios, first to sixth.
pub const GEAR_RATIOS: [f64; 6] = [3.5, 2.5, 1.8, 1.3, 1.0, 0.8];

/// Highest gear.
pub const MAX_GEAR: u8 = 6;

/// Final drive ratio at top speed 1 (shortest gearing).
pub const FINAL_DRIVE_MAX: f64 = 4.5;

/// Final drive reduction between top speed 1 and top speed 10.
pub const FINAL_DRIVE_SPAN: f64 = 2.0;

// --- Manual shifting ---

/// Lower bound (inclusive) of the perfect shift window.
pub const PERFECT_SHIFT_MIN_RPM: f64 = 7000.0;

/// Upper bound (exclusive) of the perfect shift window.
pub const PERFECT_SHIFT_MAX_RPM: f64 = 7800.0;

/// Shifts strictly above this rpm are late.
pub const LATE_SHIFT_RPM: f64 = REDLINE_RPM - 200.0;

/// Shifts strictly below this rpm are early.
pub const EARLY_SHIFT_RPM: f64 = 5000.0;

/// Instant speed bonus (m/s) for a perfect shift.
pub const PERFECT_SHIFT_BONUS: f64 = 1.5;

/// Rpm multiplier applied by a manual upshift.
pub const MANUAL_SHIFT_RPM_FACTOR: f64 = 0.65;

/// How long shift feedback stays on screen (seconds).
pub const FEEDBACK_DISPLAY_SECS: f64 = 0.8;

// --- Opponent AI ---

/// Base rpm at which the AI considers shifting.
pub const AI_SHIFT_BASE_RPM: f64 = 7000.0;

/// Random rpm added on top of the base shift point, before difficulty scaling.
pub const AI_SHIFT_JITTER_RPM: f64 = 800.0;

/// Rpm drop applied by an AI upshift.
pub const AI_SHIFT_RPM_DROP: f64 = 2000.0;

/// Default opponent difficulty multiplier.
pub const DEFAULT_DIFFICULTY: f64 = 1.0;

// --- Session ---

/// Countdown value at session start.
pub const COUNTDOWN_START: u8 = 3;

/// Duration of one countdown step (seconds).
pub const COUNTDOWN_STEP_SECS: f64 = 1.0;

/// Delay between the finish and the race result hand-off (seconds).
pub const SETTLE_DELAY_SECS: f64 = 1.0;

/// Longest finish time a ghost replay may claim (seconds).
pub const MAX_GHOST_TIME: f64 = 120.0;

/// m/s to km/h.
pub const MS_TO_KMH: f64 = 3.6;
