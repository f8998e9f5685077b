//! Tests for the race session, physics step, shift grading, recorder and
//! ghost playback.

use approx::assert_relative_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use dragrace_core::commands::PlayerCommand;
use dragrace_core::constants::*;
use dragrace_core::enums::*;
use dragrace_core::events::RaceEvent;
use dragrace_core::types::{
    CarPhysicsState, CarStats, GhostDataPoint, GhostReplay, Opponent, RaceResult,
};

use crate::clock::{Clock, ManualClock};
use crate::driver::{drive, HeadlessScheduler};
use crate::engine::{RaceSession, SessionConfig};
use crate::systems::physics::{self, AiDriver};
use crate::systems::recorder::RaceRecorder;
use crate::systems::shift::{grade, ShiftController};
use crate::systems::{ghost, traction};

fn stats(acceleration: u8, top_speed: u8, grip: u8) -> CarStats {
    CarStats::new(acceleration, top_speed, grip).unwrap()
}

fn ai_opponent(stats: CarStats, difficulty: f64) -> Opponent {
    Opponent::new("Test Rival", stats, difficulty).unwrap()
}

fn session<'g>(
    seed: u64,
    player: CarStats,
    opponent: Opponent,
    ghost: Option<&'g GhostReplay>,
) -> (RaceSession<'g>, ManualClock) {
    let clock = ManualClock::new();
    let session = RaceSession::new(
        SessionConfig { seed },
        player,
        opponent,
        ghost,
        Box::new(clock.clone()),
    );
    (session, clock)
}

fn default_session(seed: u64) -> (RaceSession<'static>, ManualClock) {
    session(seed, CarStats::default(), ai_opponent(CarStats::default(), 1.0), None)
}

/// Run a whole race headlessly, upshifting the player at `shift_rpm`.
fn run_race(
    seed: u64,
    player: CarStats,
    opponent: Opponent,
    ghost: Option<&GhostReplay>,
    shift_rpm: Option<f64>,
) -> RaceResult {
    let (mut session, clock) = session(seed, player, opponent, ghost);
    let mut scheduler = HeadlessScheduler::new(clock).with_tick_budget(10_000);
    drive(&mut session, &mut scheduler, |s, _| {
        if let Some(target) = shift_rpm {
            if s.phase() == RacePhase::Racing && s.player().rpm >= target && s.player().gear < 6 {
                s.attempt_upshift();
            }
        }
    })
    .expect("race should finish")
}

/// Tick through the countdown with one large clock jump.
fn skip_countdown(session: &mut RaceSession<'_>, clock: &ManualClock) {
    clock.advance(COUNTDOWN_START as f64 * COUNTDOWN_STEP_SECS);
    session.tick(DT);
    assert_eq!(session.phase(), RacePhase::Racing);
}

// ---- Physics step ----

#[test]
fn test_wheelspin_clamps_force() {
    let stats = stats(10, 1, 10);
    let mut car = CarPhysicsState::new(0.0);

    let report = physics::step(&mut car, &stats, DT, DT, None);

    assert!(report.wheel_spinning);
    assert!(car.wheel_spinning);
    assert_relative_eq!(report.max_traction, traction::max_traction(&stats, 0.0));
    assert_relative_eq!(report.drive_force, 0.8 * report.max_traction);
    assert_relative_eq!(car.speed, report.drive_force / BASE_WEIGHT * DT);
    assert_relative_eq!(car.rpm, IDLE_RPM + WHEELSPIN_RPM_RATE * DT);
}

#[test]
fn test_no_wheelspin_under_traction_limit() {
    let stats = stats(1, 10, 1);
    let mut car = CarPhysicsState::new(0.0);

    let report = physics::step(&mut car, &stats, DT, DT, None);

    assert!(!report.wheel_spinning);
    assert!(report.drive_force < report.max_traction);
    assert!(car.speed > 0.0);
    // Target rpm is below idle at launch, so the filter pulls toward idle.
    assert_relative_eq!(car.rpm, IDLE_RPM);
}

#[test]
fn test_rev_limiter_bounce() {
    let stats = stats(10, 1, 10);
    let mut car = CarPhysicsState::new(0.0);
    car.speed = 20.0;
    car.rpm = 7990.0;

    let report = physics::step(&mut car, &stats, DT, DT, None);

    assert!(report.limiter_hit);
    assert_eq!(car.rpm, REDLINE_RPM - REV_LIMITER_CUT);
    assert_relative_eq!(car.speed, report.speed_before_limiter - 0.05);
}

#[test]
fn test_finished_car_is_frozen() {
    let stats = CarStats::default();
    let mut car = CarPhysicsState::new(0.0);
    car.distance = 402.5;
    car.speed = 40.0;
    car.finish(12.0);
    let before = car.clone();

    let report = physics::step(&mut car, &stats, DT, 20.0, None);

    assert_eq!(car, before);
    assert_eq!(report, physics::StepReport::default());
}

#[test]
fn test_finish_time_is_wall_time_since_start() {
    let stats = CarStats::default();
    let mut car = CarPhysicsState::new(5.0);
    car.distance = TRACK_LENGTH - 0.01;
    car.speed = 40.0;
    car.rpm = 6000.0;
    car.gear = 4;

    let report = physics::step(&mut car, &stats, DT, 17.25, None);

    assert!(report.finished);
    assert!(car.finished);
    assert_eq!(car.finish_time, Some(12.25));
}

#[test]
fn test_ai_shift_only_for_ai_cars() {
    let stats = CarStats::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let mut player = CarPhysicsState::new(0.0);
    player.speed = 30.0;
    player.rpm = 7950.0;
    player.gear = 2;
    let mut ai = player.clone();

    physics::step(&mut player, &stats, DT, DT, None);
    let report = physics::step(
        &mut ai,
        &stats,
        DT,
        DT,
        Some(AiDriver {
            rng: &mut rng,
            difficulty: 1.0,
        }),
    );

    assert_eq!(player.gear, 2);
    assert!(report.ai_shifted);
    assert_eq!(ai.gear, 3);
    assert!(ai.rpm < player.rpm);
}

// ---- Shift grading ----

#[test]
fn test_grade_boundaries() {
    assert_eq!(grade(4999.0), ShiftGrade::Early);
    assert_eq!(grade(5000.0), ShiftGrade::Good);
    assert_eq!(grade(6999.0), ShiftGrade::Good);
    assert_eq!(grade(7000.0), ShiftGrade::Perfect);
    assert_eq!(grade(7799.999), ShiftGrade::Perfect);
    assert_eq!(grade(7800.0), ShiftGrade::Good);
    assert_eq!(grade(7800.5), ShiftGrade::Late);
    assert_eq!(grade(7950.0), ShiftGrade::Late);
}

#[test]
fn test_perfect_shift_bonus() {
    let mut controller = ShiftController::new();
    let mut car = CarPhysicsState::new(0.0);
    car.speed = 20.0;
    car.rpm = 7400.0;

    let feedback = controller.upshift(&mut car, 3.0).unwrap();

    assert_eq!(feedback.kind, ShiftGrade::Perfect);
    assert_eq!(feedback.issued_at, 3.0);
    assert_eq!(controller.perfect_shifts(), 1);
    assert_relative_eq!(car.speed, 21.5);
    assert_eq!(car.gear, 2);
    assert_relative_eq!(car.rpm, 7400.0 * 0.65);
}

#[test]
fn test_shift_in_top_gear_still_graded() {
    let mut controller = ShiftController::new();
    let mut car = CarPhysicsState::new(0.0);
    car.gear = 6;
    car.rpm = 7200.0;

    let feedback = controller.upshift(&mut car, 1.0).unwrap();

    assert_eq!(feedback.kind, ShiftGrade::Perfect);
    assert_eq!(car.gear, 6);
    assert_relative_eq!(car.rpm, 7200.0 * 0.65);
}

#[test]
fn test_early_shift_has_no_bonus() {
    let mut controller = ShiftController::new();
    let mut car = CarPhysicsState::new(0.0);
    car.speed = 10.0;
    car.rpm = 3000.0;

    let feedback = controller.upshift(&mut car, 1.0).unwrap();

    assert_eq!(feedback.kind, ShiftGrade::Early);
    assert_eq!(controller.perfect_shifts(), 0);
    assert_eq!(car.speed, 10.0);
}

#[test]
fn test_shift_ignored_for_finished_car() {
    let mut controller = ShiftController::new();
    let mut car = CarPhysicsState::new(0.0);
    car.rpm = 7400.0;
    car.finish(10.0);

    assert!(controller.upshift(&mut car, 11.0).is_none());
    assert_eq!(car.gear, 1);
    assert!(controller.last_feedback().is_none());
}

#[test]
fn test_feedback_window() {
    let mut controller = ShiftController::new();
    let mut car = CarPhysicsState::new(0.0);
    car.rpm = 6000.0;
    controller.upshift(&mut car, 2.0);

    assert!(controller.visible_feedback(2.5).is_some());
    assert!(controller.visible_feedback(2.9).is_none());
}

// ---- Recorder ----

#[test]
fn test_recorder_drops_non_increasing_samples() {
    let mut recorder = RaceRecorder::new();
    let mut car = CarPhysicsState::new(1.0);

    car.distance = 1.0;
    assert!(recorder.sample(&car, 1.5));
    car.distance = 2.0;
    assert!(!recorder.sample(&car, 1.5));
    assert!(!recorder.sample(&car, 1.2));
    assert!(recorder.sample(&car, 1.6));

    let samples = recorder.samples();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0], GhostDataPoint { t: 0.5, d: 1.0 });
    assert_relative_eq!(samples[1].t, 0.6);
}

#[test]
fn test_recorder_skips_finished_car() {
    let mut recorder = RaceRecorder::new();
    let mut car = CarPhysicsState::new(0.0);
    car.finish(9.0);

    assert!(!recorder.sample(&car, 9.5));
    assert!(recorder.is_empty());
}

// ---- Ghost playback ----

fn trace() -> Vec<GhostDataPoint> {
    vec![
        GhostDataPoint { t: 0.5, d: 2.0 },
        GhostDataPoint { t: 1.0, d: 6.0 },
        GhostDataPoint { t: 2.0, d: 20.0 },
    ]
}

fn replay(data: Vec<GhostDataPoint>, total_time: f64) -> GhostReplay {
    GhostReplay {
        id: "g1".into(),
        player_name: "Ana".into(),
        total_time,
        data,
        date: 0,
        design: None,
    }
}

#[test]
fn test_ghost_interpolation() {
    let data = trace();
    assert_eq!(ghost::distance_at(&data, 0.0), 2.0);
    assert_eq!(ghost::distance_at(&data, 0.5), 2.0);
    assert_relative_eq!(ghost::distance_at(&data, 0.75), 4.0);
    assert_relative_eq!(ghost::distance_at(&data, 1.5), 13.0);
    assert_eq!(ghost::distance_at(&data, 2.0), 20.0);
    assert_eq!(ghost::distance_at(&data, 5.0), 20.0);
    assert_eq!(ghost::distance_at(&[], 1.0), 0.0);
}

#[test]
fn test_ghost_sample_speed_is_interval_slope() {
    let sample = ghost::sample_at(&trace(), 1.5);
    assert_relative_eq!(sample.speed, 14.0);
}

#[test]
fn test_ghost_equal_timestamps_take_later_sample() {
    let data = vec![
        GhostDataPoint { t: 0.5, d: 2.0 },
        GhostDataPoint { t: 1.0, d: 6.0 },
        GhostDataPoint { t: 1.0, d: 9.0 },
        GhostDataPoint { t: 2.0, d: 20.0 },
    ];

    let before = ghost::sample_at(&data, 0.99);
    assert_relative_eq!(before.distance, 5.92, epsilon = 1e-9);
    assert_relative_eq!(before.speed, 8.0, epsilon = 1e-9);

    let at = ghost::sample_at(&data, 1.0);
    assert_eq!(at.distance, 9.0);
    assert_relative_eq!(at.speed, 11.0);

    assert_relative_eq!(ghost::distance_at(&data, 1.5), 14.5);

    // A duplicate at the end holds the later distance.
    let tail = &data[..3];
    assert_eq!(ghost::distance_at(tail, 1.0), 9.0);
    assert_eq!(ghost::distance_at(tail, 3.0), 9.0);

    // Playback over the duplicate stays finite and never moves backwards.
    let replay = replay(data, 2.5);
    let mut car = CarPhysicsState::new(0.0);
    let mut last = 0.0;
    for i in 0..=160 {
        ghost::run(&mut car, &replay, i as f64 * DT);
        assert!(car.distance.is_finite() && car.speed.is_finite());
        assert!(car.distance >= last);
        last = car.distance;
    }
    assert!(car.finished);
}

#[test]
fn test_ghost_holds_last_sample_until_total_time() {
    let replay = replay(trace(), 3.0);
    let mut car = CarPhysicsState::new(10.0);

    ghost::run(&mut car, &replay, 12.5);

    assert!(!car.finished);
    assert_eq!(car.distance, 20.0);
}

#[test]
fn test_ghost_finishes_at_total_time() {
    let replay = replay(trace(), 3.0);
    let mut car = CarPhysicsState::new(10.0);

    ghost::run(&mut car, &replay, 13.0);
    assert!(car.finished);
    assert_eq!(car.distance, TRACK_LENGTH);
    assert_eq!(car.finish_time, Some(3.0));

    // Terminal.
    ghost::run(&mut car, &replay, 20.0);
    assert_eq!(car.finish_time, Some(3.0));
    assert_eq!(car.distance, TRACK_LENGTH);
}

#[test]
fn test_empty_ghost_finishes_at_zero() {
    let replay = replay(Vec::new(), 14.2);
    let mut car = CarPhysicsState::new(0.0);

    ghost::run(&mut car, &replay, 0.1);

    assert!(car.finished);
    assert_eq!(car.distance, 0.0);
    assert_eq!(car.finish_time, Some(14.2));
}

// ---- Clock ----

#[test]
fn test_manual_clock_clones_share_time() {
    let clock = ManualClock::starting_at(2.0);
    let view = clock.clone();
    clock.advance(0.5);
    assert_eq!(view.now(), 2.5);
}

// ---- Session state machine ----

#[test]
fn test_countdown_steps_once_per_second() {
    let (mut session, clock) = default_session(42);

    clock.advance(0.5);
    let snap = session.tick(DT);
    assert_eq!(snap.phase, RacePhase::Countdown(3));
    assert!(snap.events.is_empty());

    clock.advance(0.5);
    let snap = session.tick(DT);
    assert_eq!(snap.phase, RacePhase::Countdown(2));
    assert_eq!(snap.events, vec![RaceEvent::CountdownTick { remaining: 2 }]);

    clock.advance(1.0);
    assert_eq!(session.tick(DT).phase, RacePhase::Countdown(1));

    clock.advance(1.0);
    let snap = session.tick(DT);
    assert_eq!(snap.phase, RacePhase::Racing);
    assert_eq!(
        snap.events,
        vec![
            RaceEvent::CountdownTick { remaining: 0 },
            RaceEvent::Go { start_time: 3.0 }
        ]
    );
    assert_eq!(session.start_time(), Some(3.0));
    assert_eq!(session.player().start_time, 3.0);
    assert_eq!(session.opponent_car().start_time, 3.0);
}

#[test]
fn test_countdown_catches_up_after_long_tick() {
    let (mut session, clock) = default_session(42);

    clock.advance(3.0);
    let snap = session.tick(DT);

    assert_eq!(snap.phase, RacePhase::Racing);
    let ticks = snap
        .events
        .iter()
        .filter(|e| matches!(e, RaceEvent::CountdownTick { .. }))
        .count();
    assert_eq!(ticks, 3);
}

#[test]
fn test_no_movement_during_countdown() {
    let (mut session, clock) = default_session(42);

    for _ in 0..30 {
        clock.advance(DT);
        session.tick(DT);
    }

    assert_eq!(session.player().distance, 0.0);
    assert_eq!(session.opponent_car().distance, 0.0);
    assert!(session.attempt_upshift().is_none());
    assert_eq!(session.player().gear, 1);
}

#[test]
fn test_queued_upshift_processed_at_tick() {
    let (mut session, clock) = default_session(42);
    skip_countdown(&mut session, &clock);

    session.queue_command(PlayerCommand::Upshift);
    assert_eq!(session.player().gear, 1);

    clock.advance(DT);
    let snap = session.tick(DT);

    assert_eq!(session.player().gear, 2);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, RaceEvent::Shift(fb) if fb.kind == ShiftGrade::Early)));
    assert_eq!(
        snap.shift_feedback.map(|fb| fb.kind),
        Some(ShiftGrade::Early)
    );
}

#[test]
fn test_snapshot_reports_speed_in_kmh() {
    let (mut session, clock) = default_session(42);
    skip_countdown(&mut session, &clock);

    for _ in 0..119 {
        clock.advance(DT);
        session.tick(DT);
    }
    clock.advance(DT);
    let snap = session.tick(DT);

    assert_relative_eq!(snap.player.speed_kmh, session.player().speed * 3.6);
    assert_relative_eq!(snap.player.progress, session.player().distance / 402.0);
    assert_relative_eq!(snap.elapsed_secs, 120.0 * DT, epsilon = 1e-9);
}

#[test]
fn test_full_race_produces_result_once() {
    let (mut session, clock) =
        session(42, stats(8, 8, 8), ai_opponent(CarStats::default(), 1.0), None);
    let mut scheduler = HeadlessScheduler::new(clock).with_tick_budget(10_000);
    let mut finished_events = 0;

    let result = drive(&mut session, &mut scheduler, |s, snap| {
        if s.player().rpm >= 7400.0 && s.player().gear < 6 {
            s.attempt_upshift();
        }
        finished_events += snap
            .events
            .iter()
            .filter(|e| matches!(e, RaceEvent::RaceFinished { .. }))
            .count();
    });

    let result = result.expect("race should finish");
    assert_eq!(finished_events, 1);
    assert_eq!(session.phase(), RacePhase::Finished);
    assert!(session.take_result().is_none());
    assert_eq!(result.player_won(), result.player_time() < result.enemy_time());
    assert!(result.player_time() > 0.0);
    assert!(result.enemy_time() > 0.0);
    assert!(!result.replay_data().is_empty());
}

#[test]
fn test_late_finisher_keeps_ticking() {
    let (mut session, clock) =
        session(42, stats(10, 10, 10), ai_opponent(stats(1, 1, 1), 0.8), None);
    let mut scheduler = HeadlessScheduler::new(clock).with_tick_budget(10_000);
    let mut checked = false;
    let mut last_enemy_distance = 0.0;

    let result = drive(&mut session, &mut scheduler, |s, snap| {
        if s.phase() == RacePhase::Racing && s.player().rpm >= 7400.0 && s.player().gear < 6 {
            s.attempt_upshift();
        }
        if snap.player.finished && !snap.opponent.finished {
            assert_eq!(snap.phase, RacePhase::Racing);
            assert!(snap.opponent.distance >= last_enemy_distance);
            checked = true;
        }
        last_enemy_distance = snap.opponent.distance;
    })
    .unwrap();

    assert!(checked, "player should finish first");
    assert!(result.player_won());
}

#[test]
fn test_perfect_shifts_counted_in_result() {
    let result = run_race(
        42,
        stats(8, 8, 8),
        ai_opponent(CarStats::default(), 1.0),
        None,
        Some(7400.0),
    );
    assert!(result.perfect_shifts() >= 1);
    assert!(result.max_speed() > 100.0);
}

#[test]
fn test_cancelled_race_yields_no_result() {
    let (mut session, clock) = default_session(42);
    let mut scheduler = HeadlessScheduler::new(clock).with_tick_budget(100);

    let result = drive(&mut session, &mut scheduler, |_, _| {});

    assert!(result.is_none());
    assert_eq!(scheduler.ticks(), 100);
    assert!(matches!(session.phase(), RacePhase::Countdown(_)));
    assert!(session.take_result().is_none());
}

#[test]
fn test_settle_delay_before_hand_off() {
    let (mut session, clock) =
        session(42, stats(8, 8, 8), ai_opponent(CarStats::default(), 1.0), None);
    let mut scheduler = HeadlessScheduler::new(clock.clone()).with_tick_budget(10_000);
    let mut finish_clock = 0.0;

    drive(&mut session, &mut scheduler, |s, snap| {
        if s.player().rpm >= 7400.0 && s.player().gear < 6 {
            s.attempt_upshift();
        }
        if snap.phase == RacePhase::Finished {
            finish_clock = clock.now();
        }
    })
    .unwrap();

    assert_relative_eq!(clock.now() - finish_clock, SETTLE_DELAY_SECS, epsilon = 1e-9);
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let (mut a, clock_a) = default_session(12345);
    let (mut b, clock_b) = default_session(12345);

    for _ in 0..900 {
        clock_a.advance(DT);
        clock_b.advance(DT);
        let json_a = serde_json::to_string(&a.tick(DT)).unwrap();
        let json_b = serde_json::to_string(&b.tick(DT)).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let (mut a, clock_a) = default_session(111);
    let (mut b, clock_b) = default_session(222);

    let mut diverged = false;
    for _ in 0..3000 {
        clock_a.advance(DT);
        clock_b.advance(DT);
        let snap_a = a.tick(DT);
        let snap_b = b.tick(DT);
        if snap_a.opponent != snap_b.opponent {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should shift the AI differently");
}

// ---- Ghost races ----

#[test]
fn test_recorded_trace_round_trips_through_playback() {
    let result = run_race(
        7,
        stats(7, 5, 6),
        ai_opponent(CarStats::default(), 1.0),
        None,
        Some(7300.0),
    );
    let data = result.replay_data();

    assert!(data.windows(2).all(|w| w[1].t > w[0].t));
    for point in data {
        assert_eq!(ghost::distance_at(data, point.t), point.d);
    }
}

#[test]
fn test_mirror_ghost_race_is_a_tie_won_by_ghost() {
    let player = stats(7, 5, 6);
    let first = run_race(7, player, ai_opponent(CarStats::default(), 1.0), None, None);
    let replay = GhostReplay::from_result("best", "Ana", &first, 0, None);

    let mut ghost_opponent = ai_opponent(player, 1.0);
    ghost_opponent.is_ghost = true;
    let rematch = run_race(7, player, ghost_opponent, Some(&replay), None);

    assert_eq!(rematch.enemy_time(), first.player_time());
    assert_eq!(rematch.player_time(), first.player_time());
    assert!(!rematch.player_won());
}

#[test]
fn test_ghost_race_uses_replay_not_ai() {
    let replay = replay(trace(), 6.0);
    let mut opponent = ai_opponent(CarStats::default(), 1.0);
    opponent.is_ghost = true;
    let (mut session, clock) = session(42, CarStats::default(), opponent, Some(&replay));
    assert!(session.is_ghost_race());
    skip_countdown(&mut session, &clock);

    clock.advance(1.5);
    session.tick(DT);

    assert_relative_eq!(session.opponent_car().distance, 13.0);
    assert_eq!(session.opponent_car().gear, 1);
}

#[test]
fn test_ghost_flag_without_replay_races_ai() {
    let mut opponent = ai_opponent(CarStats::default(), 1.0);
    opponent.is_ghost = true;
    let (mut session, clock) = session(42, CarStats::default(), opponent, None);
    assert!(!session.is_ghost_race());
    skip_countdown(&mut session, &clock);

    for _ in 0..60 {
        clock.advance(DT);
        session.tick(DT);
    }
    assert!(session.opponent_car().distance > 0.0);
}

#[test]
fn test_empty_ghost_is_beaten_by_any_finisher() {
    let replay = replay(Vec::new(), 30.0);
    let mut opponent = ai_opponent(CarStats::default(), 1.0);
    opponent.is_ghost = true;

    let result = run_race(42, stats(8, 8, 8), opponent, Some(&replay), Some(7400.0));

    assert_eq!(result.enemy_time(), 30.0);
    assert!(result.player_won());
}
