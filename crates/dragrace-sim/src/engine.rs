//! Race session: the state machine around one race.
//!
//! `RaceSession` owns both cars, processes player commands, runs the
//! physics, ghost and recorder systems, and produces `RaceSnapshot`s.
//! Headless and clock-injected, so whole races run deterministically in
//! tests.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use dragrace_core::commands::PlayerCommand;
use dragrace_core::constants::*;
use dragrace_core::enums::{CarSlot, RacePhase};
use dragrace_core::events::{RaceEvent, ShiftFeedback};
use dragrace_core::state::RaceSnapshot;
use dragrace_core::types::{CarPhysicsState, CarStats, GhostReplay, Opponent, RaceResult};

use crate::clock::Clock;
use crate::systems;
use crate::systems::physics::AiDriver;
use crate::systems::recorder::RaceRecorder;
use crate::systems::shift::ShiftController;

/// Configuration for starting a new race.
pub struct SessionConfig {
    /// RNG seed for the AI shift policy. Same seed = same race.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// One race between the player and an opponent (AI or ghost).
pub struct RaceSession<'g> {
    phase: RacePhase,
    tick: u64,
    clock: Box<dyn Clock>,
    rng: ChaCha8Rng,
    player_stats: CarStats,
    opponent: Opponent,
    ghost: Option<&'g GhostReplay>,
    player: CarPhysicsState,
    enemy: CarPhysicsState,
    /// Clock time of the last countdown step.
    countdown_mark: f64,
    start_time: Option<f64>,
    shift: ShiftController,
    recorder: RaceRecorder,
    /// Peak player speed (m/s).
    max_speed: f64,
    command_queue: VecDeque<PlayerCommand>,
    events: Vec<RaceEvent>,
    result: Option<RaceResult>,
}

impl<'g> RaceSession<'g> {
    /// Set up a race. The countdown starts at the clock's current time.
    ///
    /// With `ghost` supplied the opponent lane replays it; otherwise the
    /// opponent is driven by the AI shift policy.
    pub fn new(
        config: SessionConfig,
        player_stats: CarStats,
        opponent: Opponent,
        ghost: Option<&'g GhostReplay>,
        clock: Box<dyn Clock>,
    ) -> Self {
        if opponent.is_ghost && ghost.is_none() {
            tracing::warn!(
                opponent = %opponent.name,
                "Ghost opponent without a replay, racing the AI instead"
            );
        }
        let now = clock.now();
        Self {
            phase: RacePhase::Countdown(COUNTDOWN_START),
            tick: 0,
            clock,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            player_stats,
            opponent,
            ghost,
            player: CarPhysicsState::new(now),
            enemy: CarPhysicsState::new(now),
            countdown_mark: now,
            start_time: None,
            shift: ShiftController::new(),
            recorder: RaceRecorder::new(),
            max_speed: 0.0,
            command_queue: VecDeque::new(),
            events: Vec::new(),
            result: None,
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Shift the player's car up one gear right away.
    ///
    /// Only honored while racing and before the player finishes.
    pub fn attempt_upshift(&mut self) -> Option<ShiftFeedback> {
        if self.phase != RacePhase::Racing {
            return None;
        }
        let now = self.clock.now();
        let feedback = self.shift.upshift(&mut self.player, now)?;
        self.max_speed = self.max_speed.max(self.player.speed);
        tracing::debug!(
            grade = feedback.kind.label(),
            gear = self.player.gear,
            "Player upshift"
        );
        self.events.push(RaceEvent::Shift(feedback));
        Some(feedback)
    }

    /// Advance the race by one tick of `dt` seconds and return the snapshot.
    pub fn tick(&mut self, dt: f64) -> RaceSnapshot {
        self.tick += 1;
        self.process_commands();
        let now = self.clock.now();

        match self.phase {
            RacePhase::Countdown(_) => self.advance_countdown(now),
            RacePhase::Racing => self.run_systems(dt, now),
            RacePhase::Finished => {}
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            self.tick,
            self.phase,
            self.elapsed_at(now),
            &self.player,
            &self.enemy,
            self.shift.visible_feedback(now),
            events,
        )
    }

    /// Hand over the race result. Yields it at most once.
    pub fn take_result(&mut self) -> Option<RaceResult> {
        self.result.take()
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    /// Ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn player(&self) -> &CarPhysicsState {
        &self.player
    }

    pub fn opponent_car(&self) -> &CarPhysicsState {
        &self.enemy
    }

    pub fn opponent(&self) -> &Opponent {
        &self.opponent
    }

    pub fn player_stats(&self) -> &CarStats {
        &self.player_stats
    }

    pub fn is_ghost_race(&self) -> bool {
        self.ghost.is_some()
    }

    pub fn perfect_shifts(&self) -> u32 {
        self.shift.perfect_shifts()
    }

    /// Clock time at which the lights went out.
    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    /// Seconds since the start, 0 before it.
    pub fn elapsed(&self) -> f64 {
        self.elapsed_at(self.clock.now())
    }

    fn elapsed_at(&self, now: f64) -> f64 {
        self.start_time.map_or(0.0, |start| now - start)
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            match command {
                PlayerCommand::Upshift => {
                    self.attempt_upshift();
                }
            }
        }
    }

    /// Step the countdown once per full second of clock time.
    fn advance_countdown(&mut self, now: f64) {
        while let RacePhase::Countdown(remaining) = self.phase {
            if now - self.countdown_mark < COUNTDOWN_STEP_SECS {
                break;
            }
            self.countdown_mark += COUNTDOWN_STEP_SECS;
            let remaining = remaining.saturating_sub(1);
            self.events.push(RaceEvent::CountdownTick { remaining });
            if remaining == 0 {
                self.start_race(now);
            } else {
                tracing::debug!(remaining, "Countdown");
                self.phase = RacePhase::Countdown(remaining);
            }
        }
    }

    fn start_race(&mut self, now: f64) {
        self.start_time = Some(now);
        self.player = CarPhysicsState::new(now);
        self.enemy = CarPhysicsState::new(now);
        self.phase = RacePhase::Racing;
        self.events.push(RaceEvent::Go { start_time: now });
        tracing::info!(
            opponent = %self.opponent.name,
            ghost = self.ghost.is_some(),
            "Race started"
        );
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64, now: f64) {
        // 1. Player physics
        if !self.player.finished {
            let report =
                systems::physics::step(&mut self.player, &self.player_stats, dt, now, None);
            tracing::trace!(?report, distance = self.player.distance, "Player step");
            self.max_speed = self.max_speed.max(self.player.speed);
            if report.finished {
                self.car_finished(CarSlot::Player);
            }
        }

        // 2. Opponent: ghost replay or AI physics
        if !self.enemy.finished {
            match self.ghost {
                Some(replay) => systems::ghost::run(&mut self.enemy, replay, now),
                None => {
                    let report = systems::physics::step(
                        &mut self.enemy,
                        &self.opponent.stats,
                        dt,
                        now,
                        Some(AiDriver {
                            rng: &mut self.rng,
                            difficulty: self.opponent.difficulty,
                        }),
                    );
                    tracing::trace!(?report, distance = self.enemy.distance, "Opponent step");
                }
            }
            if self.enemy.finished {
                self.car_finished(CarSlot::Opponent);
            }
        }

        // 3. Recorder
        self.recorder.sample(&self.player, now);

        // 4. Completion
        if self.player.finished && self.enemy.finished {
            self.finish_race();
        }
    }

    fn car_finished(&mut self, slot: CarSlot) {
        let car = match slot {
            CarSlot::Player => &self.player,
            CarSlot::Opponent => &self.enemy,
        };
        let time = car.finish_time.unwrap_or_default();
        tracing::debug!(?slot, time, "Car finished");
        self.events.push(RaceEvent::CarFinished { slot, time });
    }

    fn finish_race(&mut self) {
        let (Some(player_time), Some(enemy_time)) =
            (self.player.finish_time, self.enemy.finish_time)
        else {
            return;
        };
        let result = RaceResult::new(
            player_time,
            enemy_time,
            self.max_speed * MS_TO_KMH,
            self.shift.perfect_shifts(),
            self.recorder.take(),
        );
        self.phase = RacePhase::Finished;
        self.events.push(RaceEvent::RaceFinished {
            player_won: result.player_won(),
        });
        tracing::info!(
            player_time,
            enemy_time,
            player_won = result.player_won(),
            max_speed_kmh = result.max_speed(),
            perfect_shifts = result.perfect_shifts(),
            "Race finished"
        );
        self.result = Some(result);
    }
}
