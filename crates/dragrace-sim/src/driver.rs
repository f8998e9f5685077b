//! Drives a race session to completion.
//!
//! A `Scheduler` decides when the next tick happens and whether the race is
//! still wanted. `drive` ticks the session until both cars finish, waits out
//! the settle delay and hands over the result. A cancelled scheduler ends the
//! loop without a result.

use std::time::Duration;

use dragrace_core::constants::{DT, SETTLE_DELAY_SECS};
use dragrace_core::enums::RacePhase;
use dragrace_core::state::RaceSnapshot;
use dragrace_core::types::RaceResult;

use crate::clock::ManualClock;
use crate::engine::RaceSession;

/// Paces ticks for `drive`.
pub trait Scheduler {
    /// Wait for the next tick. Returns false once the race is cancelled.
    fn next_tick(&mut self) -> bool;

    /// Wait out a fixed delay. Returns false if cancelled while waiting.
    fn delay(&mut self, duration: Duration) -> bool;

    /// Physics step per tick (seconds).
    fn tick_dt(&self) -> f64 {
        DT
    }
}

/// Runs as fast as possible by advancing a `ManualClock` one tick at a time.
#[derive(Debug, Clone)]
pub struct HeadlessScheduler {
    clock: ManualClock,
    dt: f64,
    tick_budget: Option<u64>,
    ticks: u64,
}

impl HeadlessScheduler {
    /// Schedule ticks of `DT` on `clock`.
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            dt: DT,
            tick_budget: None,
            ticks: 0,
        }
    }

    /// Cancel after `ticks` ticks.
    pub fn with_tick_budget(mut self, ticks: u64) -> Self {
        self.tick_budget = Some(ticks);
        self
    }

    /// Ticks handed out so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }
}

impl Scheduler for HeadlessScheduler {
    fn next_tick(&mut self) -> bool {
        if self.tick_budget.is_some_and(|budget| self.ticks >= budget) {
            return false;
        }
        self.ticks += 1;
        self.clock.advance(self.dt);
        true
    }

    fn delay(&mut self, duration: Duration) -> bool {
        self.clock.advance(duration.as_secs_f64());
        true
    }

    fn tick_dt(&self) -> f64 {
        self.dt
    }
}

/// Tick `session` until it finishes, calling `on_tick` after every tick.
///
/// Returns `None` if the scheduler is cancelled before the result is handed
/// over.
pub fn drive<'g, S, F>(
    session: &mut RaceSession<'g>,
    scheduler: &mut S,
    mut on_tick: F,
) -> Option<RaceResult>
where
    S: Scheduler + ?Sized,
    F: FnMut(&mut RaceSession<'g>, &RaceSnapshot),
{
    loop {
        if !scheduler.next_tick() {
            tracing::debug!(tick = session.tick_count(), "Race cancelled");
            return None;
        }
        let snapshot = session.tick(scheduler.tick_dt());
        on_tick(session, &snapshot);
        if snapshot.phase == RacePhase::Finished {
            break;
        }
    }

    if !scheduler.delay(Duration::from_secs_f64(SETTLE_DELAY_SECS)) {
        tracing::debug!("Race cancelled during settle delay");
        return None;
    }
    session.take_result()
}
