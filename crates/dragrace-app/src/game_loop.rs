//! Race loop thread: runs one race session in real time and emits snapshots.
//!
//! The session is created inside the thread because it borrows the ghost
//! replay the thread owns. Commands arrive via `mpsc` channel. Snapshots are
//! sent back as `LoopEvent`s and stored in shared state for polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dragrace_core::commands::PlayerCommand;
use dragrace_core::constants::{MAX_GEAR, TICK_RATE};
use dragrace_core::enums::RacePhase;
use dragrace_core::state::RaceSnapshot;
use dragrace_core::types::RaceResult;
use dragrace_sim::clock::{Clock, SystemClock};
use dragrace_sim::driver::{self, Scheduler};
use dragrace_sim::{RaceSession, SessionConfig};

use crate::handle::RaceHandle;
use crate::state::{LoopCommand, LoopError, LoopEvent, RaceSetup};

/// Nominal duration of one tick.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Longest sleep slice while waiting out a delay, so cancellation is seen
/// promptly.
const DELAY_SLICE: Duration = Duration::from_millis(10);

/// Shared cancellation flag for a race loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Real-time scheduler: sleeps until each tick is due.
pub struct IntervalScheduler {
    tick_duration: Duration,
    next_tick_time: Option<Instant>,
    cancel: CancelToken,
}

impl IntervalScheduler {
    pub fn new(tick_duration: Duration, cancel: CancelToken) -> Self {
        Self {
            tick_duration,
            next_tick_time: None,
            cancel,
        }
    }
}

impl Scheduler for IntervalScheduler {
    fn next_tick(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        match self.next_tick_time {
            None => self.next_tick_time = Some(now),
            Some(due) => {
                if due > now {
                    std::thread::sleep(due - now);
                } else if now - due > self.tick_duration * 2 {
                    // Too far behind, reset to avoid catch-up spiral
                    self.next_tick_time = Some(now);
                }
            }
        }
        if let Some(due) = self.next_tick_time.as_mut() {
            *due += self.tick_duration;
        }
        !self.cancel.is_cancelled()
    }

    fn delay(&mut self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.cancel.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep((deadline - now).min(DELAY_SLICE));
        }
    }
}

/// Wraps a scheduler so a cancelled token stops it.
struct Cancellable<'a, S> {
    inner: S,
    cancel: &'a CancelToken,
}

impl<S: Scheduler> Scheduler for Cancellable<'_, S> {
    fn next_tick(&mut self) -> bool {
        !self.cancel.is_cancelled() && self.inner.next_tick() && !self.cancel.is_cancelled()
    }

    fn delay(&mut self, duration: Duration) -> bool {
        !self.cancel.is_cancelled() && self.inner.delay(duration) && !self.cancel.is_cancelled()
    }

    fn tick_dt(&self) -> f64 {
        self.inner.tick_dt()
    }
}

/// Spawns a race loop in a new thread ticking at `tick_rate` Hz.
pub fn spawn_race_loop(setup: RaceSetup, tick_rate: u32) -> Result<RaceHandle, LoopError> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();
    let (event_tx, event_rx) = mpsc::channel::<LoopEvent>();
    let latest_snapshot = Arc::new(Mutex::new(None));
    let cancel = CancelToken::new();
    let tick_duration = Duration::from_secs_f64(1.0 / f64::from(tick_rate.max(1)));

    let thread_snapshot = Arc::clone(&latest_snapshot);
    let thread_cancel = cancel.clone();
    let join = std::thread::Builder::new()
        .name("dragrace-race-loop".into())
        .spawn(move || {
            let scheduler = IntervalScheduler::new(tick_duration, thread_cancel.clone());
            run_race_loop(
                setup,
                Box::new(SystemClock::new()),
                scheduler,
                &cmd_rx,
                &thread_cancel,
                Some(&event_tx),
                &thread_snapshot,
            )
        })?;

    Ok(RaceHandle::new(cmd_tx, event_rx, latest_snapshot, cancel, join))
}

/// The race loop. Runs until the race is handed over, a Shutdown command
/// arrives or the command channel disconnects.
///
/// Without an `event_tx` only `latest_snapshot` is updated.
pub fn run_race_loop<S: Scheduler>(
    setup: RaceSetup,
    clock: Box<dyn Clock>,
    scheduler: S,
    cmd_rx: &mpsc::Receiver<LoopCommand>,
    cancel: &CancelToken,
    event_tx: Option<&mpsc::Sender<LoopEvent>>,
    latest_snapshot: &Mutex<Option<RaceSnapshot>>,
) -> Option<RaceResult> {
    let mut session = RaceSession::new(
        SessionConfig { seed: setup.seed },
        setup.player,
        setup.opponent.clone(),
        setup.ghost.as_ref(),
        clock,
    );

    let mut scheduler = Cancellable {
        inner: scheduler,
        cancel,
    };
    let result = driver::drive(&mut session, &mut scheduler, |session, snapshot| {
        // 1. Drain all pending commands; they apply at the next tick
        loop {
            match cmd_rx.try_recv() {
                Ok(LoopCommand::Player(cmd)) => session.queue_command(cmd),
                Ok(LoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    cancel.cancel();
                    break;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        // 2. Autopilot
        if let Some(shift_rpm) = setup.autopilot_rpm {
            let car = session.player();
            if snapshot.phase == RacePhase::Racing
                && !car.finished
                && car.rpm >= shift_rpm
                && car.gear < MAX_GEAR
            {
                session.queue_command(PlayerCommand::Upshift);
            }
        }

        // 3. Store latest snapshot for polling, then emit it
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot.clone());
        }
        if let Some(tx) = event_tx {
            if tx.send(LoopEvent::Snapshot(snapshot.clone())).is_err() {
                tracing::debug!("Event receiver gone, snapshot not emitted");
            }
        }
    });

    let last_event = match &result {
        Some(result) => LoopEvent::Finished(result.clone()),
        None => {
            tracing::info!("Race loop cancelled");
            LoopEvent::Cancelled
        }
    };
    if let Some(tx) = event_tx {
        if tx.send(last_event).is_err() {
            tracing::debug!("Event receiver gone, final event not emitted");
        }
    }
    result
}
