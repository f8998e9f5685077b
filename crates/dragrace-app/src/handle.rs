//! Caller-side handle to a running race loop.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use dragrace_core::commands::PlayerCommand;
use dragrace_core::state::RaceSnapshot;
use dragrace_core::types::RaceResult;

use crate::game_loop::CancelToken;
use crate::state::{LoopCommand, LoopError, LoopEvent};

/// Owns a race loop thread. Dropping the handle cancels the race, so no
/// tick runs against a session nobody is watching.
pub struct RaceHandle {
    commands: mpsc::Sender<LoopCommand>,
    events: mpsc::Receiver<LoopEvent>,
    latest_snapshot: Arc<Mutex<Option<RaceSnapshot>>>,
    cancel: CancelToken,
    join: Option<JoinHandle<Option<RaceResult>>>,
}

impl RaceHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<LoopCommand>,
        events: mpsc::Receiver<LoopEvent>,
        latest_snapshot: Arc<Mutex<Option<RaceSnapshot>>>,
        cancel: CancelToken,
        join: JoinHandle<Option<RaceResult>>,
    ) -> Self {
        Self {
            commands,
            events,
            latest_snapshot,
            cancel,
            join: Some(join),
        }
    }

    /// Forward a player command; it applies at the next tick.
    pub fn send(&self, command: PlayerCommand) -> Result<(), LoopError> {
        self.commands
            .send(LoopCommand::Player(command))
            .map_err(|_| LoopError::Closed)
    }

    pub fn upshift(&self) -> Result<(), LoopError> {
        self.send(PlayerCommand::Upshift)
    }

    /// Latest snapshot, if any tick has run.
    pub fn snapshot(&self) -> Option<RaceSnapshot> {
        self.latest_snapshot.lock().ok().and_then(|lock| lock.clone())
    }

    /// Loop events: snapshots, then `Finished` or `Cancelled`.
    pub fn events(&self) -> &mpsc::Receiver<LoopEvent> {
        &self.events
    }

    /// Stop the race without a result.
    pub fn cancel(&self) {
        self.cancel.cancel();
        let _ = self.commands.send(LoopCommand::Shutdown);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Block until the loop ends and return its result.
    pub fn wait(mut self) -> Result<Option<RaceResult>, LoopError> {
        match self.join.take() {
            Some(join) => join.join().map_err(|_| LoopError::Panicked),
            None => Ok(None),
        }
    }
}

impl Drop for RaceHandle {
    fn drop(&mut self) {
        if self.join.is_some() {
            self.cancel();
        }
    }
}
