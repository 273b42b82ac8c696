//! Notifications published by the engine after every completed operation or
//! staged step.
//!
//! Observers register with [`crate::engine::GameEngine::subscribe`] and receive
//! each [`Update`] synchronously, so a presentation layer can drive its own
//! animations from the diff without reading engine internals.
use crate::board::Position;
use crate::engine::StagedEffect;
use serde::Serialize;

pub use crate::board::CellChange;

/// What produced an update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum UpdateCause {
    Tap(Position),
    /// One staged continuation scheduled by an earlier tap.
    Step(StagedEffect),
    Undo,
    Reset,
    NewGame,
}

/// Diff payload delivered to observers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Update {
    pub cause: UpdateCause,
    /// Cells whose contents changed, with their new values, in row-major order.
    pub changes: Vec<CellChange>,
    /// Score after the operation.
    pub score: u32,
    /// Signed change in score; undo and reset can lower it.
    pub score_delta: i64,
    pub game_over: bool,
    /// Becomes `true` only on the update that moved the game into `GameOver`.
    pub entered_game_over: bool,
    pub high_score: u32,
    /// Staged steps still queued after this update.
    pub pending_steps: usize,
}

impl Update {
    /// Returns `true` if the update changed neither the board nor the score.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty() && self.score_delta == 0
    }
}

/// Receives engine updates.
///
/// Implemented for every `FnMut(&Update)` closure.
pub trait Observer {
    fn on_update(&mut self, update: &Update);
}

impl<F> Observer for F
where
    F: FnMut(&Update),
{
    fn on_update(&mut self, update: &Update) {
        self(update)
    }
}
