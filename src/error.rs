//! Error type shared by every part of the engine.

use thiserror::Error;

/// Errors surfaced by the board, the engine, level loading and score storage.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A row/column pair lies outside the board.
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} board")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// A level or board definition cannot be used to start a session.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A staged conversion from an earlier tap has not finished yet.
    #[error("staged effects from the previous tap are still pending")]
    StagedEffectsPending,

    /// The session has ended; only undo, reset or a new game can resume it.
    #[error("the game is over")]
    GameOver,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
