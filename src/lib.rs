//! # Elemental Engine Library
//!
//! This library provides the board-state engine for Elemental, a single-player
//! tile-matching puzzle. Tapping a cell makes it react with its neighbours
//! according to a fixed alchemical rule table: stone ignites wood, water
//! douses fire, earth and water make clay, fire bakes clay into pots, and a
//! cluster of three or more pots is sold for coins one pot at a time. The game
//! ends when no reaction is possible anywhere on the board.
//!
//! It is used by two binaries:
//! - `human_player`: interactive play in the terminal.
//! - `board_check`: validates a board file or level catalog and reports
//!   whether each board is already terminal.
//!
//! ## Modules
//! - `board`: `Element`, `Position` and the fixed-size `Board` grid.
//! - `rules`: the pairwise reaction table and the `can_make_*` predicates.
//! - `components`: pot-cluster detection and the breadth-first coin order.
//! - `engine`: `GameEngine`, which applies taps, runs staged steps, keeps
//!   undo/reset snapshots and tracks score and high score.
//! - `events`: the `Update` payload and the `Observer` trait.
//! - `levels`: level configuration, the built-in levels and JSON catalogs.
//! - `store`: high-score persistence.
//! - `error`: the crate's error type.
//! - `utils`: parsing boards from glyph strings.

pub mod board;
pub mod components;
pub mod engine;
pub mod error;
pub mod events;
pub mod levels;
pub mod rules;
pub mod store;
pub mod utils;

pub use board::{Board, Element, Position};
pub use engine::{GameEngine, GameStatus, Pacing, StagedEffect};
pub use error::{EngineError, Result};
pub use events::{Observer, Update, UpdateCause};
pub use levels::{LevelCatalog, LevelConfig};
pub use store::{HighScoreStore, JsonFileStore, MemoryStore};
