//! Game engine for the Elemental puzzle.
//!
//! `GameEngine` owns the board, the score, the persisted high score and two
//! snapshots: the state at session start (for reset) and the state just
//! before the last tap (for a single level of undo). All mutation goes
//! through `tap`, `undo`, `reset_game` and `new_game`, plus the staged steps a
//! tap can schedule.
//!
//! Staged steps exist so a front end can animate multi-step effects (fire
//! settling after being doused, a pot cluster turning into coins one cell at
//! a time). Each step carries a pacing delay, but the final board never
//! depends on timing: a caller either drives `advance` from a timer or calls
//! `run_pending` to finish everything at once. While steps are pending, every
//! other mutating call is rejected with `EngineError::StagedEffectsPending`.
use crate::board::{Board, Element, Position};
use crate::components::{chained_order, connected_pots, COIN_POINTS, MIN_COIN_CLUSTER};
use crate::error::{EngineError, Result};
use crate::events::{Observer, Update, UpdateCause};
use crate::levels::LevelConfig;
use crate::rules::{self, Reaction, REACTION_POINTS};
use crate::store::HighScoreStore;
use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Whether the session still has legal reactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// Board and score captured together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub score: u32,
}

/// A continuation scheduled by a tap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum StagedEffect {
    /// Turns the doused cells of one tap from extinguishing to extinguished.
    SettleFire(Vec<Position>),
    /// Converts one pot of a cluster into a coin. The last conversion of a
    /// cluster re-runs terminal detection.
    MintCoin { position: Position, last: bool },
}

/// Delays between staged steps. They only pace animation and default to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pacing {
    pub extinguish_delay: Duration,
    pub coin_delay: Duration,
}

impl Pacing {
    /// The delays the original mobile game used.
    pub fn animated() -> Self {
        Pacing {
            extinguish_delay: Duration::from_millis(300),
            coin_delay: Duration::from_millis(50),
        }
    }
}

#[derive(Clone, Debug)]
struct PendingStep {
    effect: StagedEffect,
    delay: Duration,
}

/// Owns the state of one level session and applies the reaction rules.
///
/// # Examples
/// ```
/// use elemental::engine::GameEngine;
/// use elemental::levels::LevelConfig;
/// use elemental::store::MemoryStore;
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
///
/// let level = LevelConfig::from_rows(1, "clay", &["E~"]).unwrap();
/// let mut rng = SmallRng::seed_from_u64(1);
/// let mut engine = GameEngine::new(level, Box::new(MemoryStore::new()), &mut rng).unwrap();
///
/// let update = engine.tap(0, 0).unwrap();
/// assert_eq!(update.score_delta, 1);
/// assert!(engine.is_game_over());
/// assert!(engine.undo().unwrap().is_some());
/// assert_eq!(engine.score(), 0);
/// ```
pub struct GameEngine {
    level: LevelConfig,
    board: Board,
    score: u32,
    high_score: u32,
    status: GameStatus,
    initial_state: Snapshot,
    previous_state: Option<Snapshot>,
    pending: VecDeque<PendingStep>,
    pacing: Pacing,
    store: Box<dyn HighScoreStore>,
    observers: Vec<Box<dyn Observer>>,
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("level", &self.level.id)
            .field("board", &self.board)
            .field("score", &self.score)
            .field("high_score", &self.high_score)
            .field("status", &self.status)
            .field("pending", &self.pending.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl GameEngine {
    /// Starts a session on `level`.
    ///
    /// Loads the level's high score from `store`, generates the starting
    /// board (fixed layout, or sampled from the palette with `rng`) and runs
    /// terminal detection. A board without any legal reaction starts in
    /// `GameOver`.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfiguration` if the level is invalid.
    #[instrument(skip(level, store, rng), fields(level = level.id))]
    pub fn new(
        level: LevelConfig,
        store: Box<dyn HighScoreStore>,
        rng: &mut (impl Rng + ?Sized),
    ) -> Result<Self> {
        let board = level.generate(rng)?;
        let high_score = store.load(level.id);
        let initial_state = Snapshot {
            board: board.clone(),
            score: 0,
        };
        let mut engine = GameEngine {
            level,
            board,
            score: 0,
            high_score,
            status: GameStatus::Playing,
            initial_state,
            previous_state: None,
            pending: VecDeque::new(),
            pacing: Pacing::default(),
            store,
            observers: Vec::new(),
        };
        engine.check_game_over();
        debug!(high_score, status = ?engine.status, "session started");
        Ok(engine)
    }

    /// Sets the delays attached to staged steps.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Registers an observer that receives every published [`Update`].
    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    /// Returns `true` if `undo` would restore something.
    pub fn can_undo(&self) -> bool {
        self.previous_state.is_some()
    }

    /// Current board and score.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            score: self.score,
        }
    }

    /// The board and score a reset returns to.
    pub fn initial_state(&self) -> &Snapshot {
        &self.initial_state
    }

    pub fn has_pending_steps(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_steps(&self) -> usize {
        self.pending.len()
    }

    /// Pacing delay before the next staged step, if one is queued.
    pub fn next_step_delay(&self) -> Option<Duration> {
        self.pending.front().map(|s| s.delay)
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(EngineError::StagedEffectsPending)
        }
    }

    fn position(&self, row: usize, col: usize) -> Result<Position> {
        if self.board.contains(row, col) {
            Ok(Position::new(row, col))
        } else {
            Err(EngineError::OutOfBounds {
                row,
                col,
                rows: self.board.rows(),
                cols: self.board.cols(),
            })
        }
    }

    /// Handles a tap on `(row, col)`.
    ///
    /// Every reaction is evaluated against the board as it was before the tap:
    /// 1. The current board and score become the undo snapshot.
    /// 2. Tapping a pot whose cluster has at least three pots queues one
    ///    `MintCoin` step per pot, in breadth-first order from the tapped
    ///    cell. Smaller clusters do nothing.
    /// 3. Any other element is checked against each neighbour in the fixed
    ///    adjacency order, and every matching reaction is applied.
    /// 4. Air/fire reinforcement scores one point per tap, however many
    ///    pairs matched.
    /// 5. Points are added to the score in one commit, terminal detection
    ///    runs, and the resulting [`Update`] is published.
    ///
    /// # Errors
    /// - `EngineError::OutOfBounds` if the cell is off the board.
    /// - `EngineError::StagedEffectsPending` while an earlier tap's steps are
    ///   still queued.
    /// - `EngineError::GameOver` once no legal reaction remains.
    #[instrument(skip(self), fields(level = self.level.id))]
    pub fn tap(&mut self, row: usize, col: usize) -> Result<Update> {
        let pos = self.position(row, col)?;
        self.ensure_idle()?;
        if self.is_game_over() {
            return Err(EngineError::GameOver);
        }

        let before = self.snapshot();
        self.previous_state = Some(before.clone());

        let tapped = before.board.element(pos);
        let mut points = 0;

        if tapped == Element::Pot {
            self.queue_coin_chain(pos);
        } else {
            let mut reinforced = false;
            let mut doused = Vec::new();

            for neighbor in before.board.adjacent(pos) {
                let Some(reaction) = rules::reaction(tapped, before.board.element(neighbor)) else {
                    continue;
                };
                debug!(?reaction, %neighbor, "reaction");
                let effect = reaction.effect();
                if let Some(element) = effect.tapped {
                    self.board.put(pos, Some(element));
                }
                if let Some(element) = effect.neighbor {
                    self.board.put(neighbor, Some(element));
                }
                match reaction {
                    Reaction::Reinforce => reinforced = true,
                    Reaction::Extinguish => doused.push(neighbor),
                    _ => {}
                }
                points += reaction.points();
            }

            if reinforced {
                points += REACTION_POINTS;
            }
            if !doused.is_empty() {
                self.pending.push_back(PendingStep {
                    effect: StagedEffect::SettleFire(doused),
                    delay: self.pacing.extinguish_delay,
                });
            }
        }

        self.score += points;

        let entered_game_over = self.check_game_over();

        Ok(self.publish(UpdateCause::Tap(pos), &before, entered_game_over))
    }

    fn has_coin_chain_pending(&self) -> bool {
        self.pending
            .iter()
            .any(|s| matches!(s.effect, StagedEffect::MintCoin { .. }))
    }

    fn queue_coin_chain(&mut self, start: Position) {
        let cluster = connected_pots(&self.board, start);
        if cluster.len() < MIN_COIN_CLUSTER {
            debug!(size = cluster.len(), "pot cluster too small to sell");
            return;
        }
        let order = chained_order(&self.board, &cluster, start);
        debug!(size = order.len(), "queueing coin chain");
        let last_index = order.len() - 1;
        for (i, position) in order.into_iter().enumerate() {
            self.pending.push_back(PendingStep {
                effect: StagedEffect::MintCoin {
                    position,
                    last: i == last_index,
                },
                delay: self.pacing.coin_delay,
            });
        }
    }

    /// Runs the next staged step and publishes its [`Update`].
    ///
    /// Returns `None` when nothing is pending.
    #[instrument(skip(self), fields(level = self.level.id))]
    pub fn advance(&mut self) -> Option<Update> {
        let step = self.pending.pop_front()?;
        let before = self.snapshot();
        let mut entered_game_over = false;

        match &step.effect {
            StagedEffect::SettleFire(cells) => {
                for &cell in cells {
                    if self.board.element(cell) == Element::FireExtinguishing {
                        self.board.put(cell, Some(Element::FireOut));
                    }
                }
            }
            StagedEffect::MintCoin { position, last } => {
                self.board.put(*position, Some(Element::Coin));
                self.score += COIN_POINTS;
                if *last {
                    entered_game_over = self.check_game_over();
                }
            }
        }
        debug!(effect = ?step.effect, remaining = self.pending.len(), "staged step");

        Some(self.publish(UpdateCause::Step(step.effect), &before, entered_game_over))
    }

    /// Runs every pending staged step in order and returns their updates.
    pub fn run_pending(&mut self) -> Vec<Update> {
        let mut updates = Vec::with_capacity(self.pending.len());
        while let Some(update) = self.advance() {
            updates.push(update);
        }
        updates
    }

    /// Re-evaluates whether any cell still has a legal reaction.
    ///
    /// On the transition from `Playing` to `GameOver` the high score is raised
    /// to the current score if needed and persisted. Calling this again
    /// without a board change has no further effect.
    ///
    /// While a coin chain is still converting, the board is not evaluated and
    /// the state is left untouched; the chain's last step runs the check.
    ///
    /// Returns `true` only when this call moved the game into `GameOver`.
    pub fn check_game_over(&mut self) -> bool {
        if self.has_coin_chain_pending() {
            debug!(pending = self.pending.len(), "coin chain still converting");
            return false;
        }
        let terminal = rules::is_terminal(&self.board);
        match (self.status, terminal) {
            (GameStatus::Playing, true) => {
                self.status = GameStatus::GameOver;
                self.high_score = self.high_score.max(self.score);
                if let Err(e) = self.store.save(self.level.id, self.high_score) {
                    warn!(error = %e, level = self.level.id, "failed to persist high score");
                }
                info!(
                    score = self.score,
                    high_score = self.high_score,
                    "no reactions left, game over"
                );
                true
            }
            (_, terminal) => {
                self.status = if terminal {
                    GameStatus::GameOver
                } else {
                    GameStatus::Playing
                };
                false
            }
        }
    }

    /// Restores the board and score from just before the last tap.
    ///
    /// Only one level is kept: a second undo without a tap in between, or an
    /// undo right after a reset or new game, does nothing and returns
    /// `Ok(None)`.
    ///
    /// # Errors
    /// Returns `EngineError::StagedEffectsPending` while staged steps are queued.
    #[instrument(skip(self), fields(level = self.level.id))]
    pub fn undo(&mut self) -> Result<Option<Update>> {
        self.ensure_idle()?;
        let Some(previous) = self.previous_state.take() else {
            debug!("nothing to undo");
            return Ok(None);
        };
        let before = self.snapshot();
        self.restore(previous);
        let entered_game_over = self.check_game_over();
        Ok(Some(self.publish(UpdateCause::Undo, &before, entered_game_over)))
    }

    /// Restores the board and score the session started with.
    ///
    /// The next undo is suppressed until another tap happens.
    ///
    /// # Errors
    /// Returns `EngineError::StagedEffectsPending` while staged steps are queued.
    #[instrument(skip(self), fields(level = self.level.id))]
    pub fn reset_game(&mut self) -> Result<Update> {
        self.ensure_idle()?;
        let before = self.snapshot();
        self.restore(self.initial_state.clone());
        self.previous_state = None;
        let entered_game_over = self.check_game_over();
        Ok(self.publish(UpdateCause::Reset, &before, entered_game_over))
    }

    /// Generates a fresh board for the level and starts over from score 0.
    ///
    /// A level with a fixed layout gets that layout again; otherwise every
    /// cell is sampled from the palette with `rng`. The new board becomes the
    /// reset target and the undo snapshot is dropped.
    ///
    /// # Errors
    /// Returns `EngineError::StagedEffectsPending` while staged steps are queued.
    #[instrument(skip(self, rng), fields(level = self.level.id))]
    pub fn new_game(&mut self, rng: &mut (impl Rng + ?Sized)) -> Result<Update> {
        self.ensure_idle()?;
        let board = self.level.generate(rng)?;
        let before = self.snapshot();
        let fresh = Snapshot { board, score: 0 };
        self.initial_state = fresh.clone();
        self.restore(fresh);
        self.previous_state = None;
        let entered_game_over = self.check_game_over();
        Ok(self.publish(UpdateCause::NewGame, &before, entered_game_over))
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.board = snapshot.board;
        self.score = snapshot.score;
        self.status = GameStatus::Playing;
    }

    fn publish(
        &mut self,
        cause: UpdateCause,
        before: &Snapshot,
        entered_game_over: bool,
    ) -> Update {
        let update = Update {
            cause,
            changes: before.board.diff(&self.board),
            score: self.score,
            score_delta: i64::from(self.score) - i64::from(before.score),
            game_over: self.is_game_over(),
            entered_game_over,
            high_score: self.high_score,
            pending_steps: self.pending.len(),
        };
        for observer in self.observers.iter_mut() {
            observer.on_update(&update);
        }
        update
    }
}
