//! Level definitions: board size, element palette and optional fixed layout.
//!
//! Levels are plain configuration. The engine reads a [`LevelConfig`] once at
//! construction and never looks at it again mid-session.
use crate::board::{Board, Element};
use crate::error::{EngineError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Static description of one level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    /// Elements a random board is sampled from.
    #[serde(default)]
    pub palette: Vec<Element>,
    /// Fixed starting board, row-major. `null` entries are absent cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Vec<Option<Element>>>,
}

impl LevelConfig {
    /// Creates a level whose boards are sampled from `palette`.
    pub fn random(
        id: u32,
        name: impl Into<String>,
        rows: usize,
        cols: usize,
        palette: &[Element],
    ) -> Self {
        LevelConfig {
            id,
            name: name.into(),
            rows,
            cols,
            palette: palette.to_vec(),
            layout: None,
        }
    }

    /// Creates a level that always starts from `layout`.
    pub fn fixed(
        id: u32,
        name: impl Into<String>,
        rows: usize,
        cols: usize,
        palette: &[Element],
        layout: Vec<Option<Element>>,
    ) -> Self {
        LevelConfig {
            id,
            name: name.into(),
            rows,
            cols,
            palette: palette.to_vec(),
            layout: Some(layout),
        }
    }

    /// Creates a fixed level from glyph rows (see [`crate::utils::board_from_str_array`]).
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfiguration` if the rows do not parse.
    pub fn from_rows(id: u32, name: impl Into<String>, rows: &[&str]) -> Result<Self> {
        let board = crate::utils::board_from_str_array(rows)?;
        let layout: Vec<_> = board.positions().map(|p| board.get(p)).collect();
        let mut palette: Vec<Element> = Vec::new();
        for e in layout.iter().flatten() {
            if !palette.contains(e) {
                palette.push(*e);
            }
        }
        Ok(LevelConfig::fixed(
            id,
            name,
            board.rows(),
            board.cols(),
            &palette,
            layout,
        ))
    }

    /// Checks that a session can start from this level.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfiguration` for zero or overflowing
    /// dimensions, an empty palette without a layout, or a layout whose
    /// length is not `rows * cols`.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "level {} has a {}x{} board",
                self.id, self.rows, self.cols
            )));
        }
        let Some(cells) = self.cell_count() else {
            return Err(EngineError::InvalidConfiguration(format!(
                "level {} has a {}x{} board, too many cells",
                self.id, self.rows, self.cols
            )));
        };
        match &self.layout {
            Some(layout) if layout.len() != cells => {
                Err(EngineError::InvalidConfiguration(format!(
                    "level {} layout has {} cells, expected {}",
                    self.id,
                    layout.len(),
                    cells
                )))
            }
            None if self.palette.is_empty() => Err(EngineError::InvalidConfiguration(format!(
                "level {} has neither a layout nor a palette",
                self.id
            ))),
            _ => Ok(()),
        }
    }

    /// Number of cells on the board, or `None` if `rows * cols` overflows.
    pub fn cell_count(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Levels with a fixed layout always replay the same board, so a front
    /// end has no reason to offer "new game" on them.
    pub fn offers_new_game(&self) -> bool {
        self.layout.is_none()
    }

    /// Builds a starting board: the fixed layout if there is one, otherwise
    /// every cell sampled uniformly from the palette.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfiguration` if the level is invalid.
    pub fn generate(&self, rng: &mut (impl Rng + ?Sized)) -> Result<Board> {
        self.validate()?;
        match &self.layout {
            Some(layout) => Board::from_layout(self.rows, self.cols, layout),
            None => Board::new_random(self.rows, self.cols, &self.palette, rng),
        }
    }
}

/// A fixed level drawn from glyph rows with an explicit palette.
fn drawn(id: u32, name: &str, palette: &[Element], rows: &[&str]) -> Result<LevelConfig> {
    let board = crate::utils::board_from_str_array(rows)?;
    let layout = board.positions().map(|p| board.get(p)).collect();
    Ok(LevelConfig::fixed(
        id,
        name,
        board.rows(),
        board.cols(),
        palette,
        layout,
    ))
}

/// The nine levels of the original game.
///
/// # Errors
/// Returns `EngineError::InvalidConfiguration` if a drawn layout holds an
/// unknown glyph or ragged rows.
pub fn builtin() -> Result<Vec<LevelConfig>> {
    use Element::*;
    let classic = [Earth, Water, Fire, Air];
    Ok(vec![
        drawn(
            1,
            "Tap air elements to\nspread some fire!",
            &[Empty, Stone, Wood],
            &["SW.WS", "WWWWW", ".WSW.", "WWWWW", "SW.WS"],
        )?,
        drawn(
            2,
            "Put out fire with water!",
            &[Empty, Fire, Water],
            &["~F.F~", "FFFFF", ".F~F.", "FFFFF", "~F.F~"],
        )?,
        drawn(
            3,
            "Mix water and earth\nto make clay!",
            &[Empty, Water, Earth],
            &["~E.E~", "EE~EE", ".~E~.", "EE~EE", "~E.E~"],
        )?,
        drawn(
            4,
            "Use fire and clay\nto form pots\nand sell them!",
            &[Clay, Fire],
            &["FCCF", "CFFC", "CFFC", "FCCF"],
        )?,
        LevelConfig::random(
            5,
            "You know everything now.\nUse the elements wisely.",
            5,
            5,
            &classic,
        ),
        LevelConfig::random(6, "Random 6 x 6", 6, 6, &classic),
        LevelConfig::random(7, "Random 7 x 6", 7, 6, &classic),
        LevelConfig::random(8, "Random 8 x 6", 8, 6, &classic),
        LevelConfig::random(9, "Random 9 x 6", 9, 6, &classic),
    ])
}

/// An ordered, validated list of levels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCatalog {
    levels: Vec<LevelConfig>,
}

impl LevelCatalog {
    /// Validates every level and checks that ids are unique.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfiguration` for an empty catalog, a
    /// duplicate id, or any invalid level.
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self> {
        if levels.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "level catalog is empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for level in &levels {
            level.validate()?;
            if !seen.insert(level.id) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "duplicate level id {}",
                    level.id
                )));
            }
        }
        Ok(LevelCatalog { levels })
    }

    /// The nine built-in levels.
    ///
    /// # Errors
    /// See [`builtin`].
    pub fn builtin() -> Result<Self> {
        LevelCatalog::new(builtin()?)
    }

    /// Parses a catalog from JSON text: `{"levels": [ ... ]}`.
    ///
    /// # Errors
    /// Returns a JSON error for malformed input, or
    /// `EngineError::InvalidConfiguration` if a level is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: LevelCatalog = serde_json::from_str(json)?;
        LevelCatalog::new(raw.levels)
    }

    /// Reads a catalog from a JSON file.
    ///
    /// # Errors
    /// See [`LevelCatalog::from_json`]; I/O failures are returned as well.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let catalog = LevelCatalog::from_json(&content)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            levels = catalog.len(),
            "loaded level catalog"
        );
        Ok(catalog)
    }

    pub fn get(&self, id: u32) -> Option<&LevelConfig> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// The level after `id` in catalog order.
    pub fn next(&self, id: u32) -> Option<&LevelConfig> {
        let idx = self.levels.iter().position(|l| l.id == id)?;
        self.levels.get(idx + 1)
    }

    /// The level before `id` in catalog order.
    pub fn previous(&self, id: u32) -> Option<&LevelConfig> {
        let idx = self.levels.iter().position(|l| l.id == id)?;
        idx.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    pub fn first(&self) -> Option<&LevelConfig> {
        self.levels.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelConfig> {
        self.levels.iter()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
