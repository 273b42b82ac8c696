//! Grid storage for the Elemental puzzle.
//!
//! This module defines the board's fundamental components:
//! - `Element`: the type occupying a cell (stone, wood, fire, pot, ...).
//! - `Position`: an immutable `(row, col)` key used for sets and maps.
//! - `Board`: a fixed-size grid of optional elements with bounds-checked
//!   accessors, Moore-neighbourhood enumeration in a fixed order, diffing and
//!   text rendering.
use crate::error::{EngineError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the type of element held by a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    /// A passable cell with nothing in it.
    Empty,
    Stone,
    Wood,
    Earth,
    Water,
    Fire,
    Air,
    Clay,
    Pot,
    Coin,
    /// Fire that has been doused but has not settled yet.
    FireExtinguishing,
    /// Settled, extinguished fire. Inert.
    FireOut,
}

impl Element {
    /// Every element, in declaration order.
    pub const ALL: [Element; 12] = [
        Element::Empty,
        Element::Stone,
        Element::Wood,
        Element::Earth,
        Element::Water,
        Element::Fire,
        Element::Air,
        Element::Clay,
        Element::Pot,
        Element::Coin,
        Element::FireExtinguishing,
        Element::FireOut,
    ];

    /// Converts the element to its character representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use elemental::board::Element;
    /// assert_eq!(Element::Water.to_char(), '~');
    /// assert_eq!(Element::Empty.to_char(), '.');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            Element::Empty => '.',
            Element::Stone => 'S',
            Element::Wood => 'W',
            Element::Earth => 'E',
            Element::Water => '~',
            Element::Fire => 'F',
            Element::Air => 'A',
            Element::Clay => 'C',
            Element::Pot => 'P',
            Element::Coin => '$',
            Element::FireExtinguishing => 'x',
            Element::FireOut => 'X',
        }
    }

    /// Parses the character produced by [`Element::to_char`].
    pub fn from_char(c: char) -> Option<Element> {
        Element::ALL.iter().copied().find(|e| e.to_char() == c)
    }

    /// Returns the ANSI background colour code used for terminal output.
    fn to_ansi_color_code(&self) -> &'static str {
        match self {
            Element::Empty => "40",
            Element::Stone => "100",
            Element::Wood => "43",
            Element::Earth => "42",
            Element::Water => "44",
            Element::Fire => "41",
            Element::Air => "47",
            Element::Clay => "45",
            Element::Pot => "105",
            Element::Coin => "103",
            Element::FireExtinguishing => "101",
            Element::FireOut => "100",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Element::Empty => "empty",
            Element::Stone => "stone",
            Element::Wood => "wood",
            Element::Earth => "earth",
            Element::Water => "water",
            Element::Fire => "fire",
            Element::Air => "air",
            Element::Clay => "clay",
            Element::Pot => "pot",
            Element::Coin => "coin",
            Element::FireExtinguishing => "fire_extinguishing",
            Element::FireOut => "fire_out",
        };
        f.write_str(name)
    }
}

/// Glyph used for a cell that holds no element at all.
pub const ABSENT_CHAR: char = '_';

/// A `(row, col)` coordinate on the board. Rows and columns are 0-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Relative offsets of the Moore neighbourhood, row-major, skipping `(0, 0)`:
/// top-left, top, top-right, left, right, bottom-left, bottom, bottom-right.
///
/// This order decides which reaction is evaluated first around a tapped cell
/// and the visiting order of the coin chain.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A single cell whose contents differ between two boards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CellChange {
    pub position: Position,
    /// New contents of the cell. `None` is an absent cell.
    pub element: Option<Element>,
}

/// Represents the game board as a fixed-size grid of optional elements.
///
/// Absent cells (`None`) and `Element::Empty` are treated alike by every rule.
/// The dimensions never change after construction; only cell contents mutate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Element>>,
}

impl Board {
    /// Creates a board of absent cells.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfiguration` if `rows` or `cols` is zero,
    /// or if the grid is too large to allocate.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "board dimensions must be at least 1x1, got {}x{}",
                rows, cols
            )));
        }
        let too_large = || {
            EngineError::InvalidConfiguration(format!("a {}x{} board is too large", rows, cols))
        };
        let len = rows.checked_mul(cols).ok_or_else(too_large)?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| too_large())?;
        cells.resize(len, None);
        Ok(Board { rows, cols, cells })
    }

    /// Creates a board filled row-major from `layout`.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfiguration` for zero dimensions or when
    /// `layout` does not hold exactly `rows * cols` entries.
    pub fn from_layout(rows: usize, cols: usize, layout: &[Option<Element>]) -> Result<Self> {
        let mut board = Board::new(rows, cols)?;
        if layout.len() != board.cells.len() {
            return Err(EngineError::InvalidConfiguration(format!(
                "layout holds {} cells but a {}x{} board needs {}",
                layout.len(),
                rows,
                cols,
                board.cells.len()
            )));
        }
        board.cells.copy_from_slice(layout);
        Ok(board)
    }

    /// Creates a board where every cell is sampled uniformly from `palette`.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfiguration` for zero dimensions or an
    /// empty palette.
    pub fn new_random(
        rows: usize,
        cols: usize,
        palette: &[Element],
        rng: &mut (impl Rng + ?Sized),
    ) -> Result<Self> {
        if palette.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "cannot sample a board from an empty palette".to_string(),
            ));
        }
        let mut board = Board::new(rows, cols)?;
        for cell in board.cells.iter_mut() {
            *cell = Some(palette[rng.gen_range(0..palette.len())]);
        }
        Ok(board)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `true` when `(row, col)` lies on the board.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<Position> {
        if self.contains(row, col) {
            Ok(Position::new(row, col))
        } else {
            Err(EngineError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    fn index(&self, pos: Position) -> usize {
        assert!(
            self.contains(pos.row, pos.col),
            "position {} outside {}x{} board",
            pos,
            self.rows,
            self.cols
        );
        pos.row * self.cols + pos.col
    }

    /// Returns the contents of the cell at `(row, col)`.
    ///
    /// # Errors
    /// Returns `EngineError::OutOfBounds` if the coordinates are off the board.
    pub fn cell_at(&self, row: usize, col: usize) -> Result<Option<Element>> {
        let pos = self.check_bounds(row, col)?;
        Ok(self.cells[self.index(pos)])
    }

    /// Overwrites the cell at `(row, col)`.
    ///
    /// # Errors
    /// Returns `EngineError::OutOfBounds` if the coordinates are off the board.
    pub fn set_cell(&mut self, row: usize, col: usize, element: Option<Element>) -> Result<()> {
        let pos = self.check_bounds(row, col)?;
        self.put(pos, element);
        Ok(())
    }

    /// Returns `true` if the cell holds `Element::Empty` or nothing at all.
    ///
    /// # Errors
    /// Returns `EngineError::OutOfBounds` if the coordinates are off the board.
    pub fn is_empty(&self, row: usize, col: usize) -> Result<bool> {
        let pos = self.check_bounds(row, col)?;
        Ok(self.element(pos) == Element::Empty)
    }

    /// Returns the in-bounds Moore neighbours of `(row, col)` in the fixed
    /// order of [`NEIGHBOR_OFFSETS`].
    ///
    /// # Errors
    /// Returns `EngineError::OutOfBounds` if the coordinates are off the board.
    pub fn neighbors(&self, row: usize, col: usize) -> Result<Vec<Position>> {
        let pos = self.check_bounds(row, col)?;
        Ok(self.adjacent(pos).collect())
    }

    /// Returns the element at a validated position, mapping absent cells to
    /// `Element::Empty`.
    ///
    /// # Panics
    /// Panics if `pos` is outside the board.
    pub fn element(&self, pos: Position) -> Element {
        self.cells[self.index(pos)].unwrap_or(Element::Empty)
    }

    /// Raw contents of a validated position.
    ///
    /// # Panics
    /// Panics if `pos` is outside the board.
    pub fn get(&self, pos: Position) -> Option<Element> {
        self.cells[self.index(pos)]
    }

    /// Writes a validated position.
    ///
    /// # Panics
    /// Panics if `pos` is outside the board.
    pub fn put(&mut self, pos: Position, element: Option<Element>) {
        let idx = self.index(pos);
        self.cells[idx] = element;
    }

    /// Iterates the in-bounds Moore neighbours of `pos` without allocating.
    pub fn adjacent(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dr, dc)| {
            let r = pos.row.checked_add_signed(dr)?;
            let c = pos.col.checked_add_signed(dc)?;
            self.contains(r, c).then_some(Position::new(r, c))
        })
    }

    /// Iterates every position on the board in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols;
        (0..self.rows * cols).map(move |i| Position::new(i / cols, i % cols))
    }

    /// Number of cells holding `element`.
    pub fn count(&self, element: Element) -> usize {
        self.positions().filter(|&p| self.element(p) == element).count()
    }

    /// Lists every cell whose contents differ from `other`, in row-major order.
    ///
    /// # Panics
    /// Panics if the two boards have different dimensions.
    pub fn diff(&self, other: &Board) -> Vec<CellChange> {
        assert_eq!(
            (self.rows, self.cols),
            (other.rows, other.cols),
            "cannot diff boards of different dimensions"
        );
        self.positions()
            .filter(|&p| self.get(p) != other.get(p))
            .map(|p| CellChange {
                position: p,
                element: other.get(p),
            })
            .collect()
    }

    /// Renders the board as plain glyph rows, one line per row.
    pub fn to_plain_string(&self) -> String {
        let mut output = String::with_capacity(self.rows * (self.cols + 1));
        for r in 0..self.rows {
            if r > 0 {
                output.push('\n');
            }
            for c in 0..self.cols {
                output.push(
                    self.get(Position::new(r, c))
                        .map_or(ABSENT_CHAR, |e| e.to_char()),
                );
            }
        }
        output
    }

    /// Generates a coloured terminal rendering with row/column numbers.
    ///
    /// The cell at `highlight`, if any, is drawn with brackets around its glyph.
    pub fn to_string_with_highlight(&self, highlight: Option<Position>) -> String {
        let mut output = String::new();

        output.push_str("   ");
        for c in 0..self.cols {
            output.push_str(&format!("{:<3}", c));
        }
        output.push('\n');

        for r in 0..self.rows {
            output.push_str(&format!("{:<3}", r));
            for c in 0..self.cols {
                let pos = Position::new(r, c);
                let cell = self.get(pos);
                let glyph = cell.map_or(ABSENT_CHAR, |e| e.to_char());
                let color_code = cell.unwrap_or(Element::Empty).to_ansi_color_code();
                let content = if highlight == Some(pos) {
                    format!("[{}]", glyph)
                } else {
                    format!(" {} ", glyph)
                };
                output.push_str(&format!("\x1b[1;{}m{}\x1b[m", color_code, content));
            }
            if r + 1 < self.rows {
                output.push('\n');
            }
        }

        output
    }
}

impl fmt::Display for Board {
    /// Formats the board using `to_string_with_highlight(None)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_board_is_absent_and_empty() {
        let board = Board::new(2, 3).unwrap();
        assert_eq!(board.rows(), 2);
        assert_eq!(board.cols(), 3);
        for p in board.positions() {
            assert_eq!(board.get(p), None);
            assert!(board.is_empty(p.row, p.col).unwrap());
        }
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            Board::new(0, 4),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Board::new(4, 0),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        assert!(matches!(
            Board::new(usize::MAX, 2),
            Err(EngineError::InvalidConfiguration(_))
        ));
        // Fits in usize but exceeds the largest possible allocation.
        assert!(matches!(
            Board::new(usize::MAX / 2 + 1, 1),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_cell_access_out_of_bounds() {
        let mut board = Board::new(2, 2).unwrap();
        assert!(matches!(
            board.cell_at(2, 0),
            Err(EngineError::OutOfBounds { row: 2, col: 0, rows: 2, cols: 2 })
        ));
        assert!(matches!(
            board.set_cell(0, 5, Some(Element::Fire)),
            Err(EngineError::OutOfBounds { .. })
        ));
        assert!(board.neighbors(3, 3).is_err());
        assert!(board.is_empty(0, 2).is_err());
    }

    #[test]
    fn test_set_and_read_cell() {
        let mut board = Board::new(2, 2).unwrap();
        board.set_cell(1, 0, Some(Element::Wood)).unwrap();
        assert_eq!(board.cell_at(1, 0).unwrap(), Some(Element::Wood));
        assert!(!board.is_empty(1, 0).unwrap());
        board.set_cell(1, 0, Some(Element::Empty)).unwrap();
        assert!(board.is_empty(1, 0).unwrap());
    }

    #[test]
    fn test_neighbors_fixed_order_interior() {
        let board = Board::new(3, 3).unwrap();
        let n = board.neighbors(1, 1).unwrap();
        assert_eq!(
            n,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(0, 2),
                Position::new(1, 0),
                Position::new(1, 2),
                Position::new(2, 0),
                Position::new(2, 1),
                Position::new(2, 2),
            ]
        );
    }

    #[test]
    fn test_neighbors_clipped_at_corner_and_edge() {
        let board = Board::new(3, 4).unwrap();
        assert_eq!(
            board.neighbors(0, 0).unwrap(),
            vec![Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)]
        );
        assert_eq!(
            board.neighbors(2, 3).unwrap(),
            vec![Position::new(1, 2), Position::new(1, 3), Position::new(2, 2)]
        );
        let single = Board::new(1, 1).unwrap();
        assert!(single.neighbors(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_from_layout_length_mismatch() {
        let short = vec![Some(Element::Fire); 3];
        assert!(matches!(
            Board::from_layout(2, 2, &short),
            Err(EngineError::InvalidConfiguration(_))
        ));
        let exact = vec![Some(Element::Fire), None, Some(Element::Air), Some(Element::Empty)];
        let board = Board::from_layout(2, 2, &exact).unwrap();
        assert_eq!(board.get(Position::new(0, 1)), None);
        assert_eq!(board.element(Position::new(1, 0)), Element::Air);
    }

    #[test]
    fn test_new_random_uses_palette_only_and_is_seeded() {
        let palette = [Element::Earth, Element::Water];
        let a = Board::new_random(6, 6, &palette, &mut SmallRng::seed_from_u64(7)).unwrap();
        let b = Board::new_random(6, 6, &palette, &mut SmallRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b, "same seed must give the same board");
        for p in a.positions() {
            assert!(palette.contains(&a.element(p)));
        }
        assert!(Board::new_random(2, 2, &[], &mut SmallRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn test_diff_lists_changed_cells_row_major() {
        let before = board_from_str_array(&["EW", "F."]).unwrap();
        let after = board_from_str_array(&["CW", "F$"]).unwrap();
        assert_eq!(
            before.diff(&after),
            vec![
                CellChange {
                    position: Position::new(0, 0),
                    element: Some(Element::Clay)
                },
                CellChange {
                    position: Position::new(1, 1),
                    element: Some(Element::Coin)
                },
            ]
        );
        assert!(after.diff(&after).is_empty());
    }

    #[test]
    fn test_element_char_round_trip() {
        for e in Element::ALL {
            assert_eq!(Element::from_char(e.to_char()), Some(e));
        }
        assert_eq!(Element::from_char('?'), None);
    }

    #[test]
    fn test_display_board_formatting() {
        let board = board_from_str_array(&["SW.", "~F_"]).unwrap();
        let display = format!("{}", board);
        assert!(display.starts_with("   0  1  2"));
        assert_eq!(display.lines().count(), 3);
        assert!(board.to_string_with_highlight(Some(Position::new(0, 1))).contains("[W]"));
        assert_eq!(board.to_plain_string(), "SW.\n~F_");
    }
}
