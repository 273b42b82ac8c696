use crate::board::{Board, Element, Position, ABSENT_CHAR};
use crate::error::{EngineError, Result};

/// Parses an array of string slices into a `Board`.
///
/// Each string slice is one row, starting from row 0. All rows must have the
/// same number of characters; the board is `s.len()` rows by that many columns.
///
/// Valid characters are the glyphs of [`Element::to_char`] plus
/// [`ABSENT_CHAR`] (`'_'`) for a cell that holds nothing:
/// `.` empty, `S` stone, `W` wood, `E` earth, `~` water, `F` fire, `A` air,
/// `C` clay, `P` pot, `$` coin, `x` fire_extinguishing, `X` fire_out.
///
/// # Errors
/// Returns `EngineError::InvalidConfiguration` if there are no rows, a row is
/// empty, the rows have different lengths, or a character is unrecognized.
///
/// # Examples
/// ```
/// use elemental::utils::board_from_str_array;
/// use elemental::board::{Element, Position};
///
/// let board = board_from_str_array(&["EW", "~_"]).unwrap();
/// assert_eq!(board.rows(), 2);
/// assert_eq!(board.cols(), 2);
/// assert_eq!(board.get(Position::new(0, 0)), Some(Element::Earth));
/// assert_eq!(board.get(Position::new(1, 1)), None);
///
/// assert!(board_from_str_array(&["E?"]).is_err());
/// assert!(board_from_str_array(&["EW", "E"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board> {
    let cols = s.first().map_or(0, |row| row.chars().count());
    let mut board = Board::new(s.len(), cols)?;

    for (r, row_str) in s.iter().enumerate() {
        let len = row_str.chars().count();
        if len != cols {
            return Err(EngineError::InvalidConfiguration(format!(
                "Row {} has {} characters, expected {}",
                r, len, cols
            )));
        }

        for (c, glyph) in row_str.chars().enumerate() {
            let cell = if glyph == ABSENT_CHAR {
                None
            } else {
                Some(Element::from_char(glyph).ok_or_else(|| {
                    EngineError::InvalidConfiguration(format!(
                        "Unrecognized character '{}' in row {} col {}",
                        glyph, r, c
                    ))
                })?)
            };
            board.put(Position::new(r, c), cell);
        }
    }
    Ok(board)
}
