//! The alchemical reaction table.
//!
//! Everything here is pure: [`reaction`] maps an ordered
//! `(tapped, neighbour)` element pair to at most one [`Reaction`], and the
//! `can_make_*` predicates report whether a cell has at least one neighbour
//! it could react with. The predicates are checked in both orientations so a
//! reactive pair is visible from either of its cells.
use crate::board::{Board, Element, Position};
use crate::components::can_make_coin;

/// Points awarded by every pairwise reaction.
pub const REACTION_POINTS: u32 = 1;

/// Effect of a tapped cell on one neighbour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reaction {
    /// Stone strikes wood: the neighbour catches fire.
    Ignite,
    /// Air feeds fire (either orientation): the neighbour is written to fire.
    /// Scores at most once per tap.
    Reinforce,
    /// Water douses fire: the neighbour starts extinguishing.
    Extinguish,
    /// Earth and water mix: both cells become clay.
    MakeClay,
    /// Fire bakes clay: both cells become pots.
    MakePot,
}

/// Writes a reaction performs, relative to the tapped cell and its neighbour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Effect {
    pub tapped: Option<Element>,
    pub neighbor: Option<Element>,
}

impl Reaction {
    /// Returns the cell writes this reaction performs.
    pub fn effect(&self) -> Effect {
        match self {
            Reaction::Ignite => Effect {
                tapped: None,
                neighbor: Some(Element::Fire),
            },
            Reaction::Reinforce => Effect {
                tapped: None,
                neighbor: Some(Element::Fire),
            },
            Reaction::Extinguish => Effect {
                tapped: None,
                neighbor: Some(Element::FireExtinguishing),
            },
            Reaction::MakeClay => Effect {
                tapped: Some(Element::Clay),
                neighbor: Some(Element::Clay),
            },
            Reaction::MakePot => Effect {
                tapped: Some(Element::Pot),
                neighbor: Some(Element::Pot),
            },
        }
    }

    /// Points this reaction awards on its own. Reinforcement is scored once
    /// per tap by the engine, not per pair, so it reports zero here.
    pub fn points(&self) -> u32 {
        match self {
            Reaction::Reinforce => 0,
            _ => REACTION_POINTS,
        }
    }
}

/// Looks up the reaction between a tapped element and one of its neighbours.
///
/// Pot clusters are not a pairwise rule and never match here. All unlisted
/// pairs are no-ops.
///
/// # Examples
/// ```
/// use elemental::board::Element;
/// use elemental::rules::{reaction, Reaction};
/// assert_eq!(reaction(Element::Stone, Element::Wood), Some(Reaction::Ignite));
/// assert_eq!(reaction(Element::Wood, Element::Stone), None);
/// ```
pub fn reaction(tapped: Element, neighbor: Element) -> Option<Reaction> {
    use Element::*;
    match (tapped, neighbor) {
        (Stone, Wood) => Some(Reaction::Ignite),
        (Air, Fire) | (Fire, Air) => Some(Reaction::Reinforce),
        (Water, Fire) => Some(Reaction::Extinguish),
        (Earth, Water) | (Water, Earth) => Some(Reaction::MakeClay),
        (Fire, Clay) | (Clay, Fire) => Some(Reaction::MakePot),
        _ => None,
    }
}

fn any_neighbor(board: &Board, pos: Position, pairs: &[(Element, Element)]) -> bool {
    let me = board.element(pos);
    board.adjacent(pos).any(|n| {
        let other = board.element(n);
        pairs.iter().any(|&(a, b)| me == a && other == b)
    })
}

/// Returns `true` if the cell at `pos` can start or feed a fire:
/// stone next to wood, or air and fire side by side.
///
/// # Panics
/// Panics if `pos` is outside the board.
pub fn can_make_fire(board: &Board, pos: Position) -> bool {
    use Element::*;
    any_neighbor(board, pos, &[(Air, Fire), (Fire, Air), (Stone, Wood)])
}

/// Returns `true` if water and fire touch at `pos`.
///
/// # Panics
/// Panics if `pos` is outside the board.
pub fn can_extinguish_fire(board: &Board, pos: Position) -> bool {
    use Element::*;
    any_neighbor(board, pos, &[(Fire, Water), (Water, Fire)])
}

/// Returns `true` if earth and water touch at `pos`.
///
/// # Panics
/// Panics if `pos` is outside the board.
pub fn can_make_clay(board: &Board, pos: Position) -> bool {
    use Element::*;
    any_neighbor(board, pos, &[(Earth, Water), (Water, Earth)])
}

/// Returns `true` if fire and clay touch at `pos`.
///
/// # Panics
/// Panics if `pos` is outside the board.
pub fn can_make_pot(board: &Board, pos: Position) -> bool {
    use Element::*;
    any_neighbor(board, pos, &[(Fire, Clay), (Clay, Fire)])
}

/// Returns `true` if any rule, including pot-cluster conversion, applies at `pos`.
///
/// # Panics
/// Panics if `pos` is outside the board.
pub fn has_any_reaction(board: &Board, pos: Position) -> bool {
    can_make_fire(board, pos)
        || can_extinguish_fire(board, pos)
        || can_make_clay(board, pos)
        || can_make_pot(board, pos)
        || can_make_coin(board, pos)
}

/// Returns `true` if no cell on the board has a legal reaction.
pub fn is_terminal(board: &Board) -> bool {
    !board.positions().any(|p| has_any_reaction(board, p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;

    #[test]
    fn test_reaction_table() {
        use Element::*;
        assert_eq!(reaction(Stone, Wood), Some(Reaction::Ignite));
        assert_eq!(reaction(Air, Fire), Some(Reaction::Reinforce));
        assert_eq!(reaction(Fire, Air), Some(Reaction::Reinforce));
        assert_eq!(reaction(Earth, Water), Some(Reaction::MakeClay));
        assert_eq!(reaction(Water, Earth), Some(Reaction::MakeClay));
        assert_eq!(reaction(Water, Fire), Some(Reaction::Extinguish));
        assert_eq!(reaction(Fire, Clay), Some(Reaction::MakePot));
        assert_eq!(reaction(Clay, Fire), Some(Reaction::MakePot));
    }

    #[test]
    fn test_unlisted_pairs_are_no_ops() {
        use Element::*;
        assert_eq!(reaction(Wood, Stone), None);
        assert_eq!(reaction(Fire, Water), None);
        assert_eq!(reaction(Pot, Pot), None);
        assert_eq!(reaction(Fire, Fire), None);
        assert_eq!(reaction(Coin, Fire), None);
        assert_eq!(reaction(FireOut, Water), None);
        assert_eq!(reaction(FireExtinguishing, Air), None);

        let mut matched = 0;
        for a in Element::ALL {
            for b in Element::ALL {
                if reaction(a, b).is_some() {
                    matched += 1;
                }
            }
        }
        assert_eq!(matched, 8, "exactly the eight listed pairs react");
    }

    #[test]
    fn test_effects_and_points() {
        assert_eq!(
            Reaction::MakeClay.effect(),
            Effect {
                tapped: Some(Element::Clay),
                neighbor: Some(Element::Clay)
            }
        );
        assert_eq!(Reaction::Ignite.effect().tapped, None);
        assert_eq!(
            Reaction::Extinguish.effect().neighbor,
            Some(Element::FireExtinguishing)
        );
        assert_eq!(Reaction::Ignite.points(), 1);
        assert_eq!(Reaction::Reinforce.points(), 0);
    }

    #[test]
    fn test_predicates_see_both_orientations() {
        let board = board_from_str_array(&["~F", ".."]).unwrap();
        assert!(can_extinguish_fire(&board, Position::new(0, 0)));
        assert!(can_extinguish_fire(&board, Position::new(0, 1)));
        assert!(!can_extinguish_fire(&board, Position::new(1, 0)));

        let board = board_from_str_array(&["SW"]).unwrap();
        assert!(can_make_fire(&board, Position::new(0, 0)));
        assert!(!can_make_fire(&board, Position::new(0, 1)));
    }

    #[test]
    fn test_predicates_use_diagonals() {
        let board = board_from_str_array(&["E.", ".~"]).unwrap();
        assert!(can_make_clay(&board, Position::new(0, 0)));
        assert!(can_make_clay(&board, Position::new(1, 1)));

        let board = board_from_str_array(&[".C", "F."]).unwrap();
        assert!(can_make_pot(&board, Position::new(1, 0)));
        assert!(can_make_pot(&board, Position::new(0, 1)));
    }

    #[test]
    fn test_is_terminal() {
        assert!(is_terminal(&board_from_str_array(&["S.", ".."]).unwrap()));
        assert!(!is_terminal(&board_from_str_array(&["SS", "WW"]).unwrap()));
        assert!(!is_terminal(&board_from_str_array(&["SW"]).unwrap()));
        assert!(is_terminal(&board_from_str_array(&["PP.", "..."]).unwrap()));
        assert!(!is_terminal(&board_from_str_array(&["PPP"]).unwrap()));
        assert!(is_terminal(&board_from_str_array(&["$$$", "XxC"]).unwrap()));
        assert!(is_terminal(&board_from_str_array(&["F", "W"]).unwrap()));
    }
}
