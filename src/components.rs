//! Pot clusters and the order in which they turn into coins.
use crate::board::{Board, Element, Position};
use std::collections::{HashSet, VecDeque};

/// Smallest pot cluster that can be sold for coins.
pub const MIN_COIN_CLUSTER: usize = 3;

/// Points awarded for each pot converted to a coin.
pub const COIN_POINTS: u32 = 5;

/// Finds the cluster of pots connected to `start` through the 8-neighbourhood.
///
/// The traversal is depth-first and the result includes `start` itself.
/// Returns an empty set when `start` does not hold a pot.
///
/// # Panics
/// Panics if `start` is outside the board.
pub fn connected_pots(board: &Board, start: Position) -> HashSet<Position> {
    let mut cluster = HashSet::new();
    if board.element(start) != Element::Pot {
        return cluster;
    }

    let mut stack = vec![start];
    cluster.insert(start);

    while let Some(current) = stack.pop() {
        for next in board.adjacent(current) {
            if board.element(next) == Element::Pot && cluster.insert(next) {
                stack.push(next);
            }
        }
    }

    cluster
}

/// Returns `true` if `pos` holds a pot whose cluster has at least
/// [`MIN_COIN_CLUSTER`] pots.
///
/// # Panics
/// Panics if `pos` is outside the board.
pub fn can_make_coin(board: &Board, pos: Position) -> bool {
    board.element(pos) == Element::Pot && connected_pots(board, pos).len() >= MIN_COIN_CLUSTER
}

/// Orders `cluster` breadth-first from `start`, visiting neighbours in the
/// board's fixed adjacency order. Cells outside `cluster` are never entered.
///
/// The result is the sequence in which pots are converted to coins; for a
/// given cluster and start it is always the same. Returns an empty sequence
/// if `start` is not part of `cluster`.
pub fn chained_order(board: &Board, cluster: &HashSet<Position>, start: Position) -> Vec<Position> {
    if !cluster.contains(&start) {
        return Vec::new();
    }

    let mut order = Vec::with_capacity(cluster.len());
    let mut queue = VecDeque::new();
    let mut visited = HashSet::with_capacity(cluster.len());

    queue.push_back(start);
    visited.insert(start);

    while let Some(current) = queue.pop_front() {
        order.push(current);
        for next in board.adjacent(current) {
            if cluster.contains(&next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_connected_pots_diagonal_cluster() {
        let board = board_from_str_array(&[
            "P..P", //
            ".P..", //
            "..PC", //
        ])
        .unwrap();
        let cluster = connected_pots(&board, p(0, 0));
        let expected: HashSet<Position> = [p(0, 0), p(1, 1), p(2, 2)].into_iter().collect();
        assert_eq!(cluster, expected);

        let lone = connected_pots(&board, p(0, 3));
        assert_eq!(lone.len(), 1);
        assert!(lone.contains(&p(0, 3)));
    }

    #[test]
    fn test_connected_pots_non_pot_start() {
        let board = board_from_str_array(&["PPC"]).unwrap();
        assert!(connected_pots(&board, p(0, 2)).is_empty());
    }

    #[test]
    fn test_can_make_coin_threshold() {
        let pair = board_from_str_array(&["PP.", "..."]).unwrap();
        assert!(!can_make_coin(&pair, p(0, 0)));
        assert!(!can_make_coin(&pair, p(0, 1)));

        let triple = board_from_str_array(&["PP.", "..P"]).unwrap();
        assert!(can_make_coin(&triple, p(0, 0)));
        assert!(can_make_coin(&triple, p(1, 2)));
        assert!(!can_make_coin(&triple, p(1, 0)));
    }

    #[test]
    fn test_chained_order_line_from_middle() {
        let board = board_from_str_array(&["PPP"]).unwrap();
        let cluster = connected_pots(&board, p(0, 1));
        assert_eq!(
            chained_order(&board, &cluster, p(0, 1)),
            vec![p(0, 1), p(0, 0), p(0, 2)]
        );
    }

    #[test]
    fn test_chained_order_breadth_first_layers() {
        // Start in the corner of an L so later layers are visibly deferred.
        let board = board_from_str_array(&[
            "PPPP", //
            "P...", //
            "P...", //
        ])
        .unwrap();
        let cluster = connected_pots(&board, p(0, 0));
        let order = chained_order(&board, &cluster, p(0, 0));
        assert_eq!(
            order,
            vec![p(0, 0), p(0, 1), p(1, 0), p(0, 2), p(2, 0), p(0, 3)]
        );
    }

    #[test]
    fn test_chained_order_is_deterministic() {
        let board = board_from_str_array(&[
            "PP.P", //
            ".PPP", //
            "P.P.", //
        ])
        .unwrap();
        let start = p(1, 2);
        let cluster = connected_pots(&board, start);
        let first = chained_order(&board, &cluster, start);
        for _ in 0..10 {
            let again = connected_pots(&board, start);
            assert_eq!(chained_order(&board, &again, start), first);
        }
        assert_eq!(first.len(), cluster.len());
        assert_eq!(first[0], start);
    }

    #[test]
    fn test_chained_order_start_outside_cluster() {
        let board = board_from_str_array(&["PPP."]).unwrap();
        let cluster = connected_pots(&board, p(0, 0));
        assert!(chained_order(&board, &cluster, p(0, 3)).is_empty());
    }
}
