//! Group and liberty search.
//!
//! Groups are collected with an explicit worklist and a visited array keyed
//! by canonical board index. A stone may be its own neighbor on boards with
//! an axis of length 1, and the visited check is what keeps the search finite.

use crate::board::{Board, Color, Field, Pos, Size, canonicalize, index_position, neighbors, position_index};

/// Collect the connected component reachable from `seed` through neighbors
/// accepted by `filter`.
///
/// The seed itself is always a member and is not checked against the filter.
/// Members are canonical and distinct, in breadth-first discovery order.
pub fn group_with_filter(size: Size, filter: impl Fn(Pos) -> bool, seed: Pos) -> Vec<Pos> {
    let mut visited = vec![false; size.area()];
    let mut members = Vec::new();
    let mut head = 0;

    let start = canonicalize(size, seed);
    visited[position_index(size, start)] = true;
    members.push(start);

    // `members` doubles as the BFS queue: everything past `head` is the frontier.
    while head < members.len() {
        let pt = members[head];
        head += 1;
        for n in neighbors(size, pt) {
            let i = position_index(size, n);
            if !visited[i] && filter(n) {
                visited[i] = true;
                members.push(n);
            }
        }
    }
    members
}

/// The group of `color` stones containing `seed`.
pub fn group(size: Size, board: &Board, color: Color, seed: Pos) -> Vec<Pos> {
    let field = Field::Stone(color);
    group_with_filter(size, |p| board.get(size, p) == field, seed)
}

/// Distinct empty positions adjacent to the `color` group containing `seed`.
///
/// A point bordering the group from several sides is counted once.
pub fn group_liberties(size: Size, board: &Board, color: Color, seed: Pos) -> Vec<Pos> {
    let mut seen = vec![false; size.area()];
    let mut liberties = Vec::new();

    for member in group(size, board, color, seed) {
        for n in neighbors(size, member) {
            let i = position_index(size, n);
            if !seen[i] && board.get(size, n).is_empty() {
                seen[i] = true;
                liberties.push(index_position(size, i));
            }
        }
    }
    liberties
}

/// Number of distinct liberties of the `color` group containing `seed`.
#[inline]
pub fn liberty_count(size: Size, board: &Board, color: Color, seed: Pos) -> usize {
    group_liberties(size, board, color, seed).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const B: u8 = 1;
    const W: u8 = 2;

    fn board(size: Size, fields: &[u8]) -> Board {
        Board::from_fields(size, fields.iter().map(|&f| Field::try_from(f).unwrap())).unwrap()
    }

    #[test]
    fn test_group_wraps_across_edge() {
        let size = Size::new(3, 3).unwrap();
        // Black at (0,0) and (2,0): adjacent through the left/right wrap.
        let b = board(size, &[B, 0, 0, 0, 0, 0, B, 0, 0]);
        let g = group(size, &b, Color::Black, Pos::new(0, 0));
        assert_eq!(g, vec![Pos::new(0, 0), Pos::new(2, 0)]);
    }

    #[test]
    fn test_seed_is_not_filtered() {
        let size = Size::new(3, 3).unwrap();
        let g = group_with_filter(size, |_| false, Pos::new(-1, 4));
        assert_eq!(g, vec![Pos::new(2, 1)]);
    }

    #[test]
    fn test_group_terminates_on_one_by_one() {
        let size = Size::new(1, 1).unwrap();
        let b = board(size, &[B]);
        assert_eq!(group(size, &b, Color::Black, Pos::new(0, 0)), vec![Pos::new(0, 0)]);
        assert!(group_liberties(size, &b, Color::Black, Pos::new(0, 0)).is_empty());
    }

    #[test]
    fn test_group_terminates_on_one_by_n() {
        let size = Size::new(1, 4).unwrap();
        let b = board(size, &[B, B, B, B]);
        let g = group(size, &b, Color::Black, Pos::new(0, 2));
        assert_eq!(g.len(), 4);
        assert_eq!(liberty_count(size, &b, Color::Black, Pos::new(0, 2)), 0);
    }

    #[test]
    fn test_liberties_are_deduplicated() {
        // On a 2x1 torus both horizontal neighbors of (0,0) are (1,0).
        let size = Size::new(2, 1).unwrap();
        let b = board(size, &[W, 0]);
        let libs = group_liberties(size, &b, Color::White, Pos::new(0, 0));
        assert_eq!(libs, vec![Pos::new(1, 0)]);
    }

    #[test]
    fn test_ring_has_single_liberty() {
        let size = Size::new(3, 3).unwrap();
        let b = board(size, &[B, B, B, B, 0, B, B, B, B]);
        let g = group(size, &b, Color::Black, Pos::new(0, 0));
        assert_eq!(g.len(), 8);
        assert_eq!(
            group_liberties(size, &b, Color::Black, Pos::new(2, 2)),
            vec![Pos::new(1, 1)]
        );
    }

    #[test]
    fn test_single_stone_has_four_liberties() {
        let size = Size::new(5, 5).unwrap();
        let b = Board::empty(size).with_field(size, Pos::new(0, 0), Field::Stone(Color::White));
        assert_eq!(liberty_count(size, &b, Color::White, Pos::new(5, 5)), 4);
    }
}
