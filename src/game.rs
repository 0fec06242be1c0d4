//! Go rules on a torus: legality check and move application.
//!
//! This module is the whole rules engine. It is pure: [`test_move`] only
//! reads a state, and [`apply_move`] returns a fresh [`GameState`] without
//! touching its input, so old states can be kept for undo or replay and
//! shared between observers.
//!
//! Legality is decided in a fixed order (occupied, ko, capture, friendly
//! liberties, empty neighbors). A placement that captures is legal even if
//! it would otherwise look like suicide. Ko is the simple single-stone
//! recapture rule; longer repetition cycles are not detected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{
    Board, Color, ColorMap, Field, Pos, Size, SizeError, canonicalize, neighbors, neighbors_where,
};
use crate::constants::{DEFAULT_HANDICAP, DEFAULT_KOMI, PASSES_TO_END};
use crate::group::{group, liberty_count};

/// Why a placement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// Point is not empty
    Occupied,
    /// Move retakes a ko
    Ko,
    /// Move would leave its own group without liberties and captures nothing
    Suicide,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::Occupied => write!(f, "illegal move: point not empty"),
            MoveError::Ko => write!(f, "illegal move: retakes ko"),
            MoveError::Suicide => write!(f, "illegal move: suicide"),
        }
    }
}

impl std::error::Error for MoveError {}

/// Per-game configuration, fixed when the game is created.
///
/// Komi and handicap are carried along for collaborators; the engine does
/// not score games or place handicap stones.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub size: Size,
    pub komi: f64,
    pub handicap: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet {
            size: Size::default(),
            komi: DEFAULT_KOMI,
            handicap: DEFAULT_HANDICAP,
        }
    }
}

impl RuleSet {
    pub fn new(x: usize, y: usize, komi: f64, handicap: u32) -> Result<Self, SizeError> {
        Ok(RuleSet {
            size: Size::new(x, y)?,
            komi,
            handicap,
        })
    }
}

/// A move: pass, or place a stone for the player to move.
///
/// Placement coordinates need not be canonical. On the wire this is
/// `{"type":"Pass"}` or `{"type":"Move","x":..,"y":..}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Move {
    Pass,
    #[serde(rename = "Move")]
    Place { x: i32, y: i32 },
}

impl Move {
    pub fn place(pos: Pos) -> Self {
        Move::Place { x: pos.x, y: pos.y }
    }

    pub fn is_pass(self) -> bool {
        self == Move::Pass
    }

    /// Target position of a placement.
    pub fn pos(self) -> Option<Pos> {
        match self {
            Move::Pass => None,
            Move::Place { x, y } => Some(Pos::new(x, y)),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Pass => write!(f, "pass"),
            Move::Place { x, y } => write!(f, "{x},{y}"),
        }
    }
}

/// Complete state of one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub rule_set: RuleSet,
    pub to_move: Color,
    pub board: Board,
    /// Position the player to move may not play on this turn.
    pub ko_position: Option<Pos>,
    /// Consecutive passes so far; reset by any placement.
    pub num_passes: u32,
    /// Opposing stones removed by each color.
    pub captured: ColorMap<u32>,
}

impl GameState {
    pub fn size(&self) -> Size {
        self.rule_set.size
    }

    /// Two consecutive passes conventionally end the game.
    pub fn is_over(&self) -> bool {
        self.num_passes >= PASSES_TO_END
    }

    /// Every legal placement in board index order, followed by `Pass`.
    pub fn legal_moves(&self) -> Vec<Move> {
        let size = self.size();
        let mut moves: Vec<Move> = size
            .positions()
            .filter(|&p| test_position(size, &self.board, self.ko_position, self.to_move, p))
            .map(Move::place)
            .collect();
        moves.push(Move::Pass);
        moves
    }
}

/// Empty board, Black to move, no captures, no ko.
pub fn init_game(rule_set: RuleSet) -> GameState {
    log::debug!("new game {} komi {}", rule_set.size, rule_set.komi);
    GameState {
        board: Board::empty(rule_set.size),
        rule_set,
        to_move: Color::Black,
        ko_position: None,
        num_passes: 0,
        captured: ColorMap::default(),
    }
}

/// Decide whether `to_move` may place a stone at `pos`, and if not, why.
///
/// Rules are checked in precedence order:
/// 1. the point must be empty;
/// 2. it must not be the ko point;
/// 3. if any adjacent enemy group has exactly one liberty, the move captures
///    and is legal;
/// 4. otherwise, if there are adjacent friendly groups, at least one of them
///    must have more than one liberty;
/// 5. otherwise the point needs at least one empty neighbor.
pub fn check_position(
    size: Size,
    board: &Board,
    ko_position: Option<Pos>,
    to_move: Color,
    pos: Pos,
) -> Result<(), MoveError> {
    let pos = canonicalize(size, pos);

    if !board.get(size, pos).is_empty() {
        log::trace!("{pos}: not empty");
        return Err(MoveError::Occupied);
    }

    if ko_position.is_some_and(|ko| canonicalize(size, ko) == pos) {
        log::trace!("{pos}: ko");
        return Err(MoveError::Ko);
    }

    let enemy = Field::Stone(to_move.opposite());
    let enemies = neighbors_where(size, pos, |n| board.get(size, n) == enemy);
    if enemies
        .iter()
        .any(|&n| liberty_count(size, board, to_move.opposite(), n) == 1)
    {
        log::trace!("{pos}: captures");
        return Ok(());
    }

    let friend = Field::Stone(to_move);
    let friends = neighbors_where(size, pos, |n| board.get(size, n) == friend);
    if !friends.is_empty() {
        if friends
            .iter()
            .any(|&n| liberty_count(size, board, to_move, n) > 1)
        {
            log::trace!("{pos}: joins a group with liberties");
            return Ok(());
        }
        log::trace!("{pos}: would kill friendly group");
        return Err(MoveError::Suicide);
    }

    if neighbors(size, pos)
        .into_iter()
        .any(|n| board.get(size, n).is_empty())
    {
        log::trace!("{pos}: has space");
        Ok(())
    } else {
        log::trace!("{pos}: no space");
        Err(MoveError::Suicide)
    }
}

/// Legality predicate over the raw pieces of a state. See [`check_position`].
pub fn test_position(
    size: Size,
    board: &Board,
    ko_position: Option<Pos>,
    to_move: Color,
    pos: Pos,
) -> bool {
    check_position(size, board, ko_position, to_move, pos).is_ok()
}

/// Whether `mv` is legal in `state`. Passing is always legal.
pub fn test_move(state: &GameState, mv: Move) -> bool {
    check_move(state, mv).is_ok()
}

/// Like [`test_move`], reporting the rule that rejected the move.
pub fn check_move(state: &GameState, mv: Move) -> Result<(), MoveError> {
    match mv.pos() {
        None => Ok(()),
        Some(pos) => check_position(
            state.size(),
            &state.board,
            state.ko_position,
            state.to_move,
            pos,
        ),
    }
}

/// Apply a legal move and return the next state.
///
/// # Panics
///
/// Panics if `mv` is an illegal placement. Callers must gate this on
/// [`test_move`]; use [`try_apply_move`] to check and apply in one step.
pub fn apply_move(state: &GameState, mv: Move) -> GameState {
    match try_apply_move(state, mv) {
        Ok(next) => next,
        Err(e) => panic!("apply_move called with {mv} for {}: {e}", state.to_move),
    }
}

/// Apply `mv` if it is legal, otherwise return why it is not.
pub fn try_apply_move(state: &GameState, mv: Move) -> Result<GameState, MoveError> {
    let Some(target) = mv.pos() else {
        return Ok(GameState {
            to_move: state.to_move.opposite(),
            num_passes: state.num_passes + 1,
            ko_position: None,
            ..state.clone()
        });
    };

    check_move(state, mv)?;

    let size = state.size();
    let target = canonicalize(size, target);
    let color = state.to_move;
    let enemy = color.opposite();
    let board = &state.board;

    // Enemy neighbors, one entry per direction (repeats on tiny boards).
    let enemy_field = Field::Stone(enemy);
    let enemies = neighbors_where(size, target, |n| board.get(size, n) == enemy_field);

    // Enemy neighbors whose group dies (their only liberty is `target`),
    // still one entry per direction.
    let dying: Vec<Pos> = enemies
        .iter()
        .copied()
        .filter(|&n| liberty_count(size, board, enemy, n) == 1)
        .collect();

    let mut captured: Vec<Pos> = Vec::new();
    for &n in &dying {
        if captured.contains(&n) {
            continue;
        }
        for m in group(size, board, enemy, n) {
            if !captured.contains(&m) {
                captured.push(m);
            }
        }
    }

    // Ko: a single stone taken from one direction by a stone that is itself
    // surrounded by enemies on all four sides.
    let ko_position = match dying.as_slice() {
        &[n] if captured.len() == 1 && enemies.len() == 4 => Some(n),
        _ => None,
    };

    let board = board
        .with_fields(size, &captured, Field::Empty)
        .with_field(size, target, Field::Stone(color));

    let mut counts = state.captured;
    counts[color] += captured.len() as u32;

    log::debug!(
        "{color} plays {target}, captures {}, ko {:?}",
        captured.len(),
        ko_position
    );

    Ok(GameState {
        rule_set: state.rule_set,
        to_move: enemy,
        board,
        ko_position,
        num_passes: 0,
        captured: counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const B: u8 = 1;
    const W: u8 = 2;

    fn board(size: Size, fields: &[u8]) -> Board {
        Board::from_fields(size, fields.iter().map(|&f| Field::try_from(f).unwrap())).unwrap()
    }

    fn flipped(size: Size, fields: &[u8]) -> Board {
        let swapped: Vec<u8> = fields
            .iter()
            .map(|&f| match f {
                B => W,
                W => B,
                other => other,
            })
            .collect();
        board(size, &swapped)
    }

    /// Check a position for `color`, and for the other color on the
    /// color-swapped board; both must agree.
    fn expect(
        size: Size,
        fields: &[u8],
        ko: Option<Pos>,
        color: Color,
        pos: Pos,
        legal: bool,
    ) {
        assert_eq!(
            test_position(size, &board(size, fields), ko, color, pos),
            legal,
            "{color} at {pos}"
        );
        assert_eq!(
            test_position(size, &flipped(size, fields), ko, color.opposite(), pos),
            legal,
            "{} at {pos} on flipped board",
            color.opposite()
        );
    }

    #[test]
    fn test_empty_board() {
        let size = Size::new(3, 3).unwrap();
        let fields = [0; 9];
        for p in size.positions() {
            expect(size, &fields, None, Color::White, p, true);
            expect(size, &fields, None, Color::Black, p, true);
        }
    }

    #[test]
    fn test_occupied() {
        let size = Size::new(3, 3).unwrap();
        let fields = [0, 0, 0, 0, B, 0, 0, 0, 0];
        expect(size, &fields, None, Color::White, Pos::new(1, 1), false);
        expect(size, &fields, None, Color::Black, Pos::new(1, 1), false);
        assert_eq!(
            check_position(size, &board(size, &fields), None, Color::White, Pos::new(4, -2)),
            Err(MoveError::Occupied)
        );
    }

    #[test]
    fn test_no_self_kill() {
        let size = Size::new(3, 3).unwrap();
        let fields = [B, B, B, B, 0, B, B, B, B];
        // White captures the whole ring
        expect(size, &fields, None, Color::White, Pos::new(1, 1), true);
        // Black would fill its own last liberty
        expect(size, &fields, None, Color::Black, Pos::new(1, 1), false);
    }

    #[test]
    fn test_no_space() {
        let size = Size::new(4, 3).unwrap();
        let fields = [0, 0, 0, B, B, B, B, 0, B, B, B, B];
        expect(size, &fields, None, Color::White, Pos::new(2, 1), false);
        expect(size, &fields, None, Color::Black, Pos::new(2, 1), true);
        assert_eq!(
            check_position(size, &board(size, &fields), None, Color::White, Pos::new(2, 1)),
            Err(MoveError::Suicide)
        );
    }

    #[test]
    fn test_ko_inactive() {
        let size = Size::new(3, 4).unwrap();
        let fields = [0, B, W, 0, B, W, 0, W, 0, B, W, 0];
        expect(size, &fields, None, Color::Black, Pos::new(0, 0), true);
        expect(size, &fields, None, Color::Black, Pos::new(1, 2), true);
        expect(size, &fields, None, Color::White, Pos::new(1, 2), true);
    }

    #[test]
    fn test_ko_active() {
        let size = Size::new(3, 4).unwrap();
        let fields = [0, B, W, 0, B, W, 0, W, 0, B, W, 0];
        let ko = Some(Pos::new(1, 2));
        expect(size, &fields, ko, Color::Black, Pos::new(1, 2), false);
        expect(size, &fields, ko, Color::Black, Pos::new(4, -2), false);
        assert_eq!(
            check_position(size, &board(size, &fields), ko, Color::Black, Pos::new(1, 2)),
            Err(MoveError::Ko)
        );
    }

    #[test]
    fn test_pass() {
        let state = init_game(RuleSet::default());
        let next = apply_move(&state, Move::Pass);
        assert_eq!(next.to_move, Color::White);
        assert_eq!(next.num_passes, 1);
        assert_eq!(next.board, state.board);
        let next = apply_move(&next, Move::Pass);
        assert!(next.is_over());
    }

    #[test]
    fn test_placement_resets_passes() {
        let state = apply_move(&init_game(RuleSet::default()), Move::Pass);
        let next = apply_move(&state, Move::Place { x: 3, y: 3 });
        assert_eq!(next.num_passes, 0);
        assert_eq!(next.to_move, Color::Black);
        assert_eq!(
            next.board.get(next.size(), Pos::new(3, 3)),
            Field::Stone(Color::White)
        );
    }

    #[test]
    fn test_capture_ring() {
        let size = Size::new(3, 3).unwrap();
        let state = GameState {
            board: board(size, &[B, B, B, B, 0, B, B, B, B]),
            to_move: Color::White,
            ..init_game(RuleSet::new(3, 3, 0.5, 0).unwrap())
        };
        let next = apply_move(&state, Move::Place { x: 1, y: 1 });
        assert_eq!(next.captured[Color::White], 8);
        assert_eq!(next.captured[Color::Black], 0);
        assert_eq!(next.board.count(Field::Empty), 8);
        assert_eq!(next.ko_position, None);
    }

    #[test]
    fn test_ko_is_set_and_cleared() {
        let size = Size::new(3, 4).unwrap();
        let state = GameState {
            board: board(size, &[0, B, W, 0, B, W, 0, W, 0, B, W, 0]),
            ..init_game(RuleSet::new(3, 4, 0.5, 0).unwrap())
        };
        let next = apply_move(&state, Move::Place { x: 1, y: 2 });
        assert_eq!(next.ko_position, Some(Pos::new(1, 1)));
        assert_eq!(next.captured[Color::Black], 1);
        assert_eq!(
            check_move(&next, Move::Place { x: 1, y: 1 }),
            Err(MoveError::Ko)
        );

        let after = apply_move(&next, Move::Pass);
        assert_eq!(after.ko_position, None);
    }

    #[test]
    #[should_panic(expected = "illegal move")]
    fn test_apply_illegal_panics() {
        let size = Size::new(3, 3).unwrap();
        let state = GameState {
            board: board(size, &[B, B, B, B, 0, B, B, B, B]),
            ..init_game(RuleSet::new(3, 3, 0.5, 0).unwrap())
        };
        apply_move(&state, Move::Place { x: 1, y: 1 });
    }

    #[test]
    fn test_try_apply_reports_reason() {
        let state = init_game(RuleSet::default());
        let next = apply_move(&state, Move::Place { x: 0, y: 0 });
        assert_eq!(
            try_apply_move(&next, Move::Place { x: 9, y: 9 }),
            Err(MoveError::Occupied)
        );
    }

    #[test]
    fn test_legal_moves_ends_with_pass() {
        let size = Size::new(3, 3).unwrap();
        let state = GameState {
            board: board(size, &[B, B, B, B, 0, B, B, B, B]),
            ..init_game(RuleSet::new(3, 3, 0.5, 0).unwrap())
        };
        assert_eq!(state.legal_moves(), vec![Move::Pass]);
    }
}
