//! Random play: legal move sampling and whole random games.
//!
//! Used by the `genmove` protocol command, the `selfplay` CLI subcommand,
//! and by randomized tests that push the rules engine through long games.
//! Random players never fill their own eyes, otherwise games would not end.

use crate::board::{Board, Color, Pos, Size, neighbors};
use crate::constants::MAX_GAME_LEN_FACTOR;
use crate::game::{GameState, Move, RuleSet, apply_move, init_game, test_move};

/// Color surrounding `pos` on all four sides, if any.
///
/// May return a color for false eyes; good enough to stop random players
/// from filling their own territory.
pub fn is_eyeish(size: Size, board: &Board, pos: Pos) -> Option<Color> {
    let mut eyecolor = None;
    for n in neighbors(size, pos) {
        let c = board.get(size, n).color()?;
        match eyecolor {
            None => eyecolor = Some(c),
            Some(e) if e != c => return None,
            Some(_) => {}
        }
    }
    eyecolor
}

/// Pick a random legal placement for the player to move that does not fill
/// one of their own eyes. Falls back to `Pass`.
pub fn random_legal_move(state: &GameState, rng: &mut fastrand::Rng) -> Move {
    let size = state.size();
    let mut candidates: Vec<Pos> = size
        .positions()
        .filter(|&p| state.board.get(size, p).is_empty())
        .filter(|&p| is_eyeish(size, &state.board, p) != Some(state.to_move))
        .collect();
    rng.shuffle(&mut candidates);

    candidates
        .into_iter()
        .map(Move::place)
        .find(|&mv| test_move(state, mv))
        .unwrap_or(Move::Pass)
}

/// Upper bound on random game length for a board.
pub fn max_game_len(size: Size) -> usize {
    size.area() * MAX_GAME_LEN_FACTOR
}

/// Play a random game from the initial state.
///
/// Returns every state from the initial one to the last, stopping after two
/// consecutive passes or `max_moves` moves.
pub fn random_game(rule_set: RuleSet, max_moves: usize, seed: u64) -> Vec<GameState> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut history = vec![init_game(rule_set)];

    while let Some(state) = history.last() {
        if state.is_over() || history.len() > max_moves {
            break;
        }
        let mv = random_legal_move(state, &mut rng);
        let next = apply_move(state, mv);
        history.push(next);
    }
    log::debug!("random game of {} moves", history.len() - 1);
    history
}
