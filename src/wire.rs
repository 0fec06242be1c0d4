//! JSON wire format for game states, moves and per-move deltas.
//!
//! Incoming payloads are parsed into typed values here, at the boundary, so
//! malformed input never reaches the rules engine. States are checked for
//! internal consistency (board length, ko inside the board) on the way in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{BoardLengthError, Color, ColorMap, Pos, canonicalize};
use crate::game::{GameState, Move, MoveError, try_apply_move};

/// A payload that could not be turned into a typed value.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    BoardLength(#[from] BoardLengthError),
    #[error("ko position {0} is outside the board")]
    KoOutOfRange(Pos),
    #[error("invalid player name {0:?}")]
    Name(String),
    #[error("delta for {mv} does not apply: {reason}")]
    IllegalDelta { mv: Move, reason: MoveError },
    #[error("state diverged after {mv}: {field} differs")]
    Desync { mv: Move, field: &'static str },
}

/// Structured error sent back over the transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub name: String,
    pub message: String,
}

/// What observers receive after each applied move instead of the full board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDelta {
    #[serde(rename = "move")]
    pub mv: Move,
    pub to_move: Color,
    pub ko_position: Option<Pos>,
    pub captured: ColorMap<u32>,
    pub move_number: u32,
}

impl MoveDelta {
    /// Delta describing the transition to `next` by `mv`.
    pub fn new(mv: Move, next: &GameState, move_number: u32) -> Self {
        MoveDelta {
            mv,
            to_move: next.to_move,
            ko_position: next.ko_position,
            captured: next.captured,
            move_number,
        }
    }

    /// Rebuild the authoritative next state from an observer's copy of the
    /// previous one, checking that it agrees with the delta.
    pub fn replay(&self, prev: &GameState) -> Result<GameState, PayloadError> {
        let next = try_apply_move(prev, self.mv).map_err(|reason| PayloadError::IllegalDelta {
            mv: self.mv,
            reason,
        })?;
        let desync = |field| PayloadError::Desync { mv: self.mv, field };
        if next.to_move != self.to_move {
            return Err(desync("toMove"));
        }
        if next.ko_position != self.ko_position {
            return Err(desync("koPosition"));
        }
        if next.captured != self.captured {
            return Err(desync("captured"));
        }
        Ok(next)
    }
}

pub fn parse_move(payload: &str) -> Result<Move, PayloadError> {
    Ok(serde_json::from_str(payload)?)
}

pub fn move_from_value(value: serde_json::Value) -> Result<Move, PayloadError> {
    Ok(serde_json::from_value(value)?)
}

/// Parse a full game state and check that its parts fit together.
pub fn parse_state(payload: &str) -> Result<GameState, PayloadError> {
    let state: GameState = serde_json::from_str(payload)?;
    validate_state(&state)?;
    Ok(state)
}

/// Check the invariants serde cannot express.
pub fn validate_state(state: &GameState) -> Result<(), PayloadError> {
    let size = state.size();
    if state.board.len() != size.area() {
        return Err(BoardLengthError {
            expected: size.area(),
            actual: state.board.len(),
        }
        .into());
    }
    match state.ko_position {
        Some(ko) if canonicalize(size, ko) != ko => Err(PayloadError::KoOutOfRange(ko)),
        _ => Ok(()),
    }
}

pub fn encode_move(mv: Move) -> Result<String, PayloadError> {
    Ok(serde_json::to_string(&mv)?)
}

pub fn encode_state(state: &GameState) -> Result<String, PayloadError> {
    Ok(serde_json::to_string(state)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{RuleSet, apply_move, init_game};

    #[test]
    fn test_move_shapes() {
        assert_eq!(encode_move(Move::Pass).unwrap(), r#"{"type":"Pass"}"#);
        assert_eq!(
            encode_move(Move::Place { x: -1, y: 4 }).unwrap(),
            r#"{"type":"Move","x":-1,"y":4}"#
        );
        assert_eq!(
            parse_move(r#"{"type":"Move","x":2,"y":3}"#).unwrap(),
            Move::Place { x: 2, y: 3 }
        );
    }

    #[test]
    fn test_rejects_malformed_moves() {
        for bad in [
            r#"{"type":"Move","x":2}"#,
            r#"{"type":"Jump"}"#,
            r#"{"type":"Move","x":1.5,"y":0}"#,
            r#"{"type":"Move","x":99999999999,"y":0}"#,
            r#"[1,2]"#,
        ] {
            assert!(
                matches!(parse_move(bad), Err(PayloadError::Json(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_state_shape() {
        let state = init_game(RuleSet::new(2, 1, 6.5, 0).unwrap());
        let state = apply_move(&state, Move::Place { x: 1, y: 0 });
        let json: serde_json::Value = serde_json::from_str(&encode_state(&state).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ruleSet": {"size": {"x": 2, "y": 1}, "komi": 6.5, "handicap": 0},
                "toMove": "White",
                "board": [0, 1],
                "koPosition": null,
                "numPasses": 0,
                "captured": {"Black": 0, "White": 0},
            })
        );
    }

    #[test]
    fn test_parse_state_checks_board_length() {
        let payload = r#"{
            "ruleSet": {"size": {"x": 2, "y": 2}, "komi": 0.5, "handicap": 0},
            "toMove": "Black",
            "board": [0, 0, 0],
            "koPosition": null,
            "numPasses": 0,
            "captured": {"Black": 0, "White": 0}
        }"#;
        assert!(matches!(
            parse_state(payload),
            Err(PayloadError::BoardLength(BoardLengthError {
                expected: 4,
                actual: 3
            }))
        ));
    }

    #[test]
    fn test_parse_state_checks_size_and_fields() {
        let zero = r#"{
            "ruleSet": {"size": {"x": 0, "y": 2}, "komi": 0.5, "handicap": 0},
            "toMove": "Black", "board": [], "koPosition": null,
            "numPasses": 0, "captured": {"Black": 0, "White": 0}
        }"#;
        assert!(matches!(parse_state(zero), Err(PayloadError::Json(_))));

        let bad_field = r#"{
            "ruleSet": {"size": {"x": 1, "y": 1}, "komi": 0.5, "handicap": 0},
            "toMove": "Black", "board": [3], "koPosition": null,
            "numPasses": 0, "captured": {"Black": 0, "White": 0}
        }"#;
        assert!(matches!(parse_state(bad_field), Err(PayloadError::Json(_))));
    }

    #[test]
    fn test_parse_state_checks_ko() {
        let payload = r#"{
            "ruleSet": {"size": {"x": 2, "y": 2}, "komi": 0.5, "handicap": 0},
            "toMove": "Black", "board": [0, 0, 0, 0], "koPosition": {"x": 2, "y": 0},
            "numPasses": 0, "captured": {"Black": 0, "White": 0}
        }"#;
        assert!(matches!(
            parse_state(payload),
            Err(PayloadError::KoOutOfRange(Pos { x: 2, y: 0 }))
        ));
    }

    #[test]
    fn test_state_survives_the_wire() {
        let mut state = init_game(RuleSet::new(4, 3, 7.5, 2).unwrap());
        for mv in [
            Move::Place { x: 0, y: 0 },
            Move::Place { x: 3, y: 2 },
            Move::Pass,
        ] {
            state = apply_move(&state, mv);
        }
        let back = parse_state(&encode_state(&state).unwrap()).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_delta_replay() {
        let prev = init_game(RuleSet::new(3, 3, 0.5, 0).unwrap());
        let mv = Move::Place { x: 1, y: 1 };
        let next = apply_move(&prev, mv);
        let delta = MoveDelta::new(mv, &next, 1);
        assert_eq!(delta.replay(&prev).unwrap(), next);

        let mut wrong = delta;
        wrong.captured.black = 3;
        assert!(matches!(
            wrong.replay(&prev),
            Err(PayloadError::Desync {
                field: "captured",
                ..
            })
        ));

        let occupied = MoveDelta::new(mv, &next, 2);
        assert!(matches!(
            occupied.replay(&next),
            Err(PayloadError::IllegalDelta {
                reason: MoveError::Occupied,
                ..
            })
        ));
    }
}
