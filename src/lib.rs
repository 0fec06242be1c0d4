//! Torus-Go: Go rules on a wrap-around board.
//!
//! The heart of this crate is a pure rules engine for Go played on a torus
//! of any width and height: every edge wraps, so there are no borders,
//! corners or edge liberties. The engine validates and applies moves,
//! resolving captures, suicide and simple ko.
//!
//! ## Modules
//!
//! - [`constants`] - Rule set defaults and limits
//! - [`board`] - Board, colors, positions and torus adjacency
//! - [`group`] - Group and liberty search
//! - [`game`] - Game state, legality check and move application
//! - [`wire`] - JSON wire format and observer deltas
//! - [`session`] - In-memory game rooms with players and observers
//! - [`playout`] - Random legal moves and random games
//! - [`protocol`] - Text protocol for local play
//!
//! ## Example
//!
//! ```
//! use torus_go::game::{Move, RuleSet, apply_move, init_game, test_move};
//!
//! let state = init_game(RuleSet::new(5, 5, 7.5, 0).unwrap());
//!
//! // Coordinates wrap: (-1, 7) is (4, 2) on a 5x5 torus.
//! let mv = Move::Place { x: -1, y: 7 };
//! assert!(test_move(&state, mv));
//!
//! let next = apply_move(&state, mv);
//! assert!(!test_move(&next, Move::Place { x: 4, y: 2 }));
//! ```

pub mod board;
pub mod constants;
pub mod game;
pub mod group;
pub mod playout;
pub mod protocol;
pub mod session;
pub mod wire;

pub use crate::board::{Board, Color, ColorMap, Field, Pos, Size};
pub use crate::game::{GameState, Move, MoveError, RuleSet, apply_move, init_game, test_move};
