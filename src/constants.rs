//! Default rule set values and protocol limits.
//!
//! Board dimensions are chosen per game at runtime (see [`crate::game::RuleSet`]),
//! so nothing here is tied to a particular board size.

// =============================================================================
// Rule Set Defaults
// =============================================================================

/// Default board width and height when none is given.
pub const DEFAULT_SIZE: usize = 9;

/// Default komi (compensation points for White).
pub const DEFAULT_KOMI: f64 = 7.5;

/// Default number of handicap stones. Recorded only, never placed.
pub const DEFAULT_HANDICAP: u32 = 0;

/// Largest accepted board width or height.
pub const MAX_DIMENSION: usize = 1024;

/// Consecutive passes that conventionally end a game.
pub const PASSES_TO_END: u32 = 2;

/// Multiplier on the board area bounding the length of random games.
pub const MAX_GAME_LEN_FACTOR: usize = 3;

// =============================================================================
// Field Encoding
// =============================================================================

/// Wire value of an empty field.
pub const FIELD_EMPTY: u8 = 0;

/// Wire value of a Black stone.
pub const FIELD_BLACK: u8 = 1;

/// Wire value of a White stone.
pub const FIELD_WHITE: u8 = 2;

// =============================================================================
// Session Limits
// =============================================================================

/// Length of generated game ids.
pub const GAME_ID_LEN: usize = 8;

/// Longest accepted player name (after trimming).
pub const MAX_NAME_LEN: usize = 32;
