//! In-memory game rooms: players, observers and turn ownership.
//!
//! A [`GameRoom`] is the single owner of one game's [`GameState`]. Every move
//! goes through [`GameRoom::submit_move`], which checks that the game is
//! running and that the submitting player holds the color to move before the
//! rules engine is consulted. Observers subscribe for a channel and receive a
//! [`GameEvent`] after each change; dropped receivers are pruned on the next
//! broadcast.
//!
//! Rooms are independent values, so an error in one game never touches
//! another.

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Color, ColorMap};
use crate::constants::{GAME_ID_LEN, MAX_NAME_LEN};
use crate::game::{GameState, Move, MoveError, RuleSet, init_game, try_apply_move};
use crate::wire::{ErrorPayload, MoveDelta, PayloadError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: PlayerId, name: &str) -> Result<Self, PayloadError> {
        Ok(Player {
            id,
            name: check_name(name)?,
        })
    }
}

/// Trim a display name and check it: 1 to 32 characters, word characters
/// and whitespace only.
pub fn check_name(name: &str) -> Result<String, PayloadError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    let allowed = trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c.is_whitespace());
    if len == 0 || len > MAX_NAME_LEN || !allowed {
        return Err(PayloadError::Name(name.to_string()));
    }
    Ok(trimmed.to_string())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Waiting,
    Running,
    Canceled,
    WhiteVictory,
    BlackVictory,
}

/// Public view of a seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
}

/// Notification pushed to every observer of a room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum GameEvent {
    Move(MoveDelta),
    PlayerUpdate(ColorMap<Option<PlayerInfo>>),
    PhaseUpdate(GamePhase),
}

/// Everything a newly arriving observer needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    pub raw_game: GameState,
    pub phase: GamePhase,
    pub move_number: u32,
    pub players: ColorMap<Option<PlayerInfo>>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("{0}")]
    State(&'static str),
    #[error("game {0} not found")]
    GameNotFound(String),
    #[error("{mv}: {reason}")]
    Move { mv: Move, reason: MoveError },
}

impl SessionError {
    /// Error kind as reported to clients.
    pub fn name(&self) -> &'static str {
        match self {
            SessionError::Payload(_) => "PayloadError",
            SessionError::State(_) => "StateError",
            SessionError::GameNotFound(_) => "GameNotFoundError",
            SessionError::Move { .. } => "MoveError",
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            name: self.name().to_string(),
            message: self.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct GameRoom {
    id: String,
    state: GameState,
    phase: GamePhase,
    move_number: u32,
    players: ColorMap<Option<Player>>,
    observers: Vec<Sender<GameEvent>>,
}

impl GameRoom {
    pub fn new(id: impl Into<String>, rule_set: RuleSet) -> Self {
        let id = id.into();
        log::debug!("[{id}] initialized with {rule_set:?}");
        GameRoom {
            id,
            state: init_game(rule_set),
            phase: GamePhase::Running,
            move_number: 0,
            players: ColorMap::default(),
            observers: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Register an observer. Events arrive in the order they happen.
    pub fn subscribe(&mut self) -> Receiver<GameEvent> {
        let (tx, rx) = mpsc::channel();
        self.observers.push(tx);
        rx
    }

    /// Color held by `player`, if seated.
    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        [Color::Black, Color::White]
            .into_iter()
            .find(|&c| self.players[c].as_ref().is_some_and(|p| p.id == player))
    }

    pub fn player_info(&self) -> ColorMap<Option<PlayerInfo>> {
        let info = |slot: &Option<Player>| {
            slot.as_ref().map(|p| PlayerInfo {
                name: p.name.clone(),
            })
        };
        ColorMap {
            black: info(&self.players.black),
            white: info(&self.players.white),
        }
    }

    pub fn snapshot(&self) -> RoomState {
        RoomState {
            raw_game: self.state.clone(),
            phase: self.phase,
            move_number: self.move_number,
            players: self.player_info(),
        }
    }

    /// Seat `player` as `color`. A player already seated as the other color
    /// gives that seat up.
    pub fn join(&mut self, player: Player, color: Color) -> Result<(), SessionError> {
        if self.players[color]
            .as_ref()
            .is_some_and(|p| p.id != player.id)
        {
            return Err(SessionError::State("role occupied by another player"));
        }
        if let Some(old) = self.color_of(player.id) {
            self.players[old] = None;
        }
        log::debug!("[{}] {} joins as {color}", self.id, player.id);
        self.players[color] = Some(player);
        self.broadcast(GameEvent::PlayerUpdate(self.player_info()));
        Ok(())
    }

    /// Release whatever seat `player` holds. Returns the freed color.
    pub fn leave(&mut self, player: PlayerId) -> Option<Color> {
        let color = self.color_of(player)?;
        self.players[color] = None;
        log::debug!("[{}] {player} leaves {color}", self.id);
        self.broadcast(GameEvent::PlayerUpdate(self.player_info()));
        Some(color)
    }

    pub fn rename(&mut self, player: PlayerId, name: &str) -> Result<(), SessionError> {
        let name = check_name(name)?;
        let color = self
            .color_of(player)
            .ok_or(SessionError::State("not playing"))?;
        if let Some(p) = self.players[color].as_mut() {
            p.name = name;
        }
        self.broadcast(GameEvent::PlayerUpdate(self.player_info()));
        Ok(())
    }

    /// Validate and apply a move from `player`, then notify observers.
    pub fn submit_move(&mut self, player: PlayerId, mv: Move) -> Result<MoveDelta, SessionError> {
        if self.phase != GamePhase::Running {
            return Err(SessionError::State("game is not running"));
        }
        let color = self
            .color_of(player)
            .ok_or(SessionError::State("not playing"))?;
        if color != self.state.to_move {
            return Err(SessionError::State("not your turn"));
        }
        self.state =
            try_apply_move(&self.state, mv).map_err(|reason| SessionError::Move { mv, reason })?;
        self.move_number += 1;
        let delta = MoveDelta::new(mv, &self.state, self.move_number);
        log::debug!("[{}] {color} plays {mv} (move {})", self.id, self.move_number);
        self.broadcast(GameEvent::Move(delta));
        Ok(delta)
    }

    /// `player` gives up; the other color wins.
    pub fn resign(&mut self, player: PlayerId) -> Result<GamePhase, SessionError> {
        if self.phase != GamePhase::Running {
            return Err(SessionError::State("game is not running"));
        }
        let color = self
            .color_of(player)
            .ok_or(SessionError::State("not playing"))?;
        self.phase = match color {
            Color::Black => GamePhase::WhiteVictory,
            Color::White => GamePhase::BlackVictory,
        };
        log::info!("[{}] finished with {color} resignation", self.id);
        self.broadcast(GameEvent::PhaseUpdate(self.phase));
        Ok(self.phase)
    }

    fn broadcast(&mut self, event: GameEvent) {
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Table of running rooms keyed by generated id.
pub struct GameServer {
    rooms: HashMap<String, GameRoom>,
    rng: fastrand::Rng,
}

impl Default for GameServer {
    fn default() -> Self {
        Self::new()
    }
}

impl GameServer {
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }

    /// Server with reproducible game ids.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }

    fn with_rng(rng: fastrand::Rng) -> Self {
        GameServer {
            rooms: HashMap::new(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn create_game(&mut self, rule_set: RuleSet) -> String {
        let mut id = self.generate_id();
        while self.rooms.contains_key(&id) {
            id = self.generate_id();
        }
        log::info!("created game {id} on {} board", rule_set.size);
        self.rooms.insert(id.clone(), GameRoom::new(id.clone(), rule_set));
        id
    }

    /// Create a game from a JSON rule set payload.
    pub fn create_game_from_payload(&mut self, payload: &str) -> Result<String, SessionError> {
        let rule_set: RuleSet = serde_json::from_str(payload).map_err(PayloadError::from)?;
        Ok(self.create_game(rule_set))
    }

    pub fn game(&self, id: &str) -> Result<&GameRoom, SessionError> {
        self.rooms
            .get(id)
            .ok_or_else(|| SessionError::GameNotFound(id.to_string()))
    }

    pub fn game_mut(&mut self, id: &str) -> Result<&mut GameRoom, SessionError> {
        self.rooms
            .get_mut(id)
            .ok_or_else(|| SessionError::GameNotFound(id.to_string()))
    }

    pub fn remove_game(&mut self, id: &str) -> Option<GameRoom> {
        self.rooms.remove(id)
    }

    fn generate_id(&mut self) -> String {
        (0..GAME_ID_LEN).map(|_| self.rng.alphanumeric()).collect()
    }
}
