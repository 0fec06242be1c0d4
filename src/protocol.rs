//! Line-based text protocol for local play.
//!
//! Modelled on GTP version 2: each command may carry a numeric id, and every
//! response starts with `=` (success) or `?` (failure) followed by the id.
//! Vertices are written `x,y` in torus coordinates, or `pass`. Coordinates
//! outside the board wrap around.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <x> [y]` - Start a new game on an x by y torus
//! - `clear_board` - Reset to an empty board
//! - `komi <value>` - Applies now if no move was played, else from the next game
//! - `play <color> <vertex>` - Play a move; color must be the player to move
//! - `genmove <color>` - Play a random legal move
//! - `undo` - Take back the last move
//! - `showboard`, `state` (JSON), `captures`
//!
//! ## Example
//!
//! ```ignore
//! use torus_go::protocol::ProtocolEngine;
//! let mut engine = ProtocolEngine::new();
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use crate::board::Color;
use crate::game::{GameState, Move, RuleSet, init_game, try_apply_move};
use crate::playout::random_legal_move;
use crate::wire::encode_state;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "captures",
    "clear_board",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "state",
    "undo",
    "version",
];

/// Protocol engine state.
pub struct ProtocolEngine {
    /// Rule set used for the next `clear_board`
    rule_set: RuleSet,
    /// Every state of the current game; the last one is current
    history: Vec<GameState>,
    rng: fastrand::Rng,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolEngine {
    pub fn new() -> Self {
        Self::with_rules(RuleSet::default(), fastrand::Rng::new())
    }

    /// Engine with a given rule set and a seeded random source for `genmove`.
    pub fn with_rules(rule_set: RuleSet, rng: fastrand::Rng) -> Self {
        Self {
            rule_set,
            history: vec![init_game(rule_set)],
            rng,
        }
    }

    /// Current game state.
    pub fn state(&self) -> &GameState {
        // history always holds at least the initial state
        &self.history[self.history.len() - 1]
    }

    /// Run the command loop on stdin/stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_io(stdin.lock(), stdout.lock())
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run_io(&mut self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);

            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    fn parse_color(s: &str) -> Option<Color> {
        match s.to_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }

    /// Parse `pass` or `x,y`.
    fn parse_vertex(s: &str) -> Option<Move> {
        if s.eq_ignore_ascii_case("pass") {
            return Some(Move::Pass);
        }
        let (x, y) = s.split_once(',')?;
        Some(Move::Place {
            x: x.trim().parse().ok()?,
            y: y.trim().parse().ok()?,
        })
    }

    fn new_game(&mut self, rule_set: RuleSet) {
        self.rule_set = rule_set;
        self.history = vec![init_game(rule_set)];
    }

    /// Check that `color` is the player to move.
    fn check_turn(&self, arg: &str) -> Result<(), String> {
        let color = Self::parse_color(arg).ok_or_else(|| "invalid color".to_string())?;
        if color != self.state().to_move {
            return Err(format!("not {color}'s turn"));
        }
        Ok(())
    }

    fn play(&mut self, mv: Move) -> Result<(), String> {
        let next = try_apply_move(self.state(), mv).map_err(|e| e.to_string())?;
        self.history.push(next);
        Ok(())
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "torus-go".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let known = KNOWN_COMMANDS.contains(&args[0].to_lowercase().as_str());
                (true, if known { "true" } else { "false" }.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let x = args[0].parse::<usize>();
                let y = args.get(1).map_or_else(|| x.clone(), |a| a.parse::<usize>());
                match (x, y) {
                    (Ok(x), Ok(y)) => {
                        match RuleSet::new(x, y, self.rule_set.komi, self.rule_set.handicap) {
                            Ok(rules) => {
                                self.new_game(rules);
                                (true, String::new())
                            }
                            Err(e) => (false, format!("unacceptable size: {e}")),
                        }
                    }
                    _ => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => {
                self.new_game(self.rule_set);
                (true, String::new())
            }

            "komi" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                match args[0].parse::<f64>() {
                    Ok(komi) => {
                        self.rule_set.komi = komi;
                        // Before the first move the game restarts with the new
                        // komi; otherwise it applies from the next game.
                        if self.history.len() == 1 {
                            self.new_game(self.rule_set);
                        }
                        (true, String::new())
                    }
                    Err(_) => (false, "invalid komi".to_string()),
                }
            }

            "play" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                if let Err(e) = self.check_turn(args[0]) {
                    return (false, e);
                }
                let Some(mv) = Self::parse_vertex(args[1]) else {
                    return (false, "invalid vertex".to_string());
                };
                match self.play(mv) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e),
                }
            }

            "genmove" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                if let Err(e) = self.check_turn(args[0]) {
                    return (false, e);
                }
                let Some(state) = self.history.last() else {
                    return (false, "no game".to_string());
                };
                let mv = random_legal_move(state, &mut self.rng);
                match self.play(mv) {
                    Ok(()) => (true, mv.to_string()),
                    Err(e) => (false, e),
                }
            }

            "undo" => {
                if self.history.len() < 2 {
                    return (false, "cannot undo".to_string());
                }
                self.history.pop();
                (true, String::new())
            }

            "showboard" => {
                let state = self.state();
                (true, format!("\n{}", state.board.render(state.size())))
            }

            "state" => match encode_state(self.state()) {
                Ok(json) => (true, json),
                Err(e) => (false, e.to_string()),
            },

            "captures" => {
                let captured = self.state().captured;
                (
                    true,
                    format!("Black {} White {}", captured.black, captured.white),
                )
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
