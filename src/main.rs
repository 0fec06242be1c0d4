//! Torus-Go: Go on a wrap-around board.
//!
//! ## Usage
//!
//! - `torus-go` - Show a demo
//! - `torus-go protocol` - Start the text protocol on stdin/stdout
//! - `torus-go demo` - Run the demo
//! - `torus-go selfplay` - Play a random game and print it
//!
//! Set `RUST_LOG=debug` (or `trace`) to see engine decisions.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use torus_go::constants::{DEFAULT_KOMI, DEFAULT_SIZE};
use torus_go::game::{Move, RuleSet, apply_move, init_game, test_move};
use torus_go::playout::{max_game_len, random_game};
use torus_go::protocol::ProtocolEngine;
use torus_go::wire::encode_state;

/// Torus-Go: Go rules on a toroidal board
#[derive(Parser)]
#[command(name = "torus-go")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the line-based text protocol for local play
    Protocol(BoardArgs),
    /// Run a short scripted demo
    Demo,
    /// Play a random game and print the final position
    Selfplay {
        #[command(flatten)]
        board: BoardArgs,
        /// Seed for the random players
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Maximum number of moves (default: three times the board area)
        #[arg(long)]
        moves: Option<usize>,
        /// Print the final state as JSON instead of a diagram
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct BoardArgs {
    /// Board width
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    width: usize,
    /// Board height
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    height: usize,
    /// Komi for White
    #[arg(long, default_value_t = DEFAULT_KOMI)]
    komi: f64,
}

impl BoardArgs {
    fn rule_set(&self) -> Result<RuleSet> {
        RuleSet::new(self.width, self.height, self.komi, 0).context("invalid board size")
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Protocol(board)) => {
            let mut engine = ProtocolEngine::with_rules(board.rule_set()?, fastrand::Rng::new());
            engine.run().context("protocol I/O failed")?;
        }
        Some(Commands::Selfplay {
            board,
            seed,
            moves,
            json,
        }) => run_selfplay(board.rule_set()?, seed, moves, json)?,
        Some(Commands::Demo) | None => run_demo()?,
    }
    Ok(())
}

fn run_selfplay(rule_set: RuleSet, seed: u64, moves: Option<usize>, json: bool) -> Result<()> {
    let max_moves = moves.unwrap_or_else(|| max_game_len(rule_set.size));
    let history = random_game(rule_set, max_moves, seed);
    let Some(last) = history.last() else {
        return Ok(());
    };

    if json {
        println!("{}", encode_state(last)?);
        return Ok(());
    }
    println!("{} moves on a {} torus\n", history.len() - 1, rule_set.size);
    print!("{}", last.board.render(last.size()));
    println!(
        "\nCaptured: Black {}, White {}",
        last.captured.black, last.captured.white
    );
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Torus-Go: Go on a wrap-around board\n");

    // Black surrounds a White stone across the board edge.
    let rules = RuleSet::new(5, 5, DEFAULT_KOMI, 0)?;
    let moves = [
        Move::Place { x: 4, y: 0 },
        Move::Place { x: 0, y: 0 },
        Move::Place { x: 1, y: 0 },
        Move::Pass,
        Move::Place { x: 0, y: 4 },
        Move::Pass,
        Move::Place { x: 0, y: 1 },
    ];

    let mut state = init_game(rules);
    for mv in moves {
        anyhow::ensure!(test_move(&state, mv), "demo move {mv} is illegal");
        println!("{} plays {mv}", state.to_move);
        state = apply_move(&state, mv);
    }

    println!("\n{}", state.board.render(state.size()));
    println!(
        "White's stone at (0,0) was surrounded across both edges; Black captured {}.",
        state.captured.black
    );
    Ok(())
}
