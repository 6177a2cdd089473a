//! Gothello: a 5x5 capture-game engine.
//!
//! ## Usage
//!
//! - `gothello play` - exchange text moves on stdin/stdout
//! - `gothello demo` - watch an engine-vs-engine exhibition game
//!
//! Engine options (side, depth, deepening, evaluation) apply to both.

use anyhow::Result;
use clap::{Parser, Subcommand};

use gothello::board::{Board, MoveOutcome, Player};
use gothello::constants::{DEFAULT_DEPTH, DEFAULT_MAX_VISITED};
use gothello::eval::{EvalMethod, ScoringWeights};
use gothello::game::GameSession;
use gothello::search::{EngineConfig, SearchEngine};

/// Gothello: alpha-beta engine for the 5x5 Go/Othello hybrid
#[derive(Parser)]
#[command(name = "gothello")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Side the engine plays: black or white
    #[arg(long, default_value = "black")]
    side: String,

    /// Search depth for fixed-depth search
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: usize,

    /// Deepen from depth 1 under the node-visit budget
    #[arg(long)]
    iterative_deepening: bool,

    /// Node-visit budget for iterative deepening
    #[arg(long, default_value_t = DEFAULT_MAX_VISITED)]
    max_visited: u64,

    /// Evaluation method: number or eye
    #[arg(long, default_value = "number")]
    eval_method: String,

    /// Weight of the live-stone differential
    #[arg(long, default_value_t = 1)]
    stone_weight: i32,

    /// Weight of each black eye (eye method only)
    #[arg(long, default_value_t = 1)]
    black_eye_weight: i32,

    /// Weight of each white eye (eye method only)
    #[arg(long, default_value_t = 1)]
    white_eye_weight: i32,

    /// Narrow tied move candidates to the highest liberty count
    #[arg(long)]
    prefer_liberties: bool,

    /// Log search statistics after each decision
    #[arg(long)]
    stats: bool,

    /// Log every evaluated leaf board
    #[arg(long)]
    print_leaves: bool,

    /// Log candidate move lists and killer moves
    #[arg(long)]
    print_move_lists: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange text moves on stdin/stdout against an external opponent
    Play,
    /// Watch an engine-vs-engine exhibition game
    Demo,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = engine_config(&cli)?;

    match cli.command {
        Some(Commands::Play) => GameSession::new(config).run(),
        Some(Commands::Demo) | None => run_demo(config),
    }
}

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let side: Player = cli.side.parse()?;
    let eval_method: EvalMethod = cli.eval_method.parse()?;
    Ok(EngineConfig {
        side,
        depth: cli.depth,
        iterative_deepening: cli.iterative_deepening,
        max_nodes_visited: cli.max_visited,
        eval_method,
        weights: ScoringWeights {
            stone: cli.stone_weight,
            black_eye: cli.black_eye_weight,
            white_eye: cli.white_eye_weight,
        },
        prefer_higher_liberties: cli.prefer_liberties,
        print_stats: cli.stats,
        print_leaves: cli.print_leaves,
        print_move_lists: cli.print_move_lists,
        ..Default::default()
    })
}

fn run_demo(config: EngineConfig) -> Result<()> {
    let mut black_config = config.clone();
    black_config.side = Player::Black;
    let mut white_config = config;
    white_config.side = Player::White;

    let mut black = SearchEngine::new(black_config);
    let mut white = SearchEngine::new(white_config);
    let mut board = Board::new();

    println!("*** demo game ***\n{board}");
    while !board.is_over() {
        let mover = board.to_move;
        let engine = match mover {
            Player::Black => &mut black,
            Player::White => &mut white,
        };
        let mv = engine.decide(&board);
        match board.try_move(mv) {
            Ok(MoveOutcome::GameOver) => println!("{mover}: {mv}"),
            Ok(MoveOutcome::Continue(_)) => println!("{mover}: {mv}\n{board}"),
            Err(err) => anyhow::bail!("demo engine move {mv} was rejected: {err}"),
        }
    }
    println!("winner: {}", board.referee());
    Ok(())
}
