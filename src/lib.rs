//! Gothello: an engine for a 5x5 Go/Othello hybrid.
//!
//! Legality follows Go (liberties, no suicide), capture follows Othello:
//! a surrounded group is flipped to the capturing color, never removed.
//! Moves are chosen by depth-limited alpha-beta search with a per-round
//! transposition table, killer-move ordering, and optional iterative
//! deepening under a node-visit budget.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry and engine parameters
//! - [`board`] - Game state, legality, capture resolution, scoring
//! - [`eval`] - Positional evaluation with configurable weights
//! - [`zobrist`] - Random key table for incremental position hashing
//! - [`search`] - Alpha-beta engine with transposition table and killers
//! - [`game`] - Text-move session against an external opponent
//!
//! ## Example
//!
//! ```
//! use gothello::board::{Board, Move, Player};
//! use gothello::search::{EngineConfig, SearchEngine};
//!
//! // The opponent opens in the center.
//! let mut board = Board::new();
//! board.try_move("c3".parse::<Move>().unwrap()).unwrap();
//!
//! // A White engine answers.
//! let config = EngineConfig { side: Player::White, ..Default::default() };
//! let mut engine = SearchEngine::new(config);
//! let reply = engine.decide(&board);
//! board.try_move(reply).unwrap();
//! ```

pub mod board;
pub mod constants;
pub mod eval;
pub mod game;
pub mod search;
pub mod zobrist;
