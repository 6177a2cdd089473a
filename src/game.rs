//! Text-move game session.
//!
//! Alternates the engine's moves with an external opponent over
//! stdin/stdout: one move per line in the `Move` text form (`"c3"`,
//! `"pass"`), the board printed after every move, the referee's verdict
//! announced when the game ends. The session owns the live board; the
//! engine only ever sees it through `decide`.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use log::debug;

use crate::board::{Board, Move, MoveOutcome, Player};
use crate::search::{EngineConfig, SearchEngine};

pub struct GameSession {
    board: Board,
    engine: SearchEngine,
    side: Player,
}

impl GameSession {
    pub fn new(config: EngineConfig) -> GameSession {
        let side = config.side;
        GameSession {
            board: Board::new(),
            engine: SearchEngine::new(config),
            side,
        }
    }

    /// Run until the game ends (double pass) or stdin closes.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        let mut stdout = io::stdout();

        writeln!(stdout, "*** game start ***\n{}", self.board)?;
        while !self.board.is_over() {
            let finished = if self.board.to_move == self.side {
                self.my_move(&mut stdout)?
            } else {
                let Some(line) = lines.next() else {
                    debug!("input closed, ending session");
                    break;
                };
                self.opponent_move(&line?, &mut stdout)?
            };
            if finished {
                break;
            }
        }
        writeln!(stdout, "winner: {}", self.board.referee())?;
        stdout.flush()?;
        Ok(())
    }

    fn my_move(&mut self, out: &mut impl Write) -> Result<bool> {
        let mv = self.engine.decide(&self.board);
        let outcome = self
            .board
            .try_move(mv)
            .with_context(|| format!("engine move {mv} was rejected"))?;
        writeln!(out, "me: {mv}\n{}", self.board)?;
        out.flush()?;
        Ok(matches!(outcome, MoveOutcome::GameOver))
    }

    fn opponent_move(&mut self, line: &str, out: &mut impl Write) -> Result<bool> {
        let text = line.trim();
        let mv: Move = text
            .parse()
            .with_context(|| format!("bad move text {text:?}"))?;
        let outcome = self
            .board
            .try_move(mv)
            .with_context(|| format!("opponent move {mv} was rejected"))?;
        writeln!(out, "opp: {mv}\n{}", self.board)?;
        Ok(matches!(outcome, MoveOutcome::GameOver))
    }
}
