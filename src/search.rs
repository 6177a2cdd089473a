//! Depth-limited adversarial search.
//!
//! Two mutually recursive roles, maximizing (the engine's turn) and
//! minimizing (the opponent's), run fail-hard alpha-beta over board clones.
//! The evaluator's sign convention makes "maximize" mean "best for the
//! configured side" regardless of actual stone color. A per-round
//! transposition table keyed by the incrementally maintained Zobrist hash
//! short-circuits repeated positions, and killer moves harvested from the
//! previous round's best-valued paths are tried first.
//!
//! Iterative deepening reruns the search at depth 1, 2, 3, ... under a
//! node-visit budget. Exhausting the budget aborts the whole in-flight
//! round: the `Exhausted` signal unwinds through every recursive frame via
//! `?` to the deepening driver, which falls back to the previous completed
//! round's move.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::board::{Board, Move, Player};
use crate::constants::{DEFAULT_DEPTH, DEFAULT_MAX_VISITED, INF, MAX_SEARCH_DEPTH};
use crate::eval::{EvalMethod, Evaluator, ScoringWeights};
use crate::zobrist::ZobristTable;

/// Engine configuration, immutable after construction.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Side the engine plays for
    pub side: Player,
    /// Search depth when iterative deepening is off
    pub depth: usize,
    /// Deepen from depth 1 under the node-visit budget
    pub iterative_deepening: bool,
    /// Node-visit budget; armed only under iterative deepening
    pub max_nodes_visited: u64,
    pub eval_method: EvalMethod,
    pub weights: ScoringWeights,
    /// Narrow tied candidates to the highest liberty count before the
    /// random draw
    pub prefer_higher_liberties: bool,
    /// Keep a per-round transposition table
    pub use_transposition: bool,
    /// Diagnostic toggles; observability only, never the chosen move
    pub print_stats: bool,
    pub print_leaves: bool,
    pub print_move_lists: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            side: Player::Black,
            depth: DEFAULT_DEPTH,
            iterative_deepening: false,
            max_nodes_visited: DEFAULT_MAX_VISITED,
            eval_method: EvalMethod::Number,
            weights: ScoringWeights::default(),
            prefer_higher_liberties: false,
            use_transposition: true,
            print_stats: false,
            print_leaves: false,
            print_move_lists: false,
        }
    }
}

/// Counters accumulated over one `decide` call.
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    /// Nodes entered, cumulative across deepening rounds
    pub visited: u64,
    /// Subtrees cut off by alpha-beta bounds
    pub pruned: u64,
    /// Transposition-table hits
    pub tt_hits: u64,
}

/// Node-visit budget ran out mid-round. Expected and recoverable; caught
/// only by the iterative-deepening driver.
struct Exhausted;

type Transposition = HashMap<u64, i32>;

type NodeResult = Result<(i32, Option<Move>), Exhausted>;

enum Expansion {
    Leaf(i32),
    Moves(Vec<(Move, i32)>),
}

/// Chooses moves by alpha-beta search over [`Board`] clones.
pub struct SearchEngine {
    config: EngineConfig,
    evaluator: Evaluator,
    rng: fastrand::Rng,
    stats: SearchStats,
    /// Best value recorded across the current round's leaves, with every
    /// root path that attained it
    best_value: Option<i32>,
    best_paths: Vec<Vec<Move>>,
    /// Moves on the previous round's best paths, indexed by ply
    killer_moves: Vec<HashSet<Move>>,
    stop_deepening: bool,
    last_value: Option<i32>,
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> SearchEngine {
        Self::with_rng(config, fastrand::Rng::new())
    }

    /// Engine with a seeded generator: Zobrist keys and tie-breaking draws
    /// become reproducible.
    pub fn with_seed(config: EngineConfig, seed: u64) -> SearchEngine {
        Self::with_rng(config, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(config: EngineConfig, rng: fastrand::Rng) -> SearchEngine {
        let evaluator = Evaluator::new(config.side, config.eval_method, config.weights);
        SearchEngine {
            config,
            evaluator,
            rng,
            stats: SearchStats::default(),
            best_value: None,
            best_paths: Vec::new(),
            killer_moves: Vec::new(),
            stop_deepening: false,
            last_value: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Counters from the most recent `decide` call.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Root value of the last completed search round, if any.
    pub fn last_value(&self) -> Option<i32> {
        self.last_value
    }

    /// Choose a move for the side to move on `board`.
    ///
    /// Always returns an applicable move: the best placement found, or pass
    /// when the root has no legal placement. Resource exhaustion never
    /// escapes; it degrades to the previous deepening round's move.
    pub fn decide(&mut self, board: &Board) -> Move {
        self.stats = SearchStats::default();
        self.best_value = None;
        self.best_paths.clear();
        self.killer_moves.clear();
        self.last_value = None;

        // Fresh key table per decision; hashes never cross table lifetimes.
        let zobrist = ZobristTable::from_rng(&mut self.rng);
        let mut root = board.clone();
        root.hash = zobrist.hash(&root);

        let chosen = if self.config.iterative_deepening {
            self.deepen(&root, &zobrist)
        } else {
            let mut tt = Transposition::new();
            let tt = self.config.use_transposition.then_some(&mut tt);
            let mut path = Vec::new();
            match self.max_value(&root, self.config.depth, -INF, INF, &mut path, tt, &zobrist) {
                Ok((value, mv)) => {
                    self.last_value = Some(value);
                    self.rebuild_killer_moves(self.config.depth);
                    mv
                }
                // The node budget is armed only under iterative deepening.
                Err(Exhausted) => None,
            }
        };

        self.report();
        chosen.unwrap_or_else(Move::pass)
    }

    /// Rerun the search at increasing depth until the budget runs out, the
    /// depth ceiling is reached, or a round reports that no further depth
    /// is useful. Each round gets a fresh transposition table; the visit
    /// counter and killer table carry across rounds.
    fn deepen(&mut self, root: &Board, zobrist: &ZobristTable) -> Option<Move> {
        let mut stored = None;
        let mut depth = 1;
        self.stop_deepening = false;

        while self.stats.visited < self.config.max_nodes_visited && depth <= MAX_SEARCH_DEPTH {
            let mut tt = Transposition::new();
            let tt = self.config.use_transposition.then_some(&mut tt);
            self.best_value = None;
            self.best_paths.clear();
            let mut path = Vec::new();
            match self.max_value(root, depth, -INF, INF, &mut path, tt, zobrist) {
                Ok((value, mv)) => {
                    stored = mv;
                    self.last_value = Some(value);
                    self.rebuild_killer_moves(depth);
                    if self.stop_deepening {
                        break;
                    }
                    debug!(
                        "depth {depth}: value {value}, {} nodes visited so far",
                        self.stats.visited
                    );
                    depth += 1;
                }
                Err(Exhausted) => {
                    // Discard the aborted round; keep the last completed one.
                    debug!("node budget exhausted during depth {depth}");
                    return stored;
                }
            }
        }
        stored
    }

    /// Decide whether this node is a leaf, aborted, or expands further.
    /// The budget check runs before the depth test so the visit count never
    /// overshoots the ceiling by more than the node that tripped it.
    fn expand(&mut self, board: &Board, depth: usize) -> Result<Expansion, Exhausted> {
        if self.config.iterative_deepening && self.stats.visited >= self.config.max_nodes_visited {
            return Err(Exhausted);
        }
        if depth == 0 {
            return Ok(Expansion::Leaf(self.evaluator.evaluate(board)));
        }
        let moves = self.ordered_moves(board, depth);
        if moves.is_empty() {
            if self.config.iterative_deepening {
                self.stop_deepening = true;
            }
            return Ok(Expansion::Leaf(self.evaluator.evaluate(board)));
        }
        Ok(Expansion::Moves(moves))
    }

    /// Legal moves with any killer entries for this remaining depth moved
    /// to the front of the list.
    fn ordered_moves(&self, board: &Board, depth: usize) -> Vec<(Move, i32)> {
        let mut moves = board.gen_moves();
        if depth < self.killer_moves.len() {
            let index = self.killer_moves.len() - depth;
            for killer in &self.killer_moves[index] {
                if let Some(pos) = moves.iter().position(|(mv, _)| mv == killer) {
                    let entry = moves.remove(pos);
                    moves.insert(0, entry);
                }
            }
        }
        moves
    }

    fn max_value(
        &mut self,
        board: &Board,
        depth: usize,
        mut alpha: i32,
        beta: i32,
        path: &mut Vec<Move>,
        mut tt: Option<&mut Transposition>,
        zobrist: &ZobristTable,
    ) -> NodeResult {
        self.stats.visited += 1;
        let moves = match self.expand(board, depth)? {
            Expansion::Leaf(value) => {
                self.record_path(path, value);
                self.print_leaf(board, value);
                return Ok((value, None));
            }
            Expansion::Moves(moves) => moves,
        };

        if let Some(table) = tt.as_deref_mut() {
            if let Some(&value) = table.get(&board.hash) {
                self.stats.tt_hits += 1;
                self.record_path(path, value);
                return Ok((value, None));
            }
        }

        self.print_move_list(board, &moves);

        let mut value = -INF;
        let mut candidates: Vec<Move> = Vec::new();
        let mut best_nlib = -1;

        for (mv, nlib) in moves {
            let next = match board.child(mv, zobrist) {
                Ok(next) => next,
                Err(err) => panic!("search generated an illegal move {mv}: {err}"),
            };
            path.push(mv);
            let (child_value, _) =
                self.min_value(&next, depth - 1, alpha, beta, path, tt.as_deref_mut(), zobrist)?;
            path.pop();
            self.store(tt.as_deref_mut(), next.hash, child_value);

            if child_value > value {
                value = child_value;
                candidates.clear();
                candidates.push(mv);
                best_nlib = nlib;
            } else if child_value == value {
                self.tie_candidate(&mut candidates, &mut best_nlib, mv, nlib);
            }

            if value >= beta {
                self.stats.pruned += 1;
                return Ok((value, Some(self.pick(&candidates))));
            }
            alpha = alpha.max(value);
        }

        Ok((value, Some(self.pick(&candidates))))
    }

    fn min_value(
        &mut self,
        board: &Board,
        depth: usize,
        alpha: i32,
        mut beta: i32,
        path: &mut Vec<Move>,
        mut tt: Option<&mut Transposition>,
        zobrist: &ZobristTable,
    ) -> NodeResult {
        self.stats.visited += 1;
        let moves = match self.expand(board, depth)? {
            Expansion::Leaf(value) => {
                self.record_path(path, value);
                self.print_leaf(board, value);
                return Ok((value, None));
            }
            Expansion::Moves(moves) => moves,
        };

        if let Some(table) = tt.as_deref_mut() {
            if let Some(&value) = table.get(&board.hash) {
                self.stats.tt_hits += 1;
                self.record_path(path, value);
                return Ok((value, None));
            }
        }

        self.print_move_list(board, &moves);

        let mut value = INF;
        let mut candidates: Vec<Move> = Vec::new();
        let mut best_nlib = -1;

        for (mv, nlib) in moves {
            let next = match board.child(mv, zobrist) {
                Ok(next) => next,
                Err(err) => panic!("search generated an illegal move {mv}: {err}"),
            };
            path.push(mv);
            let (child_value, _) =
                self.max_value(&next, depth - 1, alpha, beta, path, tt.as_deref_mut(), zobrist)?;
            path.pop();
            self.store(tt.as_deref_mut(), next.hash, child_value);

            if child_value < value {
                value = child_value;
                candidates.clear();
                candidates.push(mv);
                best_nlib = nlib;
            } else if child_value == value {
                self.tie_candidate(&mut candidates, &mut best_nlib, mv, nlib);
            }

            if value <= alpha {
                self.stats.pruned += 1;
                return Ok((value, Some(self.pick(&candidates))));
            }
            beta = beta.min(value);
        }

        Ok((value, Some(self.pick(&candidates))))
    }

    /// First write per round wins; a later identical position must have
    /// produced the same value.
    fn store(&mut self, tt: Option<&mut Transposition>, hash: u64, value: i32) {
        if let Some(table) = tt {
            match table.entry(hash) {
                Entry::Occupied(stored) => debug_assert_eq!(*stored.get(), value),
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
            }
        }
    }

    /// Bookkeeping for a move whose value ties the current best.
    fn tie_candidate(
        &self,
        candidates: &mut Vec<Move>,
        best_nlib: &mut i32,
        mv: Move,
        nlib: i32,
    ) {
        if self.config.prefer_higher_liberties {
            if nlib > *best_nlib {
                candidates.clear();
                candidates.push(mv);
                *best_nlib = nlib;
            } else if nlib == *best_nlib {
                candidates.push(mv);
            }
        } else {
            candidates.push(mv);
        }
    }

    /// Uniform random draw among tied candidates. Iteration order must
    /// never become the tie-break.
    fn pick(&mut self, candidates: &[Move]) -> Move {
        candidates[self.rng.usize(..candidates.len())]
    }

    /// Record a leaf (or transposition) value with its root path; the paths
    /// attaining the best recorded value seed the next round's killers.
    fn record_path(&mut self, path: &[Move], value: i32) {
        match self.best_value {
            Some(best) if value < best => {}
            Some(best) if value == best => self.best_paths.push(path.to_vec()),
            _ => {
                self.best_value = Some(value);
                self.best_paths = vec![path.to_vec()];
            }
        }
    }

    /// Rebuild the killer table from the recorded best paths, one move set
    /// per ply.
    fn rebuild_killer_moves(&mut self, depth: usize) {
        self.killer_moves = vec![HashSet::new(); depth];
        for path in &self.best_paths {
            for (ply, mv) in path.iter().enumerate() {
                self.killer_moves[ply].insert(*mv);
            }
        }
    }

    fn print_leaf(&self, board: &Board, value: i32) {
        if self.config.print_leaves {
            debug!("leaf value {value}\n{board}");
        }
    }

    fn print_move_list(&self, board: &Board, moves: &[(Move, i32)]) {
        if self.config.print_move_lists {
            let list: Vec<String> =
                moves.iter().map(|(mv, nlib)| format!("{mv}({nlib})")).collect();
            debug!("{} to move, candidates: {}", board.to_move, list.join(" "));
        }
    }

    fn report(&self) {
        if !self.config.print_stats {
            return;
        }
        info!("nodes visited: {}", self.stats.visited);
        info!("pruned subtrees: {}", self.stats.pruned);
        info!("transposition hits: {}", self.stats.tt_hits);
        if self.config.print_move_lists {
            for (ply, killers) in self.killer_moves.iter().enumerate() {
                let list: Vec<String> = killers.iter().map(Move::to_string).collect();
                info!("killer moves at ply {ply}: {}", list.join(" "));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SIZE;

    fn engine(config: EngineConfig) -> SearchEngine {
        SearchEngine::with_seed(config, 42)
    }

    /// Board whose only empty cell is suicide for the side to move.
    fn deadlocked_board() -> Board {
        let mut board = Board::new();
        for x in 0..SIZE {
            for y in 0..SIZE {
                if (x, y) != (0, 0) {
                    board.place(x, y, Player::White);
                }
            }
        }
        board
    }

    #[test]
    fn test_depth_one_empty_board() {
        let mut board = Board::new();
        let mut engine = engine(EngineConfig { depth: 1, ..Default::default() });
        let mv = engine.decide(&board);
        assert!(!mv.is_pass);
        board.try_move(mv).unwrap();
        assert_eq!(board.stone_counts(), (1, 0));
        assert_eq!(engine.last_value(), Some(1));
        // Root plus one leaf per empty cell.
        assert_eq!(engine.stats().visited, 26);
    }

    #[test]
    fn test_pruning_occurs() {
        let mut engine = engine(EngineConfig { depth: 3, ..Default::default() });
        engine.decide(&Board::new());
        assert!(engine.stats().pruned > 0);
    }

    #[test]
    fn test_decide_passes_without_moves() {
        let board = deadlocked_board();
        let mut engine = engine(EngineConfig::default());
        assert!(engine.decide(&board).is_pass);

        let mut deepening = engine_with_deepening(200);
        assert!(deepening.decide(&board).is_pass);
    }

    fn engine_with_deepening(max_nodes_visited: u64) -> SearchEngine {
        engine(EngineConfig {
            iterative_deepening: true,
            max_nodes_visited,
            ..Default::default()
        })
    }

    #[test]
    fn test_deepening_returns_legal_move() {
        let mut board = Board::new();
        let mut engine = engine_with_deepening(500);
        let mv = engine.decide(&board);
        assert!(!mv.is_pass);
        assert!(board.try_move(mv).is_ok());
    }

    #[test]
    fn test_deepening_falls_back_to_completed_round() {
        // Depth 1 from the empty board costs 26 nodes; a budget of 30 lets
        // round 1 finish and aborts round 2.
        let mut board = Board::new();
        let mut engine = engine_with_deepening(30);
        let mv = engine.decide(&board);
        assert!(!mv.is_pass);
        assert!(board.try_move(mv).is_ok());
    }

    #[test]
    fn test_budget_overshoot_bounded() {
        let mut engine = engine_with_deepening(50);
        engine.decide(&Board::new());
        assert!(engine.stats().visited <= 51);
    }

    #[test]
    fn test_aborted_first_round_degrades_to_pass() {
        // Nothing completed before exhaustion: the engine has no stored
        // move and passes.
        let mut engine = engine_with_deepening(5);
        assert!(engine.decide(&Board::new()).is_pass);
    }

    #[test]
    fn test_seeded_search_is_deterministic() {
        let mut board = Board::new();
        board.try_move("c3".parse().unwrap()).unwrap();

        let config = EngineConfig { side: Player::White, depth: 2, ..Default::default() };
        let mut a = SearchEngine::with_seed(config.clone(), 7);
        let mut b = SearchEngine::with_seed(config, 7);
        assert_eq!(a.decide(&board), b.decide(&board));
    }

    #[test]
    fn test_prefer_higher_liberties_narrows_ties() {
        // At depth 1 on the empty board every placement scores 1, so the
        // liberty filter keeps only the interior cells with 4 liberties.
        let config = EngineConfig {
            depth: 1,
            prefer_higher_liberties: true,
            ..Default::default()
        };
        for seed in 0..10 {
            let mut engine = SearchEngine::with_seed(config.clone(), seed);
            let mv = engine.decide(&Board::new());
            assert!((1..=3).contains(&mv.x) && (1..=3).contains(&mv.y), "got {mv}");
        }
    }

    #[test]
    fn test_white_engine_blocks_with_capture() {
        // Black group (0,0)-(0,1) sits in atari at (0,2). A White engine
        // searching one ply must take the flip; nothing else comes close.
        let mut board = Board::new();
        board.place(0, 0, Player::Black);
        board.place(0, 1, Player::Black);
        board.place(1, 0, Player::White);
        board.place(1, 1, Player::White);
        board.to_move = Player::White;

        let config = EngineConfig { side: Player::White, depth: 1, ..Default::default() };
        let mut engine = engine(config);
        let mv = engine.decide(&board);
        assert_eq!(mv, "a3".parse().unwrap());

        board.try_move(mv).unwrap();
        assert_eq!(board.stone_counts(), (0, 5));
    }

    #[test]
    fn test_disabling_transposition_keeps_value() {
        let mut board = Board::new();
        board.try_move("b2".parse().unwrap()).unwrap();
        board.try_move("d4".parse().unwrap()).unwrap();

        let with_tt = EngineConfig { depth: 3, ..Default::default() };
        let without_tt = EngineConfig { use_transposition: false, ..with_tt.clone() };
        let mut a = engine(with_tt);
        let mut b = engine(without_tt);
        a.decide(&board);
        b.decide(&board);
        assert_eq!(a.last_value(), b.last_value());
    }

    #[test]
    fn test_stats_reset_between_decisions() {
        let mut engine = engine(EngineConfig { depth: 1, ..Default::default() });
        engine.decide(&Board::new());
        let first = engine.stats().visited;
        engine.decide(&Board::new());
        assert_eq!(engine.stats().visited, first);
    }
}
