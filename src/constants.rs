//! Constants for board geometry and engine parameters.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). The game is defined on a 5x5 grid.
pub const SIZE: usize = 5;

/// Number of cells on the board.
pub const NCELLS: usize = SIZE * SIZE;

// =============================================================================
// Search Parameters
// =============================================================================

/// Score bound for alpha-beta windows. Larger in magnitude than any
/// reachable evaluation, so it never collides with a real leaf value.
pub const INF: i32 = 999_999;

/// Hard ceiling for iterative deepening: one ply per board cell.
pub const MAX_SEARCH_DEPTH: usize = NCELLS;

/// Default fixed search depth.
pub const DEFAULT_DEPTH: usize = 3;

/// Default node-visit budget for iterative deepening.
pub const DEFAULT_MAX_VISITED: u64 = 3000;
