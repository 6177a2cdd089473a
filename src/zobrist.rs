//! Zobrist keys for transposition-table hashing.
//!
//! A table of random 64-bit keys, one per (cell, color) pair. The search
//! builds a fresh table for every top-level decision, so hashes are only
//! ever compared within one table's lifetime. After the root is hashed from
//! scratch once, all successor hashes are maintained incrementally by
//! [`crate::board::Board::child`].

use crate::board::{Board, Player};
use crate::constants::SIZE;

pub struct ZobristTable {
    keys: [[[u64; 2]; SIZE]; SIZE],
}

impl ZobristTable {
    /// Build a table from freshly drawn random keys.
    pub fn new() -> ZobristTable {
        Self::from_rng(&mut fastrand::Rng::new())
    }

    /// Build a table from the given generator; seeded generators give
    /// reproducible tables for tests.
    pub fn from_rng(rng: &mut fastrand::Rng) -> ZobristTable {
        let mut keys = [[[0u64; 2]; SIZE]; SIZE];
        for col in keys.iter_mut() {
            for cell in col.iter_mut() {
                for key in cell.iter_mut() {
                    *key = rng.u64(..);
                }
            }
        }
        ZobristTable { keys }
    }

    /// The key for a stone of `player` at (x, y).
    pub fn key(&self, x: usize, y: usize, player: Player) -> u64 {
        let side = match player {
            Player::Black => 0,
            Player::White => 1,
        };
        self.keys[x][y][side]
    }

    /// Hash a board from scratch. Used once per search to adopt a root;
    /// everything below the root updates incrementally.
    pub fn hash(&self, board: &Board) -> u64 {
        let mut h = 0;
        for x in 0..SIZE {
            for y in 0..SIZE {
                if let Some(player) = board.get(x, y) {
                    h ^= self.key(x, y, player);
                }
            }
        }
        h
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Move;

    fn seeded_table(seed: u64) -> ZobristTable {
        ZobristTable::from_rng(&mut fastrand::Rng::with_seed(seed))
    }

    #[test]
    fn test_seeded_tables_are_reproducible() {
        let a = seeded_table(7);
        let b = seeded_table(7);
        for x in 0..SIZE {
            for y in 0..SIZE {
                assert_eq!(a.key(x, y, Player::Black), b.key(x, y, Player::Black));
                assert_eq!(a.key(x, y, Player::White), b.key(x, y, Player::White));
            }
        }
    }

    #[test]
    fn test_colors_hash_differently() {
        let table = seeded_table(11);
        let mut black = Board::new();
        black.place(2, 2, Player::Black);
        let mut white = Board::new();
        white.place(2, 2, Player::White);
        assert_ne!(table.hash(&black), table.hash(&white));
    }

    #[test]
    fn test_hash_is_order_independent() {
        let table = seeded_table(13);
        let mut a = Board::new();
        a.place(0, 0, Player::Black);
        a.place(4, 4, Player::White);
        let mut b = Board::new();
        b.place(4, 4, Player::White);
        b.place(0, 0, Player::Black);
        assert_eq!(table.hash(&a), table.hash(&b));
    }

    #[test]
    fn test_incremental_hash_matches_scratch() {
        let table = seeded_table(17);
        let mut board = Board::new();
        board.hash = table.hash(&board);
        for mv in ["c3", "c2", "b2", "e5", "d3"] {
            let mv: Move = mv.parse().unwrap();
            board = board.child(mv, &table).unwrap();
            assert_eq!(board.hash, table.hash(&board), "hash drifted after {mv}");
        }
    }

    #[test]
    fn test_incremental_hash_after_group_flip() {
        // White group (0,0)-(0,1) flipped by Black at (0,2): the hash must
        // account for every recolored cell, not just one.
        let table = seeded_table(19);
        let mut board = Board::new();
        board.place(0, 0, Player::White);
        board.place(0, 1, Player::White);
        board.place(1, 0, Player::Black);
        board.place(1, 1, Player::Black);
        board.hash = table.hash(&board);

        let next = board.child(Move::new(0, 2), &table).unwrap();
        assert_eq!(next.stone_counts(), (5, 0));
        assert_eq!(next.hash, table.hash(&next));
    }

    #[test]
    fn test_pass_keeps_hash() {
        let table = seeded_table(23);
        let mut board = Board::new();
        board.place(3, 3, Player::Black);
        board.hash = table.hash(&board);
        let next = board.child(Move::pass(), &table).unwrap();
        assert_eq!(next.hash, board.hash);
    }
}
