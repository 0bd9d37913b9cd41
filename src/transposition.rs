//! Position keys and the transposition table used by the solver.
//!
//! A position key folds every interior cell into one integer, `key = 3 * key + digit`,
//! in the fixed order the board recorded when it was reset, then appends the side
//! to move as a final binary digit. With three digit values (empty, black, white)
//! the key is exact for boards up to [`MAX_EXACT_KEY_SIZE`]; larger boards have
//! no key.
//!
//! Keys are only comparable between boards of the same size.

use std::collections::HashMap;

use crate::board::{Board, Color};
use crate::constants::MAX_EXACT_KEY_SIZE;

/// Integer identifying a stone configuration.
pub type PositionKey = u128;

/// Compute the position key of a board, or `None` if the board is too large
/// for an exact key.
pub fn encode(board: &Board) -> Option<PositionKey> {
    if board.size() > MAX_EXACT_KEY_SIZE {
        return None;
    }
    let stones = board.enumeration().iter().try_fold(0, |key: PositionKey, &p| {
        key.checked_mul(3)?
            .checked_add(board.get_color(p).key_digit() as PositionKey)
    })?;
    let side = match board.current_player() {
        Color::Black => 0,
        Color::White => 1,
    };
    stones.checked_mul(2)?.checked_add(side)
}

/// Map from position key to a proven result for the side to move.
///
/// `true` means the player to move wins. Entries are never evicted.
#[derive(Debug, Default, Clone)]
pub struct TranspositionTable {
    table: HashMap<PositionKey, bool>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn lookup(&self, key: PositionKey) -> Option<bool> {
        self.table.get(&key).copied()
    }

    /// Store a result, overwriting any previous entry for `key`.
    #[inline]
    pub fn store(&mut self, key: PositionKey, win: bool) {
        self.table.insert(key, win);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}
