//! Exhaustive boolean negamax solver.
//!
//! The solver proves whether the side to move can force a win. A position with
//! no legal move is lost for the side to move; otherwise it is won iff some
//! legal move leads to a position that is lost for the opponent.
//!
//! Moves are made and taken back in place on the caller's board (see
//! [`Board::make_move`]). Proven results are memoized in a
//! [`TranspositionTable`] owned by the solver.
//!
//! The search polls a wall-clock deadline at every node. When it passes, the
//! recursion unwinds with [`Timeout`] and nothing from the unfinished branch is
//! stored, so a truncated search is reported as "unknown" rather than as a loss.

use std::time::{Duration, Instant};

use log::{debug, warn};
use thiserror::Error;

use crate::board::{Board, Color, Point};
use crate::constants::MAX_EXACT_KEY_SIZE;
use crate::transposition::{TranspositionTable, encode};

/// The search deadline passed before a result was proven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("search deadline reached")]
pub struct Timeout;

/// Counters describing the work done by a solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Positions entered (including table hits)
    pub nodes: u64,
    /// Positions answered from the transposition table
    pub tt_hits: u64,
    /// Positions whose moves were enumerated
    pub expanded: u64,
}

/// Result of [`solve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveOutcome {
    /// The color that was asked about can force a win. Always `false` when the
    /// search was truncated, which means "not proven".
    pub color_wins: bool,
    /// The deadline passed before the root was proven.
    pub truncated: bool,
    /// First winning move for the side to move, if it wins.
    pub winning_move: Option<Point>,
}

impl SolveOutcome {
    #[inline]
    pub fn is_proven(&self) -> bool {
        !self.truncated
    }
}

/// Negamax solver with its own transposition table.
#[derive(Debug, Default)]
pub struct Solver {
    table: TranspositionTable,
    deadline: Option<Instant>,
    stats: SolverStats,
}

impl Solver {
    /// A solver without a deadline.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    #[inline]
    fn check_deadline(&self) -> Result<(), Timeout> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Timeout),
            _ => Ok(()),
        }
    }

    /// Whether the player to move on `board` can force a win.
    ///
    /// The board is restored before returning, also on timeout.
    pub fn proves_win(&mut self, board: &mut Board) -> Result<bool, Timeout> {
        self.check_deadline()?;
        self.stats.nodes += 1;

        let key = encode(board);
        if let Some(win) = key.and_then(|k| self.table.lookup(k)) {
            self.stats.tt_hits += 1;
            return Ok(win);
        }

        let win = self.find_winning_move(board, None)?.is_some();
        if let Some(key) = key {
            self.table.store(key, win);
        }
        Ok(win)
    }

    /// Try `first`, then every empty point in ascending order, and return the
    /// first legal move after which the opponent is proven to lose.
    fn find_winning_move(
        &mut self,
        board: &mut Board,
        first: Option<Point>,
    ) -> Result<Option<Point>, Timeout> {
        self.stats.expanded += 1;
        let color = board.current_player();
        let rest = board.get_empty_points();
        let candidates = first
            .into_iter()
            .chain(rest.into_iter().filter(|&p| Some(p) != first));

        for mv in candidates {
            let Ok(undo) = board.make_move(mv, color) else {
                continue;
            };
            let opponent_wins = self.proves_win(board);
            board.unmake(undo);
            if !opponent_wins? {
                return Ok(Some(mv));
            }
        }
        Ok(None)
    }

    /// Solve `board` for the side to move and report the result for `color`.
    ///
    /// Unlike [`Solver::proves_win`], the root is always expanded so that the
    /// winning move is known even if the root result is already in the table.
    pub fn solve(&mut self, board: &mut Board, color: Color, time_limit: Duration) -> SolveOutcome {
        self.deadline = Instant::now().checked_add(time_limit);
        if board.size() > MAX_EXACT_KEY_SIZE {
            warn!(
                "no exact position keys on {}x{} boards, searching without a table",
                board.size(),
                board.size()
            );
        }

        let to_play = board.current_player();
        let first = opening_reply(board);
        let result = self
            .check_deadline()
            .and_then(|()| self.find_winning_move(board, first));
        self.stats.nodes += 1;

        let outcome = match result {
            Ok(winning_move) => {
                let win = winning_move.is_some();
                if let Some(key) = encode(board) {
                    self.table.store(key, win);
                }
                SolveOutcome {
                    color_wins: win == (color == to_play),
                    truncated: false,
                    winning_move,
                }
            }
            Err(Timeout) => SolveOutcome {
                color_wins: false,
                truncated: true,
                winning_move: None,
            },
        };
        debug!(
            "solve: {:?} nodes={} hits={} expanded={} table={}",
            outcome,
            self.stats.nodes,
            self.stats.tt_hits,
            self.stats.expanded,
            self.table.len()
        );
        outcome
    }
}

/// Solve `board` with a fresh transposition table.
///
/// `color` is the player the caller is asking about; it need not be the side
/// to move. The board is left as it was.
pub fn solve(board: &mut Board, color: Color, time_limit: Duration) -> SolveOutcome {
    Solver::new().solve(board, color, time_limit)
}

/// Move to try first when exactly one stone is on the board: its mirror image
/// under a 180 degree rotation of the board.
pub fn opening_reply(board: &Board) -> Option<Point> {
    match board.stones().as_slice() {
        &[stone] => {
            let ns = board.size() + 1;
            let mirror = ns * (ns + 1) - stone;
            (mirror != stone).then_some(mirror)
        }
        _ => None,
    }
}
