//! NoGo: a Monte Carlo player and exact solver for the game NoGo.
//!
//! NoGo is played on a Go board, but capturing is forbidden: a move that
//! captures opponent stones or leaves its own block without liberties is
//! illegal. The first player without a legal move loses.
//!
//! ## Modules
//!
//! - [`constants`] - Board limits and engine defaults
//! - [`board`] - Board representation and the NoGo rules
//! - [`transposition`] - Position keys and the transposition table
//! - [`solver`] - Negamax boolean solver with a deadline
//! - [`patterns`] - 3x3 pattern codes and weights
//! - [`playout`] - Random and pattern-weighted rollouts
//! - [`ucb`] - UCB1 allocation of simulations
//! - [`player`] - Move generation from simulations
//! - [`gtp`] - Go Text Protocol adapter
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use nogo::board::{Board, Color};
//! use nogo::solver;
//!
//! let mut board = Board::new(2);
//! let outcome = solver::solve(&mut board, Color::Black, Duration::from_secs(5));
//! assert!(outcome.color_wins);
//! assert_eq!(outcome.winning_move, Some(board.pt(1, 1)));
//! ```

pub mod board;
pub mod constants;
pub mod gtp;
pub mod patterns;
pub mod player;
pub mod playout;
pub mod solver;
pub mod transposition;
pub mod ucb;
