//! Move generation for play: one-ply Monte Carlo over the legal moves.
//!
//! Every legal move of the side to move is a candidate. Candidates are
//! evaluated by playouts (see [`crate::playout`]) and either
//! - `RoundRobin`: each candidate gets the same number of simulations and the
//!   one with the most wins is played, or
//! - `Ucb`: the total budget is spread with UCB1 (see [`crate::ucb`]) and the
//!   most visited candidate is played.
//!
//! Both use a total budget of `candidates * sims_per_move` playouts.

use std::time::Duration;

use fastrand::Rng;
use log::debug;

use crate::board::{Board, Color, Point};
use crate::constants::{DEFAULT_EXPLORATION, DEFAULT_SIMULATIONS, DEFAULT_TIME_LIMIT};
use crate::patterns::PatternWeights;
use crate::playout::{SimulationPolicy, simulate_playout};
use crate::ucb::{self, ArmStats};

/// How simulations are distributed over the candidate moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionMode {
    #[default]
    RoundRobin,
    Ucb,
}

impl SelectionMode {
    pub fn name(self) -> &'static str {
        match self {
            SelectionMode::RoundRobin => "rr",
            SelectionMode::Ucb => "ucb",
        }
    }
}

/// Engine settings.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    /// Simulations per candidate move
    pub sims_per_move: usize,
    pub selection: SelectionMode,
    pub policy: SimulationPolicy,
    /// Skip moves that fill the mover's own eyes during playouts
    pub move_filter: bool,
    /// UCB1 exploration constant
    pub exploration: f64,
    /// Budget for the `solve` command
    pub time_limit: Duration,
    /// Seed for the playout RNG (random if `None`)
    pub seed: Option<u64>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sims_per_move: DEFAULT_SIMULATIONS,
            selection: SelectionMode::default(),
            policy: SimulationPolicy::default(),
            move_filter: false,
            exploration: DEFAULT_EXPLORATION,
            time_limit: DEFAULT_TIME_LIMIT,
            seed: None,
        }
    }
}

/// The Monte Carlo player.
pub struct Player {
    pub config: PlayerConfig,
    weights: PatternWeights,
    rng: Rng,
}

impl Player {
    pub fn new(config: PlayerConfig, weights: PatternWeights) -> Self {
        let rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        Self {
            config,
            weights,
            rng,
        }
    }

    pub fn weights(&self) -> &PatternWeights {
        &self.weights
    }

    /// Play `mv` for `toplay` on a copy of `board`, finish the game with the
    /// configured policy and return the winner.
    pub fn simulate(&mut self, board: &Board, mv: Point, toplay: Color) -> Color {
        let mut sim = board.clone();
        if sim.play_move(mv, toplay).is_err() {
            return toplay.opponent();
        }
        simulate_playout(
            &mut sim,
            self.config.policy,
            &self.weights,
            self.config.move_filter,
            &mut self.rng,
        )
    }

    /// Run `sims_per_move` simulations of `mv` and count the wins for `toplay`.
    pub fn simulate_move(&mut self, board: &Board, mv: Point, toplay: Color) -> u32 {
        (0..self.config.sims_per_move)
            .filter(|_| self.simulate(board, mv, toplay) == toplay)
            .count() as u32
    }

    /// Choose a move for `color`, or `None` if it has no legal move.
    pub fn get_move(&mut self, board: &Board, color: Color) -> Option<Point> {
        let mut root = board.clone();
        root.set_current_player(color);
        let moves = root.legal_moves(color);
        if moves.is_empty() {
            return None;
        }

        let (best, stats) = match self.config.selection {
            SelectionMode::RoundRobin => self.round_robin(&root, &moves, color),
            SelectionMode::Ucb => {
                let budget = moves.len() * self.config.sims_per_move;
                let exploration = self.config.exploration;
                ucb::select_move(&moves, exploration, budget, |mv| {
                    self.simulate(&root, mv, color) == color
                })?
            }
        };
        log_win_rates(&root, &moves, &stats);
        Some(best)
    }

    fn round_robin(&mut self, board: &Board, moves: &[Point], color: Color) -> (Point, Vec<ArmStats>) {
        let visits = self.config.sims_per_move as u32;
        let stats: Vec<ArmStats> = moves
            .iter()
            .map(|&mv| ArmStats {
                wins: self.simulate_move(board, mv, color),
                visits,
            })
            .collect();
        let best = stats
            .iter()
            .enumerate()
            .fold((0, 0), |(best, most), (i, arm)| {
                if arm.wins > most { (i, arm.wins) } else { (best, most) }
            })
            .0;
        (moves[best], stats)
    }
}

fn log_win_rates(board: &Board, moves: &[Point], stats: &[ArmStats]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let mut rates: Vec<(String, f64)> = moves
        .iter()
        .zip(stats)
        .map(|(&mv, arm)| (board.format_point(mv), arm.win_rate()))
        .collect();
    rates.sort_by(|a, b| b.1.total_cmp(&a.1));
    debug!("win rates: {rates:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(selection: SelectionMode, policy: SimulationPolicy) -> Player {
        let config = PlayerConfig {
            sims_per_move: 5,
            selection,
            policy,
            seed: Some(11),
            ..PlayerConfig::default()
        };
        Player::new(config, PatternWeights::uniform(1.0))
    }

    #[test]
    fn test_get_move_is_legal() {
        let mut board = Board::new(4);
        board.play_move(board.pt(2, 2), Color::Black).unwrap();
        for selection in [SelectionMode::RoundRobin, SelectionMode::Ucb] {
            for policy in [SimulationPolicy::Random, SimulationPolicy::Pattern] {
                let mut player = seeded(selection, policy);
                let before = board.clone();
                let mv = player.get_move(&board, Color::White).unwrap();
                assert!(board.is_legal(mv, Color::White));
                assert_eq!(board, before);
            }
        }
    }

    #[test]
    fn test_get_move_with_move_filter() {
        let mut board = Board::new(3);
        board.play_move(board.pt(1, 2), Color::Black).unwrap();
        board.play_move(board.pt(2, 1), Color::Black).unwrap();
        let mut player = seeded(SelectionMode::Ucb, SimulationPolicy::Pattern);
        player.config.move_filter = true;
        let mv = player.get_move(&board, Color::Black).unwrap();
        assert!(board.is_legal(mv, Color::Black));
    }

    #[test]
    fn test_no_legal_move() {
        let mut board = Board::new(2);
        board.play_move(board.pt(1, 1), Color::Black).unwrap();
        board.play_move(board.pt(2, 2), Color::Black).unwrap();
        let mut player = seeded(SelectionMode::Ucb, SimulationPolicy::Random);
        assert_eq!(player.get_move(&board, Color::White), None);
    }

    #[test]
    fn test_won_position() {
        // 2x2 after Black (1,1) and White (2,2): either remaining point wins
        // for Black immediately, so every simulation from there is a win.
        let mut board = Board::new(2);
        board.play_move(board.pt(1, 1), Color::Black).unwrap();
        board.play_move(board.pt(2, 2), Color::White).unwrap();
        let mut player = seeded(SelectionMode::RoundRobin, SimulationPolicy::Random);
        assert_eq!(player.simulate_move(&board, board.pt(1, 2), Color::Black), 5);
        let mv = player.get_move(&board, Color::Black).unwrap();
        assert!(mv == board.pt(1, 2) || mv == board.pt(2, 1));
    }
}
