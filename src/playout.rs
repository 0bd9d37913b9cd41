//! Rollout policies and simulated playouts.
//!
//! A playout plays policy moves for both sides until the side to move has no
//! legal move; that side loses. Since stones are never removed, a playout on an
//! NxN board ends within N*N plies.
//!
//! Two policies are available:
//! - `Random`: every legal move is equally likely
//! - `Pattern`: moves are drawn in proportion to the weight of their 3x3 pattern
//!
//! With the move filter on, both policies skip moves that fill one of the
//! mover's own eyes unless no other legal move is left.

use fastrand::Rng;

use crate::board::{Board, Color, Point};
use crate::patterns::PatternWeights;

/// Move generation policy used inside playouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimulationPolicy {
    #[default]
    Random,
    Pattern,
}

impl SimulationPolicy {
    pub fn name(self) -> &'static str {
        match self {
            SimulationPolicy::Random => "random",
            SimulationPolicy::Pattern => "pattern",
        }
    }
}

/// Legal moves for the side to move, ascending.
///
/// With `move_filter`, moves into the mover's own eyes are dropped unless
/// that would leave nothing.
pub fn candidate_moves(board: &Board, move_filter: bool) -> Vec<Point> {
    let color = board.current_player();
    let legal = board.legal_moves(color);
    if !move_filter {
        return legal;
    }
    let filtered: Vec<Point> = legal
        .iter()
        .copied()
        .filter(|&p| !board.is_eye(p, color))
        .collect();
    if filtered.is_empty() { legal } else { filtered }
}

/// Choose a uniformly random legal move for the side to move.
///
/// Shuffles the empty points and returns the first legal one. With
/// `move_filter`, the first legal move that does not fill an own eye wins, and
/// an eye-filling move is only returned when nothing else is legal.
pub fn generate_random_move(board: &Board, move_filter: bool, rng: &mut Rng) -> Option<Point> {
    let color = board.current_player();
    let mut moves = board.get_empty_points();
    rng.shuffle(&mut moves);

    let mut fallback = None;
    for p in moves {
        if !board.is_legal(p, color) {
            continue;
        }
        if move_filter && board.is_eye(p, color) {
            fallback.get_or_insert(p);
            continue;
        }
        return Some(p);
    }
    fallback
}

/// Candidate moves for the side to move with their pattern weights.
pub fn pattern_move_weights(
    board: &Board,
    weights: &PatternWeights,
    move_filter: bool,
) -> Vec<(Point, f64)> {
    candidate_moves(board, move_filter)
        .into_iter()
        .map(|p| (p, weights.weight_at(board, p)))
        .collect()
}

/// Draw a legal move with probability proportional to its pattern weight.
///
/// One uniform number in `[0, 1)` is compared against the running sum of the
/// normalized weights. If every weight is zero the draw is uniform.
pub fn generate_pattern_move(
    board: &Board,
    weights: &PatternWeights,
    move_filter: bool,
    rng: &mut Rng,
) -> Option<Point> {
    let moves = pattern_move_weights(board, weights, move_filter);
    if moves.is_empty() {
        return None;
    }
    let total: f64 = moves.iter().map(|&(_, w)| w).sum();
    if total <= 0.0 {
        return Some(moves[rng.usize(..moves.len())].0);
    }

    let x = rng.f64();
    let mut cumulative = 0.0;
    for &(p, w) in &moves {
        cumulative += w / total;
        if x < cumulative {
            return Some(p);
        }
    }
    // Rounding can leave the sum just below x.
    moves.iter().rev().find(|&&(_, w)| w > 0.0).map(|&(p, _)| p)
}

/// Pick one move for the side to move with the given policy.
pub fn generate_move(
    board: &Board,
    policy: SimulationPolicy,
    weights: &PatternWeights,
    move_filter: bool,
    rng: &mut Rng,
) -> Option<Point> {
    match policy {
        SimulationPolicy::Random => generate_random_move(board, move_filter, rng),
        SimulationPolicy::Pattern => generate_pattern_move(board, weights, move_filter, rng),
    }
}

/// The move distribution `policy` uses at the current position, in ascending
/// point order.
pub fn policy_moves(
    board: &Board,
    policy: SimulationPolicy,
    weights: &PatternWeights,
    move_filter: bool,
) -> Vec<(Point, f64)> {
    let moves = pattern_move_weights(board, weights, move_filter);
    let total: f64 = moves.iter().map(|&(_, w)| w).sum();
    let uniform = 1.0 / moves.len() as f64;
    moves
        .into_iter()
        .map(|(p, w)| match policy {
            SimulationPolicy::Pattern if total > 0.0 => (p, w / total),
            _ => (p, uniform),
        })
        .collect()
}

/// Play the game out with `policy` and return the winner.
///
/// The board is played on in place; pass a clone to keep it.
pub fn simulate_playout(
    board: &mut Board,
    policy: SimulationPolicy,
    weights: &PatternWeights,
    move_filter: bool,
    rng: &mut Rng,
) -> Color {
    loop {
        let color = board.current_player();
        let mv = generate_move(board, policy, weights, move_filter, rng);
        match mv.map(|mv| board.play_move(mv, color)) {
            Some(Ok(())) => {}
            _ => return color.opponent(),
        }
    }
}
