//! UCB1 move selection over root candidates.
//!
//! Each candidate move is an arm of a bandit. Every simulation goes to the arm
//! with the highest upper confidence bound
//!
//! ```text
//! wins / visits + C * sqrt(ln(total) / visits)
//! ```
//!
//! where `total` is the number of simulations run so far. Arms that have never
//! been tried are always chosen first. When the budget is spent, the most
//! visited arm is returned.

/// Statistics for one arm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArmStats {
    pub wins: u32,
    pub visits: u32,
}

impl ArmStats {
    #[inline]
    pub fn win_rate(&self) -> f64 {
        if self.visits > 0 {
            self.wins as f64 / self.visits as f64
        } else {
            0.0
        }
    }
}

/// Upper confidence bound of one arm after `total` simulations.
#[inline]
pub fn ucb_score(arm: &ArmStats, exploration: f64, total: u32) -> f64 {
    if arm.visits == 0 {
        return f64::INFINITY;
    }
    let visits = arm.visits as f64;
    arm.win_rate() + exploration * ((total as f64).ln() / visits).sqrt()
}

/// Index of the arm with the highest bound. Ties go to the lowest index.
pub fn find_best(stats: &[ArmStats], exploration: f64, total: u32) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, arm) in stats.iter().enumerate() {
        let score = ucb_score(arm, exploration, total);
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    best
}

/// Index of the most visited arm. Ties go to the lowest index.
pub fn best_arm(stats: &[ArmStats]) -> usize {
    stats
        .iter()
        .enumerate()
        .fold((0, 0), |(best, most), (i, arm)| {
            if arm.visits > most { (i, arm.visits) } else { (best, most) }
        })
        .0
}

/// Spend `budget` simulations over `candidates` with UCB1.
///
/// `simulate` runs one playout after the given candidate and returns whether
/// the side to move at the root won it. Returns the chosen candidate together
/// with the statistics of every arm, or `None` if there are no candidates.
pub fn select_move<T, F>(
    candidates: &[T],
    exploration: f64,
    budget: usize,
    mut simulate: F,
) -> Option<(T, Vec<ArmStats>)>
where
    T: Copy,
    F: FnMut(T) -> bool,
{
    if candidates.is_empty() {
        return None;
    }
    let mut stats = vec![ArmStats::default(); candidates.len()];
    for n in 0..budget {
        let i = find_best(&stats, exploration, n as u32);
        let won = simulate(candidates[i]);
        stats[i].visits += 1;
        if won {
            stats[i].wins += 1;
        }
    }
    let best = best_arm(&stats);
    Some((candidates[best], stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untried_arms_first() {
        let mut order = Vec::new();
        select_move(&[10, 20, 30], 0.4, 3, |mv| {
            order.push(mv);
            false
        });
        assert_eq!(order, vec![10, 20, 30]);
    }

    #[test]
    fn test_ucb_score() {
        let arm = ArmStats { wins: 3, visits: 4 };
        let expected = 0.75 + 0.4 * (10f64.ln() / 4.0).sqrt();
        assert!((ucb_score(&arm, 0.4, 10) - expected).abs() < 1e-12);
        assert_eq!(ucb_score(&ArmStats::default(), 0.4, 10), f64::INFINITY);
    }

    #[test]
    fn test_budget_is_spent() {
        let (_, stats) = select_move(&[1, 2, 3, 4], 1.4, 40, |_| true).unwrap();
        let visits: u32 = stats.iter().map(|a| a.visits).sum();
        assert_eq!(visits, 40);
        assert!(stats.iter().all(|a| a.visits >= 1));
    }

    #[test]
    fn test_concentrates_on_winning_arm() {
        // Arm 2 always wins, the others always lose.
        let (best, stats) = select_move(&[0, 1, 2, 3], 0.4, 200, |mv| mv == 2).unwrap();
        assert_eq!(best, 2);
        assert!(stats[2].visits > 150);
        assert_eq!(stats[2].wins, stats[2].visits);
    }

    #[test]
    fn test_best_arm_is_most_visited_not_best_rate() {
        let stats = [
            ArmStats { wins: 1, visits: 1 },
            ArmStats { wins: 6, visits: 10 },
            ArmStats { wins: 0, visits: 2 },
        ];
        assert_eq!(best_arm(&stats), 1);
    }

    #[test]
    fn test_no_candidates() {
        assert!(select_move::<usize, _>(&[], 0.4, 10, |_| true).is_none());
    }
}
