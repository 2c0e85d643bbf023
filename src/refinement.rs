use crate::{Graph, Partition};

/// Why a refinement pass stopped.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PassEnd {
    /// Every vertex was moved (or swapped) once.
    AllLocked,
    /// The best remaining swap would not reduce the cut weight.
    NoImprovingPair,
    /// No unlocked vertex could move without breaking the balance tolerance.
    BalanceInfeasible,
    /// Every vertex of one side is locked while the other side still has
    /// unlocked ones, so no pair is left to swap. Happens when the sides have
    /// different sizes.
    SideExhausted,
}

/// What happened during one refinement pass.
#[derive(Clone, Debug, PartialEq)]
pub struct PassSummary {
    /// Moves (FM) or swaps (KL) performed before the rollback.
    pub tentative: usize,
    /// Moves or swaps kept after rolling back to the best prefix.
    pub committed: usize,
    /// Cut weight reduction of the committed prefix.
    pub gain: f64,
    pub end: PassEnd,
}

/// The outcome of a refiner run.
#[derive(Clone, Debug, PartialEq)]
pub struct Refinement {
    pub partition: Partition,
    pub initial_cut: f64,
    pub cut_weight: f64,
    pub passes: Vec<PassSummary>,
}

impl Refinement {
    /// Total number of committed moves or swaps over all passes.
    pub fn committed(&self) -> usize {
        self.passes.iter().map(|p| p.committed).sum()
    }
}

/// Relative rounding error allowed per floating point term of a gain sum.
const ROUNDING_SLACK: f64 = 16.0 * f64::EPSILON;

/// Rounding slack of a gain summed over the edges around `vertices`.
///
/// Computed gains that are exactly zero in real arithmetic stay below this, so
/// float noise never counts as an improvement, while any gain that really
/// reduces the cut is far above it regardless of the other edge weights.
pub(crate) fn gain_slack(graph: &Graph, vertices: &[usize]) -> f64 {
    let (terms, weight) = vertices.iter().fold((1, 0.0), |(terms, weight), &vx| {
        (terms + graph.degree(vx), weight + graph.weighted_degree(vx))
    });
    ROUNDING_SLACK * terms as f64 * weight
}

/// Picks the prefix of `gains` with the largest positive cumulative sum.
///
/// `slacks[i]` is the rounding slack of `gains[i]`. A prefix only counts as an
/// improvement if it beats the best one so far by more than the error its sum
/// may carry. Returns `(length, cumulative gain)`, `(0, 0.0)` when no prefix
/// improves. Ties go to the shorter prefix.
pub(crate) fn best_prefix(gains: &[f64], slacks: &[f64]) -> (usize, f64) {
    let mut best = (0, 0.0);
    let mut cumulative = 0.0;
    let mut magnitude = 0.0;
    let mut slack = 0.0;
    for (i, (&gain, &gain_slack)) in gains.iter().zip(slacks.iter()).enumerate() {
        cumulative += gain;
        magnitude += gain.abs();
        slack += gain_slack;
        let tolerance = slack + ROUNDING_SLACK * (i + 1) as f64 * magnitude;
        if cumulative > best.1 + tolerance {
            best = (i + 1, cumulative);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_prefix_rolls_back_trailing_losses() {
        assert_eq!(best_prefix(&[3.0, -1.0, 2.0, -5.0], &[0.0; 4]), (3, 4.0));
        assert_eq!(best_prefix(&[-1.0, 0.5], &[0.0; 2]), (0, 0.0));
        assert_eq!(best_prefix(&[], &[]), (0, 0.0));
    }

    #[test]
    fn best_prefix_prefers_shorter_on_ties() {
        assert_eq!(best_prefix(&[2.0, 0.0, -1.0, 1.0], &[0.0; 4]), (1, 2.0));
    }

    #[test]
    fn best_prefix_ignores_rounding_noise() {
        // Sums to zero in real arithmetic but not in floating point.
        assert_eq!(best_prefix(&[-0.3, 0.1, 0.2], &[0.0; 3]), (0, 0.0));
        assert_eq!(best_prefix(&[0.1 + 0.2 - 0.3], &[1e-16]), (0, 0.0));
    }

    #[test]
    fn small_gains_next_to_heavy_edges_still_count() {
        let graph = Graph::from_edges(4, &[(0, 1, 1.0), (2, 3, 1e10)]).unwrap();
        let slack = gain_slack(&graph, &[0]);
        assert!(slack < 1e-12);
        assert_eq!(best_prefix(&[1e10, -1e10, 2.0], &[slack; 3]), (1, 1e10));
        assert_eq!(best_prefix(&[2.0, -1e10], &[slack; 2]), (1, 2.0));
    }
}
