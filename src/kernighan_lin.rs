// Kernighan, B. W. and Lin, S. "An efficient heuristic procedure for
// partitioning graphs." Bell System Technical Journal 49.2 (1970): 291-307.

use crate::refinement::{best_prefix, gain_slack};
use crate::{Graph, Partition, PartitionError, PassEnd, PassSummary, Refinement, Side};

pub struct KernighanLinConfig {
    /// Upper bound on the number of passes. `None` keeps going until a pass
    /// commits no swap.
    pub max_passes: Option<u32>,
    /// If set, a pass keeps swapping through non-improving pairs until no
    /// unlocked pair is left and then rolls back to the best prefix, which
    /// lets it climb out of some local minima. Otherwise a pass stops at the
    /// first pair that would not reduce the cut.
    pub exhaustive_passes: bool,
}

impl Default for KernighanLinConfig {
    fn default() -> Self {
        Self {
            max_passes: None,
            exhaustive_passes: false,
        }
    }
}

impl Graph {
    /// Improves a bisection by swapping pairs of vertices between the sides.
    ///
    /// Every pass repeatedly swaps the unlocked pair `(a, b)` with the largest
    /// combined gain `gain(a) + gain(b) - 2 * weight(a, b)` (lowest `(a, b)` on
    /// ties), locks both, and finally commits the prefix of swaps with the
    /// largest cumulative gain. Passes repeat until one commits nothing.
    ///
    /// Swaps keep the side sizes, so the result is exactly as balanced as
    /// `partition`. Finding a pair is O(n^2) in the worst case.
    pub fn refine_kernighan_lin(
        &self,
        partition: &Partition,
        config: &KernighanLinConfig,
    ) -> Result<Refinement, PartitionError> {
        partition.check_covers(self)?;

        let mut current = partition.clone();
        let initial_cut = self.cut_of(current.sides());
        let mut passes = Vec::new();

        while config.max_passes.map_or(true, |max| passes.len() < max as usize) {
            let summary = self.kl_pass(&mut current, config.exhaustive_passes);
            log::debug!(
                "kl pass {}: {} of {} swaps committed, gain {}, {:?}",
                passes.len(),
                summary.committed,
                summary.tentative,
                summary.gain,
                summary.end
            );
            let committed = summary.committed;
            passes.push(summary);
            if committed == 0 {
                break;
            }
        }

        let cut_weight = self.cut_of(current.sides());
        log::info!("kl refinement: cut {initial_cut} -> {cut_weight} in {} passes", passes.len());
        Ok(Refinement {
            partition: current,
            initial_cut,
            cut_weight,
            passes,
        })
    }

    fn kl_pass(&self, partition: &mut Partition, exhaustive: bool) -> PassSummary {
        let mut working = partition.clone();
        let mut gains: Vec<f64> = self.vertices().map(|vx| self.gain_of(working.sides(), vx)).collect();
        let mut locked = vec![false; self.vertex_count()];

        let mut swaps = Vec::new();
        let mut swap_gains = Vec::new();
        let mut slacks = Vec::new();
        let end = loop {
            let Some((a, b, gain)) = self.best_swap(&working, &gains, &locked) else {
                break if locked.iter().all(|&l| l) {
                    PassEnd::AllLocked
                } else {
                    PassEnd::SideExhausted
                };
            };
            let slack = gain_slack(self, &[a, b]);
            if !exhaustive && gain <= slack {
                break PassEnd::NoImprovingPair;
            }

            working.swap_sides(a, b);
            locked[a] = true;
            locked[b] = true;
            swaps.push((a, b));
            swap_gains.push(gain);
            slacks.push(slack);
            log::trace!("kl swap {a} <-> {b}, gain {gain}");

            for &vx in [a, b].iter() {
                for e in self.neighbours(vx).iter() {
                    if !locked[e.dst] {
                        gains[e.dst] = self.gain_of(working.sides(), e.dst);
                    }
                }
            }
        };

        let (committed, gain) = best_prefix(&swap_gains, &slacks);
        for &(a, b) in swaps[..committed].iter() {
            partition.swap_sides(a, b);
        }
        PassSummary {
            tentative: swaps.len(),
            committed,
            gain,
            end,
        }
    }

    /// The unlocked pair `(a on A, b on B)` with the largest swap gain.
    ///
    /// Candidates are scanned by decreasing vertex gain. Since edge weights
    /// are non-negative, `gain(a) + gain(b)` bounds the swap gain, and the scan
    /// stops as soon as that bound drops below the best gain found. The result
    /// matches a full scan of all pairs with lowest-`(a, b)` tie breaking.
    fn best_swap(&self, partition: &Partition, gains: &[f64], locked: &[bool]) -> Option<(usize, usize, f64)> {
        let by_gain = |side: Side| {
            let mut vertices: Vec<usize> = self
                .vertices()
                .filter(|&vx| !locked[vx] && partition.side(vx) == side)
                .collect();
            vertices.sort_by(|&x, &y| gains[y].total_cmp(&gains[x]).then(x.cmp(&y)));
            vertices
        };
        let side_a = by_gain(Side::A);
        let side_b = by_gain(Side::B);
        let top_b = *side_b.first()?;

        let mut best: Option<(usize, usize, f64)> = None;
        for &a in side_a.iter() {
            if let Some((_, _, best_gain)) = best {
                if gains[a] + gains[top_b] < best_gain {
                    break;
                }
            }
            for &b in side_b.iter() {
                let bound = gains[a] + gains[b];
                if let Some((_, _, best_gain)) = best {
                    if bound < best_gain {
                        break;
                    }
                }
                let gain = bound - 2.0 * self.edge_weight(a, b);
                let better = match best {
                    None => true,
                    Some((best_a, best_b, best_gain)) => gain > best_gain || (gain == best_gain && (a, b) < (best_a, best_b)),
                };
                if better {
                    best = Some((a, b, gain));
                }
            }
        }
        best
    }
}
