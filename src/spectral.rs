use crate::{validate_balance_tolerance, Graph, Partition, PartitionError, Side};
use nalgebra::{DMatrix, SymmetricEigen};

pub struct SpectralBisectionConfig {
    /// The largest side may hold at most `balance_tolerance * n / 2` vertices.
    /// Sign splits that exceed it are corrected by moving the vertices whose
    /// eigenvector components are closest to zero.
    pub balance_tolerance: f64,
    /// Convergence threshold of the symmetric eigensolver.
    pub eigen_solver_tolerance: f64,
    /// Eigenvector components with an absolute value up to this count as zero
    /// and are handed to the smaller side. `0.0` only treats exact zeros that
    /// way, though the solver rarely produces them.
    pub zero_tolerance: f64,
    /// Iteration limit of the eigensolver, `None` for no limit.
    pub max_eigen_iterations: Option<usize>,
    /// Number of eigenvectors after the Fiedler vector to try as well. The
    /// split with the lowest cut weight wins.
    pub extra_eigenvectors: usize,
}

impl Default for SpectralBisectionConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: 1.1,
            eigen_solver_tolerance: 1e-9,
            zero_tolerance: 1e-9,
            max_eigen_iterations: None,
            extra_eigenvectors: 0,
        }
    }
}

/// The result of [`Graph::bisect_spectral`].
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralBisection {
    pub partition: Partition,
    pub cut_weight: f64,
    /// Second smallest Laplacian eigenvalue (algebraic connectivity).
    pub fiedler_value: f64,
    /// Rank of the eigenvector the partition came from in ascending eigenvalue
    /// order; 1 is the Fiedler vector.
    pub eigenvector_index: usize,
    /// Whether the sign split had to be rebalanced.
    pub balance_corrected: bool,
}

impl Graph {
    /// The weighted Laplacian `D - W`.
    pub fn laplacian(&self) -> DMatrix<f64> {
        let n = self.vertex_count();
        let mut laplacian = DMatrix::<f64>::zeros(n, n);
        for u in self.vertices() {
            laplacian[(u, u)] = self.weighted_degree(u);
            for e in self.neighbours(u).iter() {
                laplacian[(u, e.dst)] = -e.weight;
            }
        }
        laplacian
    }

    /// Splits the graph by the signs of the Fiedler vector: vertices with a
    /// non-negative component go to `A`, the rest to `B`.
    ///
    /// Eigenvectors are only defined up to sign, so each one is flipped to
    /// make its largest magnitude component (lowest id on ties) positive.
    /// Components that are zero are handed out in ascending id order to the
    /// smaller side.
    pub fn bisect_spectral(&self, config: &SpectralBisectionConfig) -> Result<SpectralBisection, PartitionError> {
        validate_balance_tolerance(config.balance_tolerance)?;
        if !config.eigen_solver_tolerance.is_finite() || config.eigen_solver_tolerance <= 0.0 {
            return Err(PartitionError::InvalidConfig {
                reason: format!(
                    "eigen solver tolerance must be a finite positive value, got {}",
                    config.eigen_solver_tolerance
                ),
            });
        }
        if !config.zero_tolerance.is_finite() || config.zero_tolerance < 0.0 {
            return Err(PartitionError::InvalidConfig {
                reason: format!(
                    "zero tolerance must be a finite non-negative value, got {}",
                    config.zero_tolerance
                ),
            });
        }

        let n = self.vertex_count();
        if n < 2 {
            return Ok(SpectralBisection {
                partition: Partition::new(vec![Side::A; n]),
                cut_weight: 0.0,
                fiedler_value: 0.0,
                eigenvector_index: 1,
                balance_corrected: false,
            });
        }

        log::debug!("eigen-decomposition of {n}x{n} Laplacian");
        let max_iterations = config.max_eigen_iterations.unwrap_or(0);
        let eigen = SymmetricEigen::try_new(self.laplacian(), config.eigen_solver_tolerance, max_iterations).ok_or(
            PartitionError::EigenDecompositionFailure {
                vertex_count: n,
                max_iterations,
            },
        )?;

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&i, &j| eigen.eigenvalues[i].total_cmp(&eigen.eigenvalues[j]));
        let fiedler_value = eigen.eigenvalues[order[1]];
        log::debug!("fiedler value {fiedler_value}");

        let max_size = Partition::max_side_size(n, config.balance_tolerance);
        let last = (1 + config.extra_eigenvectors).min(n - 1);
        let mut best: Option<SpectralBisection> = None;
        for rank in 1..=last {
            let mut vector: Vec<f64> = eigen.eigenvectors.column(order[rank]).iter().copied().collect();
            normalize_sign(&mut vector);

            let split = split_by_sign(&vector, config.zero_tolerance);
            let balance_corrected = !split.is_balanced(config.balance_tolerance);
            let partition = if balance_corrected {
                correct_balance(split, &vector, max_size)
            } else {
                split
            };
            let cut_weight = self.cut_of(partition.sides());
            log::trace!(
                "eigenvector {rank} (eigenvalue {}): cut {cut_weight}, sizes {:?}, corrected {balance_corrected}",
                eigen.eigenvalues[order[rank]],
                partition.side_sizes()
            );

            if best.as_ref().map_or(true, |b| cut_weight < b.cut_weight) {
                best = Some(SpectralBisection {
                    partition,
                    cut_weight,
                    fiedler_value,
                    eigenvector_index: rank,
                    balance_corrected,
                });
            }
        }

        let best = best.ok_or(PartitionError::EigenDecompositionFailure {
            vertex_count: n,
            max_iterations,
        })?;
        log::info!(
            "spectral bisection: cut {} from eigenvector {}, sizes {:?}",
            best.cut_weight,
            best.eigenvector_index,
            best.partition.side_sizes()
        );
        Ok(best)
    }
}

/// Flips `vector` so that its largest magnitude component is positive.
fn normalize_sign(vector: &mut [f64]) {
    let mut pivot = 0;
    for (i, x) in vector.iter().enumerate() {
        if x.abs() > vector[pivot].abs() {
            pivot = i;
        }
    }
    if vector.get(pivot).map_or(false, |&x| x < 0.0) {
        for x in vector.iter_mut() {
            *x = -*x;
        }
    }
}

fn split_by_sign(vector: &[f64], zero_tolerance: f64) -> Partition {
    let mut sides = vec![Side::A; vector.len()];
    let mut sizes = [0usize; 2];
    let mut zeros = Vec::new();
    for (vx, &x) in vector.iter().enumerate() {
        if x.abs() <= zero_tolerance {
            zeros.push(vx);
        } else {
            let side = if x > 0.0 { Side::A } else { Side::B };
            sides[vx] = side;
            sizes[side.index()] += 1;
        }
    }
    for vx in zeros {
        let side = if sizes[1] < sizes[0] { Side::B } else { Side::A };
        sides[vx] = side;
        sizes[side.index()] += 1;
    }
    Partition::new(sides)
}

/// Moves the vertices of the larger side whose components are closest to zero
/// (lowest id on ties) until that side holds at most `max_size` vertices.
fn correct_balance(mut partition: Partition, vector: &[f64], max_size: usize) -> Partition {
    let [a, b] = partition.side_sizes();
    let (larger, size) = if a >= b { (Side::A, a) } else { (Side::B, b) };
    if size <= max_size {
        return partition;
    }

    let mut candidates = partition.vertices_on(larger);
    candidates.sort_by(|&x, &y| vector[x].abs().total_cmp(&vector[y].abs()).then(x.cmp(&y)));
    for &vx in candidates.iter().take(size - max_size) {
        partition.flip(vx);
    }
    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_triangles(bridge: f64) -> Graph {
        Graph::from_edges(
            6,
            &[
                (0, 1, 1.0),
                (1, 2, 1.0),
                (2, 0, 1.0),
                (3, 4, 1.0),
                (4, 5, 1.0),
                (5, 3, 1.0),
                (2, 3, bridge),
            ],
        )
        .unwrap()
    }

    #[test]
    fn laplacian_rows_sum_to_zero() {
        let laplacian = two_triangles(0.5).laplacian();
        assert_relative_eq!(laplacian[(2, 2)], 2.5);
        assert_relative_eq!(laplacian[(2, 3)], -0.5);
        assert_eq!(laplacian, laplacian.transpose());
        for row in laplacian.row_iter() {
            assert_relative_eq!(row.sum(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn cuts_the_bridge_between_two_cliques() {
        let graph = two_triangles(0.5);

        let result = graph.bisect_spectral(&SpectralBisectionConfig::default()).unwrap();

        let expected = Partition::from_sets(6, &[0, 1, 2], &[3, 4, 5]).unwrap();
        assert!(result.partition.same_grouping(&expected));
        assert_relative_eq!(result.cut_weight, 0.5, epsilon = 1e-12);
        assert_eq!(result.eigenvector_index, 1);
        assert!(!result.balance_corrected);
        assert!(result.fiedler_value > 0.0);
    }

    #[test]
    fn extra_eigenvectors_never_worsen_the_cut() {
        let graph = two_triangles(1.0);
        let plain = graph.bisect_spectral(&SpectralBisectionConfig::default()).unwrap();
        let extra = graph
            .bisect_spectral(&SpectralBisectionConfig {
                extra_eigenvectors: 3,
                ..Default::default()
            })
            .unwrap();
        assert!(extra.cut_weight <= plain.cut_weight);
        assert_eq!(extra.partition, plain.partition);
    }

    #[test]
    fn sign_is_fixed_by_the_largest_component() {
        let mut vector = vec![0.1, -0.7, 0.3];
        normalize_sign(&mut vector);
        assert_eq!(vector, vec![-0.1, 0.7, -0.3]);

        let mut vector = vec![0.5, -0.5];
        normalize_sign(&mut vector);
        assert_eq!(vector, vec![0.5, -0.5]);
    }

    #[test]
    fn zero_components_go_to_the_smaller_side() {
        let partition = split_by_sign(&[0.4, 0.0, 0.3, -0.5, 0.0, 1e-12], 1e-9);
        // Non-zero: A = {0, 2}, B = {3}; zeros 1, 4, 5 fill in.
        assert_eq!(partition.labels(), vec![0, 1, 0, 1, 0, 1]);

        // Without a zero tolerance the tiny component keeps its sign.
        let partition = split_by_sign(&[0.4, 0.0, 0.3, -0.5, 0.0, 1e-12], 0.0);
        assert_eq!(partition.labels(), vec![0, 1, 0, 1, 1, 0]);
    }

    #[test]
    fn zero_tolerance_is_independent_of_the_solver_tolerance() {
        let graph = two_triangles(0.5);
        let config = SpectralBisectionConfig {
            eigen_solver_tolerance: 1e-12,
            zero_tolerance: 0.0,
            ..Default::default()
        };

        let result = graph.bisect_spectral(&config).unwrap();

        let expected = Partition::from_sets(6, &[0, 1, 2], &[3, 4, 5]).unwrap();
        assert!(result.partition.same_grouping(&expected));
    }

    #[test]
    fn balance_correction_moves_components_nearest_zero() {
        let vector = [0.9, 0.1, 0.2, 0.05, -0.3];
        let partition = Partition::from_labels(&[0, 0, 0, 0, 1]).unwrap();

        let corrected = correct_balance(partition, &vector, 3);

        assert_eq!(corrected.labels(), vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn solver_failure_is_reported() {
        let edges: Vec<(usize, usize)> = (1..6).map(|i| (i - 1, i)).collect();
        let graph = Graph::from_unweighted_edges(6, &edges).unwrap();

        let result = graph.bisect_spectral(&SpectralBisectionConfig {
            max_eigen_iterations: Some(1),
            ..Default::default()
        });

        assert_eq!(
            result,
            Err(PartitionError::EigenDecompositionFailure {
                vertex_count: 6,
                max_iterations: 1
            })
        );
    }

    #[test]
    fn rejects_bad_tolerances() {
        let graph = two_triangles(1.0);
        for config in [
            SpectralBisectionConfig {
                eigen_solver_tolerance: 0.0,
                ..Default::default()
            },
            SpectralBisectionConfig {
                balance_tolerance: f64::NAN,
                ..Default::default()
            },
            SpectralBisectionConfig {
                zero_tolerance: -1.0,
                ..Default::default()
            },
        ] {
            assert!(matches!(graph.bisect_spectral(&config), Err(PartitionError::InvalidConfig { .. })));
        }
    }

    #[test]
    fn tiny_graphs_are_trivial() {
        let single = Graph::new(1).bisect_spectral(&SpectralBisectionConfig::default()).unwrap();
        assert_eq!(single.partition.labels(), vec![0]);
        let empty = Graph::new(0).bisect_spectral(&SpectralBisectionConfig::default()).unwrap();
        assert!(empty.partition.is_empty());
    }
}
