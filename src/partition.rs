use crate::{divide_round_up, Graph, LevelBisectionConfig, PartitionError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::cmp::Reverse;

/// One of the two vertex sets of a bisection. `A` carries label 0, `B` label 1.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn label(self) -> u32 {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn from_label(label: u32) -> Option<Side> {
        match label {
            0 => Some(Side::A),
            1 => Some(Side::B),
            _ => None,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub(crate) fn index(self) -> usize {
        self.label() as usize
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum InitialPartitioningMethod {
    /// The lower half of the vertex ids goes to `A`, the rest to `B`.
    Halves,
    /// Vertices alternate between the sides based on their id (id % 2).
    Modulo,
    /// A balanced split drawn from the given random number generator.
    Random,
    /// Level-based bisection from the lowest vertex.
    Bfs,
    /// Whole connected components go to the side with more room left,
    /// starting with the component whose size is farthest from `n / 2`. Only
    /// a component that fits on neither side is split, in BFS order from its
    /// lowest vertex. A good seed for KL on disconnected graphs.
    Components,
}

/// A 2-coloring of the vertices of a graph.
///
/// Refiners never mutate a partition they are given; they return a new one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Partition {
    sides: Vec<Side>,
}

impl Partition {
    pub fn new(sides: Vec<Side>) -> Self {
        Self { sides }
    }

    /// Builds a partition from 0/1 labels, one per vertex.
    pub fn from_labels(labels: &[u32]) -> Result<Self, PartitionError> {
        let sides = labels
            .iter()
            .enumerate()
            .map(|(vertex, &label)| Side::from_label(label).ok_or(PartitionError::InvalidLabel { vertex, label }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sides })
    }

    /// Builds a partition from the two vertex sets. Every vertex in
    /// `0..vertex_count` must appear exactly once across `a` and `b`.
    pub fn from_sets(vertex_count: usize, a: &[usize], b: &[usize]) -> Result<Self, PartitionError> {
        let mut sides: Vec<Option<Side>> = vec![None; vertex_count];
        for (side, set) in [(Side::A, a), (Side::B, b)] {
            for &vertex in set {
                let slot = sides
                    .get_mut(vertex)
                    .ok_or(PartitionError::VertexOutOfRange { vertex, vertex_count })?;
                if slot.is_some() {
                    return Err(PartitionError::DuplicateVertex { vertex, vertex_count });
                }
                *slot = Some(side);
            }
        }

        let sides = sides
            .into_iter()
            .enumerate()
            .map(|(vertex, side)| side.ok_or(PartitionError::UnassignedVertex { vertex, vertex_count }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sides })
    }

    pub fn len(&self) -> usize {
        self.sides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    pub fn side(&self, vx: usize) -> Side {
        self.sides[vx]
    }

    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    pub fn labels(&self) -> Vec<u32> {
        self.sides.iter().map(|s| s.label()).collect()
    }

    /// The vertices on `side`, in ascending order.
    pub fn vertices_on(&self, side: Side) -> Vec<usize> {
        self.sides
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == side)
            .map(|(vx, _)| vx)
            .collect()
    }

    /// `[|A|, |B|]`.
    pub fn side_sizes(&self) -> [usize; 2] {
        let b = self.sides.iter().filter(|&&s| s == Side::B).count();
        [self.sides.len() - b, b]
    }

    /// The largest side size allowed by `balance_tolerance` for a graph with
    /// `vertex_count` vertices. Never below `ceil(n / 2)`, so odd graphs stay
    /// feasible with a tolerance of 1.
    pub fn max_side_size(vertex_count: usize, balance_tolerance: f64) -> usize {
        let allowed = (balance_tolerance * vertex_count as f64 / 2.0 + 1e-9).floor() as usize;
        allowed.max(divide_round_up(vertex_count, 2))
    }

    pub fn is_balanced(&self, balance_tolerance: f64) -> bool {
        let [a, b] = self.side_sizes();
        a.max(b) <= Self::max_side_size(self.sides.len(), balance_tolerance)
    }

    /// Size of the larger side relative to a perfect split, `max(|A|, |B|) / (n / 2)`.
    pub fn imbalance(&self) -> f64 {
        if self.sides.is_empty() {
            return 1.0;
        }
        let [a, b] = self.side_sizes();
        a.max(b) as f64 / (self.sides.len() as f64 / 2.0)
    }

    /// The same grouping with the labels exchanged.
    pub fn with_sides_swapped(&self) -> Partition {
        Partition {
            sides: self.sides.iter().map(|s| s.opposite()).collect(),
        }
    }

    /// Whether both partitions group the vertices identically, regardless of
    /// which group is called `A`.
    pub fn same_grouping(&self, other: &Partition) -> bool {
        if self.sides.len() != other.sides.len() {
            return false;
        }
        self.sides == other.sides || self.sides.iter().zip(&other.sides).all(|(a, b)| *a != *b)
    }

    pub(crate) fn flip(&mut self, vx: usize) {
        self.sides[vx] = self.sides[vx].opposite();
    }

    pub(crate) fn swap_sides(&mut self, va: usize, vb: usize) {
        self.sides.swap(va, vb);
    }

    /// Fails unless the partition assigns exactly the vertices of `graph`.
    pub(crate) fn check_covers(&self, graph: &Graph) -> Result<(), PartitionError> {
        if self.sides.len() != graph.vertex_count() {
            return Err(PartitionError::InvalidPartition {
                expected: graph.vertex_count(),
                actual: self.sides.len(),
            });
        }
        Ok(())
    }
}

impl Graph {
    /// Produces a starting partition for the refiners.
    pub fn partition_initial(
        &self,
        method: InitialPartitioningMethod,
        rng: &mut StdRng,
    ) -> Result<Partition, PartitionError> {
        let n = self.vertex_count();
        let partition = match method {
            InitialPartitioningMethod::Halves => {
                let half = divide_round_up(n, 2);
                Partition::new((0..n).map(|vx| if vx < half { Side::A } else { Side::B }).collect())
            }
            InitialPartitioningMethod::Modulo => {
                Partition::new((0..n).map(|vx| if vx % 2 == 0 { Side::A } else { Side::B }).collect())
            }
            InitialPartitioningMethod::Random => {
                let mut order: Vec<usize> = (0..n).collect();
                order.shuffle(rng);
                let mut sides = vec![Side::B; n];
                for &vx in order.iter().take(divide_round_up(n, 2)) {
                    sides[vx] = Side::A;
                }
                Partition::new(sides)
            }
            InitialPartitioningMethod::Bfs => self.bisect_levels(&LevelBisectionConfig::default())?.partition,
            InitialPartitioningMethod::Components => self.pack_components(),
        };
        log::trace!("initial partition {:?} with sizes {:?}", method, partition.side_sizes());
        Ok(partition)
    }

    fn pack_components(&self) -> Partition {
        let n = self.vertex_count();
        let component = self.connected_components();
        let count = component.iter().max().map_or(0, |&c| c + 1);
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); count];
        for vx in self.vertices() {
            members[component[vx]].push(vx);
        }
        // Stable, so components at the same distance keep their order.
        members.sort_by_key(|m| Reverse((2 * m.len()).abs_diff(n)));
        log::trace!("packing {count} components");

        let mut room = [divide_round_up(n, 2), n / 2];
        let mut sides = vec![Side::A; n];
        for mut vertices in members {
            let side = if room[1] > room[0] { Side::B } else { Side::A };
            if vertices.len() > room[side.index()] {
                let levels = self.bfs_levels(vertices[0]);
                vertices.sort_by_key(|&vx| (levels[vx], vx));
            }
            let fit = vertices.len().min(room[side.index()]);
            for (i, &vx) in vertices.iter().enumerate() {
                let target = if i < fit { side } else { side.opposite() };
                sides[vx] = target;
                room[target.index()] -= 1;
            }
        }
        Partition::new(sides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn from_sets_checks_coverage() {
        let p = Partition::from_sets(4, &[0, 2], &[1, 3]).unwrap();
        assert_eq!(p.labels(), vec![0, 1, 0, 1]);

        assert_eq!(
            Partition::from_sets(4, &[0, 2], &[1, 2, 3]),
            Err(PartitionError::DuplicateVertex { vertex: 2, vertex_count: 4 })
        );
        assert_eq!(
            Partition::from_sets(4, &[0], &[1, 3]),
            Err(PartitionError::UnassignedVertex { vertex: 2, vertex_count: 4 })
        );
        assert_eq!(
            Partition::from_sets(4, &[0, 7], &[1, 2, 3]),
            Err(PartitionError::VertexOutOfRange { vertex: 7, vertex_count: 4 })
        );
    }

    #[test]
    fn from_labels_rejects_unknown_labels() {
        let err = Partition::from_labels(&[0, 1, 2]).unwrap_err();
        assert_eq!(err, PartitionError::InvalidLabel { vertex: 2, label: 2 });
        assert!(err.is_invalid_partition());
    }

    #[test]
    fn balance_limits() {
        assert_eq!(Partition::max_side_size(4, 1.0), 2);
        assert_eq!(Partition::max_side_size(4, 1.1), 2);
        assert_eq!(Partition::max_side_size(4, 1.5), 3);
        assert_eq!(Partition::max_side_size(5, 1.0), 3);
        assert_eq!(Partition::max_side_size(20, 1.1), 11);

        let p = Partition::from_labels(&[0, 0, 0, 1]).unwrap();
        assert!(!p.is_balanced(1.1));
        assert!(p.is_balanced(1.5));
        assert_eq!(p.imbalance(), 1.5);
    }

    #[test]
    fn grouping_ignores_label_names() {
        let p = Partition::from_labels(&[0, 0, 1, 1]).unwrap();
        let q = p.with_sides_swapped();
        assert_eq!(q.labels(), vec![1, 1, 0, 0]);
        assert!(p.same_grouping(&q));
        assert!(!p.same_grouping(&Partition::from_labels(&[0, 1, 0, 1]).unwrap()));
    }

    #[test]
    fn initial_partitions_are_balanced() {
        let graph = Graph::from_unweighted_edges(7, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6)]).unwrap();
        let mut rng = StdRng::seed_from_u64(1234);
        for method in [
            InitialPartitioningMethod::Halves,
            InitialPartitioningMethod::Modulo,
            InitialPartitioningMethod::Random,
            InitialPartitioningMethod::Bfs,
            InitialPartitioningMethod::Components,
        ] {
            let p = graph.partition_initial(method, &mut rng).unwrap();
            assert_eq!(p.len(), 7);
            assert!(p.is_balanced(1.0), "{method:?} gave sizes {:?}", p.side_sizes());
        }
    }

    #[test]
    fn components_are_kept_whole_where_they_fit() {
        // Arrange: a path of 5, an edge and an isolated vertex.
        let graph = Graph::from_unweighted_edges(8, &[(0, 1), (1, 2), (2, 3), (3, 4), (5, 6)]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        // Act
        let p = graph
            .partition_initial(InitialPartitioningMethod::Components, &mut rng)
            .unwrap();

        // Assert: vertex 7 and the edge are placed first, then the path is cut
        // in BFS order.
        assert_eq!(p.labels(), vec![0, 0, 0, 1, 1, 1, 1, 0]);
        assert_eq!(graph.cut_weight(&p).unwrap(), 1.0);
    }

    #[test]
    fn packable_components_give_an_empty_cut() {
        let graph = Graph::from_unweighted_edges(6, &[(0, 4), (4, 2), (1, 3), (3, 5), (5, 1)]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let p = graph
            .partition_initial(InitialPartitioningMethod::Components, &mut rng)
            .unwrap();

        assert_eq!(p.labels(), vec![0, 1, 0, 1, 0, 1]);
        assert_eq!(graph.cut_weight(&p).unwrap(), 0.0);
    }

    #[test]
    fn random_split_is_reproducible() {
        let graph = Graph::new(10);
        let a = graph
            .partition_initial(InitialPartitioningMethod::Random, &mut StdRng::seed_from_u64(7))
            .unwrap();
        let b = graph
            .partition_initial(InitialPartitioningMethod::Random, &mut StdRng::seed_from_u64(7))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.side_sizes(), [5, 5]);
    }
}
