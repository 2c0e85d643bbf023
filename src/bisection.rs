use crate::{Graph, Partition, PartitionError, Side};
use std::collections::VecDeque;

/// Where the breadth first search of a level bisection starts.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum SourceVertex {
    /// The vertex with the lowest id.
    #[default]
    Lowest,
    /// A specific vertex.
    Fixed(usize),
    /// A vertex of (approximately) maximum eccentricity, found by repeatedly
    /// jumping to the farthest vertex of the previous search. Starts from the
    /// lowest id, so it stays within that vertex's component.
    PseudoPeripheral,
}

#[derive(Clone, Debug, Default)]
pub struct LevelBisectionConfig {
    /// The vertex the breadth first search starts from.
    pub source: SourceVertex,
}

/// The result of [`Graph::bisect_levels`].
#[derive(Clone, Debug, PartialEq)]
pub struct LevelBisection {
    pub partition: Partition,
    /// The vertex the search started from, `None` for an empty graph.
    pub source: Option<usize>,
    /// Vertices with a level up to and including this one are on side `A`.
    pub threshold: usize,
    /// BFS distance from the source, `None` for vertices in other components.
    pub levels: Vec<Option<usize>>,
    /// Vertices the search could not reach, ascending.
    pub unreached: Vec<usize>,
}

impl LevelBisection {
    /// Whether some vertices were unreachable from the source. Their placement
    /// only balances the side sizes and ignores the cut, so callers may want
    /// to pick another source or another algorithm.
    pub fn is_disconnected(&self) -> bool {
        !self.unreached.is_empty()
    }
}

impl Graph {
    /// Splits the graph by breadth first search levels: every vertex with a
    /// level up to a threshold goes to side `A`, the rest to side `B`. The
    /// threshold is the one whose `A` side comes closest to `n / 2`.
    ///
    /// Neighbours are visited in ascending id order, so the result only
    /// depends on the graph and the source.
    pub fn bisect_levels(&self, config: &LevelBisectionConfig) -> Result<LevelBisection, PartitionError> {
        let n = self.vertex_count();
        if n == 0 {
            return Ok(LevelBisection {
                partition: Partition::new(Vec::new()),
                source: None,
                threshold: 0,
                levels: Vec::new(),
                unreached: Vec::new(),
            });
        }

        let source = match config.source {
            SourceVertex::Lowest => 0,
            SourceVertex::Fixed(vx) if vx < n => vx,
            SourceVertex::Fixed(vx) => {
                return Err(PartitionError::VertexOutOfRange {
                    vertex: vx,
                    vertex_count: n,
                })
            }
            SourceVertex::PseudoPeripheral => self.pseudo_peripheral_vertex(0),
        };

        let levels = self.bfs_levels(source);
        let max_level = levels.iter().flatten().copied().max().unwrap_or(0);
        let mut level_counts = vec![0usize; max_level + 1];
        for level in levels.iter().flatten() {
            level_counts[*level] += 1;
        }

        // Compare 2 * count against n to stay in integers.
        let mut threshold = 0;
        let mut best_distance = usize::MAX;
        let mut count = 0;
        for (level, level_count) in level_counts.iter().enumerate() {
            count += level_count;
            let distance = (2 * count).abs_diff(n);
            if distance < best_distance {
                best_distance = distance;
                threshold = level;
            }
        }

        let mut sides: Vec<Side> = levels
            .iter()
            .map(|level| match level {
                Some(l) if *l <= threshold => Side::A,
                _ => Side::B,
            })
            .collect();

        let unreached: Vec<usize> = (0..n).filter(|&vx| levels[vx].is_none()).collect();
        if !unreached.is_empty() {
            log::warn!(
                "level bisection from vertex {source} reached {} of {n} vertices; placing {} unreached vertices on the smaller side",
                n - unreached.len(),
                unreached.len()
            );
            let mut sizes = [0usize; 2];
            for (vx, side) in sides.iter().enumerate() {
                if levels[vx].is_some() {
                    sizes[side.index()] += 1;
                }
            }
            for &vx in unreached.iter() {
                let side = if sizes[0] < sizes[1] { Side::A } else { Side::B };
                sides[vx] = side;
                sizes[side.index()] += 1;
            }
        }

        let partition = Partition::new(sides);
        log::debug!(
            "level bisection from vertex {source}: threshold {threshold}, sizes {:?}, cut {}",
            partition.side_sizes(),
            self.cut_of(partition.sides())
        );

        Ok(LevelBisection {
            partition,
            source: Some(source),
            threshold,
            levels,
            unreached,
        })
    }

    /// BFS distance of every vertex from `source`.
    pub(crate) fn bfs_levels(&self, source: usize) -> Vec<Option<usize>> {
        let mut levels = vec![None; self.vertex_count()];
        let mut queue = VecDeque::new();
        levels[source] = Some(0);
        queue.push_back(source);

        while let Some(vx) = queue.pop_front() {
            let next = levels[vx].map_or(0, |l| l + 1);
            for e in self.neighbours(vx).iter() {
                if levels[e.dst].is_none() {
                    levels[e.dst] = Some(next);
                    queue.push_back(e.dst);
                }
            }
        }
        levels
    }

    fn pseudo_peripheral_vertex(&self, start: usize) -> usize {
        let farthest = |levels: &[Option<usize>]| {
            // Lowest id among the vertices at the largest level.
            let mut best = (0, start);
            for (vx, level) in levels.iter().enumerate() {
                if let Some(l) = level {
                    if *l > best.0 {
                        best = (*l, vx);
                    }
                }
            }
            best
        };

        let mut current = start;
        let (mut eccentricity, mut far) = farthest(&self.bfs_levels(current));
        loop {
            let (far_eccentricity, next_far) = farthest(&self.bfs_levels(far));
            if far_eccentricity <= eccentricity {
                break;
            }
            current = far;
            eccentricity = far_eccentricity;
            far = next_far;
        }
        log::trace!("pseudo-peripheral vertex {current} with eccentricity {eccentricity}");
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> Graph {
        let edges: Vec<(usize, usize)> = (1..n).map(|i| (i - 1, i)).collect();
        Graph::from_unweighted_edges(n, &edges).unwrap()
    }

    #[test]
    fn path_of_four_splits_in_the_middle() {
        let graph = path(4);
        let result = graph.bisect_levels(&LevelBisectionConfig::default()).unwrap();

        assert_eq!(result.partition.vertices_on(Side::A), vec![0, 1]);
        assert_eq!(result.partition.vertices_on(Side::B), vec![2, 3]);
        assert_eq!(result.threshold, 1);
        assert_eq!(graph.cut_weight(&result.partition).unwrap(), 1.0);
        assert!(!result.is_disconnected());
    }

    #[test]
    fn threshold_ties_pick_the_lower_level() {
        let result = path(3).bisect_levels(&LevelBisectionConfig::default()).unwrap();
        assert_eq!(result.partition.labels(), vec![0, 1, 1]);
    }

    #[test]
    fn fixed_source_is_respected() {
        let graph = path(6);
        let result = graph
            .bisect_levels(&LevelBisectionConfig {
                source: SourceVertex::Fixed(5),
            })
            .unwrap();
        assert_eq!(result.source, Some(5));
        assert_eq!(result.partition.vertices_on(Side::A), vec![3, 4, 5]);

        assert_eq!(
            graph.bisect_levels(&LevelBisectionConfig {
                source: SourceVertex::Fixed(6)
            }),
            Err(PartitionError::VertexOutOfRange {
                vertex: 6,
                vertex_count: 6
            })
        );
    }

    #[test]
    fn pseudo_peripheral_source_finds_a_path_end() {
        // Star of three paths of different lengths, centre 0.
        let graph = Graph::from_unweighted_edges(7, &[(0, 1), (1, 2), (2, 3), (0, 4), (0, 5), (5, 6)]).unwrap();
        let result = graph
            .bisect_levels(&LevelBisectionConfig {
                source: SourceVertex::PseudoPeripheral,
            })
            .unwrap();
        assert_eq!(result.source, Some(3));
        assert!(result.partition.is_balanced(1.1));
    }

    #[test]
    fn unreached_vertices_fill_the_smaller_side() {
        // 0-1-2 plus three isolated vertices.
        let graph = Graph::from_unweighted_edges(6, &[(0, 1), (1, 2)]).unwrap();
        let result = graph.bisect_levels(&LevelBisectionConfig::default()).unwrap();

        assert!(result.is_disconnected());
        assert_eq!(result.unreached, vec![3, 4, 5]);
        assert_eq!(result.levels[3], None);
        assert_eq!(result.partition.side_sizes(), [3, 3]);
        assert_eq!(result.partition.vertices_on(Side::A), vec![0, 1, 2]);
    }

    #[test]
    fn empty_and_single_vertex_graphs() {
        let empty = Graph::new(0).bisect_levels(&LevelBisectionConfig::default()).unwrap();
        assert!(empty.partition.is_empty());
        assert_eq!(empty.source, None);

        let single = Graph::new(1).bisect_levels(&LevelBisectionConfig::default()).unwrap();
        assert_eq!(single.partition.labels(), vec![0]);
    }
}
