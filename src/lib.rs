// Balanced graph bisection: level-based (BFS) bisection, Kernighan-Lin and
// Fiduccia-Mattheyses refinement, and spectral bisection via the Fiedler vector.

mod bisection;
mod cut;
mod error;
mod fiduccia_mattheyses;
mod gain_buckets;
mod kernighan_lin;
mod partition;
mod refinement;
mod spectral;

pub use bisection::{LevelBisection, LevelBisectionConfig, SourceVertex};
pub use error::PartitionError;
pub use fiduccia_mattheyses::FiducciaMattheysesConfig;
pub use kernighan_lin::KernighanLinConfig;
pub use partition::{InitialPartitioningMethod, Partition, Side};
pub use refinement::{PassEnd, PassSummary, Refinement};
pub use spectral::{SpectralBisection, SpectralBisectionConfig};

use std::collections::VecDeque;

/// Divides and rounds up, `divide_round_up(5, 2) == 3`.
pub(crate) fn divide_round_up(dividend: usize, divisor: usize) -> usize {
    (dividend + divisor - 1) / divisor
}

/// Checks a balance tolerance the way every config does before running.
pub(crate) fn validate_balance_tolerance(balance_tolerance: f64) -> Result<(), PartitionError> {
    if !balance_tolerance.is_finite() || balance_tolerance < 1.0 {
        return Err(PartitionError::InvalidConfig {
            reason: format!("balance tolerance must be a finite value >= 1, got {balance_tolerance}"),
        });
    }
    Ok(())
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GraphEdge {
    pub dst: usize,
    pub weight: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct GraphVertex {
    /// Incident edges, sorted by `dst`.
    edges: Vec<GraphEdge>,
}

/// An undirected graph with non-negative edge weights and vertices `0..n`.
///
/// Every edge is stored in the adjacency lists of both endpoints, so
/// `edge_weight(u, v) == edge_weight(v, u)` always holds. The partitioning
/// algorithms only ever borrow the graph immutably.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    vertices: Vec<GraphVertex>,
}

impl Graph {
    /// Creates a graph with `vertex_count` vertices and no edges.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertices: vec![GraphVertex::default(); vertex_count],
        }
    }

    /// Builds a graph from `(u, v, weight)` triples.
    pub fn from_edges(vertex_count: usize, edges: &[(usize, usize, f64)]) -> Result<Self, PartitionError> {
        let mut graph = Self::new(vertex_count);
        for &(u, v, weight) in edges {
            graph.add_edge(u, v, weight)?;
        }
        Ok(graph)
    }

    /// Builds a graph from `(u, v)` pairs, each with weight 1.
    pub fn from_unweighted_edges(vertex_count: usize, edges: &[(usize, usize)]) -> Result<Self, PartitionError> {
        let mut graph = Self::new(vertex_count);
        for &(u, v) in edges {
            graph.add_edge(u, v, 1.0)?;
        }
        Ok(graph)
    }

    /// Inserts the undirected edge `u`-`v`. Inserting a pair that already
    /// exists adds `weight` to the stored weight.
    pub fn add_edge(&mut self, u: usize, v: usize, weight: f64) -> Result<(), PartitionError> {
        let n = self.vertices.len();
        let invalid = |reason: &str| PartitionError::InvalidEdge {
            u,
            v,
            vertex_count: n,
            reason: reason.to_string(),
        };
        if u >= n || v >= n {
            return Err(invalid("endpoint out of range"));
        }
        if u == v {
            return Err(invalid("self-loops are not allowed"));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(invalid("weight must be finite and non-negative"));
        }

        self.insert_half_edge(u, v, weight);
        self.insert_half_edge(v, u, weight);
        Ok(())
    }

    fn insert_half_edge(&mut self, src: usize, dst: usize, weight: f64) {
        let edges = &mut self.vertices[src].edges;
        match edges.binary_search_by(|e| e.dst.cmp(&dst)) {
            Ok(i) => edges[i].weight += weight,
            Err(i) => edges.insert(i, GraphEdge { dst, weight }),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.vertices.iter().map(|v| v.edges.len()).sum::<usize>() / 2
    }

    pub fn vertices(&self) -> std::ops::Range<usize> {
        0..self.vertices.len()
    }

    /// The edges leaving `vx`, in ascending neighbour order.
    pub fn neighbours(&self, vx: usize) -> &[GraphEdge] {
        &self.vertices[vx].edges
    }

    pub fn degree(&self, vx: usize) -> usize {
        self.vertices[vx].edges.len()
    }

    /// Weight of the edge `u`-`v`, or 0 when the vertices are not adjacent.
    pub fn edge_weight(&self, u: usize, v: usize) -> f64 {
        let edges = &self.vertices[u].edges;
        match edges.binary_search_by(|e| e.dst.cmp(&v)) {
            Ok(i) => edges[i].weight,
            Err(_) => 0.0,
        }
    }

    /// Sum of the weights of all edges incident to `vx`.
    pub fn weighted_degree(&self, vx: usize) -> f64 {
        self.vertices[vx].edges.iter().map(|e| e.weight).sum()
    }

    pub fn total_edge_weight(&self) -> f64 {
        self.vertices
            .iter()
            .enumerate()
            .flat_map(|(src, v)| v.edges.iter().filter(move |e| e.dst > src))
            .map(|e| e.weight)
            .sum()
    }

    /// Labels every vertex with the id of its connected component. Components
    /// are numbered in order of their lowest vertex.
    pub fn connected_components(&self) -> Vec<usize> {
        let mut component = vec![usize::MAX; self.vertices.len()];
        let mut queue = VecDeque::new();
        let mut next = 0;

        for start in self.vertices() {
            if component[start] != usize::MAX {
                continue;
            }
            component[start] = next;
            queue.push_back(start);
            while let Some(vx) = queue.pop_front() {
                for e in self.vertices[vx].edges.iter() {
                    if component[e.dst] == usize::MAX {
                        component[e.dst] = next;
                        queue.push_back(e.dst);
                    }
                }
            }
            next += 1;
        }
        component
    }
}
