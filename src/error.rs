use thiserror::Error;

/// Errors returned by graph construction and the bisection algorithms.
///
/// Conditions the algorithms recover from (a BFS that cannot reach every
/// vertex, a refinement pass that runs out of feasible moves) are reported
/// through the returned values instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartitionError {
    /// The partition was built for a different number of vertices.
    #[error("invalid partition: covers {actual} vertices but the graph has {expected}")]
    InvalidPartition { expected: usize, actual: usize },

    /// A vertex was listed on both sides, or twice on one side.
    #[error("invalid partition: vertex {vertex} is assigned more than once (graph has {vertex_count} vertices)")]
    DuplicateVertex { vertex: usize, vertex_count: usize },

    /// A vertex was not listed on either side.
    #[error("invalid partition: vertex {vertex} is not assigned to a side (graph has {vertex_count} vertices)")]
    UnassignedVertex { vertex: usize, vertex_count: usize },

    /// A label outside `{0, 1}`.
    #[error("invalid partition: vertex {vertex} has label {label}, expected 0 or 1")]
    InvalidLabel { vertex: usize, label: u32 },

    #[error("vertex {vertex} is out of range for a graph with {vertex_count} vertices")]
    VertexOutOfRange { vertex: usize, vertex_count: usize },

    #[error("invalid edge {u}-{v} in graph with {vertex_count} vertices: {reason}")]
    InvalidEdge {
        u: usize,
        v: usize,
        vertex_count: usize,
        reason: String,
    },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The symmetric eigensolver did not converge. Callers can fall back to
    /// level bisection or refine an arbitrary initial split instead.
    #[error("eigen-decomposition of the {vertex_count}x{vertex_count} Laplacian did not converge within {max_iterations} iterations")]
    EigenDecompositionFailure { vertex_count: usize, max_iterations: usize },
}

impl PartitionError {
    /// Whether the error reports a partition that does not cover every vertex
    /// exactly once.
    pub fn is_invalid_partition(&self) -> bool {
        matches!(
            self,
            PartitionError::InvalidPartition { .. }
                | PartitionError::DuplicateVertex { .. }
                | PartitionError::UnassignedVertex { .. }
                | PartitionError::InvalidLabel { .. }
        )
    }
}
