use crate::{Graph, Partition, PartitionError, Side};

impl Graph {
    /// Sum of the weights of all edges whose endpoints lie on different sides.
    pub fn cut_weight(&self, partition: &Partition) -> Result<f64, PartitionError> {
        partition.check_covers(self)?;
        Ok(self.cut_of(partition.sides()))
    }

    /// Reduction in cut weight from moving `vx` to the other side: the weight
    /// of its edges into the opposite side minus the weight of its edges into
    /// its own side. Runs in O(degree(vx)).
    pub fn vertex_gain(&self, partition: &Partition, vx: usize) -> Result<f64, PartitionError> {
        partition.check_covers(self)?;
        if vx >= self.vertex_count() {
            return Err(PartitionError::VertexOutOfRange {
                vertex: vx,
                vertex_count: self.vertex_count(),
            });
        }
        Ok(self.gain_of(partition.sides(), vx))
    }

    pub(crate) fn cut_of(&self, sides: &[Side]) -> f64 {
        self.vertices()
            .map(|src| {
                self.neighbours(src)
                    .iter()
                    .filter(|e| e.dst > src && sides[e.dst] != sides[src])
                    .map(|e| e.weight)
                    .sum::<f64>()
            })
            .sum()
    }

    pub(crate) fn gain_of(&self, sides: &[Side], vx: usize) -> f64 {
        let own = sides[vx];
        self.neighbours(vx).iter().fold(0.0, |gain, e| {
            if sides[e.dst] == own {
                gain - e.weight
            } else {
                gain + e.weight
            }
        })
    }
}
