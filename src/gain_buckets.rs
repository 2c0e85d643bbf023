use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// A gain as an ordered map key. Weights are finite, so gains never hold NaN.
#[derive(Copy, Clone, Debug)]
struct GainKey(f64);

impl PartialEq for GainKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GainKey {}

impl PartialOrd for GainKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GainKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Vertices grouped into buckets of equal gain, kept in a balanced tree
/// ordered by gain.
///
/// Every member of a bucket has exactly the same gain, so the maximum is the
/// lowest id of the highest bucket. Insert, update and extraction are all
/// O(log n).
#[derive(Clone, Debug)]
pub(crate) struct GainBuckets {
    buckets: BTreeMap<GainKey, BTreeSet<usize>>,
    keys: Vec<Option<GainKey>>,
    len: usize,
}

impl GainBuckets {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            buckets: BTreeMap::new(),
            keys: vec![None; vertex_count],
            len: 0,
        }
    }

    fn key(gain: f64) -> GainKey {
        // Folds -0.0 into 0.0, which `total_cmp` would otherwise order apart.
        GainKey(gain + 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `vx`, or moves it to the bucket of its new gain.
    pub fn insert(&mut self, vx: usize, gain: f64) {
        self.remove(vx);
        let key = Self::key(gain);
        self.buckets.entry(key).or_default().insert(vx);
        self.keys[vx] = Some(key);
        self.len += 1;
    }

    pub fn remove(&mut self, vx: usize) -> Option<f64> {
        let key = self.keys[vx].take()?;
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.remove(&vx);
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
        self.len -= 1;
        Some(key.0)
    }

    /// The member with the largest gain, lowest id first on ties.
    pub fn peek_max(&self) -> Option<(usize, f64)> {
        let (key, bucket) = self.buckets.iter().next_back()?;
        bucket.iter().next().map(|&vx| (vx, key.0))
    }

    pub fn pop_max(&mut self) -> Option<(usize, f64)> {
        let (vx, gain) = self.peek_max()?;
        self.remove(vx);
        Some((vx, gain))
    }
}
