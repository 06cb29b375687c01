use std::cmp::Ordering;

use ndarray::ArrayView1;

use crate::error::{BenchError, Result};
use crate::types::filter::LabelFilter;
use crate::types::{Label, Metric};

pub mod brute_force;
pub mod hnsw;

/// Default number of graph neighbors per node (`M`).
pub const DEFAULT_MAX_CONNECTIONS: usize = 16;
/// Default candidate list size while building the graph.
pub const DEFAULT_EF_CONSTRUCTION: usize = 200;
/// Default candidate list size while searching; raised to `k` when smaller.
pub const DEFAULT_EF_SEARCH: usize = 10;

/// A search hit: a label and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub distance: f32,
    pub label: Label,
}

impl Neighbor {
    /// Orders by ascending distance, then by ascending label.
    pub fn cmp_by_distance(&self, other: &Neighbor) -> Ordering {
        self.distance.total_cmp(&other.distance)
            .then_with(|| self.label.cmp(&other.label))
    }
}

/// Settings an index is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexParams {
    pub metric: Metric,
    pub dimensions: usize,
    /// Maximum number of points the index accepts.
    pub capacity: usize,
    /// Graph connectivity (`M`); ignored by exact engines.
    pub max_connections: usize,
    /// Build-time search breadth; ignored by exact engines.
    pub ef_construction: usize,
    /// Query-time search breadth; ignored by exact engines.
    pub ef_search: usize,
}

impl IndexParams {
    pub fn new(metric: Metric, dimensions: usize, capacity: usize) -> IndexParams {
        IndexParams {
            metric,
            dimensions,
            capacity,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            ef_construction: DEFAULT_EF_CONSTRUCTION,
            ef_search: DEFAULT_EF_SEARCH,
        }
    }

    /// Returns an error if any setting is zero.
    pub fn validate(&self) -> Result<()> {
        let settings = [
            ("dimensions", self.dimensions),
            ("capacity", self.capacity),
            ("max_connections", self.max_connections),
            ("ef_construction", self.ef_construction),
            ("ef_search", self.ef_search),
        ];
        if let Some((name, _)) = settings.iter().find(|(_, value)| *value == 0) {
            return Err(BenchError::InvalidConfig(format!("{} must be greater than zero", name)));
        }
        Ok(())
    }

    pub(crate) fn check_dimensions(&self, vector: &ArrayView1<f32>) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(BenchError::DimensionMismatch {
                expected: self.dimensions,
                found: vector.len(),
            });
        }
        Ok(())
    }
}

/// The narrow surface the benchmark needs from a nearest-neighbor engine.
pub trait AnnIndex: Sized {
    /// Creates an empty index.
    fn create(params: &IndexParams) -> Result<Self>;

    /// Adds one point. Each label may be inserted once.
    ///
    /// Returns an error if the index is full, the label is already present, or the vector
    /// has the wrong number of dimensions.
    fn insert(&mut self, vector: ArrayView1<f32>, label: Label) -> Result<()>;

    /// Returns up to `k` points admitted by `filter`, closest first.
    ///
    /// Fewer than `k` hits, including none at all, is a valid outcome when few points pass
    /// the filter.
    fn search_nearest_filtered<F: LabelFilter>(
        &self,
        query: ArrayView1<f32>,
        k: usize,
        filter: &F,
    ) -> Result<Vec<Neighbor>>;

    /// Number of points inserted so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Distance between `a` and `b` under `metric`; smaller is closer.
pub fn distance(metric: Metric, a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    match metric {
        Metric::Euclidean => {
            a.iter().zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt()
        }
        Metric::Cosine => {
            let norms = a.dot(&a).sqrt() * b.dot(&b).sqrt();
            if norms == 0.0 {
                return 1.0;
            }
            1.0 - a.dot(&b) / norms
        }
        Metric::InnerProduct => -a.dot(&b),
    }
}
