use crate::error::{BenchError, Result};
use crate::index::{IndexParams, DEFAULT_EF_CONSTRUCTION, DEFAULT_EF_SEARCH, DEFAULT_MAX_CONNECTIONS};
use crate::types::{AttributeId, Metric};

/// Attribute densities swept by the reference benchmark.
pub const DEFAULT_DENSITIES: [f64; 8] = [0.001, 0.01, 0.05, 0.1, 0.2, 0.3, 0.4, 0.5];

/// Every input of a benchmark sweep.
///
/// `Default` gives the reference configuration: 10,000 points in 16 dimensions, a universe of
/// 1,000 attributes, the two-nearest neighbors of point 0 restricted to points carrying
/// attributes 50 and 100, and seed 48.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    /// Number of points, the query point included.
    pub num_points: usize,
    pub dimensions: usize,
    /// Size of the attribute universe.
    pub universe: usize,
    /// Densities to sweep, in order.
    pub densities: Vec<f64>,
    /// Number of neighbors requested.
    pub k: usize,
    /// Attributes every result must carry.
    pub query_attributes: Vec<AttributeId>,
    pub seed: u64,
    pub metric: Metric,
    pub max_connections: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
    /// Number of times the timed query runs; the reported latency is the mean.
    pub repetitions: usize,
    /// Draws a progress bar while the index is built.
    pub show_progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_points: 10_000,
            dimensions: 16,
            universe: 1000,
            densities: DEFAULT_DENSITIES.to_vec(),
            k: 2,
            query_attributes: vec![50, 100],
            seed: 48,
            metric: Metric::Euclidean,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            ef_construction: DEFAULT_EF_CONSTRUCTION,
            ef_search: DEFAULT_EF_SEARCH,
            repetitions: 1,
            show_progress: false,
        }
    }
}

impl BenchmarkConfig {
    /// Returns an error describing the first setting that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(BenchError::InvalidConfig(message));

        if self.num_points < 2 {
            return invalid(format!(
                "at least 2 points are needed (one is the query), got {}", self.num_points));
        }
        if self.dimensions == 0 {
            return invalid("dimensions must be greater than zero".to_string());
        }
        if self.universe == 0 {
            return invalid("the attribute universe must not be empty".to_string());
        }
        if self.universe > AttributeId::MAX as usize + 1 {
            return invalid(format!("the attribute universe is limited to {} ids",
                                   AttributeId::MAX as usize + 1));
        }
        if self.k == 0 {
            return invalid("k must be greater than zero".to_string());
        }
        if self.repetitions == 0 {
            return invalid("repetitions must be greater than zero".to_string());
        }
        if self.densities.is_empty() {
            return invalid("at least one density is needed".to_string());
        }
        if let Some(density) = self.densities.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return invalid(format!("density {} is not in [0, 1]", density));
        }
        if self.query_attributes.is_empty() {
            return invalid("the query must require at least one attribute".to_string());
        }
        if let Some(id) = self.query_attributes.iter().find(|&&id| id as usize >= self.universe) {
            return invalid(format!(
                "query attribute {} is outside the universe [0, {})", id, self.universe));
        }
        self.index_params().validate()
    }

    /// Parameters of the index built for each run.
    pub fn index_params(&self) -> IndexParams {
        IndexParams {
            metric: self.metric,
            dimensions: self.dimensions,
            capacity: self.num_points,
            max_connections: self.max_connections,
            ef_construction: self.ef_construction,
            ef_search: self.ef_search,
        }
    }
}
