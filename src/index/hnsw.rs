use std::borrow::Cow;
use std::collections::HashSet;

use hnsw_rs::hnsw::FilterT;
use hnsw_rs::prelude::{DataId, DistCosine, DistL2, Hnsw, Neighbour};
use ndarray::ArrayView1;

use crate::error::{BenchError, Result};
use crate::index::{AnnIndex, IndexParams, Neighbor};
use crate::types::filter::LabelFilter;
use crate::types::{Label, Metric};

/// Maximum number of graph layers; `hnsw_rs` supports at most 16.
const MAX_LAYERS: usize = 16;

enum Graph {
    Euclidean(Hnsw<'static, f32, DistL2>),
    Cosine(Hnsw<'static, f32, DistCosine>),
}

/// Presents a [`LabelFilter`] to `hnsw_rs`, which probes candidates by data id.
struct FilterBridge<'a, F: LabelFilter>(&'a F);

impl<F: LabelFilter> FilterT for FilterBridge<'_, F> {
    fn hnsw_filter(&self, id: &DataId) -> bool {
        self.0.test(*id)
    }
}

/// A hierarchical navigable small-world graph index backed by `hnsw_rs`.
///
/// Supports the Euclidean and cosine metrics. The filter is applied while the graph is
/// traversed, so a selective filter may leave the result shorter than `k` even when more
/// matching points exist.
pub struct HnswIndex {
    graph: Graph,
    params: IndexParams,
    labels: HashSet<Label>,
}

impl HnswIndex {
    /// Effective search breadth for a request of `k` neighbors.
    pub fn ef_for(&self, k: usize) -> usize {
        self.params.ef_search.max(k)
    }
}

fn as_slice<'a>(vector: &'a ArrayView1<f32>) -> Cow<'a, [f32]> {
    match vector.as_slice() {
        Some(slice) => Cow::Borrowed(slice),
        None => Cow::Owned(vector.to_vec()),
    }
}

impl AnnIndex for HnswIndex {
    fn create(params: &IndexParams) -> Result<Self> {
        params.validate()?;
        let graph = match params.metric {
            Metric::Euclidean => Graph::Euclidean(Hnsw::new(
                params.max_connections,
                params.capacity,
                MAX_LAYERS,
                params.ef_construction,
                DistL2 {},
            )),
            Metric::Cosine => Graph::Cosine(Hnsw::new(
                params.max_connections,
                params.capacity,
                MAX_LAYERS,
                params.ef_construction,
                DistCosine {},
            )),
            Metric::InnerProduct => {
                return Err(BenchError::InvalidConfig(
                    "the graph index supports euclidean and cosine metrics only".to_string()));
            }
        };
        Ok(HnswIndex {
            graph,
            params: params.clone(),
            labels: HashSet::with_capacity(params.capacity),
        })
    }

    fn insert(&mut self, vector: ArrayView1<f32>, label: Label) -> Result<()> {
        if self.labels.len() >= self.params.capacity {
            return Err(BenchError::CapacityExceeded { capacity: self.params.capacity });
        }
        self.params.check_dimensions(&vector)?;
        if !self.labels.insert(label) {
            return Err(BenchError::DuplicateLabel(label));
        }

        let data = as_slice(&vector);
        match &self.graph {
            Graph::Euclidean(hnsw) => hnsw.insert_slice((&*data, label)),
            Graph::Cosine(hnsw) => hnsw.insert_slice((&*data, label)),
        }
        Ok(())
    }

    fn search_nearest_filtered<F: LabelFilter>(
        &self,
        query: ArrayView1<f32>,
        k: usize,
        filter: &F,
    ) -> Result<Vec<Neighbor>> {
        self.params.check_dimensions(&query)?;
        if k == 0 || self.labels.is_empty() {
            return Ok(Vec::new());
        }

        let data = as_slice(&query);
        let ef = self.ef_for(k);
        let bridge = FilterBridge(filter);
        let found: Vec<Neighbour> = match &self.graph {
            Graph::Euclidean(hnsw) => hnsw.search_filter(&*data, k, ef, Some(&bridge)),
            Graph::Cosine(hnsw) => hnsw.search_filter(&*data, k, ef, Some(&bridge)),
        };

        let mut neighbors = found.iter()
            .map(|n| Neighbor { distance: n.distance, label: n.d_id })
            .collect::<Vec<_>>();
        neighbors.sort_by(|a, b| a.cmp_by_distance(b));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    fn len(&self) -> usize { self.labels.len() }
}
