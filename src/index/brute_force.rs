use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use ndarray::{Array1, ArrayView1};

use crate::error::{BenchError, Result};
use crate::index::{distance, AnnIndex, IndexParams, Neighbor};
use crate::types::filter::LabelFilter;
use crate::types::Label;

/// An exact index that compares the query against every admitted point.
///
/// It honors the same ordering contract as the graph index, which makes it the reference
/// engine in tests.
pub struct BruteForceIndex {
    params: IndexParams,
    points: Vec<(Label, Array1<f32>)>,
    labels: HashSet<Label>,
}

/// Max-heap entry keyed on distance, so the worst of the current top-k sits on top.
#[derive(PartialEq)]
struct Candidate(Neighbor);

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Candidate) -> Ordering {
        self.0.cmp_by_distance(&other.0)
    }
}

impl AnnIndex for BruteForceIndex {
    fn create(params: &IndexParams) -> Result<Self> {
        params.validate()?;
        Ok(BruteForceIndex {
            params: params.clone(),
            points: Vec::new(),
            labels: HashSet::new(),
        })
    }

    fn insert(&mut self, vector: ArrayView1<f32>, label: Label) -> Result<()> {
        if self.points.len() >= self.params.capacity {
            return Err(BenchError::CapacityExceeded { capacity: self.params.capacity });
        }
        self.params.check_dimensions(&vector)?;
        if !self.labels.insert(label) {
            return Err(BenchError::DuplicateLabel(label));
        }
        self.points.push((label, vector.to_owned()));
        Ok(())
    }

    fn search_nearest_filtered<F: LabelFilter>(
        &self,
        query: ArrayView1<f32>,
        k: usize,
        filter: &F,
    ) -> Result<Vec<Neighbor>> {
        self.params.check_dimensions(&query)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        self.points.iter()
            .filter(|(label, _)| filter.test(*label))
            .for_each(|(label, point)| {
                let candidate = Candidate(Neighbor {
                    distance: distance(self.params.metric, query, point.view()),
                    label: *label,
                });
                if heap.len() < k {
                    heap.push(candidate);
                } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                    heap.pop();
                    heap.push(candidate);
                }
            });

        Ok(heap.into_sorted_vec().into_iter().map(|c| c.0).collect())
    }

    fn len(&self) -> usize { self.points.len() }
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array2};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use crate::error::BenchError;
    use crate::index::brute_force::BruteForceIndex;
    use crate::index::{distance, AnnIndex, IndexParams};
    use crate::types::filter::AcceptAll;
    use crate::types::Label;
    use crate::Metric;

    struct EvenLabels;

    impl crate::LabelFilter for EvenLabels {
        fn test(&self, label: Label) -> bool { label % 2 == 0 }
    }

    fn sample_index(points: &Array2<f32>) -> BruteForceIndex {
        let params = IndexParams::new(Metric::Euclidean, points.ncols(), points.nrows());
        let mut index = BruteForceIndex::create(&params).unwrap();
        for (label, point) in points.outer_iter().enumerate() {
            index.insert(point, label).unwrap();
        }
        index
    }

    #[test]
    fn test_search_is_exact() {
        let points = Array2::random((200, 8), Uniform::new(0.0, 1.0));
        let index = sample_index(&points);
        let query = points.row(17);

        let result = index.search_nearest_filtered(query, 5, &AcceptAll).unwrap();
        assert_eq!(5, result.len());
        assert_eq!(17, result[0].label);
        assert_eq!(0.0, result[0].distance);

        let mut expected = points.outer_iter()
            .map(|point| distance(Metric::Euclidean, query, point))
            .collect::<Vec<_>>();
        expected.sort_by(|a, b| a.total_cmp(b));
        let distances = result.iter().map(|n| n.distance).collect::<Vec<_>>();
        assert_eq!(&expected[..5], &distances[..]);
    }

    #[test]
    fn test_search_filtered() {
        let points = Array2::random((50, 4), Uniform::new(0.0, 1.0));
        let index = sample_index(&points);

        let result = index.search_nearest_filtered(points.row(3), 10, &EvenLabels).unwrap();
        assert_eq!(10, result.len());
        assert!(result.iter().all(|n| n.label % 2 == 0));
        assert!(result.windows(2).all(|w| w[0].distance <= w[1].distance));

        // Fewer admitted points than requested.
        let result = index.search_nearest_filtered(points.row(3), 100, &EvenLabels).unwrap();
        assert_eq!(25, result.len());

        assert!(index.search_nearest_filtered(points.row(3), 0, &AcceptAll).unwrap().is_empty());
    }

    #[test]
    fn test_ties_break_on_label() {
        let points = array![[1.0_f32, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]];
        let index = sample_index(&points);
        let result = index.search_nearest_filtered(array![0.0_f32, 0.0].view(), 3, &AcceptAll)
            .unwrap();
        assert_eq!(vec![0, 1, 2], result.iter().map(|n| n.label).collect::<Vec<_>>());
    }

    #[test]
    fn test_insert_errors() {
        let params = IndexParams::new(Metric::Euclidean, 2, 2);
        let mut index = BruteForceIndex::create(&params).unwrap();
        assert!(index.is_empty());

        assert!(index.insert(array![1.0_f32, 2.0].view(), 7).is_ok());
        assert!(matches!(index.insert(array![1.0_f32, 2.0].view(), 7),
            Err(BenchError::DuplicateLabel(7))));
        assert!(matches!(index.insert(array![1.0_f32].view(), 8),
            Err(BenchError::DimensionMismatch { expected: 2, found: 1 })));
        assert!(index.insert(array![3.0_f32, 4.0].view(), 8).is_ok());
        assert!(matches!(index.insert(array![5.0_f32, 6.0].view(), 9),
            Err(BenchError::CapacityExceeded { capacity: 2 })));
        assert_eq!(2, index.len());

        assert!(matches!(index.search_nearest_filtered(array![1.0_f32].view(), 1, &AcceptAll),
            Err(BenchError::DimensionMismatch { .. })));
    }
}
