use std::io::Write;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use anyhow::Context;
use ndarray::Array2;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, error, info};

use crate::bench::config::BenchmarkConfig;
use crate::bench::report::ResultWriter;
use crate::error::Result;
use crate::index::{AnnIndex, Neighbor};
use crate::types::attribute_set::AttributeSet;
use crate::types::catalog::AttributeCatalog;
use crate::types::filter::SupersetFilter;
use crate::types::Label;

/// The point used as the query. It carries no attributes and is never inserted into the index.
pub const QUERY_LABEL: Label = 0;

/// Measurements of one density value.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRow {
    /// Probability of each attribute being present on a point.
    pub density: f64,
    /// Fraction of attribute slots left unset.
    pub sparsity: f64,
    /// Seconds spent in the filtered search, averaged over repetitions.
    pub search_latency: f64,
    /// Total footprint of the attribute sets.
    pub memory_bytes: usize,
}

/// The outcome of one run: its measurements and the neighbors the search returned.
#[derive(Debug, Clone)]
pub struct Trial {
    pub row: BenchmarkRow,
    pub neighbors: Vec<Neighbor>,
}

/// Runs the filtered-search benchmark for attribute sets of type `S` on an index of type `I`.
///
/// Every run starts from a generator reseeded with the configured seed and owns its vectors,
/// catalog and index; all three are dropped before the next run begins.
pub struct BenchmarkDriver<S: AttributeSet, I: AnnIndex> {
    config: BenchmarkConfig,
    _marker: PhantomData<fn() -> (S, I)>,
}

/// Progress bar over the points inserted into the index.
fn insert_progress(points: usize) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new(points as u64);
    pb.set_draw_delta((points / 100).max(1) as u64);
    pb.set_style(indicatif::ProgressStyle::default_bar().template(
        "Inserting points: [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})"));
    pb
}

impl<S: AttributeSet, I: AnnIndex> BenchmarkDriver<S, I> {
    /// Creates a driver, or returns an error if `config` is invalid.
    pub fn new(config: BenchmarkConfig) -> Result<BenchmarkDriver<S, I>> {
        config.validate()?;
        Ok(BenchmarkDriver { config, _marker: PhantomData })
    }

    pub fn config(&self) -> &BenchmarkConfig { &self.config }

    /// Generates data, builds the index and times the filtered query for one density.
    ///
    /// Every returned neighbor is checked against the filter; a neighbor that does not carry
    /// the query attributes is reported as an error.
    pub fn run(&self, density: f64) -> Result<Trial> {
        let config = &self.config;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        let vectors = Array2::random_using(
            (config.num_points, config.dimensions),
            Uniform::new(0.0_f32, 1.0_f32),
            &mut rng,
        );

        let started = Instant::now();
        let catalog = AttributeCatalog::<S>::populate_reserved(
            config.num_points, config.universe, density, QUERY_LABEL + 1, &mut rng)?;
        debug!(density, elapsed = ?started.elapsed(), set_bits = catalog.total_set_bits(),
               "attributes assigned");

        let started = Instant::now();
        let index = self.build_index(&vectors)?;
        debug!(density, elapsed = ?started.elapsed(), points = index.len(), "index built");

        let query_set = S::from_ids(config.universe, config.query_attributes.iter().copied())?;
        let filter = SupersetFilter::new(&catalog, &query_set);
        let query = vectors.row(QUERY_LABEL);

        let mut elapsed = Duration::ZERO;
        let mut neighbors = Vec::new();
        for _ in 0..config.repetitions {
            let started = Instant::now();
            neighbors = index.search_nearest_filtered(query, config.k, &filter)?;
            elapsed += started.elapsed();
        }
        filter.verify(neighbors.iter().map(|neighbor| neighbor.label))?;

        let row = BenchmarkRow {
            density,
            sparsity: catalog.sparsity(),
            search_latency: elapsed.as_secs_f64() / config.repetitions as f64,
            memory_bytes: catalog.size_in_bytes(),
        };
        Ok(Trial { row, neighbors })
    }

    fn build_index(&self, vectors: &Array2<f32>) -> Result<I> {
        let mut index = I::create(&self.config.index_params())?;
        let pb = if self.config.show_progress {
            insert_progress(vectors.nrows() - 1)
        } else {
            indicatif::ProgressBar::hidden()
        };
        for (label, point) in vectors.outer_iter().enumerate().skip(QUERY_LABEL + 1) {
            index.insert(point, label)?;
            pb.inc(1);
        }
        pb.finish_and_clear();
        Ok(index)
    }

    /// Runs every configured density in order, appending each row to `writer` as soon as it
    /// is measured.
    ///
    /// Stops at the first failing density and returns an error naming it; rows written
    /// before the failure are kept.
    pub fn sweep<W: Write>(&self, writer: &mut ResultWriter<W>) -> anyhow::Result<Vec<BenchmarkRow>> {
        let mut rows = Vec::with_capacity(self.config.densities.len());
        for &density in &self.config.densities {
            let trial = self.run(density)
                .inspect_err(|e| error!(density, "benchmark aborted: {}", e))
                .with_context(|| format!("Benchmark failed at probability {}", density))?;
            writer.append(&trial.row)
                .with_context(|| format!("Failed to write the row for probability {}", density))?;

            info!(sparsity = trial.row.sparsity,
                  search_latency = trial.row.search_latency,
                  memory = trial.row.memory_bytes,
                  matches = trial.neighbors.len(),
                  "Completed probability: {}", density);
            rows.push(trial.row);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use approx_eq::assert_approx_eq;
    use ndarray::ArrayView1;
    use crate::bench::config::BenchmarkConfig;
    use crate::bench::driver::{BenchmarkDriver, QUERY_LABEL};
    use crate::bench::report::{ResultWriter, HEADER};
    use crate::error::{BenchError, Result};
    use crate::index::brute_force::BruteForceIndex;
    use crate::index::{AnnIndex, IndexParams, Neighbor};
    use crate::types::filter::LabelFilter;
    use crate::types::Label;
    use crate::types::compressed::CompressedBitmap;
    use crate::types::dense::DenseBitSet;

    fn small_config() -> BenchmarkConfig {
        BenchmarkConfig {
            num_points: 300,
            dimensions: 4,
            universe: 64,
            densities: vec![0.1, 0.5],
            query_attributes: vec![3, 7],
            ..Default::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = BenchmarkConfig { k: 0, ..small_config() };
        assert!(BenchmarkDriver::<DenseBitSet, BruteForceIndex>::new(config).is_err());
    }

    #[test]
    fn test_run() {
        let driver = BenchmarkDriver::<DenseBitSet, BruteForceIndex>::new(small_config()).unwrap();
        let trial = driver.run(0.5).unwrap();

        assert_eq!(2, trial.neighbors.len());
        assert!(trial.neighbors.iter().all(|n| n.label != QUERY_LABEL));
        assert!(trial.neighbors[0].distance <= trial.neighbors[1].distance);
        assert_eq!(300 * 8, trial.row.memory_bytes);
        assert_approx_eq!(trial.row.sparsity, 0.5 + 0.5 / 300.0, 0.05);
        assert!(trial.row.search_latency >= 0.0);
    }

    #[test]
    fn test_run_is_reproducible_across_representations() {
        let dense = BenchmarkDriver::<DenseBitSet, BruteForceIndex>::new(small_config()).unwrap();
        let compressed =
            BenchmarkDriver::<CompressedBitmap, BruteForceIndex>::new(small_config()).unwrap();

        for density in [0.1, 0.3] {
            let a = dense.run(density).unwrap();
            let b = compressed.run(density).unwrap();
            assert_eq!(a.neighbors, b.neighbors);
            assert_eq!(a.row.sparsity, b.row.sparsity);
            assert_eq!(a.neighbors, dense.run(density).unwrap().neighbors);
        }
    }

    #[test]
    fn test_repetitions() {
        let config = BenchmarkConfig { repetitions: 3, ..small_config() };
        let driver = BenchmarkDriver::<CompressedBitmap, BruteForceIndex>::new(config).unwrap();
        let trial = driver.run(0.5).unwrap();
        assert_eq!(2, trial.neighbors.len());
    }

    #[test]
    fn test_run_with_progress() {
        let config = BenchmarkConfig { show_progress: true, ..small_config() };
        let driver = BenchmarkDriver::<DenseBitSet, BruteForceIndex>::new(config).unwrap();
        let trial = driver.run(0.5).unwrap();
        assert_eq!(2, trial.neighbors.len());
    }

    #[test]
    fn test_sweep() {
        let driver =
            BenchmarkDriver::<CompressedBitmap, BruteForceIndex>::new(small_config()).unwrap();
        let mut writer = ResultWriter::new(Vec::new()).unwrap();
        let rows = driver.sweep(&mut writer).unwrap();

        assert_eq!(2, rows.len());
        assert_eq!(0.1, rows[0].density);
        assert_eq!(0.5, rows[1].density);
        assert!(rows[0].sparsity > rows[1].sparsity);
        assert!(rows[0].memory_bytes <= rows[1].memory_bytes);

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(3, lines.len());
        assert_eq!(HEADER, lines[0]);
        assert!(lines[1].starts_with("0.1,"));
        assert!(lines[2].starts_with("0.5,"));
    }

    thread_local! {
        static CREATED: Cell<usize> = Cell::new(0);
    }

    /// An exact index whose second creation on the current thread fails.
    struct FailsOnSecondCreate(BruteForceIndex);

    impl AnnIndex for FailsOnSecondCreate {
        fn create(params: &IndexParams) -> Result<Self> {
            let created = CREATED.with(|c| {
                c.set(c.get() + 1);
                c.get()
            });
            if created == 2 {
                return Err(BenchError::CapacityExceeded { capacity: params.capacity });
            }
            Ok(FailsOnSecondCreate(BruteForceIndex::create(params)?))
        }

        fn insert(&mut self, vector: ArrayView1<f32>, label: Label) -> Result<()> {
            self.0.insert(vector, label)
        }

        fn search_nearest_filtered<F: LabelFilter>(
            &self,
            query: ArrayView1<f32>,
            k: usize,
            filter: &F,
        ) -> Result<Vec<Neighbor>> {
            self.0.search_nearest_filtered(query, k, filter)
        }

        fn len(&self) -> usize { self.0.len() }
    }

    #[test]
    fn test_sweep_stops_at_failing_density() {
        CREATED.with(|c| c.set(0));
        let config = BenchmarkConfig {
            num_points: 100,
            densities: vec![0.1, 0.3, 0.5],
            ..small_config()
        };
        let driver = BenchmarkDriver::<CompressedBitmap, FailsOnSecondCreate>::new(config).unwrap();
        let mut writer = ResultWriter::new(Vec::new()).unwrap();

        let err = driver.sweep(&mut writer).unwrap_err();
        assert!(format!("{:#}", err).contains("probability 0.3"), "{:#}", err);
        assert!(matches!(err.downcast_ref::<BenchError>(),
                         Some(BenchError::CapacityExceeded { capacity: 100 })));
        // Density 0.5 was never attempted.
        assert_eq!(2, CREATED.with(|c| c.get()));

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(2, lines.len());
        assert_eq!(HEADER, lines[0]);
        assert!(lines[1].starts_with("0.1,"));
    }
}
