//! A research harness for attribute-filtered Approximate Nearest Neighbor search.
//!
//! Every point of a vector dataset carries a set of attribute ids. A filtered search returns
//! the nearest neighbors of a query among the points whose attribute set contains all of the
//! query's attributes. This library measures how the in-memory representation of those sets,
//! a fixed-width [`DenseBitSet`] or a roaring-backed [`CompressedBitmap`], affects search
//! latency and memory as the density of attributes changes.
//!
//! ## Filtering a search
//!
//! ```
//! use filtered_ann_bench::{AnnIndex, AttributeCatalog, AttributeSet, BruteForceIndex,
//!                          CompressedBitmap, IndexParams, Metric, SupersetFilter};
//!
//! let sets = vec![
//!     CompressedBitmap::from_ids(8, [1, 2]).unwrap(),
//!     CompressedBitmap::from_ids(8, [2]).unwrap(),
//!     CompressedBitmap::from_ids(8, [1, 2, 5]).unwrap(),
//! ];
//! let catalog = AttributeCatalog::from_sets(8, sets).unwrap();
//!
//! let points = ndarray::array![[0.0_f32, 0.0], [0.1, 0.0], [1.0, 1.0]];
//! let mut index = BruteForceIndex::create(&IndexParams::new(Metric::Euclidean, 2, 3)).unwrap();
//! for (label, point) in points.outer_iter().enumerate() {
//!     index.insert(point, label).unwrap();
//! }
//!
//! let query = CompressedBitmap::from_ids(8, [1, 2]).unwrap();
//! let filter = SupersetFilter::new(&catalog, &query);
//! let neighbors = index.search_nearest_filtered(points.row(1), 2, &filter).unwrap();
//! assert_eq!(vec![0, 2], neighbors.iter().map(|n| n.label).collect::<Vec<_>>());
//! ```
//!
//! ## Running a sweep
//!
//! ```no_run
//! use filtered_ann_bench::{BenchmarkConfig, BenchmarkDriver, DenseBitSet, HnswIndex,
//!                          ResultWriter};
//!
//! let driver = BenchmarkDriver::<DenseBitSet, HnswIndex>::new(BenchmarkConfig::default())
//!     .expect("invalid configuration");
//! let mut writer = ResultWriter::open("benchmark_results.csv")
//!     .expect("failed to open the result file");
//! driver.sweep(&mut writer).expect("benchmark failed");
//! ```

pub mod error;
pub mod types;
pub mod index;
pub mod bench;

pub use crate::error::{BenchError, Result};

pub use crate::types::{AttributeId, Label, Metric, Representation};
pub use crate::types::attribute_set::{same_members, AttributeSet};
pub use crate::types::dense::DenseBitSet;
pub use crate::types::compressed::CompressedBitmap;
pub use crate::types::catalog::AttributeCatalog;
pub use crate::types::filter::{AcceptAll, LabelFilter, SupersetFilter};

pub use crate::index::{AnnIndex, IndexParams, Neighbor};
pub use crate::index::brute_force::BruteForceIndex;
pub use crate::index::hnsw::HnswIndex;

pub use crate::bench::config::BenchmarkConfig;
pub use crate::bench::driver::{BenchmarkDriver, BenchmarkRow, Trial, QUERY_LABEL};
pub use crate::bench::report::ResultWriter;
