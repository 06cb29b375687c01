use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use filtered_ann_bench::bench::config::DEFAULT_DENSITIES;
use filtered_ann_bench::{AnnIndex, AttributeId, AttributeSet, BenchmarkConfig, BenchmarkDriver,
                         BruteForceIndex, CompressedBitmap, DenseBitSet, HnswIndex, Metric,
                         Representation, ResultWriter};
use tracing::info;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Engine {
    /// Hierarchical navigable small-world graph.
    Hnsw,
    /// Exact linear scan.
    BruteForce,
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of points, the query point included.
    #[clap(long, default_value_t = 10_000)]
    points: usize,

    /// Dimensionality of the vectors.
    #[clap(long, default_value_t = 16)]
    dimensions: usize,

    /// Size of the attribute universe.
    #[clap(long, default_value_t = 1000)]
    attributes: usize,

    /// Comma-separated attribute densities to sweep.
    #[clap(long, value_delimiter = ',', default_values_t = DEFAULT_DENSITIES.to_vec())]
    densities: Vec<f64>,

    /// Number of nearest neighbors to retrieve.
    #[clap(long, default_value_t = 2)]
    top_k: usize,

    /// Comma-separated attribute ids every result must carry.
    #[clap(long, value_delimiter = ',', default_values_t = vec![50, 100])]
    query_attributes: Vec<AttributeId>,

    /// Seed of the pseudo-random generator.
    #[clap(long, default_value_t = 48)]
    seed: u64,

    /// Distance metric [euclidean|cosine|inner-product].
    #[clap(long, default_value = "euclidean")]
    metric: Metric,

    /// Attribute set representations to benchmark [dense|compressed].
    #[clap(long, value_delimiter = ',',
           default_values_t = vec![Representation::Dense, Representation::Compressed])]
    representation: Vec<Representation>,

    /// Nearest-neighbor engine.
    #[clap(long, value_enum, default_value_t = Engine::Hnsw)]
    engine: Engine,

    /// Graph connectivity (M).
    #[clap(long, default_value_t = 16)]
    max_connections: usize,

    /// Search breadth while building the graph.
    #[clap(long, default_value_t = 200)]
    ef_construction: usize,

    /// Search breadth while querying the graph.
    #[clap(long, default_value_t = 10)]
    ef_search: usize,

    /// Number of times the query is timed per density; the mean is reported.
    #[clap(long, default_value_t = 1)]
    repetitions: usize,

    /// Directory the result files are appended to.
    #[clap(long, default_value = ".")]
    output_dir: PathBuf,

    /// Show a progress bar while building the index.
    #[clap(long)]
    progress: bool,
}

impl Args {
    fn config(&self) -> BenchmarkConfig {
        BenchmarkConfig {
            num_points: self.points,
            dimensions: self.dimensions,
            universe: self.attributes,
            densities: self.densities.clone(),
            k: self.top_k,
            query_attributes: self.query_attributes.clone(),
            seed: self.seed,
            metric: self.metric,
            max_connections: self.max_connections,
            ef_construction: self.ef_construction,
            ef_search: self.ef_search,
            repetitions: self.repetitions,
            show_progress: self.progress,
        }
    }
}

fn sweep<S: AttributeSet, I: AnnIndex>(config: &BenchmarkConfig, path: &Path) -> anyhow::Result<()> {
    let driver = BenchmarkDriver::<S, I>::new(config.clone())
        .context("Invalid benchmark configuration")?;
    let mut writer = ResultWriter::open(path)
        .with_context(|| format!("Unable to open result file {}", path.display()))?;
    let rows = driver.sweep(&mut writer)?;
    info!("Appended {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("filtered_search_bench=info".parse()?)
                .add_directive("filtered_ann_bench=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = args.config();

    for representation in &args.representation {
        let path = args.output_dir.join(representation.default_output());
        info!("Benchmarking {} attribute sets with {:?}", representation, args.engine);
        match (representation, args.engine) {
            (Representation::Dense, Engine::Hnsw) =>
                sweep::<DenseBitSet, HnswIndex>(&config, &path)?,
            (Representation::Dense, Engine::BruteForce) =>
                sweep::<DenseBitSet, BruteForceIndex>(&config, &path)?,
            (Representation::Compressed, Engine::Hnsw) =>
                sweep::<CompressedBitmap, HnswIndex>(&config, &path)?,
            (Representation::Compressed, Engine::BruteForce) =>
                sweep::<CompressedBitmap, BruteForceIndex>(&config, &path)?,
        }
    }
    Ok(())
}
