use std::fmt::{Display, Formatter};
use std::str::FromStr;
use anyhow::anyhow;

pub mod attribute_set;
pub mod dense;
pub mod compressed;
pub mod catalog;
pub mod filter;

/// Identifier of a point; dense in `[0, N)` within one benchmark run.
pub type Label = usize;

/// Identifier of an attribute from a fixed universe `[0, U)`.
pub type AttributeId = u32;

/// Distance functions the index adapters understand.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub enum Metric {
    Euclidean,
    Cosine,
    InnerProduct,
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Euclidean" | "euclidean" | "l2" => Ok(Metric::Euclidean),
            "Cosine" | "cosine" => Ok(Metric::Cosine),
            "InnerProduct" | "inner-product" | "dot-product" => Ok(Metric::InnerProduct),
            _ => Err(anyhow!("Metric must be one of [euclidean|cosine|inner-product]"))
        }
    }
}

/// In-memory representation of per-point attribute sets.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub enum Representation {
    /// Fixed-width bit vector, see [`dense::DenseBitSet`].
    Dense,
    /// Roaring bitmap, see [`compressed::CompressedBitmap`].
    Compressed,
}

impl Representation {
    /// File name the benchmark appends its rows to for this representation.
    pub fn default_output(&self) -> &'static str {
        match self {
            Representation::Dense => "benchmark_results.csv",
            Representation::Compressed => "roaring_benchmark_results.csv",
        }
    }
}

impl Display for Representation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Representation::Dense => write!(f, "dense"),
            Representation::Compressed => write!(f, "compressed"),
        }
    }
}

impl FromStr for Representation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dense" | "dense" | "bitset" => Ok(Representation::Dense),
            "Compressed" | "compressed" | "roaring" => Ok(Representation::Compressed),
            _ => Err(anyhow!("Representation must be one of [dense|compressed]"))
        }
    }
}
