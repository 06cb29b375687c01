use thiserror::Error;

use crate::types::{AttributeId, Label};

/// Errors raised by attribute sets, the catalog, the index adapters and the driver.
///
/// None of these are expected at runtime: each one marks a broken invariant and aborts the
/// benchmark iteration that raised it.
#[derive(Debug, Error)]
pub enum BenchError {
    /// An attribute id outside `[0, universe)`.
    #[error("attribute id {id} is outside the universe [0, {universe})")]
    AttributeOutOfRange { id: AttributeId, universe: usize },

    /// A label outside the populated catalog.
    #[error("label {label} is outside the catalog [0, {len})")]
    LabelOutOfRange { label: Label, len: usize },

    /// More points inserted than the index was sized for.
    #[error("index capacity of {capacity} points exceeded")]
    CapacityExceeded { capacity: usize },

    #[error("vector has {found} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("label {0} was already inserted into the index")]
    DuplicateLabel(Label),

    /// The engine returned a neighbor the filter rejects.
    #[error("search returned label {label} whose attributes do not satisfy the query")]
    FilterViolation { label: Label },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;
