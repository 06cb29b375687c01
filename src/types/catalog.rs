use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::{Bernoulli, Distribution};

use crate::error::{BenchError, Result};
use crate::types::attribute_set::AttributeSet;
use crate::types::{AttributeId, Label};

/// One attribute set per point, indexed by label.
///
/// A catalog is built in one go, either by [`populate`](AttributeCatalog::populate) or from
/// explicit sets, and is read-only afterwards.
#[derive(Debug, Clone)]
pub struct AttributeCatalog<S: AttributeSet> {
    sets: Vec<S>,
    universe: usize,
    total_set_bits: usize,
}

impl<S: AttributeSet> AttributeCatalog<S> {
    /// Draws attribute sets for labels `[0, n)`.
    ///
    /// Each of the `universe` attributes is present on a label independently with probability
    /// `density`. The outcome depends only on the state of `rng`, so a reseeded generator
    /// reproduces the catalog exactly.
    ///
    /// Returns an error if `density` is not a probability or if `universe` holds more ids
    /// than an [`AttributeId`] can name.
    pub fn populate<R: Rng + ?Sized>(
        n: usize,
        universe: usize,
        density: f64,
        rng: &mut R,
    ) -> Result<AttributeCatalog<S>> {
        Self::populate_reserved(n, universe, density, 0, rng)
    }

    /// Like [`populate`](AttributeCatalog::populate), but labels `[0, reserved)` get an empty
    /// set and draw nothing from `rng`.
    pub fn populate_reserved<R: Rng + ?Sized>(
        n: usize,
        universe: usize,
        density: f64,
        reserved: usize,
        rng: &mut R,
    ) -> Result<AttributeCatalog<S>> {
        if !(0.0..=1.0).contains(&density) {
            return Err(BenchError::InvalidConfig(
                format!("density must lie in [0, 1], got {}", density)));
        }
        if universe > AttributeId::MAX as usize + 1 {
            return Err(BenchError::InvalidConfig(
                format!("the attribute universe is limited to {} ids", AttributeId::MAX as u64 + 1)));
        }
        let trial = Bernoulli::new(density)
            .map_err(|e| BenchError::InvalidConfig(e.to_string()))?;

        let mut sets = Vec::with_capacity(n);
        let mut total_set_bits = 0_usize;
        for label in 0..n {
            let mut set = S::empty(universe);
            if label >= reserved {
                for id in 0..universe {
                    if trial.sample(rng) {
                        set.add(AttributeId::try_from(id).map_err(|e| {
                            BenchError::InvalidConfig(e.to_string())
                        })?)?;
                        total_set_bits += 1;
                    }
                }
            }
            sets.push(set);
        }

        Ok(AttributeCatalog { sets, universe, total_set_bits })
    }

    /// Creates a catalog from explicit sets; the set at position `i` belongs to label `i`.
    ///
    /// Returns an error if any set was created for a different universe.
    pub fn from_sets(universe: usize, sets: Vec<S>) -> Result<AttributeCatalog<S>> {
        if let Some(set) = sets.iter().find(|set| set.universe() != universe) {
            return Err(BenchError::InvalidConfig(format!(
                "attribute set over a universe of {} in a catalog over {}",
                set.universe(), universe)));
        }
        let total_set_bits = sets.iter().map(|set| set.len()).sum();
        Ok(AttributeCatalog { sets, universe, total_set_bits })
    }

    /// Returns the attribute set of `label`.
    pub fn get(&self, label: Label) -> Result<&S> {
        self.sets.get(label)
            .ok_or(BenchError::LabelOutOfRange { label, len: self.sets.len() })
    }

    /// Number of labels in the catalog.
    pub fn len(&self) -> usize { self.sets.len() }

    pub fn is_empty(&self) -> bool { self.sets.is_empty() }

    pub fn universe(&self) -> usize { self.universe }

    /// Total number of attributes set across all labels.
    pub fn total_set_bits(&self) -> usize { self.total_set_bits }

    /// Sum of the footprint of every attribute set, empty ones included.
    pub fn size_in_bytes(&self) -> usize {
        self.sets.iter().map(|set| set.size_in_bytes()).sum()
    }

    /// Fraction of attribute slots left unset across the catalog.
    pub fn sparsity(&self) -> f64 {
        let slots = self.sets.len() * self.universe;
        if slots == 0 {
            return 1.0;
        }
        1.0 - self.total_set_bits as f64 / slots as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.sets.iter()
    }
}
