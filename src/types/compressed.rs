use std::fmt;
use std::fmt::Formatter;

use roaring::RoaringBitmap;

use crate::error::{BenchError, Result};
use crate::types::attribute_set::{fmt_members, same_members, AttributeSet};
use crate::types::dense::DenseBitSet;
use crate::types::AttributeId;

/// A roaring bitmap over the attribute universe.
///
/// The bitmap itself has no upper bound; the universe is enforced here so that both
/// representations reject the same ids. Footprint grows with the number of populated
/// containers and their occupancy rather than with the universe.
#[derive(Clone, Debug)]
pub struct CompressedBitmap {
    bitmap: RoaringBitmap,
    universe: usize,
}

impl CompressedBitmap {
    /// Returns the underlying bitmap.
    pub fn bitmap(&self) -> &RoaringBitmap { &self.bitmap }
}

impl AttributeSet for CompressedBitmap {
    type Ids<'a> = roaring::bitmap::Iter<'a>;

    fn empty(universe: usize) -> Self {
        CompressedBitmap {
            bitmap: RoaringBitmap::new(),
            universe,
        }
    }

    fn universe(&self) -> usize { self.universe }

    fn add(&mut self, id: AttributeId) -> Result<bool> {
        if id as usize >= self.universe {
            return Err(BenchError::AttributeOutOfRange { id, universe: self.universe });
        }
        Ok(self.bitmap.insert(id))
    }

    fn contains(&self, id: AttributeId) -> bool {
        self.bitmap.contains(id)
    }

    fn contains_all(&self, other: &Self) -> bool {
        other.bitmap.is_subset(&self.bitmap)
    }

    fn intersect(&self, other: &Self) -> Self {
        CompressedBitmap {
            bitmap: &self.bitmap & &other.bitmap,
            universe: self.universe.min(other.universe),
        }
    }

    fn union(&self, other: &Self) -> Self {
        CompressedBitmap {
            bitmap: &self.bitmap | &other.bitmap,
            universe: self.universe.max(other.universe),
        }
    }

    fn len(&self) -> usize {
        self.bitmap.len() as usize
    }

    fn size_in_bytes(&self) -> usize {
        self.bitmap.serialized_size()
    }

    fn ids(&self) -> Self::Ids<'_> {
        self.bitmap.iter()
    }
}

impl PartialEq for CompressedBitmap {
    fn eq(&self, other: &Self) -> bool {
        self.bitmap == other.bitmap
    }
}

impl Eq for CompressedBitmap {}

impl PartialEq<DenseBitSet> for CompressedBitmap {
    fn eq(&self, other: &DenseBitSet) -> bool {
        same_members(self, other)
    }
}

impl fmt::Display for CompressedBitmap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_members(self, f)
    }
}
