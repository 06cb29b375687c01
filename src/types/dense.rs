use std::fmt;
use std::fmt::Formatter;

use crate::error::{BenchError, Result};
use crate::types::attribute_set::{fmt_members, same_members, AttributeSet};
use crate::types::compressed::CompressedBitmap;
use crate::types::AttributeId;

const WORD_BITS: usize = u64::BITS as usize;

/// A fixed-width bit vector with one bit per attribute in the universe.
///
/// Memory is `ceil(universe / 8)` bytes no matter how many attributes are set, and every
/// operation walks all `ceil(universe / 64)` words.
#[derive(Clone, Debug)]
pub struct DenseBitSet {
    words: Vec<u64>,
    universe: usize,
}

/// Iterator over the set bits of a [`DenseBitSet`], in ascending order.
pub struct DenseIds<'a> {
    words: &'a [u64],
    index: usize,
    current: u64,
}

impl<'a> Iterator for DenseIds<'a> {
    type Item = AttributeId;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current == 0 {
            self.index += 1;
            if self.index >= self.words.len() {
                return None;
            }
            self.current = self.words[self.index];
        }
        let bit = self.current.trailing_zeros() as usize;
        // Clear the lowest set bit.
        self.current &= self.current - 1;
        Some((self.index * WORD_BITS + bit) as AttributeId)
    }
}

impl AttributeSet for DenseBitSet {
    type Ids<'a> = DenseIds<'a>;

    fn empty(universe: usize) -> Self {
        DenseBitSet {
            words: vec![0_u64; universe.div_ceil(WORD_BITS)],
            universe,
        }
    }

    fn universe(&self) -> usize { self.universe }

    fn add(&mut self, id: AttributeId) -> Result<bool> {
        let index = id as usize;
        if index >= self.universe {
            return Err(BenchError::AttributeOutOfRange { id, universe: self.universe });
        }
        let word = &mut self.words[index / WORD_BITS];
        let mask = 1_u64 << (index % WORD_BITS);
        let added = *word & mask == 0;
        *word |= mask;
        Ok(added)
    }

    fn contains(&self, id: AttributeId) -> bool {
        let index = id as usize;
        index < self.universe && self.words[index / WORD_BITS] & (1_u64 << (index % WORD_BITS)) != 0
    }

    fn contains_all(&self, other: &Self) -> bool {
        other.words.iter().enumerate().all(|(i, &word)| {
            let own = self.words.get(i).copied().unwrap_or(0);
            word & !own == 0
        })
    }

    fn intersect(&self, other: &Self) -> Self {
        let universe = self.universe.min(other.universe);
        let words = self.words.iter()
            .zip(other.words.iter())
            .map(|(a, b)| a & b)
            .collect();
        DenseBitSet { words, universe }
    }

    fn union(&self, other: &Self) -> Self {
        let (wide, narrow) = if self.words.len() >= other.words.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut words = wide.words.clone();
        words.iter_mut()
            .zip(narrow.words.iter())
            .for_each(|(a, b)| *a |= b);
        DenseBitSet { words, universe: self.universe.max(other.universe) }
    }

    fn len(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    fn size_in_bytes(&self) -> usize {
        self.universe.div_ceil(8)
    }

    fn ids(&self) -> Self::Ids<'_> {
        DenseIds {
            words: &self.words,
            index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl PartialEq for DenseBitSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.contains_all(other)
    }
}

impl Eq for DenseBitSet {}

impl PartialEq<CompressedBitmap> for DenseBitSet {
    fn eq(&self, other: &CompressedBitmap) -> bool {
        same_members(self, other)
    }
}

impl fmt::Display for DenseBitSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_members(self, f)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::BenchError;
    use crate::types::attribute_set::AttributeSet;
    use crate::types::dense::DenseBitSet;

    #[test]
    fn test_add() {
        let mut set = DenseBitSet::empty(1000);
        assert!(set.is_empty());
        assert!(set.add(0).unwrap());
        assert!(set.add(999).unwrap());
        assert!(!set.add(999).unwrap());
        assert_eq!(2, set.len());
        assert!(set.contains(0));
        assert!(set.contains(999));
        assert!(!set.contains(1));
        assert!(!set.contains(1000));

        assert!(matches!(set.add(1000),
            Err(BenchError::AttributeOutOfRange { id: 1000, universe: 1000 })));
        assert_eq!(2, set.len());
    }

    #[test]
    fn test_contains_all() {
        let set = DenseBitSet::from_ids(1000, [1, 50, 64, 100, 700]).unwrap();
        let query = DenseBitSet::from_ids(1000, [50, 100]).unwrap();
        assert!(set.contains_all(&query));
        assert!(!query.contains_all(&set));
        assert!(set.contains_all(&DenseBitSet::empty(1000)));
        assert!(DenseBitSet::empty(1000).contains_all(&DenseBitSet::empty(1000)));

        let query = DenseBitSet::from_ids(1000, [50, 101]).unwrap();
        assert!(!set.contains_all(&query));

        // Operands are left untouched.
        assert_eq!(5, set.len());
        assert_eq!(2, query.len());
    }

    #[test]
    fn test_set_algebra() {
        let a = DenseBitSet::from_ids(200, [1, 2, 3, 130]).unwrap();
        let b = DenseBitSet::from_ids(200, [2, 3, 4, 199]).unwrap();

        assert_eq!(vec![2, 3], a.intersect(&b).ids().collect::<Vec<_>>());
        assert_eq!(vec![1, 2, 3, 4, 130, 199], a.union(&b).ids().collect::<Vec<_>>());
        assert_eq!(a.intersect(&b) == b, a.contains_all(&b));
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = DenseBitSet::from_ids(1000, [5, 500, 64]).unwrap();
        let b = DenseBitSet::from_ids(1000, [64, 5, 500]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, DenseBitSet::from_ids(1000, [5, 500]).unwrap());
        assert_eq!("{5, 64, 500}", a.to_string());
    }

    #[test]
    fn test_size_in_bytes() {
        assert_eq!(125, DenseBitSet::empty(1000).size_in_bytes());
        assert_eq!(2, DenseBitSet::empty(9).size_in_bytes());

        let full = DenseBitSet::from_ids(1000, 0..1000).unwrap();
        assert_eq!(125, full.size_in_bytes());
        assert_eq!(1000, full.len());
    }
}
