use crate::error::{BenchError, Result};
use crate::types::attribute_set::AttributeSet;
use crate::types::catalog::AttributeCatalog;
use crate::types::Label;

/// Admission test a search engine applies to every candidate label.
///
/// Implementations must not mutate anything: an engine may call `test` any number of times,
/// in any order, and from several threads at once.
///
/// Labels passed to `test` must belong to the filtered data; a label the filter knows nothing
/// about is a caller bug, not a rejection.
pub trait LabelFilter: Sync {
    fn test(&self, label: Label) -> bool;
}

/// Admits every label.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl LabelFilter for AcceptAll {
    fn test(&self, _label: Label) -> bool { true }
}

/// Admits labels whose attribute set contains every attribute of the query set.
///
/// Borrows both the catalog and the query set, so it cannot outlive either. No label is
/// excluded implicitly, including the label of the query point itself.
#[derive(Debug, Clone)]
pub struct SupersetFilter<'a, S: AttributeSet> {
    catalog: &'a AttributeCatalog<S>,
    query: &'a S,
}

impl<'a, S: AttributeSet> SupersetFilter<'a, S> {
    pub fn new(catalog: &'a AttributeCatalog<S>, query: &'a S) -> SupersetFilter<'a, S> {
        SupersetFilter { catalog, query }
    }

    /// Like [`LabelFilter::test`], but reports labels outside the catalog as an error instead
    /// of rejecting them.
    pub fn try_test(&self, label: Label) -> Result<bool> {
        Ok(self.catalog.get(label)?.contains_all(self.query))
    }

    /// Checks that every label in `labels` is admitted.
    pub fn verify<I: IntoIterator<Item = Label>>(&self, labels: I) -> Result<()> {
        for label in labels {
            if !self.try_test(label)? {
                return Err(BenchError::FilterViolation { label });
            }
        }
        Ok(())
    }
}

impl<S: AttributeSet> LabelFilter for SupersetFilter<'_, S> {
    /// Panics in debug builds if `label` is outside the catalog; release builds reject it,
    /// and [`verify`](SupersetFilter::verify) reports it as an error.
    fn test(&self, label: Label) -> bool {
        debug_assert!(label < self.catalog.len(),
                      "label {} outside a catalog of {} labels", label, self.catalog.len());
        self.try_test(label).unwrap_or(false)
    }
}
