//! A read-only, reorderable projection over a [`Collection`], without copying any
//! record bytes.

use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::record::{Record, TimeOrdering, TimeSpan};
use std::cell::Cell;

/// A view over a subset (or reordering) of a [`Collection`]'s records.
///
/// An `IndexView` owns only a `Vec<u32>` of indices into a borrowed base
/// collection — the records themselves are never copied. `sorted_by_time` is
/// computed lazily, on first access, and cached.
pub struct IndexView<'a, R: Record + TimeSpan> {
    base: &'a Collection<R>,
    indices: Vec<u32>,
    sorted_by_time: Cell<Option<bool>>,
}

impl<'a, R: Record + TimeSpan> IndexView<'a, R> {
    /// Builds a view over exactly the given base indices, in the given order.
    pub fn new(base: &'a Collection<R>, indices: Vec<u32>) -> Self {
        IndexView { base, indices, sorted_by_time: Cell::new(None) }
    }

    /// Builds a view over the whole base collection, in its current order.
    pub fn full(base: &'a Collection<R>) -> Self {
        let indices = (0..base.len() as u32).collect();
        IndexView { base, indices, sorted_by_time: Cell::new(None) }
    }

    /// The number of records in this view.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether this view covers no records.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The base collection's index that view position `position` refers to.
    pub fn base_index(&self, position: usize) -> Result<usize> {
        self.indices
            .get(position)
            .map(|&i| i as usize)
            .ok_or(Error::OutOfRange { index: position, len: self.indices.len() })
    }

    /// Decodes and returns the record at view position `position`.
    pub fn get(&self, position: usize) -> Result<R> {
        self.base.get(self.base_index(position)?)
    }

    /// Whether every consecutive pair of records in this view's current order
    /// satisfies `Before`. Computed on first call and cached; the view is
    /// immutable, so the cached value never goes stale.
    pub fn sorted_by_time(&self) -> Result<bool> {
        if let Some(cached) = self.sorted_by_time.get() {
            return Ok(cached);
        }
        let mut sorted = true;
        for pair in self.indices.windows(2) {
            let ordering = self.base.compare_element_time(pair[0] as usize, pair[1] as usize)?;
            if ordering != TimeOrdering::Before {
                sorted = false;
                break;
            }
        }
        self.sorted_by_time.set(Some(sorted));
        Ok(sorted)
    }

    /// Builds a view over `[skip, skip+take)` of this view's current order.
    pub fn sublist(&self, skip: usize, take: usize) -> Result<IndexView<'a, R>> {
        let end = skip.checked_add(take).ok_or(Error::OutOfRange { index: usize::MAX, len: self.len() })?;
        if end > self.len() {
            return Err(Error::OutOfRange { index: end, len: self.len() });
        }
        Ok(IndexView::new(self.base, self.indices[skip..end].to_vec()))
    }
}
