#![forbid(unsafe_code)]

//! Grid-facing access surface.
//!
//! Grid widgets address rows by index and neither know nor care whether the
//! rows sit in memory or behind the windowed cache. [`IndexedRows`] is that
//! seam; [`CollectionAdapter`] puts a [`VirtualizedCollection`] behind it, and
//! plain `Vec<T>` implements it directly for small, fully materialized result
//! sets.

use crate::collection::{RangeError, RowsChanged, VirtualizedCollection};
use crate::window::WindowStatus;

/// Synchronous, index-addressed row access.
///
/// `rows(start, end)` always yields exactly `end - start` rows or fails fast
/// with [`RangeError`]; implementations backed by an asynchronous source
/// substitute placeholders for rows that have not arrived yet.
pub trait IndexedRows<T> {
    /// Logical number of rows.
    fn len(&self) -> usize;

    /// `true` when there are no logical rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the row at `index`.
    fn row(&mut self, index: usize) -> Result<T, RangeError>;

    /// Read rows `[start, end)`.
    fn rows(&mut self, start: usize, end: usize) -> Result<Vec<T>, RangeError>;
}

impl<T: Clone> IndexedRows<T> for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn row(&mut self, index: usize) -> Result<T, RangeError> {
        self.get(index).cloned().ok_or(RangeError {
            start: index,
            end: index + 1,
            length: Vec::len(self),
        })
    }

    fn rows(&mut self, start: usize, end: usize) -> Result<Vec<T>, RangeError> {
        if start > end || end > Vec::len(self) {
            return Err(RangeError {
                start,
                end,
                length: Vec::len(self),
            });
        }
        Ok(self[start..end].to_vec())
    }
}

/// [`IndexedRows`] implementation backed by a [`VirtualizedCollection`].
///
/// Thin by intent: the adapter forwards reads and re-exposes the collection
/// knobs a grid host needs (length updates, the change callback, disposal)
/// without leaking window mechanics into widget code.
pub struct CollectionAdapter<T> {
    collection: VirtualizedCollection<T>,
}

impl<T: Clone + 'static> CollectionAdapter<T> {
    /// Wrap a collection.
    pub fn new(collection: VirtualizedCollection<T>) -> Self {
        Self { collection }
    }

    /// Update the logical row count, e.g. as a query streams in.
    pub fn set_len(&mut self, len: usize) {
        self.collection.set_length(len);
    }

    /// Register the callback invoked when previously placeholder rows settle.
    ///
    /// Grid hosts typically re-render the affected range from here.
    pub fn set_changed_callback(&mut self, callback: impl FnMut(RowsChanged) + 'static) {
        self.collection.set_changed_callback(callback);
    }

    /// Status of the window covering `index`, if any.
    #[must_use]
    pub fn status_of(&self, index: usize) -> Option<WindowStatus> {
        self.collection.status_of(index)
    }

    /// Invalidate in-flight loads and drop the change callback.
    pub fn dispose(&mut self) {
        self.collection.dispose();
    }

    /// Recover the wrapped collection.
    #[must_use]
    pub fn into_inner(self) -> VirtualizedCollection<T> {
        self.collection
    }
}

impl<T: Clone + 'static> IndexedRows<T> for CollectionAdapter<T> {
    fn len(&self) -> usize {
        self.collection.len()
    }

    fn row(&mut self, index: usize) -> Result<T, RangeError> {
        self.collection.get(index)
    }

    fn rows(&mut self, start: usize, end: usize) -> Result<Vec<T>, RangeError> {
        self.collection.get_range(start, end)
    }
}
