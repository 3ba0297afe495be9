#![forbid(unsafe_code)]

//! The row-fetch seam: [`RowLoader`] and its error type.
//!
//! The cache never performs I/O itself. Hosts hand it a loader whose futures
//! resolve on the same single-threaded executor the cache spawns onto; a
//! database result-streaming protocol, an RPC client, or a plain in-memory
//! vector all fit behind the same two-argument fetch.

use futures::future::LocalBoxFuture;
use thiserror::Error;

/// Future returned by a [`RowLoader`] fetch.
///
/// Local (non-`Send`) by design: the whole cache runs on one thread and the
/// completion is applied back on that thread.
pub type LoadFuture<T> = LocalBoxFuture<'static, Result<Vec<T>, LoadError>>;

/// Error carried by a failed row fetch.
///
/// Deliberately just a message: the cache only needs something it can hand to
/// the change callback and log; retry policy belongs to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row load failed: {message}")]
pub struct LoadError {
    message: String,
}

impl LoadError {
    /// Create a load error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The underlying message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Source of rows for a logical range `[offset, offset + count)`.
///
/// Implementations may resolve with fewer than `count` rows (for example when
/// the tail of a result set is still streaming in); missing tail indices read
/// back as placeholders, never as holes.
///
/// Cancellation is cooperative: a superseded fetch has its *result* ignored,
/// but the loader is never told to abort. Loaders that can abort cheaply are
/// free to watch for their future being dropped.
pub trait RowLoader<T> {
    /// Fetch rows `[offset, offset + count)`.
    fn load(&self, offset: usize, count: usize) -> LoadFuture<T>;
}

impl<T, F> RowLoader<T> for F
where
    F: Fn(usize, usize) -> LoadFuture<T>,
{
    fn load(&self, offset: usize, count: usize) -> LoadFuture<T> {
        self(offset, count)
    }
}
