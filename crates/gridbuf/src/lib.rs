#![forbid(unsafe_code)]

//! Windowed asynchronous data-virtualization cache for large tabular grids.
//!
//! # Role
//! `gridbuf` sits between a grid widget that addresses rows by index and a
//! backing source (database cursor, RPC stream, paged API) that can only
//! deliver rows asynchronously. It keeps three sliding windows of rows
//! buffered around the viewport, so sequential scrolling is answered from
//! cache while memory stays bounded by the window size, not the row count.
//!
//! # Primary responsibilities
//! - **[`VirtualizedCollection`]**: the three-window cache with synchronous
//!   `get_range`, placeholder synthesis, and a change callback fired as loads
//!   settle.
//! - **[`RowLoader`]**: the async fetch seam hosts implement.
//! - **[`CollectionAdapter`] / [`IndexedRows`]**: the uniform grid-facing
//!   surface shared with plain in-memory row vectors.
//!
//! # Concurrency model
//! Everything runs on one thread. Load completions are applied by tasks
//! spawned onto a caller-supplied `LocalSpawn` executor; superseded loads are
//! cancelled cooperatively by a generation check, never aborted. No type in
//! this crate is `Send`.
//!
//! # Example
//! ```
//! use futures::FutureExt;
//! use futures::executor::LocalPool;
//! use gridbuf::{LoadFuture, VirtualizedCollection};
//!
//! let mut pool = LocalPool::new();
//! let mut rows = VirtualizedCollection::new(
//!     10,
//!     |i| format!("loading {i}"),
//!     1_000,
//!     |offset: usize, count: usize| -> LoadFuture<String> {
//!         async move { Ok((offset..offset + count).map(|i| format!("row {i}")).collect()) }
//!             .boxed_local()
//!     },
//!     pool.spawner(),
//! );
//!
//! // First touch answers with placeholders and kicks off window loads.
//! let first = rows.get_range(500, 505).unwrap();
//! assert_eq!(first[0], "loading 500");
//!
//! pool.run_until_stalled();
//! let settled = rows.get_range(500, 505).unwrap();
//! assert_eq!(settled[0], "row 500");
//! ```

pub mod adapter;
pub mod collection;
pub mod loader;
pub mod window;

pub use adapter::{CollectionAdapter, IndexedRows};
pub use collection::{RangeError, RowsChanged, VirtualizedCollection};
pub use loader::{LoadError, LoadFuture, RowLoader};
pub use window::WindowStatus;
