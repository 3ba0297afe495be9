#![forbid(unsafe_code)]

//! Test harness for the `gridbuf` windowed cache.
//!
//! # Role
//! Provides deterministic loaders and a change-event recorder so integration
//! tests (and the demo) can script exactly when each window load resolves,
//! fails, or stays in flight, then assert on what the cache did.
//!
//! # Primary responsibilities
//! - **[`ScriptedLoader`]**: loads resolve only when the test says so, in any
//!   order, with rows or an error.
//! - **[`InstantLoader`]**: loads resolve with `offset..offset + count` on the
//!   next executor turn, with every call recorded.
//! - **[`ChangeLog`]**: captures `RowsChanged` notifications for assertions.

pub mod recorder;
pub mod scripted;

pub use recorder::ChangeLog;
pub use scripted::{InstantLoader, PendingLoad, ScriptedLoader};
