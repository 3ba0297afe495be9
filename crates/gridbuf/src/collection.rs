#![forbid(unsafe_code)]

//! The three-window virtualized collection.
//!
//! Presents `[0, length)` as a randomly addressable sequence while keeping
//! memory bounded to `O(window_size)` rows and maximizing cache hits under
//! sequential scroll.
//!
//! # Design Rationale
//! - Three windows (`before`, `current`, `after`) cover the viewport plus one
//!   prefetch window in each scroll direction
//! - The windows live in a fixed three-slot arena addressed through a
//!   rotating base index, so "which slot is logically before" is an index
//!   computation rather than a swap of object references
//! - Sequential scroll rotates the arena and issues exactly one load; a jump
//!   outside the buffered envelope recenters all three windows
//! - `get_range` is fully synchronous: it reads what is materialized, fills
//!   the rest with placeholders, and lets load completions notify the
//!   renderer later

use std::cell::RefCell;
use std::rc::Rc;

use futures::task::LocalSpawn;
use thiserror::Error;

use crate::loader::{LoadError, RowLoader};
use crate::window::{DataWindow, LoaderEnv, WindowStatus};

/// Requested rows fall outside `[0, length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("requested rows {start}..{end} out of bounds for length {length}")]
pub struct RangeError {
    /// Start of the offending request (inclusive).
    pub start: usize,
    /// End of the offending request (exclusive).
    pub end: usize,
    /// Logical collection length at the time of the request.
    pub length: usize,
}

/// Notification that a window load settled for rows `[start, start + count)`.
///
/// `error` is `None` for a successful load. Notifications for different
/// windows may arrive in any order; the renderer is expected to re-read the
/// affected range and re-render.
#[derive(Debug, Clone, PartialEq)]
pub struct RowsChanged {
    /// First affected row index.
    pub start: usize,
    /// Number of affected rows.
    pub count: usize,
    /// Set when the load failed; the span keeps reading back as placeholders.
    pub error: Option<LoadError>,
}

/// Logical role of an arena slot.
#[derive(Clone, Copy)]
enum Role {
    Before = 0,
    Current = 1,
    After = 2,
}

/// A windowed asynchronous cache over a logically huge row sequence.
///
/// Rows are fetched lazily through a [`RowLoader`] in `window_size` chunks.
/// Reads never block: indices whose window has not resolved yet come back as
/// placeholder rows, and the registered change callback fires once the real
/// rows (or a load failure) arrive.
///
/// The collection is single-threaded by construction; completions are applied
/// by tasks spawned onto the `LocalSpawn` executor supplied at construction,
/// which must run on the same thread.
pub struct VirtualizedCollection<T> {
    env: Rc<LoaderEnv<T>>,
    windows: [DataWindow<T>; 3],
    /// Arena slot currently holding the `before` role.
    base: usize,
    window_size: usize,
    length: usize,
}

impl<T: Clone + 'static> VirtualizedCollection<T> {
    /// Create a collection of `initial_length` logical rows.
    ///
    /// `placeholder` synthesizes the row shown for any index whose window has
    /// not resolved; `loader` fetches real rows; `spawner` is the
    /// single-threaded executor the load completions run on.
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is zero.
    pub fn new(
        window_size: usize,
        placeholder: impl Fn(usize) -> T + 'static,
        initial_length: usize,
        loader: impl RowLoader<T> + 'static,
        spawner: impl LocalSpawn + 'static,
    ) -> Self {
        assert!(window_size > 0, "window_size must be positive");
        let env = Rc::new(LoaderEnv {
            loader: Box::new(loader),
            placeholder: Box::new(placeholder),
            notify: RefCell::new(None),
            spawner: Box::new(spawner),
        });
        let windows = [
            DataWindow::new(Rc::clone(&env)),
            DataWindow::new(Rc::clone(&env)),
            DataWindow::new(Rc::clone(&env)),
        ];
        Self {
            env,
            windows,
            base: 0,
            window_size,
            length: initial_length,
        }
    }

    /// Logical number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    /// `true` when the collection holds no logical rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Configured window size.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Update the logical length used for clamping window targets.
    ///
    /// Existing windows are left untouched; the next request that moves a
    /// window picks up the new bound. Backing sources use this as a query
    /// streams in (growth) or is revised (shrink).
    pub fn set_length(&mut self, length: usize) {
        self.length = length;
    }

    /// Register the single callback invoked whenever any window load settles.
    ///
    /// Replaces a previously registered callback.
    pub fn set_changed_callback(&mut self, callback: impl FnMut(RowsChanged) + 'static) {
        *self.env.notify.borrow_mut() = Some(Box::new(callback));
    }

    /// Read a single row; placeholder if its window has not resolved.
    pub fn get(&mut self, index: usize) -> Result<T, RangeError> {
        let mut rows = self.get_range(index, index + 1)?;
        Ok(rows
            .pop()
            .unwrap_or_else(|| self.env.placeholder(index)))
    }

    /// Read rows `[start, end)` synchronously.
    ///
    /// Requires `start <= end <= len()`. The result always has exactly
    /// `end - start` rows; indices not yet materialized come back as
    /// placeholders and are re-announced through the change callback once
    /// their load settles. Depending on where the request falls relative to
    /// the buffered envelope this may rotate or recenter the windows and
    /// issue fresh loads, but it never blocks on them.
    pub fn get_range(&mut self, start: usize, end: usize) -> Result<Vec<T>, RangeError> {
        if start > end || end > self.length {
            return Err(RangeError {
                start,
                end,
                length: self.length,
            });
        }

        // Read first: movement below must not affect this request's rows.
        let mut rows = Vec::with_capacity(end - start);
        for index in start..end {
            rows.push(self.read_row(index));
        }

        self.update_windows(start, end);
        Ok(rows)
    }

    /// Status of the window covering `index`, if any window does.
    #[must_use]
    pub fn status_of(&self, index: usize) -> Option<WindowStatus> {
        for role in [Role::Before, Role::After, Role::Current] {
            let window = self.window(role);
            if window.contains(index) {
                return Some(window.status());
            }
        }
        None
    }

    /// `(offset, size)` of the three windows in before/current/after order.
    ///
    /// Diagnostic accessor; also used by the integration tests to assert
    /// rotation and recentering behavior.
    #[must_use]
    pub fn window_bounds(&self) -> [(usize, usize); 3] {
        [
            self.window(Role::Before).bounds(),
            self.window(Role::Current).bounds(),
            self.window(Role::After).bounds(),
        ]
    }

    /// Invalidate all in-flight loads, release cached rows, and drop the
    /// change callback. The collection may not be used afterwards.
    pub fn dispose(&mut self) {
        for window in &self.windows {
            window.dispose();
        }
        self.env.notify.borrow_mut().take();
    }

    fn window(&self, role: Role) -> &DataWindow<T> {
        &self.windows[(self.base + role as usize) % 3]
    }

    fn read_row(&self, index: usize) -> T {
        for role in [Role::Before, Role::After, Role::Current] {
            if let Some(row) = self.window(role).read(index) {
                return row;
            }
        }
        self.env.placeholder(index)
    }

    /// Decide window movement for a request `[start, end)` already validated
    /// against `length`. Priority: jump, scroll up, scroll down, no movement.
    fn update_windows(&mut self, start: usize, end: usize) {
        let (before_offset, _) = self.window(Role::Before).bounds();
        let before_end = self.window(Role::Before).end();
        let (after_offset, _) = self.window(Role::After).bounds();
        let after_end = self.window(Role::After).end();

        if start < before_offset || end > after_end {
            // The request escaped the buffered envelope entirely.
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "gridbuf.collection",
                start,
                end,
                "recentering all windows (jump)"
            );
            self.reset_windows_around(start);
        } else if end <= before_end {
            // Scrolling up: the old `before` becomes `current`; the freed
            // slot is repositioned as the new `before`.
            let current_offset = before_offset;
            self.base = (self.base + 2) % 3;
            let new_start = current_offset.saturating_sub(self.window_size);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "gridbuf.collection",
                start,
                end,
                new_before = ?(new_start, current_offset),
                "rotating windows up"
            );
            self.window(Role::Before)
                .reposition(new_start, current_offset - new_start);
        } else if start >= after_offset {
            // Scrolling down: the old `after` becomes `current`; the freed
            // slot is repositioned as the new `after`.
            let current_end = after_end;
            self.base = (self.base + 1) % 3;
            let new_start = current_end.min(self.length);
            let new_end = current_end
                .saturating_add(self.window_size)
                .min(self.length);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "gridbuf.collection",
                start,
                end,
                new_after = ?(new_start, new_end),
                "rotating windows down"
            );
            self.window(Role::After)
                .reposition(new_start, new_end - new_start);
        }
        // Otherwise the request is fully covered; nothing moves, nothing
        // loads.
    }

    /// Recenter all three windows around `index` (`<= length`).
    ///
    /// `before` is placed over `[index - 1.5w, index - 0.5w)` so that after
    /// the recenter the requested index sits near the middle of `current`,
    /// leaving one window of prefetch in each direction.
    fn reset_windows_around(&mut self, index: usize) {
        let w = self.window_size;

        let before_start = index.saturating_sub(w + w / 2);
        let before_end = index.saturating_sub(w / 2);
        self.window(Role::Before)
            .reposition(before_start, before_end - before_start);

        let current_start = before_end;
        let current_end = current_start.saturating_add(w).min(self.length);
        self.window(Role::Current)
            .reposition(current_start, current_end - current_start);

        let after_start = current_end;
        let after_end = after_start.saturating_add(w).min(self.length);
        self.window(Role::After)
            .reposition(after_start, after_end - after_start);
    }
}

impl<T> Drop for VirtualizedCollection<T> {
    fn drop(&mut self) {
        // Orphan in-flight loads so late completions cannot fire callbacks
        // into a renderer that no longer owns this collection.
        for window in &self.windows {
            window.dispose();
        }
        self.env.notify.borrow_mut().take();
    }
}
