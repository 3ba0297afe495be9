#![forbid(unsafe_code)]

//! A single buffered window: one contiguous slice of the logical index space
//! plus its in-flight load.
//!
//! # Design Rationale
//! - Window state lives behind `Rc<RefCell<..>>` so the spawned completion
//!   task can apply results without a back-reference to the collection
//! - Superseded loads are detected with a per-window generation counter
//!   captured at issuance and compared at completion; there is no preemptive
//!   abort of in-flight work
//! - Short load results read back as placeholders past their end, never as
//!   holes

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};

use crate::collection::RowsChanged;
use crate::loader::RowLoader;

/// Callback invoked when a window load settles.
pub(crate) type ChangedCallback = Box<dyn FnMut(RowsChanged)>;

/// Observable lifecycle state of a buffered window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStatus {
    /// Degenerate window (`size == 0`); materializes nothing.
    Empty,
    /// A load has been issued and has not settled yet.
    Loading,
    /// The most recent load resolved; rows are materialized.
    Loaded,
    /// The most recent load failed; the span reads back as placeholders.
    Failed,
}

/// Environment shared by the collection, its three windows, and their
/// completion tasks: the loader, the placeholder generator, the single change
/// callback, and the executor seam.
pub(crate) struct LoaderEnv<T> {
    pub(crate) loader: Box<dyn RowLoader<T>>,
    pub(crate) placeholder: Box<dyn Fn(usize) -> T>,
    pub(crate) notify: RefCell<Option<ChangedCallback>>,
    pub(crate) spawner: Box<dyn LocalSpawn>,
}

impl<T> LoaderEnv<T> {
    /// Synthesize the placeholder row for `index`.
    pub(crate) fn placeholder(&self, index: usize) -> T {
        (self.placeholder)(index)
    }

    /// Invoke the registered change callback, if any.
    ///
    /// The callback is taken out of its slot for the duration of the call so
    /// it may freely re-enter the collection (e.g. call `get_range`); a
    /// callback registered *during* the call wins over the one being run.
    pub(crate) fn emit(&self, event: RowsChanged) {
        let taken = self.notify.borrow_mut().take();
        if let Some(mut cb) = taken {
            cb(event);
            let mut slot = self.notify.borrow_mut();
            if slot.is_none() {
                *slot = Some(cb);
            }
        }
    }

    fn spawn(&self, task: impl Future<Output = ()> + 'static) -> Result<(), SpawnError> {
        self.spawner.spawn_local_obj(LocalFutureObj::new(Box::new(task)))
    }
}

enum WindowData<T> {
    /// Nothing materialized: the window is empty or its load is in flight.
    Missing,
    /// Rows returned by the most recent load (possibly fewer than `size`).
    Ready(Vec<T>),
    /// The most recent load failed.
    Failed,
}

struct WindowState<T> {
    offset: usize,
    size: usize,
    /// Bumped on every reposition/dispose; loads carry the value current at
    /// issuance and are discarded if it no longer matches at completion.
    generation: u64,
    data: WindowData<T>,
}

/// One contiguous, lazily materialized slice of the logical index space.
///
/// Created once by the owning collection and repositioned (never recreated)
/// as the viewport moves. All mutation happens on the single scheduling
/// thread; the only concurrent-looking access is the completion task, which
/// runs on the same thread via the executor seam.
pub(crate) struct DataWindow<T> {
    state: Rc<RefCell<WindowState<T>>>,
    env: Rc<LoaderEnv<T>>,
}

impl<T: Clone + 'static> DataWindow<T> {
    pub(crate) fn new(env: Rc<LoaderEnv<T>>) -> Self {
        Self {
            state: Rc::new(RefCell::new(WindowState {
                offset: 0,
                size: 0,
                generation: 0,
                data: WindowData::Missing,
            })),
            env,
        }
    }

    /// `(offset, size)` of the window's current position.
    pub(crate) fn bounds(&self) -> (usize, usize) {
        let st = self.state.borrow();
        (st.offset, st.size)
    }

    /// One past the last index covered by this window.
    pub(crate) fn end(&self) -> usize {
        let st = self.state.borrow();
        st.offset + st.size
    }

    pub(crate) fn contains(&self, index: usize) -> bool {
        let st = self.state.borrow();
        index >= st.offset && index < st.offset + st.size
    }

    pub(crate) fn status(&self) -> WindowStatus {
        let st = self.state.borrow();
        if st.size == 0 {
            return WindowStatus::Empty;
        }
        match st.data {
            WindowData::Missing => WindowStatus::Loading,
            WindowData::Ready(_) => WindowStatus::Loaded,
            WindowData::Failed => WindowStatus::Failed,
        }
    }

    /// Read `index` if this window covers it.
    ///
    /// Returns the materialized row when the load has resolved and reached
    /// that index, a placeholder otherwise.
    pub(crate) fn read(&self, index: usize) -> Option<T> {
        let st = self.state.borrow();
        if index < st.offset || index >= st.offset + st.size {
            return None;
        }
        match &st.data {
            WindowData::Ready(rows) => match rows.get(index - st.offset) {
                Some(row) => Some(row.clone()),
                // Short load: pad the tail with placeholders.
                None => Some(self.env.placeholder(index)),
            },
            WindowData::Missing | WindowData::Failed => Some(self.env.placeholder(index)),
        }
    }

    /// Move the window to `[offset, offset + size)` and issue a fresh load.
    ///
    /// The previous generation is invalidated first, so any load still in
    /// flight for the old position becomes a no-op on completion. A zero-size
    /// window issues no load at all.
    pub(crate) fn reposition(&self, offset: usize, size: usize) {
        let generation = {
            let mut st = self.state.borrow_mut();
            st.generation += 1;
            st.offset = offset;
            st.size = size;
            st.data = WindowData::Missing;
            st.generation
        };
        if size == 0 {
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "gridbuf.window",
            offset,
            size,
            generation,
            "issuing window load"
        );

        let fut = self.env.loader.load(offset, size);
        let state = Rc::clone(&self.state);
        let env = Rc::clone(&self.env);
        let task = async move {
            let outcome = fut.await;
            let event = {
                let mut st = state.borrow_mut();
                if st.generation != generation {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(
                        target: "gridbuf.window",
                        offset,
                        generation,
                        "discarding superseded load result"
                    );
                    return;
                }
                match outcome {
                    Ok(rows) => {
                        st.data = WindowData::Ready(rows);
                        RowsChanged {
                            start: offset,
                            count: size,
                            error: None,
                        }
                    }
                    Err(err) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            target: "gridbuf.window",
                            offset,
                            size,
                            error = %err,
                            "row load failed"
                        );
                        st.data = WindowData::Failed;
                        RowsChanged {
                            start: offset,
                            count: size,
                            error: Some(err),
                        }
                    }
                }
            };
            env.emit(event);
        };
        if self.env.spawn(task).is_err() {
            // Executor is gone; the window stays on placeholders until it is
            // repositioned again.
            #[cfg(feature = "tracing")]
            tracing::warn!(
                target: "gridbuf.window",
                offset,
                size,
                "executor rejected load task"
            );
        }
    }

}

impl<T> DataWindow<T> {
    /// Invalidate any in-flight load and release materialized rows.
    pub(crate) fn dispose(&self) {
        let mut st = self.state.borrow_mut();
        st.generation += 1;
        st.offset = 0;
        st.size = 0;
        st.data = WindowData::Missing;
    }
}
