#![forbid(unsafe_code)]

//! Deterministic loaders for driving the cache in tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use gridbuf::{LoadError, LoadFuture, RowLoader};

/// One load issued against a [`ScriptedLoader`] and not yet settled.
///
/// Dropping it unresolved settles the load as a `LoadError`, which is exactly
/// what a torn-down backend looks like to the cache.
pub struct PendingLoad<T> {
    offset: usize,
    count: usize,
    tx: oneshot::Sender<Result<Vec<T>, LoadError>>,
}

impl<T> PendingLoad<T> {
    /// Offset the cache asked for.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Row count the cache asked for.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Resolve with explicit rows.
    pub fn resolve(self, rows: Vec<T>) {
        // A receiver dropped mid-flight means the pool was torn down; the
        // test is over and there is nothing to assert here.
        let _ = self.tx.send(Ok(rows));
    }

    /// Resolve with an error.
    pub fn fail(self, message: &str) {
        let _ = self.tx.send(Err(LoadError::new(message)));
    }
}

impl<T> PendingLoad<T>
where
    T: From<usize>,
{
    /// Resolve with the identity rows `offset..offset + count`.
    pub fn resolve_identity(self) {
        let rows = (self.offset..self.offset + self.count).map(T::from).collect();
        let _ = self.tx.send(Ok(rows));
    }
}

struct ScriptState<T> {
    calls: Vec<(usize, usize)>,
    pending: VecDeque<PendingLoad<T>>,
}

/// Loader whose futures resolve only when the test settles them.
///
/// Cloning yields a handle to the same script, so a test can hand one clone
/// to the collection and keep the other for driving resolutions.
pub struct ScriptedLoader<T> {
    state: Rc<RefCell<ScriptState<T>>>,
}

impl<T> Clone for ScriptedLoader<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> Default for ScriptedLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScriptedLoader<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ScriptState {
                calls: Vec::new(),
                pending: VecDeque::new(),
            })),
        }
    }

    /// Every `(offset, count)` the cache has requested, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(usize, usize)> {
        self.state.borrow().calls.clone()
    }

    /// Number of loads issued and not yet settled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Take the oldest unsettled load.
    ///
    /// # Panics
    ///
    /// Panics when no load is pending; tests use this to assert a load was
    /// actually issued.
    #[must_use]
    pub fn take_pending(&self) -> PendingLoad<T> {
        self.state
            .borrow_mut()
            .pending
            .pop_front()
            .expect("no pending load to take")
    }

    /// Take the unsettled load for `offset`, regardless of issue order.
    ///
    /// # Panics
    ///
    /// Panics when no pending load matches.
    #[must_use]
    pub fn take_pending_at(&self, offset: usize) -> PendingLoad<T> {
        let mut st = self.state.borrow_mut();
        let pos = st
            .pending
            .iter()
            .position(|p| p.offset == offset)
            .unwrap_or_else(|| panic!("no pending load at offset {offset}"));
        st.pending.remove(pos).expect("position just found")
    }
}

impl<T> ScriptedLoader<T>
where
    T: From<usize>,
{
    /// Settle every pending load with identity rows.
    pub fn resolve_all_identity(&self) {
        let drained: Vec<_> = self.state.borrow_mut().pending.drain(..).collect();
        for load in drained {
            load.resolve_identity();
        }
    }
}

impl<T: 'static> RowLoader<T> for ScriptedLoader<T> {
    fn load(&self, offset: usize, count: usize) -> LoadFuture<T> {
        let (tx, rx) = oneshot::channel();
        {
            let mut st = self.state.borrow_mut();
            st.calls.push((offset, count));
            st.pending.push_back(PendingLoad { offset, count, tx });
        }
        async move {
            rx.await
                .unwrap_or_else(|_| Err(LoadError::new("load script dropped")))
        }
        .boxed_local()
    }
}

/// Loader resolving with `offset..offset + count` on the next executor turn,
/// recording every call.
pub struct InstantLoader {
    calls: Rc<RefCell<Vec<(usize, usize)>>>,
}

impl Clone for InstantLoader {
    fn clone(&self) -> Self {
        Self {
            calls: Rc::clone(&self.calls),
        }
    }
}

impl Default for InstantLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl InstantLoader {
    pub fn new() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Every `(offset, count)` requested so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(usize, usize)> {
        self.calls.borrow().clone()
    }

    /// Number of loads requested so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl RowLoader<usize> for InstantLoader {
    fn load(&self, offset: usize, count: usize) -> LoadFuture<usize> {
        self.calls.borrow_mut().push((offset, count));
        async move { Ok((offset..offset + count).collect()) }.boxed_local()
    }
}
