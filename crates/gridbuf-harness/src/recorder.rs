#![forbid(unsafe_code)]

//! Change-event recording for assertions.

use std::cell::RefCell;
use std::rc::Rc;

use gridbuf::RowsChanged;

/// Shared recorder for `RowsChanged` notifications.
///
/// Clones share the same log; hand [`ChangeLog::sink`] to the collection and
/// keep the recorder for assertions.
#[derive(Default)]
pub struct ChangeLog {
    events: Rc<RefCell<Vec<RowsChanged>>>,
}

impl Clone for ChangeLog {
    fn clone(&self) -> Self {
        Self {
            events: Rc::clone(&self.events),
        }
    }
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback to register with `set_changed_callback`.
    pub fn sink(&self) -> impl FnMut(RowsChanged) + 'static {
        let events = Rc::clone(&self.events);
        move |ev| events.borrow_mut().push(ev)
    }

    /// Snapshot of all recorded events, in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<RowsChanged> {
        self.events.borrow().clone()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// `true` when successful events jointly cover `[start, end)`.
    #[must_use]
    pub fn covers(&self, start: usize, end: usize) -> bool {
        let events = self.events.borrow();
        (start..end).all(|index| {
            events.iter().any(|ev| {
                ev.error.is_none() && index >= ev.start && index < ev.start + ev.count
            })
        })
    }
}
