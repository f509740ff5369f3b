//! Reaction recorders.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Records every call of the callbacks it hands out.
///
/// Clones share the same record.
pub struct Recorder<T> {
    calls: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Rc::clone(&self.calls),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            calls: Rc::default(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Recorder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Recorder").field(&*self.calls.borrow()).finish()
    }
}

impl<T: Clone + 'static> Recorder<T> {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` directly.
    pub fn record(&self, value: T) {
        self.calls.borrow_mut().push(value);
    }

    /// A callback that records a clone of each argument.
    pub fn callback(&self) -> impl Fn(&T) + 'static {
        let calls = Rc::clone(&self.calls);
        move |value: &T| calls.borrow_mut().push(value.clone())
    }

    /// Every recorded argument, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<T> {
        self.calls.borrow().clone()
    }

    /// The most recent argument.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.calls.borrow().last().cloned()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Recorder<()> {
    /// A zero-argument callback, for completion reactions.
    pub fn signal(&self) -> impl Fn() + 'static {
        let calls = Rc::clone(&self.calls);
        move || calls.borrow_mut().push(())
    }
}
