//! Latest-value subject.
//!
//! A [`BehaviorSubject`] always holds a value. New observers receive it
//! synchronously during `subscribe`, and [`current`](BehaviorSubject::current)
//! reads it without subscribing.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::error::StreamError;
use crate::id::StreamId;
use crate::observer::Observer;
use crate::observers::{ObserverList, Status};
use crate::subscription::Subscription;
use crate::{CurrentValue, Stream};

struct BehaviorInner<T> {
    value: T,
    status: Status,
}

/// A multicast stream with a synchronously readable current value.
///
/// Cloning shares the same value, status and observers.
pub struct BehaviorSubject<T> {
    id: StreamId,
    inner: Rc<RefCell<BehaviorInner<T>>>,
    observers: ObserverList<T>,
}

impl<T> Clone for BehaviorSubject<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Rc::clone(&self.inner),
            observers: self.observers.clone(),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for BehaviorSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("BehaviorSubject")
            .field("id", &self.id)
            .field("value", &inner.value)
            .field("status", &inner.status)
            .field("observer_count", &self.observers.len())
            .finish()
    }
}

impl<T: Clone + 'static> BehaviorSubject<T> {
    /// Create a subject seeded with `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            id: StreamId::unique(),
            inner: Rc::new(RefCell::new(BehaviorInner {
                value,
                status: Status::Active,
            })),
            observers: ObserverList::new(),
        }
    }

    /// Identity of this subject.
    #[must_use]
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// A clone of the current value.
    ///
    /// After an error the last value before the error is still returned.
    #[must_use]
    pub fn value(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store and emit a new value. Ignored once stopped.
    pub fn next(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.status.is_stopped() {
                trace!(stream = %self.id, "next ignored on stopped behavior subject");
                return;
            }
            inner.value = value.clone();
        }
        self.observers.emit_next(&value);
    }

    /// Terminate with an error.
    pub fn error(&self, err: impl Into<StreamError>) {
        let err = err.into();
        {
            let mut inner = self.inner.borrow_mut();
            if inner.status.is_stopped() {
                return;
            }
            inner.status = Status::Errored(err.clone());
        }
        self.observers.emit_error(&err);
    }

    /// Terminate with completion.
    pub fn complete(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.status.is_stopped() {
                return;
            }
            inner.status = Status::Completed;
        }
        self.observers.emit_complete();
    }

    /// Whether the subject has terminated.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.borrow().status.is_stopped()
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Subscribe an observer; it immediately receives the current value.
    pub fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let status = self.inner.borrow().status.clone();
        if status.replay_to(&observer) {
            return Subscription::closed();
        }
        let (entry, subscription) = self.observers.add(observer);
        let value = self.value();
        entry.next(&value);
        subscription
    }
}

impl<T: Clone + 'static> Stream<T> for BehaviorSubject<T> {
    fn id(&self) -> StreamId {
        self.id
    }

    fn subscribe(&self, observer: Observer<T>) -> Subscription {
        BehaviorSubject::subscribe(self, observer)
    }
}

impl<T: Clone + 'static> CurrentValue<T> for BehaviorSubject<T> {
    fn current(&self) -> T {
        self.value()
    }
}
