//! Replaying subject.
//!
//! # Invariants
//!
//! 1. The buffer never holds more than `capacity` values (oldest evicted
//!    first). A capacity of zero is raised to one.
//! 2. A new observer receives the buffered values in emission order, then the
//!    terminal signal if the subject has stopped.
//! 3. Values emitted after the subject stopped are neither buffered nor
//!    delivered.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::Stream;
use crate::error::StreamError;
use crate::id::StreamId;
use crate::observer::Observer;
use crate::observers::{ObserverList, Status};
use crate::subscription::Subscription;

struct ReplayInner<T> {
    buffer: VecDeque<T>,
    capacity: Option<usize>,
    status: Status,
}

/// A multicast stream that replays buffered values to every new observer.
pub struct ReplaySubject<T> {
    id: StreamId,
    inner: Rc<RefCell<ReplayInner<T>>>,
    observers: ObserverList<T>,
}

impl<T> Clone for ReplaySubject<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Rc::clone(&self.inner),
            observers: self.observers.clone(),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for ReplaySubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ReplaySubject")
            .field("id", &self.id)
            .field("buffer", &inner.buffer)
            .field("capacity", &inner.capacity)
            .field("status", &inner.status)
            .finish()
    }
}

impl<T: Clone + 'static> ReplaySubject<T> {
    /// Create a subject replaying at most `capacity` values.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_capacity(Some(capacity.max(1)))
    }

    /// Create a subject replaying every value it has ever emitted.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            id: StreamId::unique(),
            inner: Rc::new(RefCell::new(ReplayInner {
                buffer: VecDeque::new(),
                capacity,
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

    /// Maximum buffered values (`None` for unbounded).
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.inner.borrow().capacity
    }

    /// Snapshot of the replay buffer, oldest first.
    #[must_use]
    pub fn buffered(&self) -> Vec<T> {
        self.inner.borrow().buffer.iter().cloned().collect()
    }

    /// Buffer and emit a value. Ignored once stopped.
    pub fn next(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.status.is_stopped() {
                trace!(stream = %self.id, "next ignored on stopped replay subject");
                return;
            }
            inner.buffer.push_back(value.clone());
            if let Some(capacity) = inner.capacity {
                while inner.buffer.len() > capacity {
                    inner.buffer.pop_front();
                }
            }
        }
        self.observers.emit_next(&value);
    }

    /// Terminate with an error. Buffered values are still replayed to late
    /// observers before the error.
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

    /// Subscribe an observer; buffered values are replayed synchronously.
    pub fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let (replay, status) = {
            let inner = self.inner.borrow();
            (inner.buffer.clone(), inner.status.clone())
        };

        if status.is_stopped() {
            for value in &replay {
                observer.next(value);
            }
            status.replay_to(&observer);
            return Subscription::closed();
        }

        let (entry, subscription) = self.observers.add(observer);
        trace!(stream = %self.id, replayed = replay.len(), "replay subject subscribed");
        for value in &replay {
            entry.next(value);
        }
        subscription
    }
}

impl<T: Clone + 'static> Stream<T> for ReplaySubject<T> {
    fn id(&self) -> StreamId {
        self.id
    }

    fn subscribe(&self, observer: Observer<T>) -> Subscription {
        ReplaySubject::subscribe(self, observer)
    }
}
