//! Plain multicast subject.
//!
//! # Invariants
//!
//! 1. Each value is delivered to every observer registered at emission time,
//!    in registration order.
//! 2. After `error()` or `complete()` the subject is stopped: further signals
//!    are ignored and every observer list entry is dropped.
//! 3. Subscribing to a stopped subject replays the terminal signal and returns
//!    a closed [`Subscription`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::Stream;
use crate::error::StreamError;
use crate::id::StreamId;
use crate::observer::Observer;
use crate::observers::{ObserverList, Status};
use crate::subscription::Subscription;

/// A hot stream that forwards each value to all current observers.
///
/// Cloning creates another handle to the **same** subject (same
/// [`StreamId`], same observers).
pub struct Subject<T> {
    id: StreamId,
    status: Rc<RefCell<Status>>,
    observers: ObserverList<T>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            status: Rc::clone(&self.status),
            observers: self.observers.clone(),
        }
    }
}

impl<T: 'static> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("id", &self.id)
            .field("status", &*self.status.borrow())
            .field("observer_count", &self.observers.len())
            .finish()
    }
}

impl<T: 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Subject<T> {
    /// Create a subject with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: StreamId::unique(),
            status: Rc::new(RefCell::new(Status::Active)),
            observers: ObserverList::new(),
        }
    }

    /// Identity of this subject.
    #[must_use]
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Whether two handles refer to the same subject.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.status, &other.status)
    }

    /// Emit a value. Ignored once the subject is stopped.
    pub fn next(&self, value: T) {
        if self.is_stopped() {
            trace!(stream = %self.id, "next ignored on stopped subject");
            return;
        }
        self.observers.emit_next(&value);
    }

    /// Terminate with an error.
    pub fn error(&self, err: impl Into<StreamError>) {
        let err = err.into();
        {
            let mut status = self.status.borrow_mut();
            if status.is_stopped() {
                return;
            }
            *status = Status::Errored(err.clone());
        }
        trace!(stream = %self.id, error = %err, "subject errored");
        self.observers.emit_error(&err);
    }

    /// Terminate with completion.
    pub fn complete(&self) {
        {
            let mut status = self.status.borrow_mut();
            if status.is_stopped() {
                return;
            }
            *status = Status::Completed;
        }
        trace!(stream = %self.id, "subject completed");
        self.observers.emit_complete();
    }

    /// Whether `error()` or `complete()` has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.status.borrow().is_stopped()
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Subscribe an observer.
    pub fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let status = self.status.borrow().clone();
        if status.replay_to(&observer) {
            return Subscription::closed();
        }
        let (_, subscription) = self.observers.add(observer);
        trace!(stream = %self.id, observers = self.observers.len(), "subject subscribed");
        subscription
    }
}

impl<T: 'static> Stream<T> for Subject<T> {
    fn id(&self) -> StreamId {
        self.id
    }

    fn subscribe(&self, observer: Observer<T>) -> Subscription {
        Subject::subscribe(self, observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn collect<T: Clone + 'static>(subject: &Subject<T>) -> (Rc<RefCell<Vec<T>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let sub = subject.subscribe(Observer::from_next(move |v: &T| {
            seen_clone.borrow_mut().push(v.clone());
        }));
        (seen, sub)
    }

    #[test]
    fn multicasts_to_all_observers() {
        let subject = Subject::new();
        let (a, _sa) = collect(&subject);
        let (b, _sb) = collect(&subject);
        subject.next(1);
        subject.next(2);
        assert_eq!(*a.borrow(), vec![1, 2]);
        assert_eq!(*b.borrow(), vec![1, 2]);
    }

    #[test]
    fn late_subscriber_misses_earlier_values() {
        let subject = Subject::new();
        subject.next(1);
        let (seen, _sub) = collect(&subject);
        subject.next(2);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let subject = Subject::new();
        let (seen, mut sub) = collect(&subject);
        subject.next(1);
        sub.unsubscribe();
        subject.next(2);
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn complete_stops_and_replays_to_late_subscribers() {
        let subject: Subject<i32> = Subject::new();
        let done = Rc::new(Cell::new(0u32));
        let done_clone = Rc::clone(&done);
        let _sub = subject.subscribe(Observer::new().on_complete(move || {
            done_clone.set(done_clone.get() + 1);
        }));
        subject.complete();
        subject.complete();
        assert_eq!(done.get(), 1);
        assert!(subject.is_stopped());

        let late = Rc::new(Cell::new(false));
        let late_clone = Rc::clone(&late);
        let sub = subject.subscribe(Observer::new().on_complete(move || late_clone.set(true)));
        assert!(late.get());
        assert!(sub.is_closed());
    }

    #[test]
    fn error_is_forwarded_once() {
        let subject: Subject<i32> = Subject::new();
        let errors = Rc::new(RefCell::new(Vec::new()));
        let errors_clone = Rc::clone(&errors);
        let _sub = subject.subscribe(Observer::new().on_error(move |e: &StreamError| {
            errors_clone.borrow_mut().push(e.message().to_string());
        }));
        subject.error("boom");
        subject.error("again");
        subject.next(1);
        assert_eq!(*errors.borrow(), vec!["boom".to_string()]);
    }

    #[test]
    fn reentrant_emission_is_allowed() {
        let subject = Subject::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let echo = subject.clone();
        let _sub = subject.subscribe(Observer::from_next(move |v: &i32| {
            seen_clone.borrow_mut().push(*v);
            if *v < 3 {
                echo.next(v + 1);
            }
        }));
        subject.next(1);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn clones_share_identity() {
        let a: Subject<u8> = Subject::new();
        let b = a.clone();
        let c: Subject<u8> = Subject::new();
        assert_eq!(a.id(), b.id());
        assert!(a.ptr_eq(&b));
        assert_ne!(a.id(), c.id());
        assert!(!a.ptr_eq(&c));
    }
}
