//! Completion-valued subject.
//!
//! An [`AsyncSubject`] withholds every value until it completes, then emits
//! only the last one followed by completion. An error discards the pending
//! value.

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

struct AsyncInner<T> {
    last: Option<T>,
    status: Status,
}

/// A stream that emits its final value only at completion.
pub struct AsyncSubject<T> {
    id: StreamId,
    inner: Rc<RefCell<AsyncInner<T>>>,
    observers: ObserverList<T>,
}

impl<T> Clone for AsyncSubject<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Rc::clone(&self.inner),
            observers: self.observers.clone(),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for AsyncSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("AsyncSubject")
            .field("id", &self.id)
            .field("last", &inner.last)
            .field("status", &inner.status)
            .finish()
    }
}

impl<T: Clone + 'static> Default for AsyncSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> AsyncSubject<T> {
    /// Create an empty subject.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: StreamId::unique(),
            inner: Rc::new(RefCell::new(AsyncInner {
                last: None,
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

    /// Record a value. Nothing is delivered until [`complete`](Self::complete).
    pub fn next(&self, value: T) {
        let mut inner = self.inner.borrow_mut();
        if inner.status.is_stopped() {
            return;
        }
        inner.last = Some(value);
    }

    /// Terminate with an error, dropping the pending value.
    pub fn error(&self, err: impl Into<StreamError>) {
        let err = err.into();
        {
            let mut inner = self.inner.borrow_mut();
            if inner.status.is_stopped() {
                return;
            }
            inner.status = Status::Errored(err.clone());
            inner.last = None;
        }
        self.observers.emit_error(&err);
    }

    /// Complete: deliver the last value (if any), then completion.
    pub fn complete(&self) {
        let last = {
            let mut inner = self.inner.borrow_mut();
            if inner.status.is_stopped() {
                return;
            }
            inner.status = Status::Completed;
            inner.last.clone()
        };
        trace!(stream = %self.id, has_value = last.is_some(), "async subject completed");
        if let Some(value) = last {
            self.observers.emit_next(&value);
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

    /// Subscribe an observer. After completion the final value and the
    /// completion are delivered immediately.
    pub fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let (last, status) = {
            let inner = self.inner.borrow();
            (inner.last.clone(), inner.status.clone())
        };
        match status {
            Status::Active => {
                let (_, subscription) = self.observers.add(observer);
                subscription
            }
            Status::Completed => {
                if let Some(value) = &last {
                    observer.next(value);
                }
                observer.complete();
                Subscription::closed()
            }
            Status::Errored(err) => {
                observer.error(&err);
                Subscription::closed()
            }
        }
    }
}

impl<T: Clone + 'static> Stream<T> for AsyncSubject<T> {
    fn id(&self) -> StreamId {
        self.id
    }

    fn subscribe(&self, observer: Observer<T>) -> Subscription {
        AsyncSubject::subscribe(self, observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(subject: &AsyncSubject<i32>) -> (Rc<RefCell<Vec<String>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (Rc::clone(&log), Rc::clone(&log));
        let sub = subject.subscribe(
            Observer::new()
                .on_next(move |v: &i32| a.borrow_mut().push(v.to_string()))
                .on_complete(move || b.borrow_mut().push("done".to_string())),
        );
        (log, sub)
    }

    #[test]
    fn withholds_values_until_complete() {
        let subject = AsyncSubject::new();
        let (log, _sub) = collect(&subject);
        subject.next(1);
        subject.next(2);
        assert!(log.borrow().is_empty());
        subject.complete();
        assert_eq!(*log.borrow(), vec!["2", "done"]);
    }

    #[test]
    fn late_subscriber_gets_final_value() {
        let subject = AsyncSubject::new();
        subject.next(9);
        subject.complete();
        let (log, sub) = collect(&subject);
        assert!(sub.is_closed());
        assert_eq!(*log.borrow(), vec!["9", "done"]);
    }

    #[test]
    fn complete_without_value_only_completes() {
        let subject = AsyncSubject::new();
        let (log, _sub) = collect(&subject);
        subject.complete();
        assert_eq!(*log.borrow(), vec!["done"]);
    }

    #[test]
    fn error_discards_pending_value() {
        let subject = AsyncSubject::new();
        let (log, _sub) = collect(&subject);
        subject.next(1);
        subject.error("nope");
        subject.complete();
        assert!(log.borrow().is_empty());
    }
}
