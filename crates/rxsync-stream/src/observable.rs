//! Cold observables.
//!
//! An [`Observable`] is a producer closure that runs once per subscription.
//! The producer receives a [`Subscriber`] to push signals into and returns a
//! [`Subscription`] holding its own teardown (or [`Subscription::closed`] when
//! it has nothing to clean up).
//!
//! # Failure Modes
//!
//! | Situation | Behavior |
//! |-----------|----------|
//! | Producer emits after `complete()`/`error()` | Dropped silently |
//! | Producer emits after the consumer released | Dropped silently |
//! | Producer terminates synchronously | `subscribe` returns a closed handle |

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::Stream;
use crate::error::StreamError;
use crate::id::StreamId;
use crate::observer::Observer;
use crate::subscription::Subscription;

struct SubscriberInner<T> {
    observer: Observer<T>,
    closed: Cell<bool>,
}

/// Producer-side handle of one subscription to an [`Observable`].
pub struct Subscriber<T> {
    inner: Rc<SubscriberInner<T>>,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("closed", &self.inner.closed.get())
            .finish()
    }
}

impl<T> Subscriber<T> {
    fn new(observer: Observer<T>) -> Self {
        Self {
            inner: Rc::new(SubscriberInner {
                observer,
                closed: Cell::new(false),
            }),
        }
    }

    /// Push a value to the consumer.
    pub fn next(&self, value: T) {
        if !self.inner.closed.get() {
            self.inner.observer.next(&value);
        }
    }

    /// Terminate with an error.
    pub fn error(&self, err: impl Into<StreamError>) {
        if !self.inner.closed.replace(true) {
            self.inner.observer.error(&err.into());
        }
    }

    /// Terminate with completion.
    pub fn complete(&self) {
        if !self.inner.closed.replace(true) {
            self.inner.observer.complete();
        }
    }

    /// Whether the subscription has terminated or been released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    fn close(&self) {
        self.inner.closed.set(true);
    }
}

type Producer<T> = dyn Fn(Subscriber<T>) -> Subscription;

/// A cold stream: each subscription runs the producer afresh.
pub struct Observable<T> {
    id: StreamId,
    producer: Rc<Producer<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            producer: Rc::clone(&self.producer),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").field("id", &self.id).finish()
    }
}

impl<T: 'static> Observable<T> {
    /// Create an observable from a producer.
    pub fn new(producer: impl Fn(Subscriber<T>) -> Subscription + 'static) -> Self {
        Self {
            id: StreamId::unique(),
            producer: Rc::new(producer),
        }
    }

    /// Emit `value` once, then complete.
    pub fn of(value: T) -> Self
    where
        T: Clone,
    {
        Self::from_values([value])
    }

    /// Emit every item of `items` in order, then complete.
    pub fn from_values(items: impl IntoIterator<Item = T>) -> Self
    where
        T: Clone,
    {
        let items: Rc<[T]> = items.into_iter().collect();
        Self::new(move |subscriber| {
            for item in items.iter() {
                if subscriber.is_closed() {
                    break;
                }
                subscriber.next(item.clone());
            }
            subscriber.complete();
            Subscription::closed()
        })
    }

    /// Complete immediately without values.
    pub fn empty() -> Self {
        Self::new(|subscriber| {
            subscriber.complete();
            Subscription::closed()
        })
    }

    /// Never emit anything.
    pub fn never() -> Self {
        Self::new(|_| Subscription::closed())
    }

    /// Fail immediately with `err`.
    pub fn throw_error(err: impl Into<StreamError>) -> Self {
        let err = err.into();
        Self::new(move |subscriber| {
            subscriber.error(err.clone());
            Subscription::closed()
        })
    }

    /// Identity of this observable.
    #[must_use]
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Run the producer for a new subscription.
    pub fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let subscriber = Subscriber::new(observer);
        let teardown = (self.producer)(subscriber.clone());
        if subscriber.is_closed() {
            drop(teardown);
            return Subscription::closed();
        }
        Subscription::new(move || {
            subscriber.close();
            drop(teardown);
        })
    }
}

impl<T: 'static> Stream<T> for Observable<T> {
    fn id(&self) -> StreamId {
        self.id
    }

    fn subscribe(&self, observer: Observer<T>) -> Subscription {
        Observable::subscribe(self, observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn collect<T: Clone + 'static>(
        obs: &Observable<T>,
    ) -> (Rc<RefCell<Vec<T>>>, Rc<Cell<bool>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let done = Rc::new(Cell::new(false));
        let (s, d) = (Rc::clone(&seen), Rc::clone(&done));
        let sub = obs.subscribe(
            Observer::new()
                .on_next(move |v: &T| s.borrow_mut().push(v.clone()))
                .on_complete(move || d.set(true)),
        );
        (seen, done, sub)
    }

    #[test]
    fn of_emits_synchronously_and_completes() {
        let (seen, done, sub) = collect(&Observable::of(42));
        assert_eq!(*seen.borrow(), vec![42]);
        assert!(done.get());
        assert!(sub.is_closed());
    }

    #[test]
    fn each_subscription_reruns_the_producer() {
        let obs = Observable::from_values([1, 2, 3]);
        let (a, _, _sa) = collect(&obs);
        let (b, _, _sb) = collect(&obs);
        assert_eq!(*a.borrow(), vec![1, 2, 3]);
        assert_eq!(*b.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn release_runs_producer_teardown_and_stops_delivery() {
        let torn_down = Rc::new(Cell::new(0u32));
        let slot: Rc<RefCell<Option<Subscriber<i32>>>> = Rc::new(RefCell::new(None));
        let (t, s) = (Rc::clone(&torn_down), Rc::clone(&slot));
        let obs = Observable::new(move |subscriber| {
            *s.borrow_mut() = Some(subscriber);
            let t = Rc::clone(&t);
            Subscription::new(move || t.set(t.get() + 1))
        });

        let (seen, _, mut sub) = collect(&obs);
        let producer_side = slot.borrow().clone().expect("producer ran");
        producer_side.next(1);
        sub.unsubscribe();
        sub.unsubscribe();
        producer_side.next(2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(torn_down.get(), 1);
        assert!(producer_side.is_closed());
    }

    #[test]
    fn throw_error_delivers_error() {
        let errors = Rc::new(RefCell::new(Vec::new()));
        let e = Rc::clone(&errors);
        let sub = Observable::<i32>::throw_error("bad")
            .subscribe(Observer::new().on_error(move |err: &StreamError| e.borrow_mut().push(err.clone())));
        assert!(sub.is_closed());
        assert_eq!(errors.borrow()[0].message(), "bad");
    }

    #[test]
    fn never_stays_open() {
        let (seen, done, sub) = collect(&Observable::<u8>::never());
        assert!(seen.borrow().is_empty());
        assert!(!done.get());
        assert!(!sub.is_closed());
    }

    #[test]
    fn empty_completes() {
        let (_, done, _sub) = collect(&Observable::<u8>::empty());
        assert!(done.get());
    }
}
