//! Streams that count how adapters use them.

use std::cell::Cell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use rxsync_stream::{CurrentValue, Observer, Stream, StreamId, Subscription};

#[derive(Debug, Default)]
struct SpyCounts {
    subscribes: Cell<usize>,
    releases: Cell<usize>,
    current_reads: Cell<usize>,
}

/// Wraps a stream and counts subscribe calls, releases and current-value
/// reads. Clones share the counters and the identity of the wrapped stream.
///
/// Derefs to the wrapped stream, so emissions go through the spy directly:
///
/// ```
/// use rxsync_harness::SpyStream;
/// use rxsync_stream::{Observer, Stream, Subject};
///
/// let spy = SpyStream::new(Subject::<i32>::new());
/// let sub = Stream::subscribe(&spy, Observer::new());
/// spy.next(1);
/// drop(sub);
/// assert_eq!((spy.subscribe_count(), spy.release_count()), (1, 1));
/// ```
pub struct SpyStream<S> {
    inner: S,
    counts: Rc<SpyCounts>,
}

impl<S: Clone> Clone for SpyStream<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            counts: Rc::clone(&self.counts),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for SpyStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpyStream")
            .field("inner", &self.inner)
            .field("subscribes", &self.counts.subscribes.get())
            .field("releases", &self.counts.releases.get())
            .finish()
    }
}

impl<S> Deref for SpyStream<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S> SpyStream<S> {
    /// Start spying on `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counts: Rc::default(),
        }
    }

    /// `subscribe` calls so far.
    #[must_use]
    pub fn subscribe_count(&self) -> usize {
        self.counts.subscribes.get()
    }

    /// Subscriptions released so far.
    #[must_use]
    pub fn release_count(&self) -> usize {
        self.counts.releases.get()
    }

    /// Subscriptions currently open.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.subscribe_count() - self.release_count()
    }

    /// `current` calls so far.
    #[must_use]
    pub fn current_reads(&self) -> usize {
        self.counts.current_reads.get()
    }
}

impl<T, S: Stream<T>> Stream<T> for SpyStream<S> {
    fn id(&self) -> StreamId {
        self.inner.id()
    }

    fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let counts = &self.counts;
        counts.subscribes.set(counts.subscribes.get() + 1);
        tracing::trace!(stream = %self.inner.id(), n = counts.subscribes.get(), "spy subscribe");
        let mut inner = self.inner.subscribe(observer);
        let counts = Rc::clone(&self.counts);
        Subscription::new(move || {
            counts.releases.set(counts.releases.get() + 1);
            inner.unsubscribe();
        })
    }
}

impl<T, S: CurrentValue<T>> CurrentValue<T> for SpyStream<S> {
    fn current(&self) -> T {
        self.counts.current_reads.set(self.counts.current_reads.get() + 1);
        self.inner.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxsync_stream::{BehaviorSubject, Subject};

    #[test]
    fn counts_subscribe_and_release() {
        let spy = SpyStream::new(Subject::<u8>::new());
        let mut a = Stream::subscribe(&spy, Observer::new());
        let b = Stream::subscribe(&spy.clone(), Observer::new());
        assert_eq!(spy.live_count(), 2);
        a.unsubscribe();
        a.unsubscribe();
        drop(b);
        assert_eq!(spy.subscribe_count(), 2);
        assert_eq!(spy.release_count(), 2);
        assert_eq!(spy.observer_count(), 0);
    }

    #[test]
    fn shares_identity_and_current_value() {
        let spy = SpyStream::new(BehaviorSubject::new(42));
        assert_eq!(Stream::id(&spy), spy.inner.id());
        assert_eq!(spy.current(), 42);
        assert_eq!(spy.current_reads(), 1);
    }
}
