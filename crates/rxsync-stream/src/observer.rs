//! Observer callback sets.

use std::fmt;
use std::rc::Rc;

use crate::error::StreamError;

type NextFn<T> = Rc<dyn Fn(&T)>;
type ErrorFn = Rc<dyn Fn(&StreamError)>;
type CompleteFn = Rc<dyn Fn()>;

/// Up to three callbacks receiving a stream's signals.
///
/// Missing callbacks silently drop their signal. Cloning is cheap and shares
/// the callbacks.
///
/// ```
/// use rxsync_stream::{Observer, Subject};
///
/// let subject = Subject::new();
/// let _sub = subject.subscribe(
///     Observer::new()
///         .on_next(|v: &i32| println!("got {v}"))
///         .on_complete(|| println!("done")),
/// );
/// subject.next(1);
/// ```
pub struct Observer<T> {
    next: Option<NextFn<T>>,
    error: Option<ErrorFn>,
    complete: Option<CompleteFn>,
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next.clone(),
            error: self.error.clone(),
            complete: self.complete.clone(),
        }
    }
}

impl<T> Default for Observer<T> {
    fn default() -> Self {
        Self {
            next: None,
            error: None,
            complete: None,
        }
    }
}

impl<T> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("next", &self.next.is_some())
            .field("error", &self.error.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

impl<T> Observer<T> {
    /// An observer with no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An observer that only handles values.
    pub fn from_next(f: impl Fn(&T) + 'static) -> Self {
        Self::new().on_next(f)
    }

    /// Set the value callback.
    #[must_use]
    pub fn on_next(mut self, f: impl Fn(&T) + 'static) -> Self {
        self.next = Some(Rc::new(f));
        self
    }

    /// Set the error callback.
    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&StreamError) + 'static) -> Self {
        self.error = Some(Rc::new(f));
        self
    }

    /// Set the completion callback.
    #[must_use]
    pub fn on_complete(mut self, f: impl Fn() + 'static) -> Self {
        self.complete = Some(Rc::new(f));
        self
    }

    /// Deliver a value.
    pub fn next(&self, value: &T) {
        if let Some(f) = &self.next {
            f(value);
        }
    }

    /// Deliver an error.
    pub fn error(&self, err: &StreamError) {
        if let Some(f) = &self.error {
            f(err);
        }
    }

    /// Deliver completion.
    pub fn complete(&self) {
        if let Some(f) = &self.complete {
            f();
        }
    }
}
