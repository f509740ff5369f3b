//! Turning callbacks into streams.

use std::fmt;

use rxsync_runtime::HookCx;
use rxsync_stream::Subject;

/// Pushes values into the stream created by [`use_observable_callback`].
///
/// Stable for the component's lifetime: every render returns a handle to the
/// same stream, and clones compare equal.
pub struct Emit<T> {
    subject: Subject<T>,
}

impl<T> Clone for Emit<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
        }
    }
}

impl<T: 'static> PartialEq for Emit<T> {
    fn eq(&self, other: &Self) -> bool {
        self.subject.ptr_eq(&other.subject)
    }
}

impl<T: 'static> fmt::Debug for Emit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Emit").field(&self.subject.id()).finish()
    }
}

impl<T: 'static> Emit<T> {
    /// Push `value` to every current subscriber.
    pub fn emit(&self, value: T) {
        self.subject.next(value);
    }

    /// A plain closure form, for APIs that take `Fn(T)`.
    pub fn to_fn(&self) -> impl Fn(T) + 'static {
        let subject = self.subject.clone();
        move |value| subject.next(value)
    }
}

/// Create a callback and the stream it feeds.
///
/// Both are created on the first render and reused afterwards. The stream
/// is never completed by the hook.
pub fn use_observable_callback<T: 'static>(cx: &mut HookCx<'_>) -> (Emit<T>, Subject<T>) {
    let subject = cx.use_memo((), Subject::new);
    (
        Emit {
            subject: subject.clone(),
        },
        subject,
    )
}
