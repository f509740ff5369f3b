//! RAII subscription handles.

use std::fmt;

/// An open relationship between an observer and a stream.
///
/// Releasing is idempotent: [`unsubscribe`](Self::unsubscribe) runs the
/// teardown at most once, and dropping the handle releases it if it is still
/// open.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// A handle that runs `teardown` when released.
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A handle that is already released (e.g. the stream had terminated
    /// before the subscribe call).
    pub fn closed() -> Self {
        Self { teardown: None }
    }

    /// Whether the handle has been released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.teardown.is_none()
    }

    /// Release the subscription. Later calls are no-ops.
    pub fn unsubscribe(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}
