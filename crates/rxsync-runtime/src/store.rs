//! External store protocol.
//!
//! An [`ExternalStore`] is mutable state owned outside the runtime. A
//! component reads it through
//! [`HookCx::use_sync_external_store`](crate::HookCx::use_sync_external_store),
//! which guarantees that no committed render mixes two different snapshots of
//! the same store.
//!
//! # Protocol
//!
//! 1. During render the runtime calls `get_snapshot` (or
//!    `get_server_snapshot` in server mode) and remembers the result.
//! 2. At commit the runtime calls `subscribe` once per store key, handing over
//!    a [`StoreNotifier`]. The returned [`Teardown`] is invoked exactly once:
//!    before subscribing for a new key, or at unmount.
//! 3. When the store calls [`StoreNotifier::notify`], the runtime re-reads the
//!    snapshot and schedules a re-render only if it differs from the rendered
//!    one.
//! 4. After commit the runtime re-reads the snapshot once more; a value that
//!    moved between render and commit schedules a synchronous re-render.

use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::scheduler::{ComponentId, Scheduler};

/// Releases a store subscription.
pub type Teardown = Box<dyn FnOnce()>;

/// Mutable state readable through the tear-free snapshot protocol.
pub trait ExternalStore: 'static {
    /// Subscription identity. A new key means a new subscription.
    type Key: PartialEq + fmt::Debug + 'static;
    /// Value handed to the component. Compared with `PartialEq` to decide
    /// whether a notification needs a re-render.
    type Snapshot: Clone + PartialEq + 'static;

    /// Current subscription identity.
    fn key(&self) -> Self::Key;

    /// Start delivering change notifications to `notify`.
    fn subscribe(&self, notify: StoreNotifier) -> Teardown;

    /// The current snapshot.
    fn get_snapshot(&self) -> Self::Snapshot;

    /// Snapshot used in server mode.
    fn get_server_snapshot(&self) -> Self::Snapshot {
        self.get_snapshot()
    }
}

/// Change-notification capability handed to [`ExternalStore::subscribe`].
///
/// Opaque to the store: calling [`notify`](Self::notify) is the only thing a
/// store can do with it.
#[derive(Clone)]
pub struct StoreNotifier {
    component: ComponentId,
    scheduler: Weak<Scheduler>,
    changed: Rc<dyn Fn() -> bool>,
}

impl fmt::Debug for StoreNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreNotifier")
            .field("component", &self.component)
            .field("live", &(self.scheduler.strong_count() > 0))
            .finish()
    }
}

impl StoreNotifier {
    pub(crate) fn new(
        component: ComponentId,
        scheduler: Weak<Scheduler>,
        changed: Rc<dyn Fn() -> bool>,
    ) -> Self {
        Self {
            component,
            scheduler,
            changed,
        }
    }

    /// Component this notifier schedules.
    #[must_use]
    pub fn component(&self) -> ComponentId {
        self.component
    }

    /// Report that the store may have changed.
    pub fn notify(&self) {
        let Some(scheduler) = self.scheduler.upgrade() else {
            return;
        };
        scheduler.record(|s| s.notifications += 1);
        if !scheduler.is_mounted(self.component) {
            warn!(component = %self.component, "store notification for unmounted component");
            return;
        }
        if (self.changed)() {
            scheduler.schedule(self.component, "store changed");
        } else {
            scheduler.record(|s| s.skipped_notifications += 1);
        }
    }
}
