//! Re-render scheduling and runtime counters.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fmt;

use tracing::trace;

/// Identity of a mounted component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);

impl ComponentId {
    /// Raw numeric value (for logging).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// Counters accumulated over a runtime's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Component render calls.
    pub renders: u64,
    /// Flush passes that reached the commit phase.
    pub commits: u64,
    /// Store change notifications received.
    pub notifications: u64,
    /// Notifications whose snapshot matched the rendered one.
    pub skipped_notifications: u64,
    /// Re-renders scheduled by the post-commit snapshot check.
    pub tearing_rerenders: u64,
    /// Store `subscribe` calls.
    pub store_subscribes: u64,
    /// Store teardowns invoked.
    pub store_teardowns: u64,
    /// Effect bodies run.
    pub effect_runs: u64,
    /// Effect cleanups run.
    pub effect_cleanups: u64,
}

/// Shared, single-threaded scheduling state.
///
/// Notifiers hold a `Weak` to this, so a notification arriving after the
/// runtime is gone is dropped.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    dirty: RefCell<BTreeSet<ComponentId>>,
    mounted: RefCell<BTreeSet<ComponentId>>,
    stats: Cell<RuntimeStats>,
}

impl Scheduler {
    pub(crate) fn mount(&self, id: ComponentId) {
        self.mounted.borrow_mut().insert(id);
    }

    pub(crate) fn unmount(&self, id: ComponentId) {
        self.mounted.borrow_mut().remove(&id);
        self.dirty.borrow_mut().remove(&id);
    }

    pub(crate) fn is_mounted(&self, id: ComponentId) -> bool {
        self.mounted.borrow().contains(&id)
    }

    /// Mark a mounted component for re-render. Returns `false` for unknown
    /// components.
    pub(crate) fn schedule(&self, id: ComponentId, reason: &'static str) -> bool {
        if !self.is_mounted(id) {
            return false;
        }
        let fresh = self.dirty.borrow_mut().insert(id);
        if fresh {
            trace!(component = %id, reason, "re-render scheduled");
        }
        true
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.dirty.borrow().is_empty()
    }

    pub(crate) fn take_dirty(&self) -> Vec<ComponentId> {
        std::mem::take(&mut *self.dirty.borrow_mut())
            .into_iter()
            .collect()
    }

    pub(crate) fn record(&self, f: impl FnOnce(&mut RuntimeStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    pub(crate) fn stats(&self) -> RuntimeStats {
        self.stats.get()
    }
}
