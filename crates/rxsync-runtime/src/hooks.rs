//! Hook context and hook slot storage.
//!
//! Every hook call claims the next slot of the rendering component, so hooks
//! must be called in the same order on every render.
//!
//! # Failure Modes
//!
//! - **Hook order change**: calling a different hook at a slot than on the
//!   previous render, or calling more hooks than were mounted, panics. This
//!   is intentional: conditional hooks indicate a bug in the component.
//! - **Re-entrant ref access**: mutating a [`HookRef`] from inside its own
//!   `with_mut` closure panics (RefCell borrow rules).

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::config::RenderMode;
use crate::hook_ref::HookRef;
use crate::scheduler::{ComponentId, Scheduler};
use crate::store::{ExternalStore, StoreNotifier, Teardown};

/// Cleanup returned by an effect.
pub type Cleanup = Box<dyn FnOnce()>;

/// Deferred work run after every component of a pass has rendered.
pub(crate) type CommitOp = Box<dyn FnOnce(&CommitCx)>;

/// Context available to commit-phase work.
pub(crate) struct CommitCx {
    pub(crate) component: ComponentId,
    pub(crate) scheduler: Rc<Scheduler>,
    pub(crate) check_tearing: bool,
}

type UnmountFn = Box<dyn FnOnce(&Scheduler)>;

/// One hook's persistent state.
pub(crate) struct Slot {
    kind: &'static str,
    state: Rc<dyn Any>,
    on_unmount: Option<UnmountFn>,
}

impl Slot {
    pub(crate) fn unmount(self, scheduler: &Scheduler) {
        if let Some(f) = self.on_unmount {
            f(scheduler);
        }
    }
}

/// Per-render hook context.
pub struct HookCx<'a> {
    component: ComponentId,
    mode: RenderMode,
    mounting: bool,
    slots: &'a mut Vec<Slot>,
    cursor: usize,
    commits: &'a mut Vec<CommitOp>,
}

impl<'a> HookCx<'a> {
    pub(crate) fn new(
        component: ComponentId,
        mode: RenderMode,
        mounting: bool,
        slots: &'a mut Vec<Slot>,
        commits: &'a mut Vec<CommitOp>,
    ) -> Self {
        Self {
            component,
            mode,
            mounting,
            slots,
            cursor: 0,
            commits,
        }
    }

    /// Component being rendered.
    #[must_use]
    pub fn component(&self) -> ComponentId {
        self.component
    }

    /// Client or server rendering.
    #[must_use]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Whether this is the component's first render.
    #[must_use]
    pub fn is_mounting(&self) -> bool {
        self.mounting
    }

    pub(crate) fn hooks_used(&self) -> usize {
        self.cursor
    }

    /// Claim the next slot. `None` means the slot does not exist yet and the
    /// caller must [`push_slot`](Self::push_slot) it.
    fn next_slot<S: 'static>(&mut self, kind: &'static str) -> Option<Rc<S>> {
        let index = self.cursor;
        self.cursor += 1;
        let Some(slot) = self.slots.get(index) else {
            assert!(
                self.mounting,
                "{}: rendered more hooks than during the previous render (`{kind}` at slot {index})",
                self.component
            );
            return None;
        };
        match Rc::clone(&slot.state).downcast::<S>() {
            Ok(state) => Some(state),
            Err(_) => panic!(
                "{}: hook order changed between renders: slot {index} was `{}`, now `{kind}`",
                self.component, slot.kind
            ),
        }
    }

    fn push_slot<S: 'static>(
        &mut self,
        kind: &'static str,
        state: S,
        on_unmount: Option<fn(&S, &Scheduler)>,
    ) -> Rc<S> {
        let state = Rc::new(state);
        let on_unmount = on_unmount.map(|f| {
            let state = Rc::clone(&state);
            Box::new(move |scheduler: &Scheduler| f(&state, scheduler)) as UnmountFn
        });
        self.slots.push(Slot {
            kind,
            state: Rc::clone(&state) as Rc<dyn Any>,
            on_unmount,
        });
        state
    }

    fn on_commit(&mut self, op: impl FnOnce(&CommitCx) + 'static) {
        self.commits.push(Box::new(op));
    }

    /// A mutable cell that keeps its identity for the component's lifetime.
    /// `init` runs on the first render only.
    pub fn use_ref<T: 'static>(&mut self, init: impl FnOnce() -> T) -> HookRef<T> {
        match self.next_slot::<HookRef<T>>("use_ref") {
            Some(cell) => (*cell).clone(),
            None => (*self.push_slot("use_ref", HookRef::new(init()), None)).clone(),
        }
    }

    /// A value recomputed only when `deps` changes.
    pub fn use_memo<D, T>(&mut self, deps: D, compute: impl FnOnce() -> T) -> T
    where
        D: PartialEq + 'static,
        T: Clone + 'static,
    {
        match self.next_slot::<MemoSlot<D, T>>("use_memo") {
            Some(slot) => {
                let stale = *slot.deps.borrow() != deps;
                if stale {
                    let value = compute();
                    *slot.value.borrow_mut() = value.clone();
                    *slot.deps.borrow_mut() = deps;
                    value
                } else {
                    slot.value.borrow().clone()
                }
            }
            None => {
                let value = compute();
                self.push_slot(
                    "use_memo",
                    MemoSlot {
                        deps: RefCell::new(deps),
                        value: RefCell::new(value.clone()),
                    },
                    None,
                );
                value
            }
        }
    }

    /// Run `effect` after commit whenever `deps` changed since the last run.
    ///
    /// The previous cleanup runs before the next effect body, and at unmount.
    /// Effects never run in server mode.
    pub fn use_effect<D, F>(&mut self, deps: D, effect: F)
    where
        D: PartialEq + 'static,
        F: FnOnce() -> Option<Cleanup> + 'static,
    {
        let slot = match self.next_slot::<EffectSlot<D>>("use_effect") {
            Some(slot) => slot,
            None => self.push_slot(
                "use_effect",
                EffectSlot {
                    deps: RefCell::new(None),
                    cleanup: RefCell::new(None),
                },
                Some(EffectSlot::<D>::unmount),
            ),
        };
        if self.mode == RenderMode::Server {
            return;
        }
        let changed = slot.deps.borrow().as_ref() != Some(&deps);
        if !changed {
            return;
        }
        *slot.deps.borrow_mut() = Some(deps);
        self.on_commit(move |commit| {
            slot.run_cleanup(&commit.scheduler);
            let cleanup = effect();
            commit.scheduler.record(|s| s.effect_runs += 1);
            *slot.cleanup.borrow_mut() = cleanup;
        });
    }

    /// Read an external store without tearing.
    ///
    /// The store is subscribed at commit, once per [`ExternalStore::key`];
    /// a key change tears the old subscription down before the new one opens.
    /// The latest `store` value is used for snapshot reads on every render.
    pub fn use_sync_external_store<S: ExternalStore>(&mut self, store: S) -> S::Snapshot {
        let key = store.key();
        let store = Rc::new(store);
        let slot = match self.next_slot::<StoreSlot<S>>("use_sync_external_store") {
            Some(slot) => {
                let key_changed = *slot.key.borrow() != key;
                if key_changed {
                    debug!(component = %self.component, ?key, "store key changed");
                    *slot.key.borrow_mut() = key;
                    slot.resubscribe.set(true);
                }
                *slot.store.borrow_mut() = Rc::clone(&store);
                slot
            }
            None => self.push_slot(
                "use_sync_external_store",
                StoreSlot {
                    store: RefCell::new(Rc::clone(&store)),
                    key: RefCell::new(key),
                    rendered: RefCell::new(None),
                    teardown: RefCell::new(None),
                    resubscribe: Cell::new(true),
                },
                Some(StoreSlot::<S>::unmount),
            ),
        };

        let snapshot = match self.mode {
            RenderMode::Client => store.get_snapshot(),
            RenderMode::Server => store.get_server_snapshot(),
        };
        *slot.rendered.borrow_mut() = Some(snapshot.clone());

        if self.mode == RenderMode::Client {
            self.on_commit(move |commit| StoreSlot::commit(&slot, commit));
        }
        snapshot
    }
}

struct MemoSlot<D, T> {
    deps: RefCell<D>,
    value: RefCell<T>,
}

struct EffectSlot<D> {
    deps: RefCell<Option<D>>,
    cleanup: RefCell<Option<Cleanup>>,
}

impl<D> EffectSlot<D> {
    fn run_cleanup(&self, scheduler: &Scheduler) {
        let cleanup = self.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
            scheduler.record(|s| s.effect_cleanups += 1);
        }
    }

    fn unmount(&self, scheduler: &Scheduler) {
        self.run_cleanup(scheduler);
    }
}

struct StoreSlot<S: ExternalStore> {
    store: RefCell<Rc<S>>,
    key: RefCell<S::Key>,
    rendered: RefCell<Option<S::Snapshot>>,
    teardown: RefCell<Option<Teardown>>,
    resubscribe: Cell<bool>,
}

impl<S: ExternalStore> StoreSlot<S> {
    fn current_store(&self) -> Rc<S> {
        Rc::clone(&self.store.borrow())
    }

    fn snapshot_changed(&self) -> bool {
        let current = self.current_store().get_snapshot();
        self.rendered.borrow().as_ref() != Some(&current)
    }

    fn release(&self, scheduler: &Scheduler) {
        let teardown = self.teardown.borrow_mut().take();
        if let Some(teardown) = teardown {
            teardown();
            scheduler.record(|s| s.store_teardowns += 1);
        }
    }

    fn unmount(&self, scheduler: &Scheduler) {
        self.release(scheduler);
    }

    fn commit(slot: &Rc<Self>, commit: &CommitCx) {
        if slot.resubscribe.replace(false) {
            slot.release(&commit.scheduler);
            let weak = Rc::downgrade(slot);
            let notifier = StoreNotifier::new(
                commit.component,
                Rc::downgrade(&commit.scheduler),
                Rc::new(move || weak.upgrade().is_some_and(|slot| slot.snapshot_changed())),
            );
            let teardown = slot.current_store().subscribe(notifier);
            *slot.teardown.borrow_mut() = Some(teardown);
            commit.scheduler.record(|s| s.store_subscribes += 1);
            debug!(component = %commit.component, key = ?slot.key.borrow(), "store subscribed");
        }
        if commit.check_tearing && slot.snapshot_changed() {
            commit.scheduler.record(|s| s.tearing_rerenders += 1);
            commit
                .scheduler
                .schedule(commit.component, "snapshot moved before commit");
        }
    }
}
