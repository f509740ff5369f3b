//! Property-based invariant tests for the runtime.
//!
//! 1. After every `act`, a component's output equals the store snapshot.
//! 2. A store with a fixed key is subscribed exactly once per mount.
//! 3. Every subscribe is matched by exactly one teardown after unmount.
//! 4. Renders never exceed one per notification plus the initial mount.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use proptest::prelude::*;
use rxsync_runtime::{ExternalStore, Runtime, StoreNotifier, Teardown};

#[derive(Clone, Default)]
struct Shared {
    value: Rc<Cell<i16>>,
    listeners: Rc<RefCell<Vec<StoreNotifier>>>,
    subscribes: Rc<Cell<u32>>,
    teardowns: Rc<Cell<u32>>,
}

impl Shared {
    fn set(&self, value: i16) {
        self.value.set(value);
        let listeners = self.listeners.borrow().clone();
        for notifier in listeners {
            notifier.notify();
        }
    }
}

impl ExternalStore for Shared {
    type Key = ();
    type Snapshot = i16;

    fn key(&self) {}

    fn subscribe(&self, notify: StoreNotifier) -> Teardown {
        self.subscribes.set(self.subscribes.get() + 1);
        self.listeners.borrow_mut().push(notify);
        let listeners = Rc::clone(&self.listeners);
        let teardowns = Rc::clone(&self.teardowns);
        Box::new(move || {
            teardowns.set(teardowns.get() + 1);
            listeners.borrow_mut().clear();
        })
    }

    fn get_snapshot(&self) -> i16 {
        self.value.get()
    }
}

proptest! {
    #[test]
    fn output_tracks_store(writes in proptest::collection::vec(any::<i16>(), 0..40)) {
        let store = Shared::default();
        let mut rt = Runtime::default();
        let source = store.clone();
        let handle = rt
            .mount((), move |cx, _| cx.use_sync_external_store(source.clone()))
            .unwrap();
        for v in &writes {
            rt.act(|| store.set(*v)).unwrap();
            prop_assert_eq!(handle.output(), Some(*v));
        }
        prop_assert_eq!(store.subscribes.get(), 1);
        prop_assert!(rt.stats().renders <= 1 + writes.len() as u64);

        rt.unmount(handle.id());
        prop_assert_eq!(store.teardowns.get(), 1);
        prop_assert!(store.listeners.borrow().is_empty());
    }

    #[test]
    fn batched_writes_render_once(writes in proptest::collection::vec(any::<i16>(), 1..20)) {
        let store = Shared::default();
        let mut rt = Runtime::default();
        let source = store.clone();
        let handle = rt
            .mount((), move |cx, _| cx.use_sync_external_store(source.clone()))
            .unwrap();
        let before = rt.stats().renders;
        rt.act(|| {
            for v in &writes {
                store.set(*v);
            }
        })
        .unwrap();
        let last = *writes.last().unwrap();
        prop_assert_eq!(handle.output(), Some(last));
        prop_assert!(rt.stats().renders - before <= 1);
    }
}
