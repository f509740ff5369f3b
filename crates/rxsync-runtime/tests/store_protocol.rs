//! External store protocol tests: subscribe once per key, teardown exactly
//! once, skipped notifications, sibling consistency and server snapshots.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rxsync_runtime::{
    ExternalStore, RenderMode, Runtime, RuntimeConfig, RuntimeError, StoreNotifier, Teardown,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

#[derive(Default)]
struct CounterInner {
    value: Cell<i32>,
    listeners: RefCell<Vec<(u64, StoreNotifier)>>,
    next_listener: Cell<u64>,
    subscribes: Cell<usize>,
    teardowns: Cell<usize>,
}

/// Minimal store: a shared integer with listeners.
#[derive(Clone, Default)]
struct Counter {
    key: u32,
    inner: Rc<CounterInner>,
}

impl Counter {
    fn keyed(key: u32) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    fn set(&self, value: i32) {
        self.inner.value.set(value);
        let listeners: Vec<StoreNotifier> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, n)| n.clone())
            .collect();
        for notifier in listeners {
            notifier.notify();
        }
    }

    fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl ExternalStore for Counter {
    type Key = u32;
    type Snapshot = i32;

    fn key(&self) -> u32 {
        self.key
    }

    fn subscribe(&self, notify: StoreNotifier) -> Teardown {
        let inner = Rc::clone(&self.inner);
        let id = inner.next_listener.get();
        inner.next_listener.set(id + 1);
        inner.subscribes.set(inner.subscribes.get() + 1);
        inner.listeners.borrow_mut().push((id, notify));
        Box::new(move || {
            inner.teardowns.set(inner.teardowns.get() + 1);
            inner.listeners.borrow_mut().retain(|(k, _)| *k != id);
        })
    }

    fn get_snapshot(&self) -> i32 {
        self.inner.value.get()
    }

    fn get_server_snapshot(&self) -> i32 {
        -1
    }
}

#[test]
fn subscribes_once_and_rerenders_on_change() {
    let store = Counter::default();
    let mut rt = Runtime::default();
    let source = store.clone();
    let handle = rt
        .mount((), move |cx, _| cx.use_sync_external_store(source.clone()))
        .unwrap();
    assert_eq!(handle.output(), Some(0));
    assert_eq!(store.inner.subscribes.get(), 1);

    rt.act(|| store.set(5)).unwrap();
    assert_eq!(handle.output(), Some(5));
    rt.rerender(handle.id()).unwrap();
    assert_eq!(store.inner.subscribes.get(), 1);
    assert_eq!(rt.stats().store_subscribes, 1);
}

#[test]
fn unchanged_snapshot_is_skipped() {
    let store = Counter::default();
    let mut rt = Runtime::default();
    let source = store.clone();
    let handle = rt
        .mount((), move |cx, _| cx.use_sync_external_store(source.clone()))
        .unwrap();
    let renders = rt.stats().renders;
    rt.act(|| store.set(0)).unwrap();
    assert_eq!(rt.stats().renders, renders);
    assert_eq!(rt.stats().skipped_notifications, 1);
    assert_eq!(handle.output(), Some(0));
}

#[test]
fn key_change_tears_down_before_resubscribe() {
    init_tracing();
    let a = Counter::keyed(1);
    let b = Counter::keyed(2);
    a.set(10);
    b.set(20);
    let mut rt = Runtime::default();
    let handle = rt
        .mount(a.clone(), |cx, store: &Counter| cx.use_sync_external_store(store.clone()))
        .unwrap();
    assert_eq!(handle.output(), Some(10));

    rt.set_props(&handle, b.clone()).unwrap();
    assert_eq!(handle.output(), Some(20));
    assert_eq!(a.inner.teardowns.get(), 1);
    assert_eq!(a.listener_count(), 0);
    assert_eq!(b.inner.subscribes.get(), 1);

    // The old store no longer reaches the component.
    let renders = rt.stats().renders;
    rt.act(|| a.set(11)).unwrap();
    assert_eq!(rt.stats().renders, renders);
}

#[test]
fn unmount_tears_down_once() {
    let store = Counter::default();
    let mut rt = Runtime::default();
    let source = store.clone();
    let handle = rt
        .mount((), move |cx, _| cx.use_sync_external_store(source.clone()))
        .unwrap();
    assert!(rt.unmount(handle.id()));
    assert!(!rt.unmount(handle.id()));
    assert_eq!(store.inner.teardowns.get(), 1);
    assert_eq!(rt.stats().store_teardowns, 1);
    store.set(3);
    assert!(!rt.has_pending());
}

#[test]
fn siblings_never_commit_different_snapshots() {
    init_tracing();
    let store = Counter::default();
    let mut rt = Runtime::default();
    let seen: Rc<RefCell<Vec<(char, i32)>>> = Rc::default();

    // The first sibling writes to the store while rendering, so the second
    // one would observe a newer value than the first.
    let first_store = store.clone();
    let first_seen = Rc::clone(&seen);
    let first = rt
        .mount((), move |cx, _| {
            let value = cx.use_sync_external_store(first_store.clone());
            first_seen.borrow_mut().push(('a', value));
            if value == 1 {
                first_store.inner.value.set(2);
            }
            value
        })
        .unwrap();
    let second_store = store.clone();
    let second_seen = Rc::clone(&seen);
    let second = rt
        .mount((), move |cx, _| {
            let value = cx.use_sync_external_store(second_store.clone());
            second_seen.borrow_mut().push(('b', value));
            value
        })
        .unwrap();

    rt.act(|| store.set(1)).unwrap();
    assert_eq!(first.output(), Some(2));
    assert_eq!(second.output(), Some(2));
    assert!(rt.stats().tearing_rerenders >= 1);
}

#[test]
fn tearing_check_can_be_disabled() {
    let store = Counter::default();
    let mut rt = Runtime::new(RuntimeConfig::default().with_tearing_check(false));
    let source = store.clone();
    let handle = rt
        .mount((), move |cx, _| {
            let value = cx.use_sync_external_store(source.clone());
            // Moves the store after the read; nothing notifies.
            source.inner.value.set(value + 1);
            value
        })
        .unwrap();
    assert_eq!(handle.output(), Some(0));
    assert_eq!(rt.stats().tearing_rerenders, 0);
}

#[test]
fn unstable_snapshot_reports_render_loop() {
    init_tracing();
    let store = Counter::default();
    let mut rt = Runtime::new(RuntimeConfig::default().with_max_render_passes(3));
    let source = store.clone();
    let result = rt.mount((), move |cx, _| {
        let value = cx.use_sync_external_store(source.clone());
        source.inner.value.set(value + 1);
        value
    });
    assert_eq!(
        result.unwrap_err(),
        RuntimeError::RenderLoop {
            passes: 3,
            pending: 1
        }
    );
}

#[test]
fn failed_mount_leaves_nothing_subscribed() {
    init_tracing();
    let store = Counter::default();
    let mut rt = Runtime::new(RuntimeConfig::default().with_max_render_passes(3));
    let source = store.clone();
    let result = rt.mount((), move |cx, _| {
        let value = cx.use_sync_external_store(source.clone());
        source.inner.value.set(value + 1);
        value
    });
    assert!(result.is_err());
    assert_eq!(rt.component_count(), 0);
    assert_eq!(store.listener_count(), 0);
    assert_eq!(store.inner.teardowns.get(), store.inner.subscribes.get());
    assert!(!rt.has_pending());

    // Later work on the same runtime is unaffected.
    let other = Counter::keyed(7);
    let source = other.clone();
    let handle = rt
        .mount((), move |cx, _| cx.use_sync_external_store(source.clone()))
        .unwrap();
    rt.act(|| {
        store.set(50);
        other.set(4);
    })
    .unwrap();
    assert_eq!(handle.output(), Some(4));
}

#[test]
fn server_mode_reads_server_snapshot_without_subscribing() {
    let store = Counter::default();
    store.set(9);
    let mut rt = Runtime::new(RuntimeConfig::default().with_mode(RenderMode::Server));
    let source = store.clone();
    let handle = rt
        .mount((), move |cx, _| cx.use_sync_external_store(source.clone()))
        .unwrap();
    assert_eq!(handle.output(), Some(-1));
    assert_eq!(store.inner.subscribes.get(), 0);
}
