//! Registration-ordered observer list shared by the subjects.
//!
//! Delivery collects the live entries first and invokes callbacks outside the
//! borrow, so callbacks may subscribe, release or emit re-entrantly. Each entry
//! carries its own `closed` flag, checked immediately before every callback:
//! a release that happens mid-notification suppresses the remaining deliveries
//! to that observer.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::StreamError;
use crate::observer::Observer;
use crate::subscription::Subscription;

pub(crate) struct Entry<T> {
    key: u64,
    observer: Observer<T>,
    closed: Cell<bool>,
}

impl<T> Entry<T> {
    pub(crate) fn next(&self, value: &T) {
        if !self.closed.get() {
            self.observer.next(value);
        }
    }

    fn error(&self, err: &StreamError) {
        if !self.closed.replace(true) {
            self.observer.error(err);
        }
    }

    fn complete(&self) {
        if !self.closed.replace(true) {
            self.observer.complete();
        }
    }
}

struct ListInner<T> {
    entries: Vec<Rc<Entry<T>>>,
    next_key: u64,
}

pub(crate) struct ObserverList<T> {
    inner: Rc<RefCell<ListInner<T>>>,
}

impl<T> Clone for ObserverList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> ObserverList<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListInner {
                entries: Vec::new(),
                next_key: 0,
            })),
        }
    }

    /// Register an observer. The returned subscription closes the entry and
    /// removes it from the list.
    pub(crate) fn add(&self, observer: Observer<T>) -> (Rc<Entry<T>>, Subscription) {
        let entry = {
            let mut inner = self.inner.borrow_mut();
            let key = inner.next_key;
            inner.next_key += 1;
            let entry = Rc::new(Entry {
                key,
                observer,
                closed: Cell::new(false),
            });
            inner.entries.push(Rc::clone(&entry));
            entry
        };

        let weak_list: Weak<RefCell<ListInner<T>>> = Rc::downgrade(&self.inner);
        let weak_entry = Rc::downgrade(&entry);
        let key = entry.key;
        let subscription = Subscription::new(move || {
            if let Some(entry) = weak_entry.upgrade() {
                entry.closed.set(true);
            }
            if let Some(list) = weak_list.upgrade() {
                list.borrow_mut().entries.retain(|e| e.key != key);
            }
        });
        (entry, subscription)
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    fn live(&self) -> Vec<Rc<Entry<T>>> {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| !e.closed.get())
            .cloned()
            .collect()
    }

    fn drain(&self) -> Vec<Rc<Entry<T>>> {
        std::mem::take(&mut self.inner.borrow_mut().entries)
    }

    pub(crate) fn emit_next(&self, value: &T) {
        for entry in self.live() {
            entry.next(value);
        }
    }

    /// Deliver an error and drop every entry.
    pub(crate) fn emit_error(&self, err: &StreamError) {
        for entry in self.drain() {
            entry.error(err);
        }
    }

    /// Deliver completion and drop every entry.
    pub(crate) fn emit_complete(&self) {
        for entry in self.drain() {
            entry.complete();
        }
    }
}

/// Terminal status shared by the subject kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Status {
    #[default]
    Active,
    Errored(StreamError),
    Completed,
}

impl Status {
    pub(crate) fn is_stopped(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Replay a terminal signal to a late observer. Returns `false` while the
    /// stream is still active.
    pub(crate) fn replay_to<T>(&self, observer: &Observer<T>) -> bool {
        match self {
            Self::Active => false,
            Self::Errored(err) => {
                observer.error(err);
                true
            }
            Self::Completed => {
                observer.complete();
                true
            }
        }
    }
}
