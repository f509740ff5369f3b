//! The subscription bridge shared by every snapshot hook.
//!
//! A bridge keeps the latest stream signal in a per-component cell and
//! exposes that cell to the runtime as an [`ExternalStore`] keyed by
//! [`StreamId`]. The runtime owns the subscription lifecycle: it subscribes
//! at commit, resubscribes only when the stream identity changes and tears
//! the subscription down exactly once.
//!
//! # Invariants
//!
//! 1. At most one live subscription per bridge.
//! 2. After N deliveries the cell holds the N-th delivered value; with no
//!    delivery it holds the initial value.
//! 3. A subscription opened for an earlier identity never writes the cell
//!    (generation guard), and a released one never delivers at all.
//!
//! # Failure Modes
//!
//! Stream errors land in [`StreamState::error`] and are logged with
//! `warn!`. They never unwind into the render.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use bitflags::bitflags;
use rxsync_runtime::{ExternalStore, HookCx, HookRef, StoreNotifier, Teardown};
use rxsync_stream::{Observer, Stream, StreamError, StreamId};
use tracing::{debug, trace, warn};

bitflags! {
    /// Stream signals that make a bridge ask the runtime for a re-render.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NotifyMask: u8 {
        /// A value was delivered.
        const VALUE = 1 << 0;
        /// The stream errored.
        const ERROR = 1 << 1;
        /// The stream completed.
        const COMPLETE = 1 << 2;
    }
}

impl NotifyMask {
    /// Re-render on every value and on errors.
    pub const EVERY_VALUE: Self = Self::VALUE.union(Self::ERROR);
    /// Stage values silently and publish the last one on completion.
    pub const ON_COMPLETE: Self = Self::COMPLETE.union(Self::ERROR);

    /// Whether values are held back until completion.
    #[must_use]
    pub const fn stages_values(self) -> bool {
        !self.contains(Self::VALUE)
    }
}

/// What a bridge has observed of its stream so far.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamState<V> {
    /// Latest published value (or the initial value).
    pub value: V,
    /// The terminal error, once delivered.
    pub error: Option<StreamError>,
    /// Whether the stream completed.
    pub completed: bool,
}

impl<V> StreamState<V> {
    /// A state holding `value` and no terminal signal.
    pub fn new(value: V) -> Self {
        Self {
            value,
            error: None,
            completed: false,
        }
    }

    /// Whether a terminal signal arrived.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.completed || self.error.is_some()
    }
}

struct BridgeCell<V> {
    stream: StreamId,
    generation: u64,
    state: StreamState<V>,
    pending: Option<V>,
}

impl<V> BridgeCell<V> {
    fn new(stream: StreamId, value: V) -> Self {
        Self {
            stream,
            generation: 0,
            state: StreamState::new(value),
            pending: None,
        }
    }

    fn reset(&mut self, stream: StreamId, value: V) {
        self.stream = stream;
        self.generation += 1;
        self.state = StreamState::new(value);
        self.pending = None;
    }
}

impl<V: fmt::Debug> fmt::Debug for BridgeCell<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeCell")
            .field("stream", &self.stream)
            .field("generation", &self.generation)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Bind `stream` to the rendering component and return its current state.
///
/// `initial` seeds the cell on the first render and again whenever
/// `stream` has a different identity than on the previous render; it is not
/// called otherwise. `wrap` converts each delivered value into the cell's
/// representation. `mask` picks the signals that trigger a re-render.
pub fn attach<T, V, S>(
    cx: &mut HookCx<'_>,
    stream: &S,
    initial: impl Fn() -> V,
    wrap: fn(&T) -> V,
    mask: NotifyMask,
) -> StreamState<V>
where
    T: 'static,
    V: Clone + PartialEq + 'static,
    S: Stream<T> + Clone + 'static,
{
    let id = stream.id();
    let cell = cx.use_ref(|| BridgeCell::new(id, initial()));
    let previous = cell.with(|c| c.stream);
    if previous != id {
        let seed = initial();
        cell.with_mut(|c| c.reset(id, seed));
        debug!(component = %cx.component(), from = %previous, to = %id, "stream identity changed");
    }
    cx.use_sync_external_store(StreamStore {
        stream: stream.clone(),
        cell,
        wrap,
        mask,
        _values: PhantomData,
    })
}

struct StreamStore<S, T, V> {
    stream: S,
    cell: HookRef<BridgeCell<V>>,
    wrap: fn(&T) -> V,
    mask: NotifyMask,
    _values: PhantomData<fn(&T)>,
}

impl<S, T, V> ExternalStore for StreamStore<S, T, V>
where
    S: Stream<T> + 'static,
    T: 'static,
    V: Clone + PartialEq + 'static,
{
    type Key = StreamId;
    type Snapshot = StreamState<V>;

    fn key(&self) -> StreamId {
        self.stream.id()
    }

    fn subscribe(&self, notify: StoreNotifier) -> Teardown {
        let stream = self.stream.id();
        let sink = Rc::new(Sink {
            cell: self.cell.clone(),
            generation: self.cell.with(|c| c.generation),
            mask: self.mask,
            notifier: notify,
            stream,
        });
        let wrap = self.wrap;
        let staged = self.mask.stages_values();

        let on_next = Rc::clone(&sink);
        let on_error = Rc::clone(&sink);
        let observer = Observer::new()
            .on_next(move |value: &T| {
                let value = wrap(value);
                on_next.write(NotifyMask::VALUE, |c| {
                    if staged {
                        c.pending = Some(value);
                    } else {
                        c.state.value = value;
                    }
                });
            })
            .on_error(move |err: &StreamError| {
                warn!(stream = %on_error.stream, error = %err, "stream error reached snapshot bridge");
                on_error.write(NotifyMask::ERROR, |c| {
                    c.pending = None;
                    c.state.error = Some(err.clone());
                });
            })
            .on_complete(move || {
                sink.write(NotifyMask::COMPLETE, |c| {
                    if let Some(value) = c.pending.take() {
                        c.state.value = value;
                    }
                    c.state.completed = true;
                });
            });

        let mut subscription = self.stream.subscribe(observer);
        trace!(%stream, closed = subscription.is_closed(), "bridge subscribed");
        Box::new(move || {
            subscription.unsubscribe();
            trace!(%stream, "bridge released");
        })
    }

    fn get_snapshot(&self) -> StreamState<V> {
        self.cell.with(|c| c.state.clone())
    }
}

/// Write side of one subscription.
struct Sink<V> {
    cell: HookRef<BridgeCell<V>>,
    generation: u64,
    mask: NotifyMask,
    notifier: StoreNotifier,
    stream: StreamId,
}

impl<V> Sink<V> {
    fn write(&self, signal: NotifyMask, update: impl FnOnce(&mut BridgeCell<V>)) {
        let current = self.cell.with_mut(|c| {
            if c.generation != self.generation {
                return false;
            }
            update(c);
            true
        });
        if !current {
            trace!(stream = %self.stream, "stale delivery dropped");
            return;
        }
        if self.mask.intersects(signal) {
            self.notifier.notify();
        }
    }
}
