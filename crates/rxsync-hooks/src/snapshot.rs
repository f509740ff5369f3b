//! Snapshot hooks: one per stream kind.
//!
//! | Hook | Before the first value | Re-renders on |
//! |------|------------------------|---------------|
//! | [`use_subject`] | `None` | every value |
//! | [`use_behavior_subject`] | the stream's current value | every value |
//! | [`use_replay_subject`] | `None` (replayed values arrive at subscribe) | every value |
//! | [`use_async_subject`] | `None` | completion only |
//! | [`use_observable`] | the caller's initial value | every value |
//! | [`use_stream_state`] | `None`, no terminal signal | values, errors and completion |
//!
//! All of them re-render on stream errors too; only [`use_stream_state`]
//! lets the component see the error.

use rxsync_runtime::HookCx;
use rxsync_stream::{CurrentValue, Stream};

use crate::bridge::{NotifyMask, StreamState, attach};

fn some<T: Clone>(value: &T) -> Option<T> {
    Some(value.clone())
}

fn cloned<T: Clone>(value: &T) -> T {
    value.clone()
}

/// Latest value of a multicast stream, `None` until the first delivery.
pub fn use_subject<T, S>(cx: &mut HookCx<'_>, stream: &S) -> Option<T>
where
    T: Clone + PartialEq + 'static,
    S: Stream<T> + Clone + 'static,
{
    attach(cx, stream, || None, some, NotifyMask::EVERY_VALUE).value
}

/// Latest value of a stream with a synchronous current value.
///
/// The current value is read when the stream is first bound (and again when
/// the identity changes), so the very first render already has a value.
pub fn use_behavior_subject<T, S>(cx: &mut HookCx<'_>, stream: &S) -> T
where
    T: Clone + PartialEq + 'static,
    S: CurrentValue<T> + Clone + 'static,
{
    attach(cx, stream, || stream.current(), cloned, NotifyMask::EVERY_VALUE).value
}

/// Latest value of a replaying stream. Buffered values are delivered during
/// subscribe, so the newest of them shows up in the render right after
/// mount.
pub fn use_replay_subject<T, S>(cx: &mut HookCx<'_>, stream: &S) -> Option<T>
where
    T: Clone + PartialEq + 'static,
    S: Stream<T> + Clone + 'static,
{
    attach(cx, stream, || None, some, NotifyMask::EVERY_VALUE).value
}

/// The value a stream completed with.
///
/// `None` until completion, even if values were delivered and the component
/// re-rendered for other reasons. On completion it is the last value
/// delivered before it. An error discards the staged value.
pub fn use_async_subject<T, S>(cx: &mut HookCx<'_>, stream: &S) -> Option<T>
where
    T: Clone + PartialEq + 'static,
    S: Stream<T> + Clone + 'static,
{
    attach(cx, stream, || None, some, NotifyMask::ON_COMPLETE).value
}

/// Latest value of any stream, starting from `initial`.
///
/// `initial` is only used on the first render and after an identity change.
pub fn use_observable<T, S>(cx: &mut HookCx<'_>, stream: &S, initial: T) -> T
where
    T: Clone + PartialEq + 'static,
    S: Stream<T> + Clone + 'static,
{
    attach(cx, stream, || initial.clone(), cloned, NotifyMask::EVERY_VALUE).value
}

/// Latest value plus terminal signals of a stream.
pub fn use_stream_state<T, S>(cx: &mut HookCx<'_>, stream: &S) -> StreamState<Option<T>>
where
    T: Clone + PartialEq + 'static,
    S: Stream<T> + Clone + 'static,
{
    attach(cx, stream, || None, some, NotifyMask::all())
}
