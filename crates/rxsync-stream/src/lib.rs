#![forbid(unsafe_code)]

//! Stream primitives: the push-based sources rxsync adapters bind to.
//!
//! # Role in rxsync
//! `rxsync-stream` is the stream provider. Hooks in `rxsync-hooks` only ever
//! talk to the [`Stream`] and [`CurrentValue`] traits, so any source that
//! honours the subscribe/release contract can be bound to a component.
//!
//! # Primary responsibilities
//! - **Identity**: every stream carries a [`StreamId`]; clones share it.
//! - **Subscription**: RAII handle whose release is idempotent and stops all
//!   further delivery, even mid-notification.
//! - **Subjects**: [`Subject`] (multicast), [`BehaviorSubject`] (latest
//!   value), [`ReplaySubject`] (buffered replay) and [`AsyncSubject`]
//!   (completion-valued).
//! - **Cold streams**: [`Observable`] runs a producer per subscription.
//!
//! # Architecture
//!
//! All streams are single-threaded (`Rc<RefCell<..>>`). Callbacks are always
//! invoked outside internal borrows, so a callback may emit into the same
//! stream re-entrantly.

pub mod async_subject;
pub mod behavior;
pub mod error;
pub mod id;
pub mod observable;
pub mod observer;
pub mod replay;
pub mod subject;
pub mod subscription;

mod observers;

pub use async_subject::AsyncSubject;
pub use behavior::BehaviorSubject;
pub use error::StreamError;
pub use id::StreamId;
pub use observable::{Observable, Subscriber};
pub use observer::Observer;
pub use replay::ReplaySubject;
pub use subject::Subject;
pub use subscription::Subscription;

/// A push source of values with optional terminal error or completion.
///
/// Implementations must deliver values to each observer in emission order and
/// must stop delivering to an observer once its [`Subscription`] is released.
pub trait Stream<T> {
    /// Identity of the underlying source. Handles to the same source compare
    /// equal.
    fn id(&self) -> StreamId;

    /// Open a subscription delivering to `observer`.
    fn subscribe(&self, observer: Observer<T>) -> Subscription;
}

/// A stream that retains its most recent value and exposes it synchronously.
pub trait CurrentValue<T>: Stream<T> {
    /// The most recent value, independent of any subscription.
    fn current(&self) -> T;
}
