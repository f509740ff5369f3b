//! Side-effect subscriptions.

use rxsync_runtime::{Cleanup, HookCx, HookRef};
use rxsync_stream::{Observer, Stream, StreamId};
use tracing::debug;

/// Run `observer`'s reactions for every signal of `stream` without touching
/// the component's render output.
///
/// - `None` is a valid stream: nothing is subscribed and nothing fails.
/// - The subscription is opened after commit and kept until the stream
///   identity changes or the component unmounts. Passing a different
///   observer never resubscribes.
/// - Reactions are looked up at delivery time, so the observer from the most
///   recent render is always the one invoked.
pub fn use_subscription<T, S>(cx: &mut HookCx<'_>, stream: Option<&S>, observer: Observer<T>)
where
    T: 'static,
    S: Stream<T> + Clone + 'static,
{
    let latest = cx.use_ref(Observer::new);
    latest.set(observer);

    let id: Option<StreamId> = stream.map(|s| s.id());
    let stream = stream.cloned();
    let component = cx.component();
    cx.use_effect(id, move || {
        let stream = stream?;
        let mut subscription = stream.subscribe(forward_to_latest(&latest));
        debug!(%component, stream = %stream.id(), "side-effect subscription opened");
        Some(Box::new(move || {
            subscription.unsubscribe();
            debug!(%component, "side-effect subscription released");
        }) as Cleanup)
    });
}

fn forward_to_latest<T: 'static>(latest: &HookRef<Observer<T>>) -> Observer<T> {
    let (next, error, complete) = (latest.clone(), latest.clone(), latest.clone());
    Observer::new()
        .on_next(move |value: &T| next.get().next(value))
        .on_error(move |err| error.get().error(err))
        .on_complete(move || complete.get().complete())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxsync_harness::{Recorder, SpyStream, render_hook_with_props};
    use rxsync_stream::{StreamError, Subject};

    type Props = (Option<SpyStream<Subject<i32>>>, Recorder<i32>);

    fn mount(props: Props) -> rxsync_harness::RenderHook<Props, ()> {
        render_hook_with_props(props, |cx, (stream, rec): &Props| {
            use_subscription(cx, stream.as_ref(), Observer::from_next(rec.callback()));
        })
        .unwrap()
    }

    #[test]
    fn absent_stream_is_a_no_op() {
        let rec = Recorder::new();
        let mut hook = mount((None, rec.clone()));
        hook.rerender().unwrap();
        assert!(hook.unmount());
        assert_eq!(rec.count(), 0);
    }

    #[test]
    fn delivers_until_unmount() {
        let stream = SpyStream::new(Subject::new());
        let rec = Recorder::new();
        let mut hook = mount((Some(stream.clone()), rec.clone()));
        let renders = hook.render_count();
        stream.next(1);
        stream.next(2);
        assert_eq!(rec.calls(), vec![1, 2]);
        assert_eq!(hook.render_count(), renders);

        hook.unmount();
        stream.next(3);
        assert_eq!(rec.calls(), vec![1, 2]);
        assert_eq!((stream.subscribe_count(), stream.release_count()), (1, 1));
    }

    #[test]
    fn newer_reaction_keeps_subscription() {
        let stream = SpyStream::new(Subject::new());
        let old = Recorder::new();
        let new = Recorder::new();
        let mut hook = mount((Some(stream.clone()), old.clone()));
        stream.next(1);
        hook.rerender_with((Some(stream.clone()), new.clone())).unwrap();
        stream.next(2);
        assert_eq!(old.calls(), vec![1]);
        assert_eq!(new.calls(), vec![2]);
        assert_eq!(stream.subscribe_count(), 1);
        assert_eq!(stream.live_count(), 1);
    }

    #[test]
    fn identity_change_moves_subscription() {
        let a = SpyStream::new(Subject::new());
        let b = SpyStream::new(Subject::new());
        let rec = Recorder::new();
        let mut hook = mount((Some(a.clone()), rec.clone()));
        hook.rerender_with((Some(b.clone()), rec.clone())).unwrap();
        a.next(1);
        b.next(2);
        assert_eq!(rec.calls(), vec![2]);
        assert_eq!((a.release_count(), b.live_count()), (1, 1));

        hook.rerender_with((None, rec.clone())).unwrap();
        assert_eq!(b.live_count(), 0);
    }

    #[test]
    fn error_and_complete_reactions() {
        let subject = Subject::<u8>::new();
        let errors = Recorder::new();
        let done = Recorder::<()>::new();
        let (e, d) = (errors.clone(), done.clone());
        let mut hook = render_hook_with_props(subject.clone(), move |cx, s: &Subject<u8>| {
            use_subscription(
                cx,
                Some(s),
                Observer::new().on_error(e.callback()).on_complete(d.signal()),
            );
        })
        .unwrap();
        hook.act(|| subject.error("lost")).unwrap();
        assert_eq!(errors.calls(), vec![StreamError::new("lost")]);
        assert_eq!(done.count(), 0);
    }
}
