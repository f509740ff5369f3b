//! Mount a hook inside a throwaway component.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use rxsync_runtime::{ComponentHandle, HookCx, Runtime, RuntimeConfig, RuntimeError, RuntimeStats};

/// A mounted hook and the runtime driving it.
pub struct RenderHook<P, R> {
    runtime: Runtime,
    handle: ComponentHandle<P, R>,
    renders: Rc<Cell<usize>>,
}

impl<P, R> fmt::Debug for RenderHook<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderHook")
            .field("component", &self.handle.id())
            .field("renders", &self.renders.get())
            .finish()
    }
}

/// Mount `hook` with no props.
pub fn render_hook<R, F>(mut hook: F) -> Result<RenderHook<(), R>, RuntimeError>
where
    R: 'static,
    F: FnMut(&mut HookCx<'_>) -> R + 'static,
{
    render_hook_with_props((), move |cx, _| hook(cx))
}

/// Mount `hook` with `props`, using the default client configuration.
pub fn render_hook_with_props<P, R, F>(props: P, hook: F) -> Result<RenderHook<P, R>, RuntimeError>
where
    P: 'static,
    R: 'static,
    F: FnMut(&mut HookCx<'_>, &P) -> R + 'static,
{
    render_hook_with_config(RuntimeConfig::default(), props, hook)
}

/// Mount `hook` with `props` in a runtime built from `config`.
pub fn render_hook_with_config<P, R, F>(
    config: RuntimeConfig,
    props: P,
    mut hook: F,
) -> Result<RenderHook<P, R>, RuntimeError>
where
    P: 'static,
    R: 'static,
    F: FnMut(&mut HookCx<'_>, &P) -> R + 'static,
{
    let mut runtime = Runtime::new(config);
    let renders = Rc::new(Cell::new(0));
    let counter = Rc::clone(&renders);
    let handle = runtime.mount(props, move |cx, props| {
        counter.set(counter.get() + 1);
        hook(cx, props)
    })?;
    Ok(RenderHook {
        runtime,
        handle,
        renders,
    })
}

impl<P, R> RenderHook<P, R> {
    /// The hook's most recent return value.
    ///
    /// # Panics
    ///
    /// Panics if the hook never completed a render.
    #[must_use]
    pub fn result(&self) -> R
    where
        R: Clone,
    {
        match self.handle.output() {
            Some(value) => value,
            None => panic!("{}: hook has not rendered", self.handle.id()),
        }
    }

    /// Re-render with the current props.
    pub fn rerender(&mut self) -> Result<(), RuntimeError> {
        self.runtime.rerender(self.handle.id())
    }

    /// Re-render with new props.
    pub fn rerender_with(&mut self, props: P) -> Result<(), RuntimeError> {
        self.runtime.set_props(&self.handle, props)
    }

    /// Run `f`, then flush whatever it scheduled.
    pub fn act<T>(&mut self, f: impl FnOnce() -> T) -> Result<T, RuntimeError> {
        self.runtime.act(f)
    }

    /// Unmount the component. Returns `false` if it was already unmounted.
    pub fn unmount(&mut self) -> bool {
        self.runtime.unmount(self.handle.id())
    }

    /// Whether the component is still mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.runtime.is_mounted(self.handle.id())
    }

    /// Times the hook body ran.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.renders.get()
    }

    /// Runtime counters.
    #[must_use]
    pub fn stats(&self) -> RuntimeStats {
        self.runtime.stats()
    }

    /// The underlying runtime, e.g. to mount sibling components.
    pub fn runtime(&mut self) -> &mut Runtime {
        &mut self.runtime
    }
}
