//! Component runtime: mount, render passes, commit and unmount.
//!
//! A flush is a sequence of passes. Each pass renders every scheduled
//! component (in mount order), then runs the commit work queued by their
//! hooks. Commit work may schedule more renders (store subscriptions that
//! deliver synchronously, tearing re-checks); those run in the next pass of
//! the same flush, so a flush only returns once no component observed a stale
//! snapshot.
//!
//! # Invariants
//!
//! 1. Within a pass all components render before any commit runs.
//! 2. A flush either ends with nothing scheduled or returns
//!    [`RuntimeError::RenderLoop`] after `max_render_passes` passes.
//! 3. Unmount runs every slot's cleanup exactly once, in slot order.
//! 4. A mount that returns an error leaves nothing mounted.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, debug_span, warn};

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::hooks::{CommitCx, CommitOp, HookCx, Slot};
use crate::scheduler::{ComponentId, RuntimeStats, Scheduler};

type RenderFn = Box<dyn FnMut(&mut HookCx<'_>)>;

struct ComponentEntry {
    slots: Vec<Slot>,
    render: RenderFn,
    rendered_once: bool,
}

/// Handle to a mounted component's props and last rendered output.
pub struct ComponentHandle<P, R> {
    id: ComponentId,
    props: Rc<RefCell<P>>,
    output: Rc<RefCell<Option<R>>>,
}

impl<P, R> Clone for ComponentHandle<P, R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            props: Rc::clone(&self.props),
            output: Rc::clone(&self.output),
        }
    }
}

impl<P, R> fmt::Debug for ComponentHandle<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("id", &self.id)
            .field("rendered", &self.output.borrow().is_some())
            .finish()
    }
}

impl<P, R> ComponentHandle<P, R> {
    /// Component identity.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// A clone of the last rendered output.
    #[must_use]
    pub fn output(&self) -> Option<R>
    where
        R: Clone,
    {
        self.output.borrow().clone()
    }

    /// Inspect the last rendered output without cloning.
    pub fn with_output<T>(&self, f: impl FnOnce(Option<&R>) -> T) -> T {
        f(self.output.borrow().as_ref())
    }
}

/// Single-threaded component runtime.
pub struct Runtime {
    config: RuntimeConfig,
    scheduler: Rc<Scheduler>,
    components: BTreeMap<ComponentId, ComponentEntry>,
    next_id: u64,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("components", &self.components.len())
            .field("stats", &self.scheduler.stats())
            .finish()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Runtime {
    /// Create an empty runtime.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            scheduler: Rc::new(Scheduler::default()),
            components: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Mount a component and flush until stable.
    ///
    /// A component whose first flush fails is unmounted again, with its
    /// cleanups run, before the error is returned.
    pub fn mount<P, R, F>(&mut self, props: P, mut render: F) -> Result<ComponentHandle<P, R>, RuntimeError>
    where
        P: 'static,
        R: 'static,
        F: FnMut(&mut HookCx<'_>, &P) -> R + 'static,
    {
        let id = ComponentId(self.next_id);
        self.next_id += 1;

        let handle = ComponentHandle {
            id,
            props: Rc::new(RefCell::new(props)),
            output: Rc::new(RefCell::new(None)),
        };
        let props = Rc::clone(&handle.props);
        let output = Rc::clone(&handle.output);
        let render: RenderFn = Box::new(move |cx| {
            let value = render(cx, &props.borrow());
            *output.borrow_mut() = Some(value);
        });

        self.components.insert(
            id,
            ComponentEntry {
                slots: Vec::new(),
                render,
                rendered_once: false,
            },
        );
        self.scheduler.mount(id);
        self.scheduler.schedule(id, "mount");
        debug!(component = %id, mode = ?self.config.mode, "component mounted");

        if let Err(err) = self.flush() {
            warn!(component = %id, error = %err, "mount failed, unmounting");
            self.unmount(id);
            return Err(err);
        }
        Ok(handle)
    }

    /// Replace a component's props and re-render it.
    pub fn set_props<P, R>(&mut self, handle: &ComponentHandle<P, R>, props: P) -> Result<(), RuntimeError> {
        if !self.is_mounted(handle.id) {
            return Err(RuntimeError::UnknownComponent(handle.id));
        }
        *handle.props.borrow_mut() = props;
        self.rerender(handle.id)
    }

    /// Schedule a component and flush.
    pub fn rerender(&mut self, id: ComponentId) -> Result<(), RuntimeError> {
        if !self.scheduler.schedule(id, "explicit rerender") {
            return Err(RuntimeError::UnknownComponent(id));
        }
        self.flush().map(|_| ())
    }

    /// Run `f` (typically stream emissions), then flush the renders it caused.
    pub fn act<T>(&mut self, f: impl FnOnce() -> T) -> Result<T, RuntimeError> {
        let value = f();
        self.flush()?;
        Ok(value)
    }

    /// Render and commit until nothing is scheduled. Returns the number of
    /// passes run.
    pub fn flush(&mut self) -> Result<usize, RuntimeError> {
        let mut passes = 0;
        while self.scheduler.has_pending() {
            if passes == self.config.max_render_passes {
                let pending = self.scheduler.take_dirty().len();
                return Err(RuntimeError::RenderLoop { passes, pending });
            }
            passes += 1;
            let _span = debug_span!("render_pass", pass = passes).entered();
            self.run_pass();
        }
        Ok(passes)
    }

    fn run_pass(&mut self) {
        let dirty = self.scheduler.take_dirty();
        let mut commits: Vec<(ComponentId, Vec<CommitOp>)> = Vec::with_capacity(dirty.len());

        for id in dirty {
            let Some(entry) = self.components.get_mut(&id) else {
                continue;
            };
            let mut ops = Vec::new();
            let mounting = !entry.rendered_once;
            let mut cx = HookCx::new(id, self.config.mode, mounting, &mut entry.slots, &mut ops);
            (entry.render)(&mut cx);
            let used = cx.hooks_used();
            assert!(
                used == entry.slots.len(),
                "{id}: rendered {used} hooks, previous render used {}",
                entry.slots.len()
            );
            entry.rendered_once = true;
            self.scheduler.record(|s| s.renders += 1);
            commits.push((id, ops));
        }

        for (component, ops) in commits {
            let commit = CommitCx {
                component,
                scheduler: Rc::clone(&self.scheduler),
                check_tearing: self.config.check_tearing,
            };
            for op in ops {
                op(&commit);
            }
        }
        self.scheduler.record(|s| s.commits += 1);
    }

    /// Unmount a component, running every cleanup it registered. Returns
    /// `false` if it was not mounted.
    pub fn unmount(&mut self, id: ComponentId) -> bool {
        let Some(entry) = self.components.remove(&id) else {
            return false;
        };
        self.scheduler.unmount(id);
        for slot in entry.slots {
            slot.unmount(&self.scheduler);
        }
        debug!(component = %id, "component unmounted");
        true
    }

    /// Whether `id` is mounted.
    #[must_use]
    pub fn is_mounted(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    /// Whether a re-render is scheduled but not yet flushed.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// Counters accumulated since creation.
    #[must_use]
    pub fn stats(&self) -> RuntimeStats {
        self.scheduler.stats()
    }

    /// Number of mounted components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let ids: Vec<ComponentId> = self.components.keys().copied().collect();
        for id in ids {
            self.unmount(id);
        }
    }
}
