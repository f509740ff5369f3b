//! Runtime errors.

use std::fmt;

use crate::scheduler::ComponentId;

/// Errors from runtime operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A flush kept scheduling re-renders past the configured bound.
    RenderLoop {
        /// Passes completed before giving up.
        passes: usize,
        /// Components still scheduled when the flush stopped.
        pending: usize,
    },
    /// The component is not (or no longer) mounted.
    UnknownComponent(ComponentId),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RenderLoop { passes, pending } => write!(
                f,
                "render loop: {pending} component(s) still scheduled after {passes} passes"
            ),
            Self::UnknownComponent(id) => write!(f, "unknown component: {id}"),
        }
    }
}

impl std::error::Error for RuntimeError {}
