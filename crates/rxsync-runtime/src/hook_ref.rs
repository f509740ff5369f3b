//! Stable mutable cells returned by [`HookCx::use_ref`](crate::HookCx::use_ref).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A shared mutable cell whose identity is stable across renders.
///
/// Cloning creates a new handle to the **same** cell. Writes never schedule
/// a re-render.
pub struct HookRef<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> Clone for HookRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for HookRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HookRef").field(&*self.inner.borrow()).finish()
    }
}

impl<T> HookRef<T> {
    /// Create a cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    /// A clone of the current contents.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.borrow().clone()
    }

    /// Overwrite the contents.
    pub fn set(&self, value: T) {
        *self.inner.borrow_mut() = value;
    }

    /// Overwrite the contents, returning the previous value.
    pub fn replace(&self, value: T) -> T {
        self.inner.replace(value)
    }

    /// Read the contents by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Mutate the contents in place.
    ///
    /// # Panics
    ///
    /// Panics if `f` re-enters this cell.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Whether two handles point at the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
