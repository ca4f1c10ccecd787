//! Scoped guards against re-entering a code section on the same call stack
//!
//! Handlers running during input dispatch may mutate the element tree, which
//! in turn triggers layout updates and focus recomputation. A
//! [`ReentrancyFlag`] marks a section as active for as long as the
//! [`ReentrancyGuard`] returned by [`ReentrancyFlag::enter`] is alive.

use std::{cell::Cell, fmt};

/// Marks whether a section is currently active on the call stack
#[derive(Default)]
pub struct ReentrancyFlag {
    active: Cell<bool>,
}

impl fmt::Debug for ReentrancyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReentrancyFlag").field(&self.active.get()).finish()
    }
}

impl ReentrancyFlag {
    /// A flag for a section that is not active
    pub const fn new() -> ReentrancyFlag {
        ReentrancyFlag {
            active: Cell::new(false),
        }
    }

    /// Enter the section
    ///
    /// Returns `None` if the section is already active further up the stack.
    /// Otherwise the section stays active until the returned guard is dropped.
    #[must_use]
    pub fn enter(&self) -> Option<ReentrancyGuard<'_>> {
        if self.active.replace(true) {
            None
        } else {
            Some(ReentrancyGuard { flag: self })
        }
    }

    /// Whether the section is active
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// Keeps a [`ReentrancyFlag`] active until dropped
pub struct ReentrancyGuard<'a> {
    flag: &'a ReentrancyFlag,
}

impl<'a> fmt::Debug for ReentrancyGuard<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReentrancyGuard").finish_non_exhaustive()
    }
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        self.flag.active.set(false);
    }
}
