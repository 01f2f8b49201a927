//! Shared trait abstractions for common patterns
//!
//! Every long-running activity in the engine (camera subscriptions, animations,
//! transitions, camera ownership) hands back a [`Cancelable`]. Cancellation is
//! synchronous and idempotent.

use std::cell::{Cell, RefCell};
use std::fmt;

/// Something that can be stopped
pub trait Cancelable {
    fn cancel(&self);
}

/// Boxed cancelable as stored by owners of an activity
pub type AnyCancelable = Box<dyn Cancelable>;

/// Runs a closure the first time it is canceled
pub struct BlockCancelable {
    block: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl BlockCancelable {
    pub fn new<F>(block: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            block: RefCell::new(Some(Box::new(block))),
        }
    }

    pub fn boxed<F>(block: F) -> AnyCancelable
    where
        F: FnOnce() + 'static,
    {
        Box::new(Self::new(block))
    }

    pub fn is_canceled(&self) -> bool {
        self.block.borrow().is_none()
    }
}

impl Cancelable for BlockCancelable {
    fn cancel(&self) {
        // Release the borrow before running: the block may re-enter its owner.
        let block = self.block.borrow_mut().take();
        if let Some(block) = block {
            block();
        }
    }
}

impl fmt::Debug for BlockCancelable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCancelable")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

/// A cancelable with nothing to stop
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyCancelable;

impl EmptyCancelable {
    pub fn boxed() -> AnyCancelable {
        Box::new(Self)
    }
}

impl Cancelable for EmptyCancelable {
    fn cancel(&self) {}
}

/// Cancels a group of cancelables together, in insertion order
#[derive(Default)]
pub struct CompositeCancelable {
    cancelables: RefCell<Vec<AnyCancelable>>,
    canceled: Cell<bool>,
}

impl CompositeCancelable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cancelable. If the group was already canceled it is canceled right away.
    pub fn add(&self, cancelable: AnyCancelable) {
        if self.canceled.get() {
            cancelable.cancel();
        } else {
            self.cancelables.borrow_mut().push(cancelable);
        }
    }
}

impl Cancelable for CompositeCancelable {
    fn cancel(&self) {
        self.canceled.set(true);
        let cancelables = std::mem::take(&mut *self.cancelables.borrow_mut());
        for cancelable in cancelables {
            cancelable.cancel();
        }
    }
}
