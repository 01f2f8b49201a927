//! Identity handles for states, transitions and viewports.
//!
//! States and transitions are long-lived objects compared by identity, never by
//! content: two states targeting the same camera are still distinct owners. A
//! handle's id is the address of the object it wraps, so every handle to the same
//! `Rc` compares equal. The handle keeps the object alive, which keeps the address
//! from being reused while the id is in circulation.

use crate::traits::AnyCancelable;
use crate::viewport::{
    state::{CameraHandler, ViewportState},
    transition::{Transition, TransitionCompletion},
};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_VIEWPORT_ID: AtomicU64 = AtomicU64::new(1);

fn address_of<T: ?Sized>(value: &Rc<T>) -> u64 {
    Rc::as_ptr(value) as *const () as usize as u64
}

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{:x}"), self.0)
            }
        }
    };
}

define_id!(StateId, "state");
define_id!(TransitionId, "transition");
define_id!(ViewportId, "viewport");

impl ViewportId {
    pub fn new() -> Self {
        Self(NEXT_VIEWPORT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ViewportId {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared reference to a [`ViewportState`] with identity semantics
#[derive(Clone)]
pub struct StateHandle {
    id: StateId,
    state: Rc<dyn ViewportState>,
}

impl StateHandle {
    pub fn new<S: ViewportState + 'static>(state: Rc<S>) -> Self {
        Self::from_dyn(state)
    }

    pub fn from_dyn(state: Rc<dyn ViewportState>) -> Self {
        Self {
            id: StateId(address_of(&state)),
            state,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn state(&self) -> &Rc<dyn ViewportState> {
        &self.state
    }

    pub fn observe_camera(&self, handler: CameraHandler) -> AnyCancelable {
        self.state.observe_camera(handler)
    }

    pub fn start_updating_camera(&self) -> AnyCancelable {
        self.state.start_updating_camera()
    }

    pub fn did_move(&self, viewport: Option<ViewportId>) {
        self.state.did_move(viewport)
    }
}

impl PartialEq for StateHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StateHandle {}

impl Hash for StateHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateHandle({})", self.id)
    }
}

/// Shared reference to a [`Transition`] with identity semantics
#[derive(Clone)]
pub struct TransitionHandle {
    id: TransitionId,
    transition: Rc<dyn Transition>,
}

impl TransitionHandle {
    pub fn new<T: Transition + 'static>(transition: Rc<T>) -> Self {
        Self::from_dyn(transition)
    }

    pub fn from_dyn(transition: Rc<dyn Transition>) -> Self {
        Self {
            id: TransitionId(address_of(&transition)),
            transition,
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn transition(&self) -> &Rc<dyn Transition> {
        &self.transition
    }

    pub fn run(
        &self,
        from: Option<&StateHandle>,
        to: &StateHandle,
        completion: TransitionCompletion,
    ) -> AnyCancelable {
        self.transition.run(from, to, completion)
    }
}

impl PartialEq for TransitionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TransitionHandle {}

impl Hash for TransitionHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl fmt::Debug for TransitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitionHandle({})", self.id)
    }
}
