//! The viewport state machine
//!
//! Tracks whether the camera is idle, owned by a state or mid-transition, and
//! guarantees a single owner at a time: every request cancels the previous
//! activity before starting the next one. Status observers are notified through
//! the [`MainQueue`], after the status has already changed.

use crate::core::config::ViewportOptions;
use crate::input::gestures::GestureEvent;
use crate::prelude::HashMap;
use crate::runtime::MainQueue;
use crate::traits::{AnyCancelable, BlockCancelable};
use crate::viewport::{
    handle::{StateHandle, StateId, TransitionHandle},
    status::{ViewportStatus, ViewportStatusChangeReason, ViewportStatusObserver},
    transition::TransitionCompletion,
};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type TransitionKey = (Option<StateId>, StateId);

/// A registered transition with the endpoints its key was derived from.
/// Holding the handles keeps the states, and so their ids, from being recycled.
struct RegisteredTransition {
    _from: Option<StateHandle>,
    _to: StateHandle,
    transition: TransitionHandle,
}

struct Registry {
    status: ViewportStatus,
    options: ViewportOptions,
    default_transition: TransitionHandle,
    transitions: HashMap<TransitionKey, RegisteredTransition>,
    observers: Vec<Rc<dyn ViewportStatusObserver>>,
}

struct Inner {
    registry: RefCell<Registry>,
    /// The live transition or camera ownership
    current: RefCell<Option<AnyCancelable>>,
    main_queue: MainQueue,
}

impl Inner {
    fn status(&self) -> ViewportStatus {
        self.registry.borrow().status.clone()
    }

    /// Cancels the live activity, including any installed while canceling
    fn cancel_current(&self) {
        loop {
            let current = self.current.borrow_mut().take();
            match current {
                Some(cancelable) => cancelable.cancel(),
                None => break,
            }
        }
    }

    fn set_status(self: &Rc<Self>, status: ViewportStatus, reason: ViewportStatusChangeReason) {
        let previous = std::mem::replace(&mut self.registry.borrow_mut().status, status.clone());
        if previous == status {
            return;
        }
        log::debug!("viewport status {} -> {} ({:?})", previous, status, reason);

        let weak = Rc::downgrade(self);
        self.main_queue.post(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let observers = inner.registry.borrow().observers.clone();
            for observer in observers {
                observer.viewport_status_did_change(&previous, &status, reason);
            }
        });
    }

    fn idle(self: &Rc<Self>, reason: ViewportStatusChangeReason) {
        self.cancel_current();
        self.set_status(ViewportStatus::Idle, reason);
    }

    fn resolve_transition(
        &self,
        from: Option<&StateHandle>,
        to: &StateHandle,
        explicit: Option<TransitionHandle>,
    ) -> TransitionHandle {
        if let Some(transition) = explicit {
            return transition;
        }
        let registry = self.registry.borrow();
        registry
            .transitions
            .get(&(from.map(StateHandle::id), to.id()))
            .map(|registered| registered.transition.clone())
            .unwrap_or_else(|| registry.default_transition.clone())
    }

    fn transition(
        self: &Rc<Self>,
        to: &StateHandle,
        transition: Option<TransitionHandle>,
        completion: Option<TransitionCompletion>,
    ) {
        let from = match self.status() {
            ViewportStatus::InState(state) if state == *to => {
                if let Some(completion) = completion {
                    completion(true);
                }
                return;
            }
            ViewportStatus::Transitioning { to: target, .. } if target == *to => {
                if let Some(completion) = completion {
                    completion(false);
                }
                return;
            }
            ViewportStatus::InState(state) => Some(state),
            ViewportStatus::Transitioning { to: target, .. } => Some(target),
            ViewportStatus::Idle => None,
        };

        let transition = self.resolve_transition(from.as_ref(), to, transition);
        self.cancel_current();

        let canceled = Rc::new(Cell::new(false));
        let completion_invoked = Rc::new(Cell::new(false));
        let completion = Rc::new(RefCell::new(completion));

        log::debug!(
            "running {} from {:?} to {}",
            transition.id(),
            from.as_ref().map(StateHandle::id),
            to.id()
        );

        let run_cancelable = transition.run(
            from.as_ref(),
            to,
            Box::new({
                let weak: Weak<Inner> = Rc::downgrade(self);
                let to = to.clone();
                let canceled = canceled.clone();
                let completion_invoked = completion_invoked.clone();
                let completion = completion.clone();
                move |success: bool| {
                    completion_invoked.set(true);
                    if canceled.get() {
                        return;
                    }
                    let Some(inner) = weak.upgrade() else {
                        return;
                    };

                    if success {
                        let ownership = to.start_updating_camera();
                        let previous = inner.current.replace(Some(ownership));
                        drop(previous);
                        inner.set_status(
                            ViewportStatus::InState(to),
                            ViewportStatusChangeReason::TransitionSucceeded,
                        );
                    } else {
                        let previous = inner.current.replace(None);
                        drop(previous);
                        inner.set_status(
                            ViewportStatus::Idle,
                            ViewportStatusChangeReason::TransitionFailed,
                        );
                    }

                    let completion = completion.borrow_mut().take();
                    if let Some(completion) = completion {
                        completion(success);
                    }
                }
            }),
        );

        if completion_invoked.get() {
            return;
        }

        let transition_cancelable = BlockCancelable::boxed(move || {
            canceled.set(true);
            run_cancelable.cancel();
            let completion = completion.borrow_mut().take();
            if let Some(completion) = completion {
                completion(false);
            }
        });
        let previous = self.current.replace(Some(transition_cancelable));
        if let Some(previous) = previous {
            previous.cancel();
        }

        self.set_status(
            ViewportStatus::Transitioning {
                transition,
                from,
                to: to.clone(),
            },
            ViewportStatusChangeReason::TransitionStarted,
        );
    }
}

/// Orchestrates camera ownership between states and transitions
pub struct ViewportStateMachine {
    inner: Rc<Inner>,
}

impl ViewportStateMachine {
    pub fn new(
        options: ViewportOptions,
        default_transition: TransitionHandle,
        main_queue: MainQueue,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                registry: RefCell::new(Registry {
                    status: ViewportStatus::Idle,
                    options,
                    default_transition,
                    transitions: HashMap::default(),
                    observers: Vec::new(),
                }),
                current: RefCell::new(None),
                main_queue,
            }),
        }
    }

    pub fn status(&self) -> ViewportStatus {
        self.inner.status()
    }

    pub fn options(&self) -> ViewportOptions {
        self.inner.registry.borrow().options
    }

    pub fn set_options(&self, options: ViewportOptions) {
        self.inner.registry.borrow_mut().options = options;
    }

    pub fn default_transition(&self) -> TransitionHandle {
        self.inner.registry.borrow().default_transition.clone()
    }

    pub fn set_default_transition(&self, transition: TransitionHandle) {
        self.inner.registry.borrow_mut().default_transition = transition;
    }

    /// Adds an observer; adding the same observer twice has no effect
    pub fn add_status_observer(&self, observer: Rc<dyn ViewportStatusObserver>) {
        let mut registry = self.inner.registry.borrow_mut();
        if !registry
            .observers
            .iter()
            .any(|existing| same_observer(existing, &observer))
        {
            registry.observers.push(observer);
        }
    }

    pub fn remove_status_observer(&self, observer: &Rc<dyn ViewportStatusObserver>) {
        self.inner
            .registry
            .borrow_mut()
            .observers
            .retain(|existing| !same_observer(existing, observer));
    }

    /// Registers the transition used from `from` (or from idle) to `to`.
    ///
    /// # Panics
    /// If `from` and `to` are the same state.
    pub fn set_transition(
        &self,
        from: Option<&StateHandle>,
        to: &StateHandle,
        transition: TransitionHandle,
    ) {
        assert!(from != Some(to), "a state cannot transition to itself");
        self.inner
            .registry
            .borrow_mut()
            .transitions
            .insert(
                (from.map(StateHandle::id), to.id()),
                RegisteredTransition {
                    _from: from.cloned(),
                    _to: to.clone(),
                    transition,
                },
            );
    }

    /// # Panics
    /// If `from` and `to` are the same state.
    pub fn transition_for(
        &self,
        from: Option<&StateHandle>,
        to: &StateHandle,
    ) -> Option<TransitionHandle> {
        assert!(from != Some(to), "a state cannot transition to itself");
        self.inner
            .registry
            .borrow()
            .transitions
            .get(&(from.map(StateHandle::id), to.id()))
            .map(|registered| registered.transition.clone())
    }

    /// # Panics
    /// If `from` and `to` are the same state.
    pub fn remove_transition(
        &self,
        from: Option<&StateHandle>,
        to: &StateHandle,
    ) -> Option<TransitionHandle> {
        assert!(from != Some(to), "a state cannot transition to itself");
        self.inner
            .registry
            .borrow_mut()
            .transitions
            .remove(&(from.map(StateHandle::id), to.id()))
            .map(|registered| registered.transition)
    }

    /// Drops every registered transition that starts or ends at `state`
    pub(crate) fn remove_transitions_involving(&self, state: &StateHandle) {
        let id = state.id();
        self.inner
            .registry
            .borrow_mut()
            .transitions
            .retain(|(from, to), _| *from != Some(id) && *to != id);
    }

    /// Cancels any transition or camera ownership and goes idle
    pub fn idle(&self) {
        self.inner.idle(ViewportStatusChangeReason::IdleRequested);
    }

    /// Transitions to `to` with `transition`, the transition registered for the
    /// current state, or the default transition, in that order of preference.
    ///
    /// `completion` receives `true` once `to` owns the camera, `false` if the
    /// transition was interrupted. Requesting the state that already owns the
    /// camera completes `true` immediately; requesting the state already being
    /// transitioned to completes `false` immediately and leaves that transition running.
    pub fn transition(
        &self,
        to: &StateHandle,
        transition: Option<TransitionHandle>,
        completion: Option<TransitionCompletion>,
    ) {
        self.inner.transition(to, transition, completion);
    }

    /// Goes idle on the start of user interaction, if configured to.
    /// Returns true if the viewport was made idle.
    pub fn handle_gesture(&self, gesture: &GestureEvent) -> bool {
        if !self.options().transitions_to_idle_upon_user_interaction
            || !gesture.is_user_interaction_start()
        {
            return false;
        }
        self.inner.idle(ViewportStatusChangeReason::UserInteraction);
        true
    }

    /// True while a transition or a camera owner is live
    pub fn has_live_activity(&self) -> bool {
        self.inner.current.borrow().is_some()
    }
}

fn same_observer(a: &Rc<dyn ViewportStatusObserver>, b: &Rc<dyn ViewportStatusObserver>) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a) as *const (),
        Rc::as_ptr(b) as *const (),
    )
}

impl fmt::Debug for ViewportStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.registry.borrow();
        f.debug_struct("ViewportStateMachine")
            .field("status", &registry.status)
            .field("options", &registry.options)
            .field("transitions", &registry.transitions.len())
            .field("observers", &registry.observers.len())
            .finish()
    }
}

impl Drop for ViewportStateMachine {
    fn drop(&mut self) {
        self.inner.cancel_current();
    }
}
