//! The host-facing viewport facade
//!
//! [`ViewportManager`] owns everything one map view needs: the animation driver,
//! the main queue that delivers status notifications, the gesture recognizer and
//! the state machine. The host calls [`ViewportManager::update`] once per frame.

use crate::animation::{transitions::DefaultTransitionAnimationHelper, tweening::AnimationDriver};
use crate::core::{
    camera::CameraOptions,
    config::{DefaultTransitionOptions, ViewportOptions},
    map::MapCamera,
};
use crate::input::{
    events::InputEvent,
    gestures::{GestureEvent, GestureRecognizer},
};
use crate::runtime::MainQueue;
use crate::viewport::{
    handle::{StateHandle, TransitionHandle, ViewportId},
    machine::ViewportStateMachine,
    state::ViewportState,
    states::{
        CameraViewportState, FollowStateOptions, FollowViewportState, OverviewStateOptions,
        OverviewViewportState,
    },
    status::{ViewportStatus, ViewportStatusObserver},
    transition::{DefaultTransition, ImmediateTransition, Transition, TransitionCompletion},
};
use crate::{Error, Result};
use futures::{channel::oneshot, Future, FutureExt};
use instant::Instant;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// A concrete state or transition together with the handle the viewport knows it by
pub struct Managed<T: ?Sized, H> {
    handle: H,
    inner: Rc<T>,
}

pub type ManagedState<T> = Managed<T, StateHandle>;
pub type ManagedTransition<T> = Managed<T, TransitionHandle>;

impl<T: ?Sized, H> Managed<T, H> {
    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn inner(&self) -> &Rc<T> {
        &self.inner
    }
}

impl<T: ViewportState + 'static> ManagedState<T> {
    pub fn new(state: T) -> Self {
        let inner = Rc::new(state);
        Self {
            handle: StateHandle::new(inner.clone()),
            inner,
        }
    }
}

impl<T: Transition + 'static> ManagedTransition<T> {
    pub fn new(transition: T) -> Self {
        let inner = Rc::new(transition);
        Self {
            handle: TransitionHandle::new(inner.clone()),
            inner,
        }
    }
}

impl<T: ?Sized, H: Clone> Clone for Managed<T, H> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized, H> Deref for Managed<T, H> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized, H: fmt::Debug> fmt::Debug for Managed<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Managed").field(&self.handle).finish()
    }
}

/// Viewport orchestration for one map
pub struct ViewportManager {
    id: ViewportId,
    map: Rc<dyn MapCamera>,
    driver: Rc<AnimationDriver>,
    main_queue: MainQueue,
    recognizer: RefCell<GestureRecognizer>,
    machine: ViewportStateMachine,
    states: RefCell<Vec<StateHandle>>,
}

impl ViewportManager {
    pub fn new(map: Rc<dyn MapCamera>, options: ViewportOptions) -> Self {
        Self::with_transition_options(map, options, DefaultTransitionOptions::default())
    }

    pub fn with_transition_options(
        map: Rc<dyn MapCamera>,
        options: ViewportOptions,
        transition_options: DefaultTransitionOptions,
    ) -> Self {
        let driver = Rc::new(AnimationDriver::new(map.clone()));
        let main_queue = MainQueue::new();
        let helper = Rc::new(DefaultTransitionAnimationHelper::new(
            map.clone(),
            driver.clone(),
        ));
        let default_transition =
            TransitionHandle::new(Rc::new(DefaultTransition::new(transition_options, helper)));
        let machine = ViewportStateMachine::new(options, default_transition, main_queue.clone());

        let id = ViewportId::new();
        log::debug!("created {} with {:?}", id, options);

        Self {
            id,
            map,
            driver,
            main_queue,
            recognizer: RefCell::new(GestureRecognizer::new()),
            machine,
            states: RefCell::new(Vec::new()),
        }
    }

    pub fn id(&self) -> ViewportId {
        self.id
    }

    pub fn map(&self) -> &Rc<dyn MapCamera> {
        &self.map
    }

    pub fn driver(&self) -> &Rc<AnimationDriver> {
        &self.driver
    }

    pub fn main_queue(&self) -> &MainQueue {
        &self.main_queue
    }

    pub fn state_machine(&self) -> &ViewportStateMachine {
        &self.machine
    }

    pub fn status(&self) -> ViewportStatus {
        self.machine.status()
    }

    pub fn options(&self) -> ViewportOptions {
        self.machine.options()
    }

    pub fn set_options(&self, options: ViewportOptions) {
        self.machine.set_options(options);
    }

    pub fn add_status_observer(&self, observer: Rc<dyn ViewportStatusObserver>) {
        self.machine.add_status_observer(observer);
    }

    pub fn remove_status_observer(&self, observer: &Rc<dyn ViewportStatusObserver>) {
        self.machine.remove_status_observer(observer);
    }

    pub fn default_transition(&self) -> TransitionHandle {
        self.machine.default_transition()
    }

    pub fn set_default_transition(&self, transition: TransitionHandle) {
        self.machine.set_default_transition(transition);
    }

    pub fn idle(&self) {
        self.machine.idle();
    }

    /// See [`ViewportStateMachine::transition`]
    pub fn transition(
        &self,
        to: &StateHandle,
        transition: Option<TransitionHandle>,
        completion: Option<TransitionCompletion>,
    ) {
        self.machine.transition(to, transition, completion);
    }

    /// Like [`ViewportManager::transition`], resolving to whether the transition finished.
    /// Resolves `false` if the completion is dropped without firing.
    pub fn transition_async(
        &self,
        to: &StateHandle,
        transition: Option<TransitionHandle>,
    ) -> impl Future<Output = bool> {
        let (tx, rx) = oneshot::channel();
        self.machine.transition(
            to,
            transition,
            Some(Box::new(move |finished: bool| {
                let _ = tx.send(finished);
            })),
        );
        rx.map(|result| result.unwrap_or(false))
    }

    pub fn set_transition(
        &self,
        from: Option<&StateHandle>,
        to: &StateHandle,
        transition: TransitionHandle,
    ) {
        self.machine.set_transition(from, to, transition);
    }

    pub fn transition_for(
        &self,
        from: Option<&StateHandle>,
        to: &StateHandle,
    ) -> Option<TransitionHandle> {
        self.machine.transition_for(from, to)
    }

    pub fn remove_transition(
        &self,
        from: Option<&StateHandle>,
        to: &StateHandle,
    ) -> Option<TransitionHandle> {
        self.machine.remove_transition(from, to)
    }

    /// Registers a state with this viewport. Adding a state twice has no effect.
    pub fn add_state(&self, state: &StateHandle) {
        {
            let mut states = self.states.borrow_mut();
            if states.contains(state) {
                return;
            }
            states.push(state.clone());
        }
        state.did_move(Some(self.id));
    }

    /// Unregisters a state, going idle first if it owns or is being given the camera
    pub fn remove_state(&self, state: &StateHandle) -> Result<()> {
        let removed = {
            let mut states = self.states.borrow_mut();
            let before = states.len();
            states.retain(|candidate| candidate != state);
            before != states.len()
        };
        if !removed {
            return Err(Error::UnknownState(state.id()));
        }

        if self.machine.status().references(state) {
            log::debug!("{} removed while in use, going idle", state.id());
            self.machine.idle();
        }
        self.machine.remove_transitions_involving(state);
        state.did_move(None);
        Ok(())
    }

    pub fn states(&self) -> Vec<StateHandle> {
        self.states.borrow().clone()
    }

    /// Advances animations by `delta_time` seconds, then delivers queued notifications
    pub fn update(&self, delta_time: f64) {
        self.driver.update(delta_time);
        self.main_queue.run_pending();
    }

    /// True while any camera animation is running
    pub fn is_animating(&self) -> bool {
        !self.driver.is_idle()
    }

    /// Feeds raw input through gesture recognition. Returns true if it made the viewport idle.
    pub fn handle_input(&self, input: &InputEvent) -> bool {
        self.handle_input_at(input, Instant::now())
    }

    pub fn handle_input_at(&self, input: &InputEvent, now: Instant) -> bool {
        let gestures = self.recognizer.borrow_mut().process_input_at(input, now);
        let mut idled = false;
        for gesture in &gestures {
            idled |= self.handle_gesture(gesture);
        }
        idled
    }

    pub fn handle_gesture(&self, gesture: &GestureEvent) -> bool {
        self.machine.handle_gesture(gesture)
    }

    pub fn make_camera_state(&self, camera: CameraOptions) -> ManagedState<CameraViewportState> {
        ManagedState::new(CameraViewportState::new(self.map.clone(), camera))
    }

    pub fn make_follow_state(
        &self,
        options: FollowStateOptions,
    ) -> ManagedState<FollowViewportState> {
        ManagedState::new(FollowViewportState::new(
            self.map.clone(),
            self.driver.clone(),
            options,
        ))
    }

    pub fn make_overview_state(
        &self,
        options: OverviewStateOptions,
    ) -> ManagedState<OverviewViewportState> {
        ManagedState::new(OverviewViewportState::new(
            self.map.clone(),
            self.driver.clone(),
            options,
        ))
    }

    pub fn make_default_transition(
        &self,
        options: DefaultTransitionOptions,
    ) -> ManagedTransition<DefaultTransition> {
        let helper = Rc::new(DefaultTransitionAnimationHelper::new(
            self.map.clone(),
            self.driver.clone(),
        ));
        ManagedTransition::new(DefaultTransition::new(options, helper))
    }

    pub fn make_immediate_transition(&self) -> ManagedTransition<ImmediateTransition> {
        ManagedTransition::new(ImmediateTransition::new(self.map.clone()))
    }
}

impl fmt::Debug for ViewportManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportManager")
            .field("id", &self.id)
            .field("machine", &self.machine)
            .field("driver", &self.driver)
            .field("states", &self.states.borrow().len())
            .finish()
    }
}
