//! Transitions between viewport states
//!
//! A transition animates from whatever the camera currently shows to the camera
//! reported by the target state, then reports whether it ran to completion.

use crate::animation::transitions::{TransitionAnimation, TransitionAnimationHelper};
use crate::core::{camera::CameraOptions, config::DefaultTransitionOptions, map::MapCamera};
use crate::traits::{AnyCancelable, BlockCancelable, Cancelable};
use crate::viewport::handle::StateHandle;
use crate::Result;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Receives `true` if the transition finished, `false` if it was interrupted
pub type TransitionCompletion = Box<dyn FnOnce(bool)>;

/// Moves the camera from one state to another
pub trait Transition {
    /// Runs the transition. The returned cancelable stops it; `completion` fires at most once.
    fn run(
        &self,
        from: Option<&StateHandle>,
        to: &StateHandle,
        completion: TransitionCompletion,
    ) -> AnyCancelable;
}

/// Adaptive transition built from the first camera the target state reports.
///
/// Only that first sample seeds the animation. The handler unsubscribes right
/// after it, so later cameras from the target state do not re-aim this run.
pub struct DefaultTransition {
    options: Cell<DefaultTransitionOptions>,
    helper: Rc<dyn TransitionAnimationHelper>,
}

impl DefaultTransition {
    pub fn new(options: DefaultTransitionOptions, helper: Rc<dyn TransitionAnimationHelper>) -> Self {
        Self {
            options: Cell::new(options),
            helper,
        }
    }

    pub fn options(&self) -> DefaultTransitionOptions {
        self.options.get()
    }

    /// Replaces the options used by later runs. Invalid options leave the current ones in place.
    pub fn set_options(&self, options: DefaultTransitionOptions) -> Result<()> {
        options.validate()?;
        self.options.set(options);
        Ok(())
    }
}

impl Transition for DefaultTransition {
    fn run(
        &self,
        _from: Option<&StateHandle>,
        to: &StateHandle,
        completion: TransitionCompletion,
    ) -> AnyCancelable {
        let completion = Rc::new(RefCell::new(Some(completion)));
        let animation: Rc<RefCell<Option<Rc<dyn TransitionAnimation>>>> =
            Rc::new(RefCell::new(None));
        let canceled = Rc::new(Cell::new(false));

        let helper = self.helper.clone();
        let max_duration = self.options.get().max_duration();
        let target = to.id();

        let subscription = to.observe_camera(Box::new({
            let animation = animation.clone();
            let canceled = canceled.clone();
            move |camera: &CameraOptions| {
                if canceled.get() {
                    log::warn!("camera for {} delivered after the transition was canceled", target);
                    return false;
                }
                if animation.borrow().is_some() {
                    return false;
                }

                log::debug!("default transition to {} seeded with {:?}", target, camera);
                let started: Rc<dyn TransitionAnimation> =
                    Rc::from(helper.make_animation(camera, max_duration));
                animation.replace(Some(started.clone()));

                let completion = completion.clone();
                started.start(Box::new(move |finished| {
                    let completion = completion.borrow_mut().take();
                    if let Some(completion) = completion {
                        completion(finished);
                    }
                }));
                false
            }
        }));

        BlockCancelable::boxed(move || {
            canceled.set(true);
            subscription.cancel();
            let started = animation.borrow_mut().take();
            if let Some(started) = started {
                started.cancel();
            }
        })
    }
}

/// Jumps straight to the first camera the target state reports
pub struct ImmediateTransition {
    map: Rc<dyn MapCamera>,
}

impl ImmediateTransition {
    pub fn new(map: Rc<dyn MapCamera>) -> Self {
        Self { map }
    }
}

impl Transition for ImmediateTransition {
    fn run(
        &self,
        _from: Option<&StateHandle>,
        to: &StateHandle,
        completion: TransitionCompletion,
    ) -> AnyCancelable {
        let map = self.map.clone();
        let mut completion = Some(completion);
        to.observe_camera(Box::new(move |camera: &CameraOptions| {
            map.set_camera(camera);
            if let Some(completion) = completion.take() {
                completion(true);
            }
            false
        }))
    }
}
