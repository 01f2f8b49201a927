//! Transition animations: one component per camera dimension, grouped into a composite
//!
//! A [`TransitionAnimationComponent`] binds an [`AnimationSpec`] to a live animator.
//! A [`CompositeTransitionAnimation`] runs several of them as one animation whose
//! completion is the AND of its parts. [`DefaultTransitionAnimationHelper`] builds the
//! composite for a target camera, scaling timings down to respect a maximum duration.

use crate::animation::{
    component::CameraOptionsComponent,
    providers::DefaultAnimationSpecProvider,
    spec::AnimationSpec,
    tweening::{AnimatingPosition, AnimatorState, CameraAnimator, CameraAnimatorFactory},
};
use crate::core::{camera::CameraOptions, map::MapCamera};
use std::cell::RefCell;
use std::rc::Rc;

pub type AnimationCompletion = Box<dyn FnOnce(bool)>;

/// A cancellable, re-targetable camera animation
pub trait TransitionAnimation {
    /// Starts the animation; `completion` receives `true` if it ran to its end
    fn start(&self, completion: AnimationCompletion);

    /// Re-aims the animation at a new target camera without restarting it
    fn update_target_camera(&self, camera_options: &CameraOptions);

    /// Stops the animation. Does not invoke the completion itself.
    fn cancel(&self);
}

impl<T: TransitionAnimation + ?Sized> TransitionAnimation for Rc<T> {
    fn start(&self, completion: AnimationCompletion) {
        (**self).start(completion)
    }

    fn update_target_camera(&self, camera_options: &CameraOptions) {
        (**self).update_target_camera(camera_options)
    }

    fn cancel(&self) {
        (**self).cancel()
    }
}

/// Animates a single camera dimension
pub struct TransitionAnimationComponent {
    component: RefCell<CameraOptionsComponent>,
    animator: Rc<dyn CameraAnimator>,
    delay: f64,
    map: Rc<dyn MapCamera>,
}

impl TransitionAnimationComponent {
    pub fn new(
        component: CameraOptionsComponent,
        animator: Rc<dyn CameraAnimator>,
        delay: f64,
        map: Rc<dyn MapCamera>,
    ) -> Self {
        Self {
            component: RefCell::new(component),
            animator,
            delay,
            map,
        }
    }

    pub fn component(&self) -> CameraOptionsComponent {
        *self.component.borrow()
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }
}

impl TransitionAnimation for TransitionAnimationComponent {
    fn start(&self, completion: AnimationCompletion) {
        self.animator.add_completion(Box::new(move |position| {
            completion(matches!(
                position,
                AnimatingPosition::Start | AnimatingPosition::End
            ))
        }));
        self.animator.start_after_delay(self.delay);
    }

    fn update_target_camera(&self, camera_options: &CameraOptions) {
        let Some(updated) = self.component.borrow().updated(camera_options) else {
            return;
        };
        match self.animator.state() {
            // Nothing is moving yet, so the camera can jump
            AnimatorState::Inactive => self.map.set_camera(&updated.camera_options()),
            AnimatorState::Active | AnimatorState::Stopped => {
                self.animator.set_target(updated.camera_options())
            }
        }
        self.component.replace(updated);
    }

    fn cancel(&self) {
        self.animator.cancel();
    }
}

struct CompositeProgress {
    remaining: usize,
    all_finished: bool,
    completion: Option<AnimationCompletion>,
}

/// Runs several animations as one
pub struct CompositeTransitionAnimation {
    animations: Vec<Box<dyn TransitionAnimation>>,
}

impl CompositeTransitionAnimation {
    pub fn new(animations: Vec<Box<dyn TransitionAnimation>>) -> Self {
        Self { animations }
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

impl TransitionAnimation for CompositeTransitionAnimation {
    fn start(&self, completion: AnimationCompletion) {
        if self.animations.is_empty() {
            completion(true);
            return;
        }

        let progress = Rc::new(RefCell::new(CompositeProgress {
            remaining: self.animations.len(),
            all_finished: true,
            completion: Some(completion),
        }));

        for animation in &self.animations {
            let progress = progress.clone();
            animation.start(Box::new(move |finished| {
                let done = {
                    let mut progress = progress.borrow_mut();
                    progress.all_finished &= finished;
                    progress.remaining = progress.remaining.saturating_sub(1);
                    if progress.remaining == 0 {
                        progress
                            .completion
                            .take()
                            .map(|completion| (completion, progress.all_finished))
                    } else {
                        None
                    }
                };
                if let Some((completion, all_finished)) = done {
                    completion(all_finished);
                }
            }));
        }
    }

    fn update_target_camera(&self, camera_options: &CameraOptions) {
        for animation in &self.animations {
            animation.update_target_camera(camera_options);
        }
    }

    fn cancel(&self) {
        for animation in &self.animations {
            animation.cancel();
        }
    }
}

/// Uniformly scales `specs` so no `delay + duration` exceeds `max_duration`
pub fn scale_to_max_duration(specs: Vec<AnimationSpec>, max_duration: f64) -> Vec<AnimationSpec> {
    let longest = specs.iter().map(AnimationSpec::total).fold(0.0, f64::max);
    if longest <= max_duration || longest <= 0.0 {
        return specs;
    }
    let factor = max_duration.max(0.0) / longest;
    log::debug!(
        "scaling transition from {:.3}s to {:.3}s (factor {:.3})",
        longest,
        max_duration,
        factor
    );
    specs.into_iter().map(|spec| spec.scaled(factor)).collect()
}

/// Builds the animation for a default transition
pub trait TransitionAnimationHelper {
    fn make_animation(
        &self,
        camera_options: &CameraOptions,
        max_duration: f64,
    ) -> Box<dyn TransitionAnimation>;
}

/// Specs from the live camera, one animator per spec, grouped into a composite
pub struct DefaultTransitionAnimationHelper {
    map: Rc<dyn MapCamera>,
    provider: DefaultAnimationSpecProvider,
    factory: Rc<dyn CameraAnimatorFactory>,
}

impl DefaultTransitionAnimationHelper {
    pub fn new(map: Rc<dyn MapCamera>, factory: Rc<dyn CameraAnimatorFactory>) -> Self {
        Self {
            provider: DefaultAnimationSpecProvider::new(map.clone()),
            map,
            factory,
        }
    }
}

impl TransitionAnimationHelper for DefaultTransitionAnimationHelper {
    fn make_animation(
        &self,
        camera_options: &CameraOptions,
        max_duration: f64,
    ) -> Box<dyn TransitionAnimation> {
        let specs = scale_to_max_duration(self.provider.make_specs(camera_options), max_duration);
        let from = CameraOptions::from(self.map.camera_state());

        let animations = specs
            .iter()
            .map(|spec| {
                let animator = self.factory.make_animator(
                    from,
                    spec.component.camera_options(),
                    spec.duration,
                );
                Box::new(TransitionAnimationComponent::new(
                    spec.component,
                    animator,
                    spec.delay,
                    self.map.clone(),
                )) as Box<dyn TransitionAnimation>
            })
            .collect();

        Box::new(CompositeTransitionAnimation::new(animations))
    }
}
