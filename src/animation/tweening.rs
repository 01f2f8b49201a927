//! Camera animators and the driver that ticks them
//!
//! An animator eases the live camera from a `from` camera towards a `to` camera.
//! `to` can be changed while running, which re-aims the animation without a restart.
//! Time only moves when the host calls [`AnimationDriver::update`].

use crate::animation::interpolation::{EasingFunction, Interpolatable, Interpolation};
use crate::core::{camera::CameraOptions, map::MapCamera};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Lifecycle of an animator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    /// Created, not started yet
    Inactive,
    /// Started, possibly still waiting out its delay
    Active,
    /// Finished or canceled; cannot be restarted
    Stopped,
}

/// Where an animator was when it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatingPosition {
    Start,
    End,
    /// Interrupted mid-flight
    Current,
}

pub type AnimatorCompletion = Box<dyn FnOnce(AnimatingPosition)>;

/// A schedulable camera animation handle
pub trait CameraAnimator {
    fn state(&self) -> AnimatorState;

    /// Starts the animation once `delay` seconds have elapsed
    fn start_after_delay(&self, delay: f64);

    /// Runs `completion` once with the terminal position.
    /// Called immediately if the animator has already stopped.
    fn add_completion(&self, completion: AnimatorCompletion);

    fn cancel(&self);

    fn target(&self) -> CameraOptions;

    /// Re-aims a running animation in place
    fn set_target(&self, target: CameraOptions);
}

/// Makes animators that write to a map
pub trait CameraAnimatorFactory {
    fn make_animator(
        &self,
        from: CameraOptions,
        to: CameraOptions,
        duration: f64,
    ) -> Rc<dyn CameraAnimator>;

    /// Like [`make_animator`](Self::make_animator) with an explicit curve.
    /// Factories without curve control ignore `easing`.
    fn make_animator_with_easing(
        &self,
        from: CameraOptions,
        to: CameraOptions,
        duration: f64,
        easing: EasingFunction,
    ) -> Rc<dyn CameraAnimator> {
        let _ = easing;
        self.make_animator(from, to, duration)
    }
}

/// Eased interpolation between two cameras, driven by a shared clock
pub struct SimpleCameraAnimator {
    map: Rc<dyn MapCamera>,
    clock: Rc<Cell<f64>>,
    from: CameraOptions,
    to: RefCell<CameraOptions>,
    duration: f64,
    easing: EasingFunction,
    state: Cell<AnimatorState>,
    start_time: Cell<f64>,
    terminal: Cell<Option<AnimatingPosition>>,
    completions: RefCell<Vec<AnimatorCompletion>>,
}

impl SimpleCameraAnimator {
    pub fn new(
        map: Rc<dyn MapCamera>,
        clock: Rc<Cell<f64>>,
        from: CameraOptions,
        to: CameraOptions,
        duration: f64,
        easing: EasingFunction,
    ) -> Self {
        Self {
            map,
            clock,
            from,
            to: RefCell::new(to),
            duration: duration.max(0.0),
            easing,
            state: Cell::new(AnimatorState::Inactive),
            start_time: Cell::new(0.0),
            terminal: Cell::new(None),
            completions: RefCell::new(Vec::new()),
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Normalized progress in [0, 1]; zero while inactive or delayed
    pub fn progress(&self) -> f64 {
        match self.state.get() {
            AnimatorState::Inactive => 0.0,
            AnimatorState::Stopped => match self.terminal.get() {
                Some(AnimatingPosition::End) => 1.0,
                _ => self.raw_progress(),
            },
            AnimatorState::Active => self.raw_progress(),
        }
    }

    fn raw_progress(&self) -> f64 {
        let elapsed = self.clock.get() - self.start_time.get();
        if elapsed < 0.0 {
            0.0
        } else if self.duration <= 0.0 {
            1.0
        } else {
            (elapsed / self.duration).min(1.0)
        }
    }

    /// Writes the camera for the current clock time. Returns false once stopped.
    pub fn tick(&self) -> bool {
        if self.state.get() != AnimatorState::Active {
            return self.state.get() != AnimatorState::Stopped;
        }
        if self.clock.get() < self.start_time.get() {
            return true;
        }

        let t = self.raw_progress();
        let camera = self.interpolated(self.easing.apply(t));
        self.map.set_camera(&camera);

        if t >= 1.0 {
            self.finish(AnimatingPosition::End);
            false
        } else {
            true
        }
    }

    fn interpolated(&self, t: f64) -> CameraOptions {
        let to = *self.to.borrow();
        let from = &self.from;
        CameraOptions {
            center: to
                .center
                .map(|end| from.center.map_or(end, |start| start.lerp(&end, t))),
            padding: to
                .padding
                .map(|end| from.padding.map_or(end, |start| start.lerp(&end, t))),
            anchor: to.anchor,
            zoom: to
                .zoom
                .map(|end| from.zoom.map_or(end, |start| start.lerp(&end, t))),
            bearing: to.bearing.map(|end| {
                from.bearing
                    .map_or(end, |start| Interpolation::bearing(start, end, t))
            }),
            pitch: to
                .pitch
                .map(|end| from.pitch.map_or(end, |start| start.lerp(&end, t))),
        }
    }

    fn finish(&self, position: AnimatingPosition) {
        self.state.set(AnimatorState::Stopped);
        self.terminal.set(Some(position));
        log::debug!("animator stopped at {:?}", position);

        let completions = std::mem::take(&mut *self.completions.borrow_mut());
        for completion in completions {
            completion(position);
        }
    }
}

impl CameraAnimator for SimpleCameraAnimator {
    fn state(&self) -> AnimatorState {
        self.state.get()
    }

    fn start_after_delay(&self, delay: f64) {
        if self.state.get() != AnimatorState::Inactive {
            log::warn!("animator cannot be restarted (state {:?})", self.state.get());
            return;
        }
        self.start_time.set(self.clock.get() + delay.max(0.0));
        self.state.set(AnimatorState::Active);
        log::debug!(
            "animator starting in {:.3}s for {:.3}s",
            delay.max(0.0),
            self.duration
        );
    }

    fn add_completion(&self, completion: AnimatorCompletion) {
        match self.terminal.get() {
            Some(position) => completion(position),
            None => self.completions.borrow_mut().push(completion),
        }
    }

    fn cancel(&self) {
        if self.state.get() == AnimatorState::Stopped {
            return;
        }
        self.finish(AnimatingPosition::Current);
    }

    fn target(&self) -> CameraOptions {
        *self.to.borrow()
    }

    fn set_target(&self, target: CameraOptions) {
        if !self.to.borrow().has_same_fields(&target) {
            log::warn!(
                "animator target updated with a different set of fields: {:?} -> {:?}",
                self.to.borrow(),
                target
            );
        }
        self.to.replace(target);
    }
}

impl fmt::Debug for SimpleCameraAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleCameraAnimator")
            .field("from", &self.from)
            .field("to", &self.to.borrow())
            .field("duration", &self.duration)
            .field("state", &self.state.get())
            .finish()
    }
}

/// Owns the animation clock and ticks every live animator
pub struct AnimationDriver {
    map: Rc<dyn MapCamera>,
    clock: Rc<Cell<f64>>,
    easing: Cell<EasingFunction>,
    animators: RefCell<Vec<Rc<SimpleCameraAnimator>>>,
}

impl AnimationDriver {
    pub fn new(map: Rc<dyn MapCamera>) -> Self {
        Self {
            map,
            clock: Rc::new(Cell::new(0.0)),
            easing: Cell::new(EasingFunction::default()),
            animators: RefCell::new(Vec::new()),
        }
    }

    pub fn with_easing(self, easing: EasingFunction) -> Self {
        self.easing.set(easing);
        self
    }

    /// Seconds of animation time elapsed so far
    pub fn time(&self) -> f64 {
        self.clock.get()
    }

    /// Advances the clock and ticks animators
    pub fn update(&self, delta_time: f64) {
        self.clock.set(self.clock.get() + delta_time.max(0.0));

        // Completions may create new animators, so tick a snapshot
        let snapshot: Vec<_> = self.animators.borrow().clone();
        for animator in &snapshot {
            animator.tick();
        }
        drop(snapshot);

        self.animators.borrow_mut().retain(|animator| match animator.state() {
            AnimatorState::Stopped => false,
            // Nobody else can start it any more
            AnimatorState::Inactive => Rc::strong_count(animator) > 1,
            AnimatorState::Active => true,
        });
    }

    /// Animators that are started and not yet finished
    pub fn active_count(&self) -> usize {
        self.animators
            .borrow()
            .iter()
            .filter(|animator| animator.state() == AnimatorState::Active)
            .count()
    }

    pub fn is_idle(&self) -> bool {
        self.active_count() == 0
    }

    /// Cancels every animator
    pub fn cancel_all(&self) {
        let animators = std::mem::take(&mut *self.animators.borrow_mut());
        for animator in animators {
            animator.cancel();
        }
    }
}

impl CameraAnimatorFactory for AnimationDriver {
    fn make_animator(
        &self,
        from: CameraOptions,
        to: CameraOptions,
        duration: f64,
    ) -> Rc<dyn CameraAnimator> {
        self.make_animator_with_easing(from, to, duration, self.easing.get())
    }

    fn make_animator_with_easing(
        &self,
        from: CameraOptions,
        to: CameraOptions,
        duration: f64,
        easing: EasingFunction,
    ) -> Rc<dyn CameraAnimator> {
        let animator = Rc::new(SimpleCameraAnimator::new(
            self.map.clone(),
            self.clock.clone(),
            from,
            to,
            duration,
            easing,
        ));
        self.animators.borrow_mut().push(animator.clone());
        animator
    }
}

impl fmt::Debug for AnimationDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationDriver")
            .field("time", &self.clock.get())
            .field("animators", &self.animators.borrow().len())
            .finish()
    }
}
