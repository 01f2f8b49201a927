//! Test doubles shared by unit tests

use crate::animation::{
    interpolation::EasingFunction,
    tweening::{AnimatingPosition, AnimatorCompletion, AnimatorState, CameraAnimator, CameraAnimatorFactory},
    transitions::{AnimationCompletion, TransitionAnimation, TransitionAnimationHelper},
};
use crate::core::{
    camera::{CameraOptions, CameraState},
    geo::{EdgeInsets, LatLng, LatLngBounds, Point},
    map::MapCamera,
};
use crate::traits::{AnyCancelable, BlockCancelable};
use crate::viewport::{
    handle::{StateHandle, StateId, ViewportId},
    state::{CameraHandler, ViewportState},
    transition::{Transition, TransitionCompletion},
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Map whose projection answers come from a queue
#[derive(Default)]
pub struct FakeMap {
    camera: RefCell<CameraState>,
    points: RefCell<VecDeque<Point>>,
    projected: RefCell<Vec<LatLng>>,
    writes: RefCell<Vec<CameraOptions>>,
}

impl FakeMap {
    pub fn with_camera(camera: CameraState) -> Self {
        let map = Self::default();
        map.camera.replace(camera);
        map
    }

    pub fn queue_points(&self, points: impl IntoIterator<Item = Point>) {
        self.points.borrow_mut().extend(points);
    }

    pub fn projected(&self) -> Vec<LatLng> {
        std::mem::take(&mut *self.projected.borrow_mut())
    }

    pub fn writes(&self) -> Vec<CameraOptions> {
        self.writes.borrow().clone()
    }
}

impl MapCamera for FakeMap {
    fn camera_state(&self) -> CameraState {
        *self.camera.borrow()
    }

    fn point_for(&self, coordinate: LatLng) -> Point {
        self.projected.borrow_mut().push(coordinate);
        self.points.borrow_mut().pop_front().unwrap_or_default()
    }

    fn set_camera(&self, options: &CameraOptions) {
        self.writes.borrow_mut().push(*options);
        let current = self.camera_state();
        self.camera.replace(CameraState {
            center: options.center.unwrap_or(current.center),
            padding: options.padding.unwrap_or(current.padding),
            zoom: options.zoom.unwrap_or(current.zoom),
            bearing: options.bearing.unwrap_or(current.bearing),
            pitch: options.pitch.unwrap_or(current.pitch),
        });
    }

    fn camera_for_bounds(
        &self,
        bounds: &LatLngBounds,
        padding: EdgeInsets,
        bearing: Option<f64>,
        pitch: Option<f64>,
    ) -> CameraOptions {
        CameraOptions {
            center: Some(bounds.center()),
            padding: Some(padding),
            anchor: None,
            zoom: Some(10.0),
            bearing,
            pitch,
        }
    }
}

/// Animator driven by hand
pub struct RecordingAnimator {
    state: Cell<AnimatorState>,
    delays: RefCell<Vec<f64>>,
    targets: RefCell<Vec<CameraOptions>>,
    cancels: Cell<usize>,
    completions: RefCell<Vec<AnimatorCompletion>>,
}

impl Default for RecordingAnimator {
    fn default() -> Self {
        Self {
            state: Cell::new(AnimatorState::Inactive),
            delays: RefCell::new(Vec::new()),
            targets: RefCell::new(Vec::new()),
            cancels: Cell::new(0),
            completions: RefCell::new(Vec::new()),
        }
    }
}

impl RecordingAnimator {
    pub fn set_state(&self, state: AnimatorState) {
        self.state.set(state);
    }

    pub fn start_delays(&self) -> Vec<f64> {
        self.delays.borrow().clone()
    }

    pub fn targets(&self) -> Vec<CameraOptions> {
        self.targets.borrow().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.get()
    }

    pub fn finish(&self, position: AnimatingPosition) {
        self.state.set(AnimatorState::Stopped);
        let completions = std::mem::take(&mut *self.completions.borrow_mut());
        for completion in completions {
            completion(position);
        }
    }
}

impl CameraAnimator for RecordingAnimator {
    fn state(&self) -> AnimatorState {
        self.state.get()
    }

    fn start_after_delay(&self, delay: f64) {
        self.delays.borrow_mut().push(delay);
        self.state.set(AnimatorState::Active);
    }

    fn add_completion(&self, completion: AnimatorCompletion) {
        self.completions.borrow_mut().push(completion);
    }

    fn cancel(&self) {
        self.cancels.set(self.cancels.get() + 1);
    }

    fn target(&self) -> CameraOptions {
        self.targets.borrow().last().copied().unwrap_or_default()
    }

    fn set_target(&self, target: CameraOptions) {
        self.targets.borrow_mut().push(target);
    }
}

pub struct MadeAnimator {
    pub from: CameraOptions,
    pub to: CameraOptions,
    pub duration: f64,
    /// `None` when the factory's own curve was requested
    pub easing: Option<EasingFunction>,
    pub animator: Rc<RecordingAnimator>,
}

#[derive(Default)]
pub struct RecordingAnimatorFactory {
    made: RefCell<Vec<Rc<MadeAnimator>>>,
}

impl RecordingAnimatorFactory {
    pub fn made(&self) -> Vec<Rc<MadeAnimator>> {
        self.made.borrow().clone()
    }

    fn record(
        &self,
        from: CameraOptions,
        to: CameraOptions,
        duration: f64,
        easing: Option<EasingFunction>,
    ) -> Rc<dyn CameraAnimator> {
        let animator = Rc::new(RecordingAnimator::default());
        self.made.borrow_mut().push(Rc::new(MadeAnimator {
            from,
            to,
            duration,
            easing,
            animator: animator.clone(),
        }));
        animator
    }
}

impl CameraAnimatorFactory for RecordingAnimatorFactory {
    fn make_animator(
        &self,
        from: CameraOptions,
        to: CameraOptions,
        duration: f64,
    ) -> Rc<dyn CameraAnimator> {
        self.record(from, to, duration, None)
    }

    fn make_animator_with_easing(
        &self,
        from: CameraOptions,
        to: CameraOptions,
        duration: f64,
        easing: EasingFunction,
    ) -> Rc<dyn CameraAnimator> {
        self.record(from, to, duration, Some(easing))
    }
}

/// Transition animation completed by hand
#[derive(Default)]
pub struct RecordingAnimation {
    starts: Cell<usize>,
    cancels: Cell<usize>,
    updates: RefCell<Vec<CameraOptions>>,
    completion: RefCell<Option<AnimationCompletion>>,
}

impl RecordingAnimation {
    pub fn complete(&self, finished: bool) {
        let completion = self.completion.borrow_mut().take();
        if let Some(completion) = completion {
            completion(finished);
        }
    }

    pub fn start_count(&self) -> usize {
        self.starts.get()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.get()
    }

    pub fn updates(&self) -> Vec<CameraOptions> {
        self.updates.borrow().clone()
    }
}

impl TransitionAnimation for RecordingAnimation {
    fn start(&self, completion: AnimationCompletion) {
        self.starts.set(self.starts.get() + 1);
        self.completion.replace(Some(completion));
    }

    fn update_target_camera(&self, camera_options: &CameraOptions) {
        self.updates.borrow_mut().push(*camera_options);
    }

    fn cancel(&self) {
        self.cancels.set(self.cancels.get() + 1);
    }
}

/// Helper that hands out [`RecordingAnimation`]s
#[derive(Default)]
pub struct RecordingHelper {
    requests: RefCell<Vec<(CameraOptions, f64)>>,
    animations: RefCell<Vec<Rc<RecordingAnimation>>>,
}

impl RecordingHelper {
    pub fn requests(&self) -> Vec<(CameraOptions, f64)> {
        self.requests.borrow().clone()
    }

    pub fn last_animation(&self) -> Rc<RecordingAnimation> {
        self.animations
            .borrow()
            .last()
            .cloned()
            .expect("no animation was made")
    }
}

impl TransitionAnimationHelper for RecordingHelper {
    fn make_animation(
        &self,
        camera_options: &CameraOptions,
        max_duration: f64,
    ) -> Box<dyn TransitionAnimation> {
        self.requests
            .borrow_mut()
            .push((*camera_options, max_duration));
        let animation = Rc::new(RecordingAnimation::default());
        self.animations.borrow_mut().push(animation.clone());
        Box::new(animation)
    }
}

/// State that emits cameras on demand and counts camera ownership
#[derive(Default)]
pub struct RecordingState {
    handlers: Rc<RefCell<Vec<Option<CameraHandler>>>>,
    keep_all: bool,
    ownership_starts: Cell<usize>,
    live_ownerships: Rc<Cell<isize>>,
    moves: RefCell<Vec<Option<ViewportId>>>,
}

impl RecordingState {
    /// Keeps delivering to handlers even after they return `false`
    pub fn keeping_all_handlers(mut self) -> Self {
        self.keep_all = true;
        self
    }

    pub fn observer_count(&self) -> usize {
        self.handlers.borrow().iter().filter(|h| h.is_some()).count()
    }

    /// Delivers `camera`; returns true if any handler asked to keep receiving
    pub fn emit(&self, camera: &CameraOptions) -> bool {
        let mut any_kept = false;
        let len = self.handlers.borrow().len();
        for index in 0..len {
            let handler = self.handlers.borrow_mut()[index].take();
            if let Some(mut handler) = handler {
                let keep = handler(camera);
                any_kept |= keep;
                if keep || self.keep_all {
                    self.handlers.borrow_mut()[index] = Some(handler);
                }
            }
        }
        any_kept
    }

    pub fn ownership_starts(&self) -> usize {
        self.ownership_starts.get()
    }

    pub fn live_ownerships(&self) -> isize {
        self.live_ownerships.get()
    }

    pub fn moves(&self) -> Vec<Option<ViewportId>> {
        self.moves.borrow().clone()
    }
}

impl ViewportState for RecordingState {
    fn observe_camera(&self, handler: CameraHandler) -> AnyCancelable {
        let index = {
            let mut handlers = self.handlers.borrow_mut();
            handlers.push(Some(handler));
            handlers.len() - 1
        };
        let handlers = self.handlers.clone();
        BlockCancelable::boxed(move || {
            let handler = handlers.borrow_mut()[index].take();
            drop(handler);
        })
    }

    fn start_updating_camera(&self) -> AnyCancelable {
        self.ownership_starts.set(self.ownership_starts.get() + 1);
        self.live_ownerships.set(self.live_ownerships.get() + 1);
        let live = self.live_ownerships.clone();
        BlockCancelable::boxed(move || live.set(live.get() - 1))
    }

    fn did_move(&self, viewport: Option<ViewportId>) {
        self.moves.borrow_mut().push(viewport);
    }
}

pub struct TransitionRun {
    pub from: Option<StateId>,
    pub to: StateId,
    completion: RefCell<Option<TransitionCompletion>>,
    canceled: Rc<Cell<bool>>,
}

impl TransitionRun {
    pub fn complete(&self, finished: bool) {
        let completion = self.completion.borrow_mut().take();
        if let Some(completion) = completion {
            completion(finished);
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.get()
    }

    pub fn is_live(&self) -> bool {
        !self.canceled.get() && self.completion.borrow().is_some()
    }
}

/// Transition completed by hand, or synchronously if configured
#[derive(Default)]
pub struct RecordingTransition {
    runs: RefCell<Vec<Rc<TransitionRun>>>,
    synchronous_result: Option<bool>,
}

impl RecordingTransition {
    pub fn completing_synchronously(finished: bool) -> Self {
        Self {
            runs: RefCell::new(Vec::new()),
            synchronous_result: Some(finished),
        }
    }

    pub fn runs(&self) -> Vec<Rc<TransitionRun>> {
        self.runs.borrow().clone()
    }

    pub fn last_run(&self) -> Rc<TransitionRun> {
        self.runs.borrow().last().cloned().expect("transition never ran")
    }

    pub fn live_runs(&self) -> usize {
        self.runs.borrow().iter().filter(|run| run.is_live()).count()
    }
}

impl Transition for RecordingTransition {
    fn run(
        &self,
        from: Option<&StateHandle>,
        to: &StateHandle,
        completion: TransitionCompletion,
    ) -> AnyCancelable {
        let canceled = Rc::new(Cell::new(false));
        let run = Rc::new(TransitionRun {
            from: from.map(StateHandle::id),
            to: to.id(),
            completion: RefCell::new(Some(completion)),
            canceled: canceled.clone(),
        });
        self.runs.borrow_mut().push(run.clone());

        if let Some(finished) = self.synchronous_result {
            run.complete(finished);
        }

        BlockCancelable::boxed(move || canceled.set(true))
    }
}
