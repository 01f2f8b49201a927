use crate::animation::{
    interpolation::EasingFunction,
    tweening::{AnimatorState, CameraAnimator, CameraAnimatorFactory},
};
use crate::core::{camera::CameraOptions, map::MapCamera};
use crate::traits::{AnyCancelable, BlockCancelable, EmptyCancelable};
use crate::viewport::handle::ViewportId;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Receives target cameras; returns `false` to unsubscribe
pub type CameraHandler = Box<dyn FnMut(&CameraOptions) -> bool>;

/// A long-lived recipe for where the camera should be
pub trait ViewportState {
    /// Reports the current and future target camera to `handler` until it
    /// returns `false` or the returned cancelable is canceled
    fn observe_camera(&self, handler: CameraHandler) -> AnyCancelable;

    /// Takes ownership of the live camera until the returned cancelable is canceled
    fn start_updating_camera(&self) -> AnyCancelable;

    /// Called when the state is added to (`Some`) or removed from (`None`) a viewport
    fn did_move(&self, _viewport: Option<ViewportId>) {}
}

struct Subscription {
    handler: RefCell<Option<CameraHandler>>,
    active: Cell<bool>,
}

impl Subscription {
    fn close(&self) {
        self.active.set(false);
        // The handler may be running right now, in which case it is already taken
        let handler = self.handler.borrow_mut().take();
        drop(handler);
    }
}

/// Camera subscribers of a state
///
/// Handlers may unsubscribe, cancel or subscribe again from inside a notification.
#[derive(Default)]
pub struct CameraObservers {
    subscriptions: Rc<RefCell<Vec<Rc<Subscription>>>>,
}

impl CameraObservers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handler`, first delivering `current` to it if there is one
    pub fn subscribe(
        &self,
        mut handler: CameraHandler,
        current: Option<CameraOptions>,
    ) -> AnyCancelable {
        if let Some(camera) = current {
            if !handler(&camera) {
                return EmptyCancelable::boxed();
            }
        }

        let subscription = Rc::new(Subscription {
            handler: RefCell::new(Some(handler)),
            active: Cell::new(true),
        });
        self.subscriptions.borrow_mut().push(subscription.clone());

        let subscriptions: Weak<RefCell<Vec<Rc<Subscription>>>> =
            Rc::downgrade(&self.subscriptions);
        BlockCancelable::boxed(move || {
            subscription.close();
            if let Some(subscriptions) = subscriptions.upgrade() {
                subscriptions
                    .borrow_mut()
                    .retain(|candidate| !Rc::ptr_eq(candidate, &subscription));
            }
        })
    }

    /// Delivers `camera` to every live subscriber
    pub fn notify(&self, camera: &CameraOptions) {
        let snapshot: Vec<_> = self.subscriptions.borrow().clone();
        for subscription in snapshot {
            if !subscription.active.get() {
                continue;
            }
            let handler = subscription.handler.borrow_mut().take();
            let Some(mut handler) = handler else {
                continue;
            };
            let keep = handler(camera);
            if keep && subscription.active.get() {
                subscription.handler.replace(Some(handler));
            } else {
                subscription.close();
            }
        }
        self.subscriptions
            .borrow_mut()
            .retain(|subscription| subscription.active.get());
    }

    pub fn len(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.borrow().is_empty()
    }

    /// Drops every subscriber
    pub fn clear(&self) {
        let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
        for subscription in subscriptions {
            subscription.close();
        }
    }
}

/// Marks whether a state currently owns the camera
///
/// Each `start_updating_camera` call gets its own token; revoking a stale token
/// leaves a newer owner untouched.
#[derive(Default)]
pub struct CameraOwnership {
    current: Rc<Cell<u64>>,
    next: Cell<u64>,
}

impl CameraOwnership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_owned(&self) -> bool {
        self.current.get() != 0
    }

    /// Claims ownership. `on_revoke` runs when the returned cancelable is canceled
    /// while it is still the live token.
    pub fn acquire<F>(&self, on_revoke: F) -> AnyCancelable
    where
        F: FnOnce() + 'static,
    {
        let token = self.next.get() + 1;
        self.next.set(token);
        self.current.set(token);

        let current = self.current.clone();
        BlockCancelable::boxed(move || {
            if current.get() == token {
                current.set(0);
                on_revoke();
            }
        })
    }
}

/// Linear eases of the live camera towards a state's latest target
///
/// Only one ease runs at a time: starting a new one cancels the previous.
pub struct CameraEase {
    map: Rc<dyn MapCamera>,
    animators: Rc<dyn CameraAnimatorFactory>,
    running: Rc<RefCell<Option<Rc<dyn CameraAnimator>>>>,
}

impl CameraEase {
    pub fn new(map: Rc<dyn MapCamera>, animators: Rc<dyn CameraAnimatorFactory>) -> Self {
        Self {
            map,
            animators,
            running: Rc::new(RefCell::new(None)),
        }
    }

    /// Eases from the live camera to `camera` over `duration` seconds
    pub fn ease_to(&self, camera: &CameraOptions, duration: f64) {
        self.cancel();
        let from = CameraOptions::from(self.map.camera_state());
        let animator = self.animators.make_animator_with_easing(
            from,
            *camera,
            duration.max(0.0),
            EasingFunction::Linear,
        );
        self.running.replace(Some(animator.clone()));
        animator.start_after_delay(0.0);
    }

    pub fn is_running(&self) -> bool {
        self.running
            .borrow()
            .as_ref()
            .is_some_and(|animator| animator.state() == AnimatorState::Active)
    }

    pub fn cancel(&self) {
        cancel_running(&self.running);
    }

    /// A callback that cancels whichever ease is running when it is called
    pub fn canceler(&self) -> impl FnOnce() + 'static {
        let running = self.running.clone();
        move || cancel_running(&running)
    }
}

fn cancel_running(running: &RefCell<Option<Rc<dyn CameraAnimator>>>) {
    let animator = running.borrow_mut().take();
    if let Some(animator) = animator {
        animator.cancel();
    }
}
