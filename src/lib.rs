//! # maplet-viewport
//!
//! Viewport orchestration for interactive maps.
//!
//! Callers declare where the camera should end up (a [`ViewportState`]) and the
//! engine works out how to get there: an adaptive multi-phase default
//! transition, a state machine that guarantees a single owner of the live
//! camera, and observer notification through a deferred main queue.
//!
//! The crate never renders anything. It talks to a renderer through the
//! [`MapCamera`] trait; [`HeadlessMap`] is a self-contained implementation.

pub mod animation;
pub mod core;
pub mod input;
pub mod prelude;
pub mod runtime;
pub mod traits;
pub mod viewport;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    camera::{CameraOptions, CameraState},
    config::{DefaultTransitionOptions, TransitionPacing, ViewportOptions},
    geo::{EdgeInsets, LatLng, LatLngBounds, Point},
    map::{HeadlessMap, MapCamera},
};

pub use animation::{
    component::{CameraDimension, CameraOptionsComponent},
    interpolation::EasingFunction,
    providers::{
        select_strategy, AnimationSpecProvider, ConvergingSpecProvider,
        DefaultAnimationSpecProvider, DivergingSpecProvider, SpecStrategy,
    },
    spec::AnimationSpec,
    transitions::{
        scale_to_max_duration, CompositeTransitionAnimation, DefaultTransitionAnimationHelper,
        TransitionAnimation, TransitionAnimationComponent, TransitionAnimationHelper,
    },
    tweening::{
        AnimatingPosition, AnimationDriver, AnimatorState, CameraAnimator, CameraAnimatorFactory,
        SimpleCameraAnimator,
    },
};

pub use input::{
    events::InputEvent,
    gestures::{GestureEvent, GestureKind, GesturePhase, GestureRecognizer},
};

pub use runtime::{FrameClock, MainQueue};

pub use traits::{AnyCancelable, BlockCancelable, Cancelable, CompositeCancelable, EmptyCancelable};

pub use viewport::{
    handle::{StateHandle, StateId, TransitionHandle, TransitionId, ViewportId},
    machine::ViewportStateMachine,
    manager::{Managed, ManagedState, ManagedTransition, ViewportManager},
    state::{CameraHandler, ViewportState},
    states::{
        CameraViewportState, FollowBearing, FollowStateOptions, FollowViewportState,
        OverviewStateOptions, OverviewViewportState,
    },
    status::{ViewportStatus, ViewportStatusChangeReason, ViewportStatusObserver},
    transition::{DefaultTransition, ImmediateTransition, Transition, TransitionCompletion},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum ViewportError {
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown viewport state: {0}")]
    UnknownState(StateId),
}

/// Error type alias for convenience
pub type Error = ViewportError;
