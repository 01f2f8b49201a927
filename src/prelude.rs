//! Prelude module for common maplet-viewport types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use maplet_viewport::prelude::*;`

pub use crate::core::{
    camera::{CameraOptions, CameraState},
    config::{DefaultTransitionOptions, TransitionPacing, ViewportOptions},
    geo::{EdgeInsets, LatLng, LatLngBounds, Point},
    map::{HeadlessMap, MapCamera},
};

pub use crate::animation::{AnimationDriver, AnimationSpec, CameraAnimator, EasingFunction};

pub use crate::input::{
    events::{InputEvent, TouchEventType, TouchPoint},
    gestures::{GestureEvent, GestureKind, GesturePhase, GestureRecognizer},
};

pub use crate::viewport::{
    CameraViewportState, DefaultTransition, FollowBearing, FollowStateOptions,
    FollowViewportState, ImmediateTransition, ManagedState, ManagedTransition,
    OverviewStateOptions, OverviewViewportState, StateHandle, Transition, TransitionHandle,
    ViewportManager, ViewportState, ViewportStatus, ViewportStatusChangeReason,
    ViewportStatusObserver,
};

pub use crate::runtime::{FrameClock, MainQueue};

pub use crate::traits::{AnyCancelable, BlockCancelable, Cancelable};

pub use crate::{Error as ViewportError, Result};

pub use std::{rc::Rc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::run_frame_loop;
