//! Viewport orchestration
//!
//! States describe where the camera should be, transitions move it there, and
//! the state machine makes sure exactly one of them drives the camera at a time.

pub mod handle;
pub mod machine;
pub mod manager;
pub mod state;
pub mod states;
pub mod status;
pub mod transition;

pub use handle::{StateHandle, StateId, TransitionHandle, TransitionId, ViewportId};
pub use machine::ViewportStateMachine;
pub use manager::{Managed, ManagedState, ManagedTransition, ViewportManager};
pub use state::{CameraHandler, CameraObservers, CameraOwnership, ViewportState};
pub use states::{
    CameraViewportState, FollowBearing, FollowStateOptions, FollowViewportState,
    OverviewStateOptions, OverviewViewportState,
};
pub use status::{ViewportStatus, ViewportStatusChangeReason, ViewportStatusObserver};
pub use transition::{DefaultTransition, ImmediateTransition, Transition, TransitionCompletion};
