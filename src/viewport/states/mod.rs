//! Built-in viewport states

pub mod camera;
pub mod follow;
pub mod overview;

pub use camera::CameraViewportState;
pub use follow::{FollowBearing, FollowStateOptions, FollowViewportState};
pub use overview::{OverviewStateOptions, OverviewViewportState};
