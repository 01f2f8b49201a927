pub mod camera;
pub mod config;
pub mod constants;
pub mod geo;
pub mod map;

pub use camera::{CameraOptions, CameraState};
pub use config::{DefaultTransitionOptions, TransitionPacing, ViewportOptions};
pub use geo::{EdgeInsets, LatLng, LatLngBounds, Point};
pub use map::{HeadlessMap, MapCamera};
