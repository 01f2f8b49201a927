//! Camera descriptors shared by states, transitions and the renderer boundary.

use crate::core::geo::{EdgeInsets, LatLng, Point};
use serde::{Deserialize, Serialize};

/// A partial camera description.
///
/// Every field is optional: `None` leaves that dimension unconstrained, it never
/// means "set to zero".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    pub center: Option<LatLng>,
    pub padding: Option<EdgeInsets>,
    pub anchor: Option<Point>,
    pub zoom: Option<f64>,
    /// Degrees clockwise from north
    pub bearing: Option<f64>,
    /// Degrees away from the nadir
    pub pitch: Option<f64>,
}

impl CameraOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_center(mut self, center: LatLng) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn with_anchor(mut self, anchor: Point) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = Some(bearing);
        self
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = Some(pitch);
        self
    }

    /// True when no dimension is constrained
    pub fn is_empty(&self) -> bool {
        self.center.is_none()
            && self.padding.is_none()
            && self.anchor.is_none()
            && self.zoom.is_none()
            && self.bearing.is_none()
            && self.pitch.is_none()
    }

    /// Overlays the populated fields of `other` onto a copy of `self`
    pub fn merged(&self, other: &CameraOptions) -> CameraOptions {
        CameraOptions {
            center: other.center.or(self.center),
            padding: other.padding.or(self.padding),
            anchor: other.anchor.or(self.anchor),
            zoom: other.zoom.or(self.zoom),
            bearing: other.bearing.or(self.bearing),
            pitch: other.pitch.or(self.pitch),
        }
    }

    /// True when both descriptors populate exactly the same set of fields
    pub fn has_same_fields(&self, other: &CameraOptions) -> bool {
        self.center.is_some() == other.center.is_some()
            && self.padding.is_some() == other.padding.is_some()
            && self.anchor.is_some() == other.anchor.is_some()
            && self.zoom.is_some() == other.zoom.is_some()
            && self.bearing.is_some() == other.bearing.is_some()
            && self.pitch.is_some() == other.pitch.is_some()
    }
}

/// The fully-populated live camera reported by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub center: LatLng,
    pub padding: EdgeInsets,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            center: LatLng::default(),
            padding: EdgeInsets::default(),
            zoom: 0.0,
            bearing: 0.0,
            pitch: 0.0,
        }
    }
}

impl From<CameraState> for CameraOptions {
    fn from(state: CameraState) -> Self {
        CameraOptions {
            center: Some(state.center),
            padding: Some(state.padding),
            anchor: None,
            zoom: Some(state.zoom),
            bearing: Some(state.bearing),
            pitch: Some(state.pitch),
        }
    }
}
