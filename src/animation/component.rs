//! Single-dimension views of a [`CameraOptions`].
//!
//! A component encodes "animate only this field" (via [`CameraOptionsComponent::camera_options`])
//! and decodes "has the target for this field changed" (via [`CameraOptionsComponent::updated`]).

use crate::core::{
    camera::CameraOptions,
    geo::{EdgeInsets, LatLng, Point},
};

/// One independently animatable camera dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraDimension {
    Center,
    Padding,
    Anchor,
    Zoom,
    Bearing,
    Pitch,
}

impl CameraDimension {
    pub const ALL: [CameraDimension; 6] = [
        CameraDimension::Center,
        CameraDimension::Padding,
        CameraDimension::Anchor,
        CameraDimension::Zoom,
        CameraDimension::Bearing,
        CameraDimension::Pitch,
    ];
}

/// A camera dimension paired with its value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraOptionsComponent {
    Center(LatLng),
    Padding(EdgeInsets),
    Anchor(Point),
    Zoom(f64),
    Bearing(f64),
    Pitch(f64),
}

impl CameraOptionsComponent {
    /// Extracts `dimension` from `options`, or `None` if it is unconstrained there
    pub fn from_camera_options(
        dimension: CameraDimension,
        options: &CameraOptions,
    ) -> Option<Self> {
        match dimension {
            CameraDimension::Center => options.center.map(Self::Center),
            CameraDimension::Padding => options.padding.map(Self::Padding),
            CameraDimension::Anchor => options.anchor.map(Self::Anchor),
            CameraDimension::Zoom => options.zoom.map(Self::Zoom),
            CameraDimension::Bearing => options.bearing.map(Self::Bearing),
            CameraDimension::Pitch => options.pitch.map(Self::Pitch),
        }
    }

    pub fn dimension(&self) -> CameraDimension {
        match self {
            Self::Center(_) => CameraDimension::Center,
            Self::Padding(_) => CameraDimension::Padding,
            Self::Anchor(_) => CameraDimension::Anchor,
            Self::Zoom(_) => CameraDimension::Zoom,
            Self::Bearing(_) => CameraDimension::Bearing,
            Self::Pitch(_) => CameraDimension::Pitch,
        }
    }

    /// Camera options with only this dimension set
    pub fn camera_options(&self) -> CameraOptions {
        let options = CameraOptions::new();
        match *self {
            Self::Center(center) => options.with_center(center),
            Self::Padding(padding) => options.with_padding(padding),
            Self::Anchor(anchor) => options.with_anchor(anchor),
            Self::Zoom(zoom) => options.with_zoom(zoom),
            Self::Bearing(bearing) => options.with_bearing(bearing),
            Self::Pitch(pitch) => options.with_pitch(pitch),
        }
    }

    /// This dimension re-read from `options`; `None` means the target for it is gone
    pub fn updated(&self, options: &CameraOptions) -> Option<Self> {
        Self::from_camera_options(self.dimension(), options)
    }
}
