use crate::core::geo::{normalize_bearing, shortest_bearing_delta, EdgeInsets, LatLng, Point};
use std::f64::consts::PI;

/// Interpolation trait for values that can be smoothly transitioned
pub trait Interpolatable {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

/// Easing curves available to camera animators
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EasingFunction {
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    #[default]
    EaseInOutCubic,
    EaseInOutSine,
}

impl EasingFunction {
    /// Apply the easing function to a normalized time value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseInCubic => t * t * t,
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseInOutSine => -(((PI * t).cos() - 1.0) / 2.0),
        }
    }
}

/// Main interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two f64 values
    pub fn linear(start: f64, end: f64, t: f64) -> f64 {
        start + (end - start) * t
    }

    /// Interpolates a bearing along the shortest arc, result in [0, 360)
    pub fn bearing(start: f64, end: f64, t: f64) -> f64 {
        normalize_bearing(start + shortest_bearing_delta(start, end) * t)
    }
}

impl Interpolatable for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Interpolation::linear(*self, *other, t)
    }
}

impl Interpolatable for LatLng {
    /// Longitude takes the short way across the antimeridian
    fn lerp(&self, other: &Self, t: f64) -> Self {
        let mut delta_lng = other.lng - self.lng;
        if delta_lng > 180.0 {
            delta_lng -= 360.0;
        } else if delta_lng < -180.0 {
            delta_lng += 360.0;
        }
        LatLng::new(
            self.lat.lerp(&other.lat, t),
            LatLng::wrap_lng(self.lng + delta_lng * t),
        )
    }
}

impl Interpolatable for Point {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Point::new(self.x.lerp(&other.x, t), self.y.lerp(&other.y, t))
    }
}

impl Interpolatable for EdgeInsets {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        EdgeInsets::new(
            self.top.lerp(&other.top, t),
            self.left.lerp(&other.left, t),
            self.bottom.lerp(&other.bottom, t),
            self.right.lerp(&other.right, t),
        )
    }
}
