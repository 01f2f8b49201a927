//! Timing strategies for the default transition
//!
//! Two providers compute one [`AnimationSpec`] per populated target dimension,
//! always in center, zoom, bearing, pitch, padding order. [`select_strategy`]
//! picks between them by comparing the current and target zoom.

use crate::animation::{
    component::{CameraDimension, CameraOptionsComponent},
    spec::AnimationSpec,
};
use crate::core::{
    camera::{CameraOptions, CameraState},
    map::MapCamera,
};
use std::rc::Rc;

/// Screen points per second the center travels at when converging
pub const CENTER_POINTS_PER_SECOND: f64 = 500.0;
/// Zoom levels per second when converging
pub const ZOOM_LEVELS_PER_SECOND: f64 = 2.2;
/// Upper bound for the distance-based center and zoom durations
pub const MAX_CONVERGING_DURATION: f64 = 3.0;

const CONVERGING_BEARING_DURATION: f64 = 1.8;
const CONVERGING_PITCH_DURATION: f64 = 1.2;
const CONVERGING_PADDING_DURATION: f64 = 1.2;
const CONVERGING_TRAILING_OFFSET: f64 = 0.1;

/// Dimensions animated by the default transition, in spec order
const ANIMATED_DIMENSIONS: [CameraDimension; 5] = [
    CameraDimension::Center,
    CameraDimension::Zoom,
    CameraDimension::Bearing,
    CameraDimension::Pitch,
    CameraDimension::Padding,
];

/// Computes animation specs for a target camera
pub trait AnimationSpecProvider {
    fn make_animation_specs(
        &self,
        current: &CameraState,
        target: &CameraOptions,
    ) -> Vec<AnimationSpec>;
}

/// Which timing strategy applies to a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecStrategy {
    /// Zooming in towards detail: timing follows the size of each change
    Converging,
    /// Zooming out or holding zoom: fixed cascade led by zoom
    Diverging,
}

/// Converging iff the target zoom is present and not below the current zoom
pub fn select_strategy(current_zoom: f64, target_zoom: Option<f64>) -> SpecStrategy {
    match target_zoom {
        Some(target_zoom) if target_zoom >= current_zoom => SpecStrategy::Converging,
        _ => SpecStrategy::Diverging,
    }
}

/// Distance-aware timing for zooming in
pub struct ConvergingSpecProvider {
    map: Rc<dyn MapCamera>,
}

impl ConvergingSpecProvider {
    pub fn new(map: Rc<dyn MapCamera>) -> Self {
        Self { map }
    }
}

impl AnimationSpecProvider for ConvergingSpecProvider {
    fn make_animation_specs(
        &self,
        current: &CameraState,
        target: &CameraOptions,
    ) -> Vec<AnimationSpec> {
        let center = target.center.map(|center| {
            let from = self.map.point_for(current.center);
            let to = self.map.point_for(center);
            let duration =
                (from.distance_to(&to) / CENTER_POINTS_PER_SECOND).min(MAX_CONVERGING_DURATION);
            AnimationSpec::new(duration, 0.0, CameraOptionsComponent::Center(center))
        });

        let zoom = target.zoom.map(|zoom| {
            let duration =
                ((zoom - current.zoom).abs() / ZOOM_LEVELS_PER_SECOND).min(MAX_CONVERGING_DURATION);
            let delay = center.map_or(0.0, |center| center.duration / 2.0);
            AnimationSpec::new(duration, delay, CameraOptionsComponent::Zoom(zoom))
        });

        // Orientation settles as the zoom lands
        let zoom_end = zoom.map(|zoom| zoom.total());
        let trailing_delay = |duration: f64, offset: f64| {
            zoom_end.map_or(0.0, |end| (end - duration + offset).max(0.0))
        };

        let bearing = target.bearing.map(|bearing| {
            AnimationSpec::new(
                CONVERGING_BEARING_DURATION,
                trailing_delay(CONVERGING_BEARING_DURATION, 0.0),
                CameraOptionsComponent::Bearing(bearing),
            )
        });

        let pitch = target.pitch.map(|pitch| {
            AnimationSpec::new(
                CONVERGING_PITCH_DURATION,
                trailing_delay(CONVERGING_PITCH_DURATION, CONVERGING_TRAILING_OFFSET),
                CameraOptionsComponent::Pitch(pitch),
            )
        });

        let padding = target.padding.map(|padding| {
            AnimationSpec::new(
                CONVERGING_PADDING_DURATION,
                trailing_delay(CONVERGING_PADDING_DURATION, CONVERGING_TRAILING_OFFSET),
                CameraOptionsComponent::Padding(padding),
            )
        });

        [center, zoom, bearing, pitch, padding]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Fixed cascade for zooming out, as (duration, delay) in seconds
#[derive(Debug, Clone, Copy, Default)]
pub struct DivergingSpecProvider;

impl DivergingSpecProvider {
    pub fn new() -> Self {
        Self
    }

    fn timing(dimension: CameraDimension) -> (f64, f64) {
        match dimension {
            CameraDimension::Center => (1.0, 0.8),
            CameraDimension::Zoom => (1.8, 0.0),
            CameraDimension::Bearing => (1.2, 0.6),
            CameraDimension::Pitch => (1.0, 0.0),
            CameraDimension::Padding => (1.2, 0.0),
            CameraDimension::Anchor => (0.0, 0.0),
        }
    }
}

impl AnimationSpecProvider for DivergingSpecProvider {
    fn make_animation_specs(
        &self,
        _current: &CameraState,
        target: &CameraOptions,
    ) -> Vec<AnimationSpec> {
        ANIMATED_DIMENSIONS
            .iter()
            .filter_map(|dimension| {
                CameraOptionsComponent::from_camera_options(*dimension, target).map(|component| {
                    let (duration, delay) = Self::timing(*dimension);
                    AnimationSpec::new(duration, delay, component)
                })
            })
            .collect()
    }
}

/// Reads the live camera and delegates to the selected strategy
pub struct DefaultAnimationSpecProvider {
    map: Rc<dyn MapCamera>,
    converging: ConvergingSpecProvider,
    diverging: DivergingSpecProvider,
}

impl DefaultAnimationSpecProvider {
    pub fn new(map: Rc<dyn MapCamera>) -> Self {
        Self {
            converging: ConvergingSpecProvider::new(map.clone()),
            diverging: DivergingSpecProvider::new(),
            map,
        }
    }

    /// Specs that take the live camera to `target`
    pub fn make_specs(&self, target: &CameraOptions) -> Vec<AnimationSpec> {
        self.make_animation_specs(&self.map.camera_state(), target)
    }
}

impl AnimationSpecProvider for DefaultAnimationSpecProvider {
    fn make_animation_specs(
        &self,
        current: &CameraState,
        target: &CameraOptions,
    ) -> Vec<AnimationSpec> {
        let strategy = select_strategy(current.zoom, target.zoom);
        let specs = match strategy {
            SpecStrategy::Converging => self.converging.make_animation_specs(current, target),
            SpecStrategy::Diverging => self.diverging.make_animation_specs(current, target),
        };
        log::debug!(
            "{:?} specs from zoom {} to {:?}: {:?}",
            strategy,
            current.zoom,
            target.zoom,
            specs
                .iter()
                .map(|spec| (spec.component.dimension(), spec.duration, spec.delay))
                .collect::<Vec<_>>()
        );
        specs
    }
}
