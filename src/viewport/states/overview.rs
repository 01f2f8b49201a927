use crate::animation::tweening::CameraAnimatorFactory;
use crate::core::{
    camera::CameraOptions,
    geo::{EdgeInsets, LatLngBounds},
    map::MapCamera,
};
use crate::traits::AnyCancelable;
use crate::viewport::state::{
    CameraEase, CameraHandler, CameraObservers, CameraOwnership, ViewportState,
};
use crate::{Error, Result};
use geo::BoundingRect;
use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// What an overview frames. Coordinates are `x = longitude`, `y = latitude`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewStateOptions {
    pub geometry: Geometry<f64>,
    #[serde(default)]
    pub padding: EdgeInsets,
    #[serde(default)]
    pub bearing: Option<f64>,
    #[serde(default)]
    pub pitch: Option<f64>,
    /// Seconds of the linear ease towards a reframed camera while owned
    #[serde(default = "default_animation_duration")]
    pub animation_duration: f64,
}

fn default_animation_duration() -> f64 {
    1.0
}

impl OverviewStateOptions {
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: geometry.into(),
            padding: EdgeInsets::default(),
            bearing: None,
            pitch: None,
            animation_duration: default_animation_duration(),
        }
    }

    pub fn with_padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = padding;
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

    pub fn with_animation_duration(mut self, animation_duration: f64) -> Self {
        self.animation_duration = animation_duration;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.animation_duration.is_finite() || self.animation_duration < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "overview animation_duration must be a finite, non-negative number of seconds (got {})",
                self.animation_duration
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Bounds of the geometry, `None` if it has no coordinates
    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.geometry.bounding_rect().map(|rect| {
            LatLngBounds::from_coords(rect.min().y, rect.min().x, rect.max().y, rect.max().x)
        })
    }
}

/// A state that frames a geometry
pub struct OverviewViewportState {
    options: RefCell<OverviewStateOptions>,
    camera: RefCell<Option<CameraOptions>>,
    observers: CameraObservers,
    ownership: CameraOwnership,
    ease: CameraEase,
    map: Rc<dyn MapCamera>,
}

impl OverviewViewportState {
    pub fn new(
        map: Rc<dyn MapCamera>,
        animators: Rc<dyn CameraAnimatorFactory>,
        options: OverviewStateOptions,
    ) -> Self {
        let state = Self {
            options: RefCell::new(options),
            camera: RefCell::new(None),
            observers: CameraObservers::new(),
            ownership: CameraOwnership::new(),
            ease: CameraEase::new(map.clone(), animators),
            map,
        };
        state.recalculate();
        state
    }

    pub fn options(&self) -> OverviewStateOptions {
        self.options.borrow().clone()
    }

    /// Replaces the options and reframes
    pub fn set_options(&self, options: OverviewStateOptions) {
        self.options.replace(options);
        self.recalculate();
    }

    pub fn camera(&self) -> Option<CameraOptions> {
        *self.camera.borrow()
    }

    pub fn is_updating_camera(&self) -> bool {
        self.ownership.is_owned()
    }

    pub fn is_animating(&self) -> bool {
        self.ease.is_running()
    }

    fn recalculate(&self) {
        let options = self.options();
        let Some(bounds) = options.bounds() else {
            log::warn!("overview geometry has no coordinates, keeping the previous camera");
            return;
        };
        let camera =
            self.map
                .camera_for_bounds(&bounds, options.padding, options.bearing, options.pitch);
        self.camera.replace(Some(camera));

        if self.ownership.is_owned() {
            self.ease.ease_to(&camera, options.animation_duration);
        }
        self.observers.notify(&camera);
    }
}

impl ViewportState for OverviewViewportState {
    fn observe_camera(&self, handler: CameraHandler) -> AnyCancelable {
        self.observers.subscribe(handler, self.camera())
    }

    fn start_updating_camera(&self) -> AnyCancelable {
        let ownership = self.ownership.acquire(self.ease.canceler());
        if let Some(camera) = self.camera() {
            let duration = self.options.borrow().animation_duration;
            self.ease.ease_to(&camera, duration);
        }
        ownership
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::interpolation::EasingFunction;
    use crate::core::geo::LatLng;
    use crate::testing::{FakeMap, RecordingAnimatorFactory};
    use crate::traits::Cancelable;
    use geo_types::{line_string, point, MultiPoint};

    fn overview(map: Rc<FakeMap>, options: OverviewStateOptions) -> OverviewViewportState {
        OverviewViewportState::new(map, Rc::new(RecordingAnimatorFactory::default()), options)
    }

    #[test]
    fn test_frames_bounding_rect_of_geometry() {
        let map = Rc::new(FakeMap::default());
        let route = line_string![(x: 10.0, y: -5.0), (x: 20.0, y: 5.0), (x: 14.0, y: 1.0)];
        let state = overview(
            map,
            OverviewStateOptions::new(route)
                .with_padding(EdgeInsets::uniform(10.0))
                .with_pitch(20.0),
        );

        let camera = state.camera().unwrap();
        assert_eq!(camera.center, Some(LatLng::new(0.0, 15.0)));
        assert_eq!(camera.padding, Some(EdgeInsets::uniform(10.0)));
        assert_eq!(camera.pitch, Some(20.0));
        assert_eq!(camera.bearing, None);
    }

    #[test]
    fn test_empty_geometry_reports_nothing() {
        let state = overview(
            Rc::new(FakeMap::default()),
            OverviewStateOptions::new(MultiPoint::<f64>::new(vec![])),
        );
        assert_eq!(state.camera(), None);

        let count = Rc::new(std::cell::Cell::new(0));
        let counter = count.clone();
        let _subscription = state.observe_camera(Box::new(move |_| {
            counter.set(counter.get() + 1);
            true
        }));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_set_options_reframes_and_notifies() {
        let map = Rc::new(FakeMap::default());
        let factory = Rc::new(RecordingAnimatorFactory::default());
        let state = OverviewViewportState::new(
            map.clone(),
            factory.clone(),
            OverviewStateOptions::new(point!(x: 1.0, y: 1.0)).with_animation_duration(0.5),
        );

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = state.observe_camera(Box::new(move |camera| {
            sink.borrow_mut().push(*camera);
            true
        }));

        let _ownership = state.start_updating_camera();
        state.set_options(
            OverviewStateOptions::new(point!(x: 3.0, y: 2.0))
                .with_bearing(90.0)
                .with_animation_duration(2.0),
        );

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].center, Some(LatLng::new(2.0, 3.0)));
        assert_eq!(seen[1].bearing, Some(90.0));

        let made = factory.made();
        assert_eq!(made.len(), 2);
        assert_eq!((made[0].to, made[0].duration), (seen[0], 0.5));
        assert_eq!((made[1].to, made[1].duration), (seen[1], 2.0));
        assert_eq!(made[1].easing, Some(EasingFunction::Linear));
        assert_eq!(made[0].animator.cancel_count(), 1);
        assert!(map.writes().is_empty());
    }

    #[test]
    fn test_revoking_ownership_cancels_the_ease() {
        let factory = Rc::new(RecordingAnimatorFactory::default());
        let state = OverviewViewportState::new(
            Rc::new(FakeMap::default()),
            factory.clone(),
            OverviewStateOptions::new(point!(x: 1.0, y: 1.0)),
        );

        let ownership = state.start_updating_camera();
        assert!(state.is_animating());
        ownership.cancel();

        let made = factory.made();
        assert_eq!(made.len(), 1);
        assert_eq!(made[0].duration, 1.0);
        assert_eq!(made[0].animator.cancel_count(), 1);
        assert!(!state.is_animating());

        state.set_options(OverviewStateOptions::new(point!(x: 5.0, y: 5.0)));
        assert_eq!(factory.made().len(), 1);
    }

    #[test]
    fn test_options_survive_json() {
        let options = OverviewStateOptions::new(point!(x: 4.0, y: 8.0)).with_pitch(30.0);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(OverviewStateOptions::from_json(&json).unwrap(), options);
        assert!(OverviewStateOptions::from_json(r#"{"padding": {}}"#).is_err());
        assert_eq!(options.animation_duration, 1.0);
    }
}
