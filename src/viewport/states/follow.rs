use crate::animation::tweening::CameraAnimatorFactory;
use crate::core::{
    camera::CameraOptions,
    geo::{normalize_bearing, EdgeInsets, LatLng},
    map::MapCamera,
};
use crate::traits::AnyCancelable;
use crate::viewport::state::{
    CameraEase, CameraHandler, CameraObservers, CameraOwnership, ViewportState,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Where a following camera points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowBearing {
    /// A fixed bearing in degrees
    Constant(f64),
    /// The heading reported with each location; unchanged when none is reported
    Heading,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowStateOptions {
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: FollowBearing,
    pub padding: EdgeInsets,
    /// Seconds of the linear ease towards each new location while following
    pub animation_duration: f64,
}

impl FollowStateOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.animation_duration.is_finite() || self.animation_duration < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "follow animation_duration must be a finite, non-negative number of seconds (got {})",
                self.animation_duration
            )));
        }
        if !self.zoom.is_finite() || !self.pitch.is_finite() {
            return Err(Error::InvalidOptions(format!(
                "follow zoom and pitch must be finite (got zoom {}, pitch {})",
                self.zoom, self.pitch
            )));
        }
        if let FollowBearing::Constant(bearing) = self.bearing {
            if !bearing.is_finite() {
                return Err(Error::InvalidOptions(format!(
                    "follow bearing must be finite (got {})",
                    bearing
                )));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

impl Default for FollowStateOptions {
    fn default() -> Self {
        Self {
            zoom: 16.35,
            pitch: 45.0,
            bearing: FollowBearing::Heading,
            padding: EdgeInsets::default(),
            animation_duration: 1.0,
        }
    }
}

/// A state that keeps the camera on a moving location fed by the host
///
/// While it owns the camera, each location is eased to linearly over
/// [`FollowStateOptions::animation_duration`].
pub struct FollowViewportState {
    options: Cell<FollowStateOptions>,
    location: Cell<Option<(LatLng, Option<f64>)>>,
    camera: RefCell<Option<CameraOptions>>,
    observers: CameraObservers,
    ownership: CameraOwnership,
    ease: CameraEase,
}

impl FollowViewportState {
    pub fn new(
        map: Rc<dyn MapCamera>,
        animators: Rc<dyn CameraAnimatorFactory>,
        options: FollowStateOptions,
    ) -> Self {
        Self {
            options: Cell::new(options),
            location: Cell::new(None),
            camera: RefCell::new(None),
            observers: CameraObservers::new(),
            ownership: CameraOwnership::new(),
            ease: CameraEase::new(map, animators),
        }
    }

    pub fn options(&self) -> FollowStateOptions {
        self.options.get()
    }

    /// Replaces the options, re-reporting the camera if a location is known
    pub fn set_options(&self, options: FollowStateOptions) {
        self.options.set(options);
        if let Some((location, heading)) = self.location.get() {
            self.update_location(location, heading);
        }
    }

    /// The last camera reported, if a location has been received
    pub fn camera(&self) -> Option<CameraOptions> {
        *self.camera.borrow()
    }

    /// Feeds a new location and optional heading in degrees
    pub fn update_location(&self, location: LatLng, heading: Option<f64>) {
        self.location.set(Some((location, heading)));
        let camera = self.camera_for(location, heading);
        self.camera.replace(Some(camera));

        if self.ownership.is_owned() {
            self.ease.ease_to(&camera, self.options.get().animation_duration);
        }
        self.observers.notify(&camera);
    }

    pub fn is_updating_camera(&self) -> bool {
        self.ownership.is_owned()
    }

    /// Whether an ease towards the latest location is in flight
    pub fn is_animating(&self) -> bool {
        self.ease.is_running()
    }

    fn camera_for(&self, location: LatLng, heading: Option<f64>) -> CameraOptions {
        let options = self.options.get();
        let bearing = match options.bearing {
            FollowBearing::Constant(bearing) => Some(bearing),
            FollowBearing::Heading => heading,
        };
        CameraOptions {
            center: Some(location),
            padding: Some(options.padding),
            anchor: None,
            zoom: Some(options.zoom),
            bearing: bearing.map(normalize_bearing),
            pitch: Some(options.pitch),
        }
    }
}

impl ViewportState for FollowViewportState {
    fn observe_camera(&self, handler: CameraHandler) -> AnyCancelable {
        self.observers.subscribe(handler, self.camera())
    }

    fn start_updating_camera(&self) -> AnyCancelable {
        let ownership = self.ownership.acquire({
            let cancel_ease = self.ease.canceler();
            move || {
                cancel_ease();
                log::debug!("follow state released the camera");
            }
        });
        log::debug!("follow state took the camera");
        if let Some(camera) = self.camera() {
            self.ease.ease_to(&camera, self.options.get().animation_duration);
        }
        ownership
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{interpolation::EasingFunction, tweening::AnimationDriver};
    use crate::core::{camera::CameraState, geo::Point, map::HeadlessMap};
    use crate::testing::{FakeMap, RecordingAnimatorFactory};
    use crate::traits::Cancelable;

    fn follow(options: FollowStateOptions) -> FollowViewportState {
        FollowViewportState::new(
            Rc::new(FakeMap::default()),
            Rc::new(RecordingAnimatorFactory::default()),
            options,
        )
    }

    fn recording(state: &FollowViewportState) -> (Rc<RefCell<Vec<CameraOptions>>>, AnyCancelable) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let subscription = state.observe_camera(Box::new(move |camera| {
            sink.borrow_mut().push(*camera);
            true
        }));
        (seen, subscription)
    }

    #[test]
    fn test_no_camera_until_first_location() {
        let state = follow(FollowStateOptions::default());
        let (seen, _subscription) = recording(&state);
        assert!(seen.borrow().is_empty());

        state.update_location(LatLng::new(10.0, 20.0), Some(90.0));
        let camera = seen.borrow()[0];
        assert_eq!(camera.center, Some(LatLng::new(10.0, 20.0)));
        assert_eq!(camera.zoom, Some(16.35));
        assert_eq!(camera.pitch, Some(45.0));
        assert_eq!(camera.bearing, Some(90.0));
    }

    #[test]
    fn test_late_subscriber_gets_last_camera() {
        let state = follow(FollowStateOptions::default());
        state.update_location(LatLng::new(1.0, 2.0), None);

        let (seen, _subscription) = recording(&state);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].bearing, None);
    }

    #[test]
    fn test_constant_bearing_ignores_heading() {
        let options = FollowStateOptions {
            bearing: FollowBearing::Constant(-30.0),
            ..FollowStateOptions::default()
        };
        let state = follow(options);
        state.update_location(LatLng::new(0.0, 0.0), Some(180.0));
        assert_eq!(state.camera().and_then(|camera| camera.bearing), Some(330.0));
    }

    #[test]
    fn test_eases_to_locations_only_while_owned() {
        let factory = Rc::new(RecordingAnimatorFactory::default());
        let state = FollowViewportState::new(
            Rc::new(FakeMap::default()),
            factory.clone(),
            FollowStateOptions::default(),
        );
        state.update_location(LatLng::new(0.0, 0.0), None);
        assert!(factory.made().is_empty());

        let ownership = state.start_updating_camera();
        state.update_location(LatLng::new(0.0, 1.0), None);

        let made = factory.made();
        assert_eq!(made.len(), 2);
        assert_eq!(made[0].to.center, Some(LatLng::new(0.0, 0.0)));
        assert_eq!(made[0].animator.cancel_count(), 1);
        assert_eq!(made[1].to, state.camera().unwrap());
        assert_eq!(made[1].duration, 1.0);
        assert_eq!(made[1].easing, Some(EasingFunction::Linear));
        assert_eq!(made[1].animator.start_delays(), vec![0.0]);

        ownership.cancel();
        assert_eq!(made[1].animator.cancel_count(), 1);
        assert!(!state.is_animating());

        state.update_location(LatLng::new(0.0, 2.0), None);
        assert_eq!(factory.made().len(), 2);
    }

    #[test]
    fn test_location_update_moves_camera_over_time() {
        let map = Rc::new(HeadlessMap::new(CameraState::default(), Point::new(512.0, 512.0)));
        let driver = Rc::new(AnimationDriver::new(map.clone()));
        let options = FollowStateOptions {
            zoom: 0.0,
            pitch: 0.0,
            ..FollowStateOptions::default()
        };
        let state = FollowViewportState::new(map.clone(), driver.clone(), options);
        let _ownership = state.start_updating_camera();

        state.update_location(LatLng::new(0.01, 0.01), None);
        assert_eq!(map.camera_state().center, LatLng::new(0.0, 0.0));
        assert!(state.is_animating());

        driver.update(0.5);
        let halfway = map.camera_state().center;
        assert!((halfway.lng - 0.005).abs() < 1e-9);

        driver.update(0.5);
        assert!((map.camera_state().center.lng - 0.01).abs() < 1e-9);
        assert!(!state.is_animating());
    }

    #[test]
    fn test_revoked_owner_stops_easing() {
        let map = Rc::new(HeadlessMap::default());
        let driver = Rc::new(AnimationDriver::new(map.clone()));
        let state = FollowViewportState::new(map.clone(), driver.clone(), FollowStateOptions::default());
        let ownership = state.start_updating_camera();

        state.update_location(LatLng::new(10.0, 10.0), None);
        driver.update(0.25);
        ownership.cancel();
        let stopped_at = map.camera_state();
        driver.update(1.0);

        assert!(!state.is_animating());
        assert!(driver.is_idle());
        assert_eq!(map.camera_state(), stopped_at);
    }

    #[test]
    fn test_set_options_re_reports_camera() {
        let state = follow(FollowStateOptions::default());
        state.update_location(LatLng::new(0.0, 0.0), None);
        let (seen, _subscription) = recording(&state);

        state.set_options(FollowStateOptions {
            zoom: 12.0,
            ..FollowStateOptions::default()
        });
        assert_eq!(seen.borrow().last().and_then(|camera| camera.zoom), Some(12.0));
    }

    #[test]
    fn test_options_from_json() {
        let options =
            FollowStateOptions::from_json(r#"{"zoom": 14.0, "bearing": {"constant": 45.0}}"#)
                .unwrap();
        assert_eq!(options.zoom, 14.0);
        assert_eq!(options.pitch, 45.0);
        assert_eq!(options.bearing, FollowBearing::Constant(45.0));

        assert!(FollowStateOptions::from_json(r#"{"bearing": "heading"}"#).is_ok());
        assert_eq!(options.animation_duration, 1.0);
        assert!(FollowStateOptions::from_json(r#"{"zoom": "high"}"#).is_err());
        assert!(FollowStateOptions::from_json(r#"{"animation_duration": -1.0}"#).is_err());
    }
}
