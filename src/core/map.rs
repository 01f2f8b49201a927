//! The renderer boundary.
//!
//! The viewport engine never paints anything. It reads the live camera, projects
//! coordinates to screen points and writes partial cameras through [`MapCamera`].
//! [`HeadlessMap`] is an in-process implementation used by hosts without a
//! renderer of their own, the demo and the tests.

use crate::core::{
    camera::{CameraOptions, CameraState},
    constants::{MAX_PITCH, TILE_SIZE},
    geo::{normalize_bearing, EdgeInsets, LatLng, LatLngBounds, Point, EARTH_RADIUS},
};
use std::cell::{Cell, RefCell};
use std::f64::consts::PI;

/// Camera access the engine needs from a map renderer
pub trait MapCamera {
    /// The current, fully-populated camera
    fn camera_state(&self) -> CameraState;

    /// Screen point (in view coordinates) for a geographic coordinate
    fn point_for(&self, coordinate: LatLng) -> Point;

    /// Applies the populated fields of `options` to the live camera
    fn set_camera(&self, options: &CameraOptions);

    /// Camera that frames `bounds` inside the view inset by `padding`
    fn camera_for_bounds(
        &self,
        bounds: &LatLngBounds,
        padding: EdgeInsets,
        bearing: Option<f64>,
        pitch: Option<f64>,
    ) -> CameraOptions;
}

/// A renderer-less map that keeps a camera and projects with Web Mercator
#[derive(Debug)]
pub struct HeadlessMap {
    camera: RefCell<CameraState>,
    anchor: Cell<Option<Point>>,
    size: Point,
    min_zoom: f64,
    max_zoom: f64,
    camera_writes: Cell<usize>,
}

impl HeadlessMap {
    /// Creates a map of `size` pixels showing `camera`
    pub fn new(camera: CameraState, size: Point) -> Self {
        let map = Self {
            camera: RefCell::new(CameraState::default()),
            anchor: Cell::new(None),
            size,
            min_zoom: 0.0,
            max_zoom: 22.0,
            camera_writes: Cell::new(0),
        };
        map.camera.replace(map.constrain(camera));
        map
    }

    /// Sets the zoom limits, clamping the current zoom into them
    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        let constrained = self.constrain(*self.camera.borrow());
        self.camera.replace(constrained);
        self
    }

    pub fn size(&self) -> Point {
        self.size
    }

    /// Last anchor written, if any
    pub fn anchor(&self) -> Option<Point> {
        self.anchor.get()
    }

    /// How many times `set_camera` has been called
    pub fn camera_writes(&self) -> usize {
        self.camera_writes.get()
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level (EPSG:3857)
    pub fn project(&self, lat_lng: &LatLng, zoom: f64) -> Point {
        let scale = TILE_SIZE as f64 * 2_f64.powf(zoom);
        let mercator = lat_lng.to_mercator();

        let pixel_x = (mercator.x + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;
        let pixel_y = (-mercator.y + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;

        Point::new(pixel_x, pixel_y)
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: f64) -> LatLng {
        let scale = TILE_SIZE as f64 * 2_f64.powf(zoom);

        let x = (pixel.x / scale) * (2.0 * PI * EARTH_RADIUS) - PI * EARTH_RADIUS;
        let y = PI * EARTH_RADIUS - (pixel.y / scale) * (2.0 * PI * EARTH_RADIUS);

        LatLng::from_mercator(Point::new(x, y))
    }

    fn constrain(&self, mut camera: CameraState) -> CameraState {
        camera.zoom = camera.zoom.clamp(self.min_zoom, self.max_zoom);
        camera.center = LatLng::new(
            LatLng::clamp_lat(camera.center.lat),
            LatLng::wrap_lng(camera.center.lng),
        );
        camera.bearing = normalize_bearing(camera.bearing);
        camera.pitch = camera.pitch.clamp(0.0, MAX_PITCH);
        camera
    }
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new(CameraState::default(), Point::new(800.0, 600.0))
    }
}

impl MapCamera for HeadlessMap {
    fn camera_state(&self) -> CameraState {
        *self.camera.borrow()
    }

    fn point_for(&self, coordinate: LatLng) -> Point {
        let camera = self.camera_state();
        let origin = self.project(&camera.center, camera.zoom);
        let projected = self.project(&coordinate, camera.zoom);
        projected
            .subtract(&origin)
            .add(&Point::new(self.size.x / 2.0, self.size.y / 2.0))
    }

    fn set_camera(&self, options: &CameraOptions) {
        let current = self.camera_state();
        let next = CameraState {
            center: options.center.unwrap_or(current.center),
            padding: options.padding.unwrap_or(current.padding),
            zoom: options.zoom.unwrap_or(current.zoom),
            bearing: options.bearing.unwrap_or(current.bearing),
            pitch: options.pitch.unwrap_or(current.pitch),
        };
        if options.anchor.is_some() {
            self.anchor.set(options.anchor);
        }
        self.camera.replace(self.constrain(next));
        self.camera_writes.set(self.camera_writes.get() + 1);
    }

    fn camera_for_bounds(
        &self,
        bounds: &LatLngBounds,
        padding: EdgeInsets,
        bearing: Option<f64>,
        pitch: Option<f64>,
    ) -> CameraOptions {
        let nw = self.project(&bounds.north_west(), 0.0);
        let se = self.project(&bounds.south_east(), 0.0);
        let center = self.unproject(&nw.add(&se).multiply(0.5), 0.0);

        let available_width = (self.size.x - padding.horizontal()).max(1.0);
        let available_height = (self.size.y - padding.vertical()).max(1.0);
        let bounds_width = (se.x - nw.x).abs();
        let bounds_height = (se.y - nw.y).abs();

        let zoom = if bounds_width <= f64::EPSILON && bounds_height <= f64::EPSILON {
            self.max_zoom
        } else {
            let scale_x = available_width / bounds_width.max(f64::EPSILON);
            let scale_y = available_height / bounds_height.max(f64::EPSILON);
            scale_x.min(scale_y).log2()
        };

        CameraOptions {
            center: Some(center),
            padding: Some(padding),
            anchor: None,
            zoom: Some(zoom.clamp(self.min_zoom, self.max_zoom)),
            bearing,
            pitch,
        }
    }
}
