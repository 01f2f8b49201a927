use crate::core::{camera::CameraOptions, map::MapCamera};
use crate::traits::AnyCancelable;
use crate::viewport::state::{CameraHandler, CameraObservers, CameraOwnership, ViewportState};
use std::cell::RefCell;
use std::rc::Rc;

/// A state that holds a fixed camera
pub struct CameraViewportState {
    camera: RefCell<CameraOptions>,
    observers: CameraObservers,
    ownership: CameraOwnership,
    map: Rc<dyn MapCamera>,
}

impl CameraViewportState {
    pub fn new(map: Rc<dyn MapCamera>, camera: CameraOptions) -> Self {
        Self {
            camera: RefCell::new(camera),
            observers: CameraObservers::new(),
            ownership: CameraOwnership::new(),
            map,
        }
    }

    pub fn camera(&self) -> CameraOptions {
        *self.camera.borrow()
    }

    /// Replaces the camera and reports it to observers, writing it to the map while owned
    pub fn set_camera(&self, camera: CameraOptions) {
        self.camera.replace(camera);
        if self.ownership.is_owned() {
            self.map.set_camera(&camera);
        }
        self.observers.notify(&camera);
    }

    pub fn is_updating_camera(&self) -> bool {
        self.ownership.is_owned()
    }
}

impl ViewportState for CameraViewportState {
    fn observe_camera(&self, handler: CameraHandler) -> AnyCancelable {
        self.observers.subscribe(handler, Some(self.camera()))
    }

    fn start_updating_camera(&self) -> AnyCancelable {
        self.map.set_camera(&self.camera());
        self.ownership.acquire(|| {})
    }
}
