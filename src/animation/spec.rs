use crate::animation::component::CameraOptionsComponent;

/// Timing for one component of a transition, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    pub duration: f64,
    pub delay: f64,
    pub component: CameraOptionsComponent,
}

impl AnimationSpec {
    pub fn new(duration: f64, delay: f64, component: CameraOptionsComponent) -> Self {
        Self {
            duration: duration.max(0.0),
            delay: delay.max(0.0),
            component,
        }
    }

    /// When this component finishes, measured from the start of the transition
    pub fn total(&self) -> f64 {
        self.duration + self.delay
    }

    /// Both duration and delay multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            duration: self.duration * factor,
            delay: self.delay * factor,
            component: self.component,
        }
    }
}
