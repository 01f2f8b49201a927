pub mod events;
pub mod gestures;

pub use events::{InputEvent, TouchEventType, TouchPoint};
pub use gestures::{GestureConfig, GestureEvent, GestureKind, GesturePhase, GestureRecognizer};
