use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Raw input events fed to the viewport by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single click/tap with a pointer
    Click { position: Point },
    /// Double click reported by the platform
    DoubleClick { position: Point },
    /// Pointer move without a pressed button
    MouseMove { position: Point },
    /// Start of drag operation
    DragStart { position: Point },
    /// Drag in progress
    Drag { delta: Point },
    /// End of drag operation
    DragEnd,
    /// Scroll wheel zoom
    Scroll { delta: f64, position: Point },
    /// Touch events (multi-touch)
    Touch {
        event_type: TouchEventType,
        touches: Vec<TouchPoint>,
    },
}

/// Types of touch events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchEventType {
    Start,
    Move,
    End,
    Cancel,
}

/// Individual touch point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u64, position: Point) -> Self {
        Self { id, position }
    }
}

impl InputEvent {
    /// Touch event with the given touches
    pub fn touch(event_type: TouchEventType, touches: Vec<TouchPoint>) -> Self {
        InputEvent::Touch {
            event_type,
            touches,
        }
    }

    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::Click { position } => Some(*position),
            InputEvent::DoubleClick { position } => Some(*position),
            InputEvent::MouseMove { position } => Some(*position),
            InputEvent::DragStart { position } => Some(*position),
            InputEvent::Scroll { position, .. } => Some(*position),
            InputEvent::Touch { touches, .. } => touches.first().map(|t| t.position),
            _ => None,
        }
    }

    /// Checks if this is a touch event
    pub fn is_touch_event(&self) -> bool {
        matches!(self, InputEvent::Touch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_event_position() {
        let click = InputEvent::Click {
            position: Point::new(10.0, 20.0),
        };
        assert_eq!(click.position(), Some(Point::new(10.0, 20.0)));
        assert_eq!(InputEvent::DragEnd.position(), None);

        let touch = InputEvent::touch(
            TouchEventType::Start,
            vec![TouchPoint::new(1, Point::new(3.0, 4.0))],
        );
        assert!(touch.is_touch_event());
        assert_eq!(touch.position(), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_input_event_json() {
        let event: InputEvent =
            serde_json::from_str(r#"{"DragStart":{"position":{"x":1.0,"y":2.0}}}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::DragStart {
                position: Point::new(1.0, 2.0)
            }
        );
    }
}
