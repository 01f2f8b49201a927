use crate::{
    core::geo::Point,
    input::events::{InputEvent, TouchEventType, TouchPoint},
    prelude::HashMap,
};
use instant::Instant;
use std::time::Duration;

/// Kinds of gestures the viewport reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Any contact with the map, from first touch down to last touch up
    AnyTouch,
    /// Two quick single-finger taps
    DoubleTap,
    /// A quick two-finger tap
    DoubleTouch,
    /// Single finger or pointer drag
    Pan,
    /// Two-finger pinch or wheel zoom
    Pinch,
}

/// Phase of a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    /// Discrete gestures are reported once, when recognized
    Recognized,
}

/// A recognized gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub phase: GesturePhase,
}

impl GestureEvent {
    pub fn new(kind: GestureKind, phase: GesturePhase) -> Self {
        Self { kind, phase }
    }

    /// True for the gestures that take the camera away from the viewport
    pub fn is_user_interaction_start(&self) -> bool {
        matches!(
            (self.kind, self.phase),
            (GestureKind::AnyTouch, GesturePhase::Began)
                | (GestureKind::DoubleTap, GesturePhase::Recognized)
                | (GestureKind::DoubleTouch, GesturePhase::Recognized)
        )
    }
}

/// Configuration for gesture recognition
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Minimum distance for drag to start
    pub drag_threshold: f64,
    /// Maximum time for tap gesture
    pub tap_timeout: Duration,
    /// Maximum time between double taps
    pub double_tap_timeout: Duration,
    /// Maximum distance between taps for double tap
    pub double_tap_distance_threshold: f64,
    /// Minimum distance change for pinch gesture
    pub pinch_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 10.0,
            tap_timeout: Duration::from_millis(300),
            double_tap_timeout: Duration::from_millis(300),
            double_tap_distance_threshold: 50.0,
            pinch_threshold: 10.0,
        }
    }
}

/// Touch tracking information
#[derive(Debug, Clone)]
struct TouchInfo {
    start_position: Point,
    current_position: Point,
}

/// Tracks one touch sequence, from first contact to last release
#[derive(Debug, Clone)]
struct TouchSequence {
    start_time: Instant,
    start_position: Point,
    max_touches: usize,
    active_gesture: Option<GestureKind>,
}

/// Turns raw input into gesture events
pub struct GestureRecognizer {
    pub enabled: bool,
    config: GestureConfig,
    active_touches: HashMap<u64, TouchInfo>,
    sequence: Option<TouchSequence>,
    last_tap: Option<(Point, Instant)>,
    pointer_drag: bool,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::with_config(GestureConfig::default())
    }

    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            enabled: true,
            config,
            active_touches: HashMap::default(),
            sequence: None,
            last_tap: None,
            pointer_drag: false,
        }
    }

    /// Processes an input event and returns the gestures it completes or advances
    pub fn process_input(&mut self, input: &InputEvent) -> Vec<GestureEvent> {
        self.process_input_at(input, Instant::now())
    }

    pub fn process_input_at(&mut self, input: &InputEvent, now: Instant) -> Vec<GestureEvent> {
        if !self.enabled {
            return Vec::new();
        }

        let mut gestures = Vec::new();
        match input {
            InputEvent::Touch {
                event_type,
                touches,
            } => self.process_touch_event(*event_type, touches, now, &mut gestures),
            InputEvent::Click { position } => {
                gestures.push(GestureEvent::new(GestureKind::AnyTouch, GesturePhase::Began));
                gestures.push(GestureEvent::new(GestureKind::AnyTouch, GesturePhase::Ended));
                self.register_tap(*position, now, &mut gestures);
            }
            InputEvent::DoubleClick { .. } => {
                self.last_tap = None;
                gestures.push(GestureEvent::new(
                    GestureKind::DoubleTap,
                    GesturePhase::Recognized,
                ));
            }
            InputEvent::DragStart { .. } => {
                self.pointer_drag = true;
                gestures.push(GestureEvent::new(GestureKind::AnyTouch, GesturePhase::Began));
                gestures.push(GestureEvent::new(GestureKind::Pan, GesturePhase::Began));
            }
            InputEvent::Drag { .. } if self.pointer_drag => {
                gestures.push(GestureEvent::new(GestureKind::Pan, GesturePhase::Changed));
            }
            InputEvent::DragEnd if self.pointer_drag => {
                self.pointer_drag = false;
                gestures.push(GestureEvent::new(GestureKind::Pan, GesturePhase::Ended));
                gestures.push(GestureEvent::new(GestureKind::AnyTouch, GesturePhase::Ended));
            }
            InputEvent::Scroll { .. } => {
                gestures.push(GestureEvent::new(GestureKind::Pinch, GesturePhase::Changed));
            }
            _ => {}
        }

        if !gestures.is_empty() {
            log::debug!("gestures from {:?}: {:?}", input, gestures);
        }
        gestures
    }

    fn process_touch_event(
        &mut self,
        event_type: TouchEventType,
        touches: &[TouchPoint],
        now: Instant,
        gestures: &mut Vec<GestureEvent>,
    ) {
        match event_type {
            TouchEventType::Start => {
                if self.active_touches.is_empty() && !touches.is_empty() {
                    self.sequence = Some(TouchSequence {
                        start_time: now,
                        start_position: touches[0].position,
                        max_touches: 0,
                        active_gesture: None,
                    });
                    gestures.push(GestureEvent::new(GestureKind::AnyTouch, GesturePhase::Began));
                }
                for touch in touches {
                    self.active_touches.insert(
                        touch.id,
                        TouchInfo {
                            start_position: touch.position,
                            current_position: touch.position,
                        },
                    );
                }
                let count = self.active_touches.len();
                if let Some(sequence) = self.sequence.as_mut() {
                    sequence.max_touches = sequence.max_touches.max(count);
                }
            }
            TouchEventType::Move => {
                for touch in touches {
                    if let Some(touch_info) = self.active_touches.get_mut(&touch.id) {
                        touch_info.current_position = touch.position;
                    }
                }
                self.update_continuous_gesture(gestures);
            }
            TouchEventType::End | TouchEventType::Cancel => {
                for touch in touches {
                    self.active_touches.remove(&touch.id);
                }
                if self.active_touches.is_empty() {
                    self.finalize_sequence(event_type == TouchEventType::Cancel, now, gestures);
                }
            }
        }
    }

    fn update_continuous_gesture(&mut self, gestures: &mut Vec<GestureEvent>) {
        let Some(sequence) = self.sequence.as_mut() else {
            return;
        };

        let detected = match self.active_touches.len() {
            1 => self.active_touches.values().next().and_then(|touch| {
                (touch.current_position.distance_to(&touch.start_position)
                    > self.config.drag_threshold)
                    .then_some(GestureKind::Pan)
            }),
            2 => {
                let touches: Vec<&TouchInfo> = self.active_touches.values().collect();
                let initial = touches[0].start_position.distance_to(&touches[1].start_position);
                let current = touches[0]
                    .current_position
                    .distance_to(&touches[1].current_position);
                ((current - initial).abs() > self.config.pinch_threshold)
                    .then_some(GestureKind::Pinch)
            }
            _ => None,
        };

        match (sequence.active_gesture, detected) {
            (None, Some(kind)) => {
                sequence.active_gesture = Some(kind);
                gestures.push(GestureEvent::new(kind, GesturePhase::Began));
            }
            (Some(active), _) => {
                gestures.push(GestureEvent::new(active, GesturePhase::Changed));
            }
            (None, None) => {}
        }
    }

    fn finalize_sequence(&mut self, canceled: bool, now: Instant, gestures: &mut Vec<GestureEvent>) {
        let Some(sequence) = self.sequence.take() else {
            return;
        };

        if let Some(kind) = sequence.active_gesture {
            gestures.push(GestureEvent::new(kind, GesturePhase::Ended));
        }
        gestures.push(GestureEvent::new(GestureKind::AnyTouch, GesturePhase::Ended));

        let quick = now.saturating_duration_since(sequence.start_time) <= self.config.tap_timeout;
        if canceled || sequence.active_gesture.is_some() || !quick {
            self.last_tap = None;
            return;
        }

        match sequence.max_touches {
            1 => self.register_tap(sequence.start_position, now, gestures),
            2 => {
                self.last_tap = None;
                gestures.push(GestureEvent::new(
                    GestureKind::DoubleTouch,
                    GesturePhase::Recognized,
                ));
            }
            _ => self.last_tap = None,
        }
    }

    fn register_tap(&mut self, position: Point, now: Instant, gestures: &mut Vec<GestureEvent>) {
        if let Some((last_position, last_time)) = self.last_tap {
            let time_diff = now.saturating_duration_since(last_time);
            let distance = position.distance_to(&last_position);

            if time_diff <= self.config.double_tap_timeout
                && distance <= self.config.double_tap_distance_threshold
            {
                gestures.push(GestureEvent::new(
                    GestureKind::DoubleTap,
                    GesturePhase::Recognized,
                ));
                self.last_tap = None;
                return;
            }
        }

        self.last_tap = Some((position, now));
    }

    /// Forgets all tracked touches and taps
    pub fn reset(&mut self) {
        self.active_touches.clear();
        self.sequence = None;
        self.last_tap = None;
        self.pointer_drag = false;
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(event_type: TouchEventType, points: &[(u64, f64, f64)]) -> InputEvent {
        InputEvent::touch(
            event_type,
            points
                .iter()
                .map(|(id, x, y)| TouchPoint::new(*id, Point::new(*x, *y)))
                .collect(),
        )
    }

    fn gesture(kind: GestureKind, phase: GesturePhase) -> GestureEvent {
        GestureEvent::new(kind, phase)
    }

    #[test]
    fn test_first_contact_begins_any_touch() {
        let mut recognizer = GestureRecognizer::new();
        let now = Instant::now();

        let events = recognizer
            .process_input_at(&touch(TouchEventType::Start, &[(1, 10.0, 10.0)]), now);
        assert_eq!(events, vec![gesture(GestureKind::AnyTouch, GesturePhase::Began)]);

        // A second finger joins the same sequence
        let events = recognizer
            .process_input_at(&touch(TouchEventType::Start, &[(2, 50.0, 10.0)]), now);
        assert!(events.is_empty());
    }

    #[test]
    fn test_double_tap_recognized() {
        let mut recognizer = GestureRecognizer::new();
        let start = Instant::now();
        let tap = |recognizer: &mut GestureRecognizer, at: Instant| {
            recognizer.process_input_at(&touch(TouchEventType::Start, &[(1, 100.0, 100.0)]), at);
            recognizer.process_input_at(
                &touch(TouchEventType::End, &[(1, 100.0, 100.0)]),
                at + Duration::from_millis(50),
            )
        };

        let first = tap(&mut recognizer, start);
        assert!(!first.contains(&gesture(GestureKind::DoubleTap, GesturePhase::Recognized)));

        let second = tap(&mut recognizer, start + Duration::from_millis(200));
        assert!(second.contains(&gesture(GestureKind::DoubleTap, GesturePhase::Recognized)));
    }

    #[test]
    fn test_slow_taps_are_not_a_double_tap() {
        let mut recognizer = GestureRecognizer::new();
        let start = Instant::now();
        let tap_at = start + Duration::from_millis(800);
        recognizer.process_input_at(&InputEvent::Click { position: Point::new(0.0, 0.0) }, start);
        let events = recognizer
            .process_input_at(&InputEvent::Click { position: Point::new(0.0, 0.0) }, tap_at);
        assert!(!events.contains(&gesture(GestureKind::DoubleTap, GesturePhase::Recognized)));
    }

    #[test]
    fn test_two_finger_tap_is_double_touch() {
        let mut recognizer = GestureRecognizer::new();
        let now = Instant::now();
        recognizer.process_input_at(
            &touch(TouchEventType::Start, &[(1, 10.0, 10.0), (2, 60.0, 10.0)]),
            now,
        );
        let events = recognizer.process_input_at(
            &touch(TouchEventType::End, &[(1, 10.0, 10.0), (2, 60.0, 10.0)]),
            now + Duration::from_millis(100),
        );
        assert_eq!(
            events,
            vec![
                gesture(GestureKind::AnyTouch, GesturePhase::Ended),
                gesture(GestureKind::DoubleTouch, GesturePhase::Recognized),
            ]
        );
    }

    #[test]
    fn test_pan_phases() {
        let mut recognizer = GestureRecognizer::new();
        let now = Instant::now();
        recognizer.process_input_at(&touch(TouchEventType::Start, &[(1, 0.0, 0.0)]), now);

        let small = recognizer.process_input_at(&touch(TouchEventType::Move, &[(1, 3.0, 0.0)]), now);
        assert!(small.is_empty());

        let began = recognizer.process_input_at(&touch(TouchEventType::Move, &[(1, 30.0, 0.0)]), now);
        assert_eq!(began, vec![gesture(GestureKind::Pan, GesturePhase::Began)]);

        let changed =
            recognizer.process_input_at(&touch(TouchEventType::Move, &[(1, 60.0, 0.0)]), now);
        assert_eq!(changed, vec![gesture(GestureKind::Pan, GesturePhase::Changed)]);

        let ended = recognizer.process_input_at(&touch(TouchEventType::End, &[(1, 60.0, 0.0)]), now);
        assert_eq!(
            ended,
            vec![
                gesture(GestureKind::Pan, GesturePhase::Ended),
                gesture(GestureKind::AnyTouch, GesturePhase::Ended),
            ]
        );
    }

    #[test]
    fn test_pinch_detected_from_two_fingers() {
        let mut recognizer = GestureRecognizer::new();
        let now = Instant::now();
        recognizer.process_input_at(
            &touch(TouchEventType::Start, &[(1, 0.0, 0.0), (2, 100.0, 0.0)]),
            now,
        );
        let events = recognizer.process_input_at(
            &touch(TouchEventType::Move, &[(1, -20.0, 0.0), (2, 120.0, 0.0)]),
            now,
        );
        assert_eq!(events, vec![gesture(GestureKind::Pinch, GesturePhase::Began)]);
    }

    #[test]
    fn test_interaction_start_classification() {
        assert!(gesture(GestureKind::AnyTouch, GesturePhase::Began).is_user_interaction_start());
        assert!(gesture(GestureKind::DoubleTap, GesturePhase::Recognized).is_user_interaction_start());
        assert!(
            gesture(GestureKind::DoubleTouch, GesturePhase::Recognized).is_user_interaction_start()
        );
        assert!(!gesture(GestureKind::AnyTouch, GesturePhase::Ended).is_user_interaction_start());
        assert!(!gesture(GestureKind::Pan, GesturePhase::Began).is_user_interaction_start());
    }

    #[test]
    fn test_disabled_recognizer_is_silent() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.enabled = false;
        let events = recognizer.process_input(&touch(TouchEventType::Start, &[(1, 0.0, 0.0)]));
        assert!(events.is_empty());
    }
}
