//! Raw pointer and keyboard input tracking.

use crate::viewport::ScreenPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: ScreenPoint,
        button: MouseButton,
    },
    Up {
        position: ScreenPoint,
        button: MouseButton,
    },
    Move {
        position: ScreenPoint,
    },
}

impl PointerEvent {
    pub fn position(&self) -> ScreenPoint {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position } => position,
        }
    }
}

/// Keyboard event, keyed by key name (e.g. `"Space"`, `"Alt"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Tracks the live pointer and keyboard state between events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last known pointer position.
    pub pointer_position: ScreenPoint,
    /// Currently pressed mouse buttons.
    pressed_buttons: HashSet<MouseButton>,
    /// Currently pressed keys, lowercased.
    pressed_keys: HashSet<String>,
    /// Last click time for double-click detection.
    last_click_time: Option<Instant>,
    /// Last click position for double-click detection.
    last_click_position: Option<ScreenPoint>,
    /// Whether the most recent pointer-down completed a double-click.
    double_click_detected: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = position;
                self.pressed_buttons.insert(button);
                self.double_click_detected = false;

                if button == MouseButton::Left {
                    self.register_click(position);
                }
            }
            PointerEvent::Up { position, button } => {
                self.pointer_position = position;
                self.pressed_buttons.remove(&button);
            }
            PointerEvent::Move { position } => {
                self.pointer_position = position;
            }
        }
    }

    fn register_click(&mut self, position: ScreenPoint) {
        let now = Instant::now();
        if let (Some(last_time), Some(last_pos)) = (self.last_click_time, self.last_click_position) {
            let elapsed = now.duration_since(last_time).as_millis();
            let distance = position.0.distance(last_pos.0);
            if elapsed < DOUBLE_CLICK_TIME_MS && distance < DOUBLE_CLICK_DISTANCE {
                self.double_click_detected = true;
                // Reset so a third click starts a new pair.
                self.last_click_time = None;
                self.last_click_position = None;
                return;
            }
        }
        self.last_click_time = Some(now);
        self.last_click_position = Some(position);
    }

    /// Process a key event.
    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        match event {
            KeyEvent::Pressed(key) => {
                self.pressed_keys.insert(key.to_ascii_lowercase());
            }
            KeyEvent::Released(key) => {
                self.pressed_keys.remove(&key.to_ascii_lowercase());
            }
        }
    }

    /// Forget every held key and button, e.g. after the window lost focus.
    pub fn release_all(&mut self) {
        self.pressed_buttons.clear();
        self.pressed_keys.clear();
        self.last_click_time = None;
        self.last_click_position = None;
        self.double_click_detected = false;
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Key names compare case-insensitively.
    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(&key.to_ascii_lowercase())
    }

    /// Whether the last pointer-down was the second click of a double-click.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }
}
