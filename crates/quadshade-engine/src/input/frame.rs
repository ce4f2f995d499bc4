use std::collections::HashSet;

use crate::coords::Vec2;

use super::types::{Key, MouseButton};

/// Per-frame input deltas.
///
/// `InputState` provides the current state (held keys/buttons, pointer position).
/// `InputFrame` provides the presses and motion accumulated since the last frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub keys_pressed: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,

    /// Sum of pointer movement this frame, in logical pixels.
    pub pointer_delta: Vec2,

    /// Sum of vertical wheel movement this frame, in lines.
    pub wheel_lines: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
        self.pointer_delta = Vec2::zero();
        self.wheel_lines = 0.0;
    }

    #[inline]
    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    #[inline]
    pub fn button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }
}
