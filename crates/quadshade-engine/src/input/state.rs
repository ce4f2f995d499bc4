use std::collections::HashSet;

use crate::coords::Vec2;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState, PointerButtonEvent};

/// Current input state for the window.
///
/// Holds "is down" information and current pointer position.
/// Per-frame transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,

    /// Pointer position in logical pixels; `None` while outside the window.
    pub pointer_pos: Option<Vec2>,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies an input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoid stuck keys/buttons when focus changes mid-press.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved(pos) => {
                if let Some(prev) = self.pointer_pos {
                    frame.pointer_delta += *pos - prev;
                }
                self.pointer_pos = Some(*pos);
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    self.keys_down.remove(key);
                }
            },

            InputEvent::PointerButton(PointerButtonEvent { button, state, pos }) => {
                self.pointer_pos = Some(*pos);

                match state {
                    MouseButtonState::Pressed => {
                        if self.buttons_down.insert(*button) {
                            frame.buttons_pressed.insert(*button);
                        }
                    }
                    MouseButtonState::Released => {
                        self.buttons_down.remove(button);
                    }
                }
            }

            InputEvent::MouseWheel(delta) => {
                frame.wheel_lines += delta.lines_y();
            }
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseWheelDelta;

    fn press(button: MouseButton, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button,
            state: MouseButtonState::Pressed,
            pos: Vec2::new(x, y),
        })
    }

    #[test]
    fn pointer_delta_accumulates_from_known_position() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        // First sample after entering has no predecessor.
        state.apply_event(&mut frame, InputEvent::PointerMoved(Vec2::new(10.0, 10.0)));
        state.apply_event(&mut frame, InputEvent::PointerMoved(Vec2::new(15.0, 8.0)));
        state.apply_event(&mut frame, InputEvent::PointerMoved(Vec2::new(20.0, 4.0)));

        assert_eq!(frame.pointer_delta, Vec2::new(10.0, -6.0));
        assert_eq!(state.pointer_pos, Some(Vec2::new(20.0, 4.0)));

        state.apply_event(&mut frame, InputEvent::PointerLeft);
        assert_eq!(state.pointer_pos, None);
    }

    #[test]
    fn press_and_release_record_transitions_once() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, press(MouseButton::Left, 1.0, 2.0));
        state.apply_event(&mut frame, press(MouseButton::Left, 1.0, 2.0));
        assert!(frame.button_pressed(MouseButton::Left));
        assert!(state.button_down(MouseButton::Left));
        assert_eq!(frame.buttons_pressed.len(), 1);

        let esc = |s| InputEvent::Key { key: Key::Escape, state: s, repeat: false };
        state.apply_event(&mut frame, esc(KeyState::Pressed));
        state.apply_event(&mut frame, esc(KeyState::Released));
        assert!(frame.key_pressed(Key::Escape));
        assert!(!state.key_down(Key::Escape));

        // A key pressed again in the same frame is still one transition.
        state.apply_event(&mut frame, esc(KeyState::Pressed));
        assert_eq!(frame.keys_pressed.len(), 1);
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, press(MouseButton::Left, 0.0, 0.0));
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(!state.button_down(MouseButton::Left));
    }

    #[test]
    fn wheel_sums_lines_and_pixels() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::MouseWheel(MouseWheelDelta::Line { x: 0.0, y: 1.0 }));
        state.apply_event(&mut frame, InputEvent::MouseWheel(MouseWheelDelta::Pixel { x: 0.0, y: -20.0 }));
        assert_eq!(frame.wheel_lines, 0.5);

        frame.clear();
        assert_eq!(frame.wheel_lines, 0.0);
        assert!(frame.keys_pressed.is_empty());
    }
}
