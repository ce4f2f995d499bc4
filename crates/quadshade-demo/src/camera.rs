use quadshade_engine::coords::{Vec2, Viewport};
use quadshade_engine::input::{InputFrame, InputState, Key, MouseButton};

pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 32.0;

/// Zoom multiplier per wheel line.
const ZOOM_STEP: f32 = 1.1;

/// Pan/zoom of the world shown by the fragment shader.
///
/// World position of a screen point `p`:
/// `(p - resolution / 2) / zoom + pan`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportState {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self { pan: Vec2::zero(), zoom: 1.0 }
    }
}

impl ViewportState {
    pub fn screen_to_world(&self, p: Vec2, viewport: Viewport) -> Vec2 {
        let center = Vec2::new(viewport.width, viewport.height) * 0.5;
        (p - center) / self.zoom + self.pan
    }

    /// Drag by `delta` screen pixels; the world follows the pointer.
    pub fn drag(&mut self, delta: Vec2) {
        self.pan -= delta / self.zoom;
    }

    /// Zooms by `ZOOM_STEP^lines`, keeping the world point under `anchor` fixed.
    pub fn zoom_by(&mut self, lines: f32, anchor: Option<Vec2>, viewport: Viewport) {
        if lines == 0.0 {
            return;
        }
        let new_zoom = (self.zoom * ZOOM_STEP.powf(lines)).clamp(MIN_ZOOM, MAX_ZOOM);

        if let Some(p) = anchor {
            let world = self.screen_to_world(p, viewport);
            let center = Vec2::new(viewport.width, viewport.height) * 0.5;
            self.pan = world - (p - center) / new_zoom;
        }
        self.zoom = new_zoom;
    }

    /// Applies this frame's input: left-drag pans, wheel zooms, Home resets.
    pub fn update(&mut self, input: &InputState, frame: &InputFrame, viewport: Viewport) {
        if frame.key_pressed(Key::Home) {
            *self = Self::default();
            return;
        }

        // A press this frame has no drag history yet.
        if input.button_down(MouseButton::Left) && !frame.button_pressed(MouseButton::Left) {
            self.drag(frame.pointer_delta);
        }

        self.zoom_by(frame.wheel_lines, input.pointer_pos, viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadshade_engine::input::{InputEvent, MouseButtonState, MouseWheelDelta, PointerButtonEvent};

    const VP: Viewport = Viewport::new(1200.0, 800.0);

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn drag_moves_pan_against_the_pointer_scaled_by_zoom() {
        let mut cam = ViewportState { pan: Vec2::zero(), zoom: 2.0 };
        cam.drag(Vec2::new(10.0, -4.0));
        assert_eq!(cam.pan, Vec2::new(-5.0, 2.0));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = ViewportState::default();
        cam.zoom_by(1000.0, None, VP);
        assert_eq!(cam.zoom, MAX_ZOOM);
        cam.zoom_by(-5000.0, None, VP);
        assert_eq!(cam.zoom, MIN_ZOOM);
    }

    #[test]
    fn zoom_keeps_the_anchor_fixed() {
        let mut cam = ViewportState { pan: Vec2::new(30.0, -12.0), zoom: 1.5 };
        let anchor = Vec2::new(900.0, 150.0);
        let before = cam.screen_to_world(anchor, VP);
        cam.zoom_by(3.0, Some(anchor), VP);
        assert!((cam.zoom - 1.5 * 1.1f32.powi(3)).abs() < 1e-4);
        assert!(close(cam.screen_to_world(anchor, VP), before));
    }

    #[test]
    fn update_pans_only_while_dragging() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let mut cam = ViewportState::default();

        state.apply_event(&mut frame, InputEvent::PointerMoved(Vec2::new(100.0, 100.0)));
        state.apply_event(&mut frame, InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
            pos: Vec2::new(100.0, 100.0),
        }));
        cam.update(&state, &frame, VP);
        assert_eq!(cam, ViewportState::default());

        frame.clear();
        state.apply_event(&mut frame, InputEvent::PointerMoved(Vec2::new(120.0, 90.0)));
        cam.update(&state, &frame, VP);
        assert_eq!(cam.pan, Vec2::new(-20.0, 10.0));

        frame.clear();
        state.apply_event(&mut frame, InputEvent::MouseWheel(MouseWheelDelta::Line { x: 0.0, y: 1.0 }));
        cam.update(&state, &frame, VP);
        assert!((cam.zoom - 1.1).abs() < 1e-6);
    }

    #[test]
    fn home_resets_the_view() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let mut cam = ViewportState { pan: Vec2::new(5.0, 5.0), zoom: 3.0 };
        state.apply_event(&mut frame, InputEvent::Key {
            key: Key::Home,
            state: quadshade_engine::input::KeyState::Pressed,
            repeat: false,
        });
        cam.update(&state, &frame, VP);
        assert_eq!(cam, ViewportState::default());
    }
}
