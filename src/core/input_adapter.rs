use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};

/// Pixel-precise scroll devices report in pixels; this many make one wheel step.
const PIXELS_PER_SCROLL_STEP: f32 = 50.0;

/// Adapter that bridges Winit events to the Controller trait
#[derive(Debug, Clone)]
pub struct WinitController {
    /// Currently pressed buttons
    pressed_keys: HashSet<Button>,
    /// Current cursor position (relative to window)
    cursor_position: Option<(f32, f32)>,
    /// Cursor movement since last reset
    pointer_delta: (f32, f32),
    /// Wheel steps since last reset
    scroll_delta: f32,
}

impl WinitController {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            cursor_position: None,
            pointer_delta: (0.0, 0.0),
            scroll_delta: 0.0,
        }
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if let Some(button) = Self::keycode_to_button(keycode) {
                        self.set_state(button, event.state);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(btn) = Self::mouse_button_to_button(*button) {
                    self.set_state(btn, *state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_position = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_SCROLL_STEP,
                };
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    /// Feed an event the overlay has already seen. Presses and wheel input
    /// the overlay consumed are dropped; releases, cursor motion and focus
    /// changes always get through.
    pub fn offer_event(&mut self, event: &WindowEvent, overlay_consumed: bool) {
        if !overlay_consumed || Self::passes_overlay(event) {
            self.process_event(event);
        }
    }

    fn passes_overlay(event: &WindowEvent) -> bool {
        matches!(
            event,
            WindowEvent::MouseInput { state: ElementState::Released, .. }
                | WindowEvent::CursorMoved { .. }
                | WindowEvent::CursorLeft { .. }
                | WindowEvent::Focused(_)
        )
    }

    /// Reset per-frame state (pointer and scroll deltas)
    /// Call this at the end of each frame after the controls consumed it
    pub fn reset_deltas(&mut self) {
        self.pointer_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }

    pub fn cursor_position(&self) -> Option<(f32, f32)> {
        self.cursor_position
    }

    fn move_cursor(&mut self, x: f32, y: f32) {
        if let Some((old_x, old_y)) = self.cursor_position {
            self.pointer_delta.0 += x - old_x;
            self.pointer_delta.1 += y - old_y;
        }
        self.cursor_position = Some((x, y));
    }

    fn set_state(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed_keys.insert(button);
            }
            ElementState::Released => {
                self.pressed_keys.remove(&button);
            }
        }
    }

    fn release_all(&mut self) {
        self.pressed_keys.clear();
    }

    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Shift),
            _ => None,
        }
    }

    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::MouseLeft),
            MouseButton::Middle => Some(Button::MouseMiddle),
            MouseButton::Right => Some(Button::MouseRight),
            _ => None,
        }
    }
}

impl Default for WinitController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn pointer_delta(&self) -> (f32, f32) {
        self.pointer_delta
    }

    fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, TouchPhase};

    fn device() -> DeviceId {
        // SAFETY: only compared, never handed back to the platform
        unsafe { DeviceId::dummy() }
    }

    fn left_button(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput { device_id: device(), state, button: MouseButton::Left }
    }

    fn wheel(steps: f32) -> WindowEvent {
        WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, steps),
            phase: TouchPhase::Moved,
        }
    }

    fn cursor(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved { device_id: device(), position: PhysicalPosition::new(x, y) }
    }

    #[test]
    fn test_new_controller_empty() {
        let controller = WinitController::new();
        assert!(!controller.is_down(Button::MouseLeft));
        assert_eq!(controller.cursor_position(), None);
        assert_eq!(controller.pointer_delta(), (0.0, 0.0));
        assert_eq!(controller.scroll_delta(), 0.0);
    }

    #[test]
    fn test_first_cursor_sample_has_no_delta() {
        let mut controller = WinitController::new();
        controller.move_cursor(100.0, 100.0);
        assert_eq!(controller.pointer_delta(), (0.0, 0.0));

        controller.move_cursor(110.0, 95.0);
        controller.move_cursor(115.0, 90.0);
        assert_eq!(controller.pointer_delta(), (15.0, -10.0));
    }

    #[test]
    fn test_delta_reset_keeps_position() {
        let mut controller = WinitController::new();
        controller.move_cursor(0.0, 0.0);
        controller.move_cursor(10.0, 5.0);
        controller.scroll_delta = 2.0;

        controller.reset_deltas();
        assert_eq!(controller.pointer_delta(), (0.0, 0.0));
        assert_eq!(controller.scroll_delta(), 0.0);
        assert_eq!(controller.cursor_position(), Some((10.0, 5.0)));
    }

    #[test]
    fn test_press_and_release() {
        let mut controller = WinitController::new();
        controller.set_state(Button::MouseLeft, ElementState::Pressed);
        controller.set_state(Button::MouseLeft, ElementState::Pressed);
        assert!(controller.is_down(Button::MouseLeft));

        controller.set_state(Button::MouseLeft, ElementState::Released);
        assert!(!controller.is_down(Button::MouseLeft));
    }

    #[test]
    fn test_focus_loss_releases_buttons() {
        let mut controller = WinitController::new();
        controller.set_state(Button::MouseRight, ElementState::Pressed);
        controller.process_event(&WindowEvent::Focused(false));
        assert!(!controller.is_down(Button::MouseRight));
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(WinitController::mouse_button_to_button(MouseButton::Left), Some(Button::MouseLeft));
        assert_eq!(WinitController::mouse_button_to_button(MouseButton::Back), None);
        assert_eq!(WinitController::keycode_to_button(KeyCode::ShiftRight), Some(Button::Shift));
        assert_eq!(WinitController::keycode_to_button(KeyCode::Escape), None);
    }

    #[test]
    fn test_release_over_overlay_ends_drag() {
        let mut controller = WinitController::new();
        controller.offer_event(&left_button(ElementState::Pressed), false);
        controller.offer_event(&cursor(100.0, 100.0), false);
        controller.offer_event(&cursor(140.0, 100.0), true);
        assert!(controller.is_down(Button::MouseLeft));
        assert_eq!(controller.pointer_delta(), (40.0, 0.0));

        controller.offer_event(&left_button(ElementState::Released), true);
        assert!(!controller.is_down(Button::MouseLeft));
    }

    #[test]
    fn test_overlay_keeps_its_presses_and_wheel() {
        let mut controller = WinitController::new();
        controller.offer_event(&left_button(ElementState::Pressed), true);
        controller.offer_event(&wheel(2.0), true);
        assert!(!controller.is_down(Button::MouseLeft));
        assert_eq!(controller.scroll_delta(), 0.0);

        controller.offer_event(&wheel(2.0), false);
        assert_eq!(controller.scroll_delta(), 2.0);
    }

    #[test]
    fn test_focus_loss_behind_overlay_releases_buttons() {
        let mut controller = WinitController::new();
        controller.offer_event(&left_button(ElementState::Pressed), false);
        controller.offer_event(&WindowEvent::Focused(false), true);
        assert!(!controller.is_down(Button::MouseLeft));
    }
}
