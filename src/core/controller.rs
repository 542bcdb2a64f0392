/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    MouseLeft,
    MouseMiddle,
    MouseRight,
    Shift,
}

/// Controller - pointer and button state as seen by the camera controls
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Pointer movement in physical pixels since the last reset
    fn pointer_delta(&self) -> (f32, f32);

    /// Scroll wheel steps since the last reset (positive = away from the user)
    fn scroll_delta(&self) -> f32;
}
