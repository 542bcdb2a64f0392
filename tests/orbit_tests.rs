use cube_scene::camera::PerspectiveCamera;
use cube_scene::core::{Button, Controller};
use cube_scene::orbit::OrbitControls;
use glam::Vec3;

/// A single frame of pointer input
struct Drag {
    buttons: Vec<Button>,
    delta: (f32, f32),
    scroll: f32,
}

impl Drag {
    fn left(dx: f32, dy: f32) -> Self {
        Self { buttons: vec![Button::MouseLeft], delta: (dx, dy), scroll: 0.0 }
    }

    fn right(dx: f32, dy: f32) -> Self {
        Self { buttons: vec![Button::MouseRight], delta: (dx, dy), scroll: 0.0 }
    }

    fn scroll(steps: f32) -> Self {
        Self { buttons: vec![], delta: (0.0, 0.0), scroll: steps }
    }

    fn idle() -> Self {
        Self::scroll(0.0)
    }
}

impl Controller for Drag {
    fn is_down(&self, button: Button) -> bool {
        self.buttons.contains(&button)
    }

    fn pointer_delta(&self) -> (f32, f32) {
        self.delta
    }

    fn scroll_delta(&self) -> f32 {
        self.scroll
    }
}

fn camera() -> PerspectiveCamera {
    let mut camera = PerspectiveCamera::new(75.0, 800.0 / 600.0, 0.1, 1000.0);
    camera.position = Vec3::new(0.0, 0.0, 5.0);
    camera
}

fn damped() -> OrbitControls {
    let mut controls = OrbitControls::new(Vec3::ZERO);
    controls.enable_damping = true;
    controls.damping_factor = 0.25;
    controls
}

fn step(controls: &mut OrbitControls, camera: &mut PerspectiveCamera, input: &Drag) -> bool {
    controls.handle_input(input, camera, 600.0);
    controls.update(camera)
}

#[cfg(test)]
mod orbit_tests {
    use super::*;

    #[test]
    fn test_rotation_keeps_distance_to_target() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera();

        for _ in 0..20 {
            step(&mut controls, &mut camera, &Drag::left(13.0, -4.0));
            assert!((camera.position.length() - 5.0).abs() < 1e-4);
        }
        assert!(camera.position.x.abs() > 0.1);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_damped_motion_converges_after_release() {
        let mut controls = damped();
        let mut camera = camera();

        step(&mut controls, &mut camera, &Drag::left(120.0, 0.0));
        assert!(!controls.is_settled());

        let mut last = camera.position;
        let mut moves = Vec::new();
        for _ in 0..200 {
            step(&mut controls, &mut camera, &Drag::idle());
            moves.push(camera.position.distance(last));
            last = camera.position;
        }

        assert!(controls.is_settled());
        // Each frame after release moves less than the one before
        assert!(moves.windows(2).take(20).all(|w| w[1] <= w[0] + 1e-6));
        assert!(moves.last().copied().unwrap_or(1.0) < 1e-5);
        assert!((camera.position.length() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_damped_total_matches_undamped() {
        let mut free = OrbitControls::new(Vec3::ZERO);
        let mut free_camera = camera();
        step(&mut free, &mut free_camera, &Drag::left(60.0, 0.0));

        let mut smooth = damped();
        let mut smooth_camera = camera();
        step(&mut smooth, &mut smooth_camera, &Drag::left(60.0, 0.0));
        for _ in 0..200 {
            step(&mut smooth, &mut smooth_camera, &Drag::idle());
        }

        assert!((free_camera.position - smooth_camera.position).length() < 1e-3);
    }

    #[test]
    fn test_scroll_dollies_towards_target() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera();

        step(&mut controls, &mut camera, &Drag::scroll(1.0));
        assert!((camera.position.length() - 5.0 * 0.95).abs() < 1e-4);

        step(&mut controls, &mut camera, &Drag::scroll(-2.0));
        assert!(camera.position.length() > 5.0);
    }

    #[test]
    fn test_zoom_can_be_disabled() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_zoom = false;
        let mut camera = camera();

        step(&mut controls, &mut camera, &Drag::scroll(3.0));
        assert!((camera.position.length() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_pan_moves_target_and_camera_together() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera();
        let offset_before = camera.position - controls.target;

        step(&mut controls, &mut camera, &Drag::right(40.0, 0.0));

        assert!(controls.target.x < 0.0);
        let offset_after = camera.position - controls.target;
        assert!((offset_after - offset_before).length() < 1e-4);
        assert_eq!(camera.target, controls.target);
    }
}
