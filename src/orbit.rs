use std::f32::consts::TAU;
use glam::Vec3;
use crate::camera::PerspectiveCamera;
use crate::core::{Button, Controller};

/// Keeps the polar angle off the poles so `look_at` never degenerates
const POLAR_EPSILON: f32 = 1e-6;
/// Residual motion below this is treated as settled
const SETTLE_EPSILON: f32 = 1e-6;

/// Position on a sphere around the orbit target (Y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Polar angle measured from +Y
    pub phi: f32,
    /// Azimuth around +Y, measured from +Z
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self { radius: 0.0, phi: 0.0, theta: 0.0 };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(&self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit, dolly and pan the camera around a target point.
///
/// Input only accumulates deltas; `update` applies them to the camera.
/// With damping enabled each update consumes `damping_factor` of the
/// pending motion and carries the rest into later frames, so the camera
/// glides to a stop after the pointer is released.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_zoom: bool,
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    spherical_delta: Spherical,
    pan_offset: Vec3,
    scale: f32,
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enable_damping: false,
            damping_factor: 0.05,
            enable_zoom: true,
            enable_rotate: true,
            enable_pan: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical_delta: Spherical { radius: 0.0, phi: 0.0, theta: 0.0 },
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    /// Queue a rotation around the target, in radians
    pub fn rotate(&mut self, azimuth: f32, polar: f32) {
        self.spherical_delta.theta -= azimuth;
        self.spherical_delta.phi -= polar;
    }

    /// Queue a dolly; positive steps move towards the target
    pub fn dolly(&mut self, steps: f32) {
        self.scale *= self.zoom_scale().powf(steps);
    }

    /// Queue a pan of the target in world units
    pub fn pan(&mut self, offset: Vec3) {
        self.pan_offset += offset;
    }

    /// Translate the frame's pointer input into pending motion.
    /// `viewport_height` is in the same pixels as the pointer deltas.
    pub fn handle_input(
        &mut self,
        controller: &dyn Controller,
        camera: &PerspectiveCamera,
        viewport_height: f32,
    ) {
        if viewport_height <= 0.0 {
            return;
        }
        let (dx, dy) = controller.pointer_delta();
        let panning = controller.is_down(Button::MouseRight)
            || controller.is_down(Button::MouseMiddle)
            || (controller.is_down(Button::MouseLeft) && controller.is_down(Button::Shift));

        if panning {
            if self.enable_pan {
                self.pan_by_pixels(dx, dy, camera, viewport_height);
            }
        } else if controller.is_down(Button::MouseLeft) && self.enable_rotate {
            self.rotate(
                TAU * dx / viewport_height * self.rotate_speed,
                TAU * dy / viewport_height * self.rotate_speed,
            );
        }

        let scroll = controller.scroll_delta();
        if self.enable_zoom && scroll != 0.0 {
            self.dolly(scroll);
        }
    }

    /// Apply pending motion to the camera. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        let factor = if self.enable_damping { self.damping_factor } else { 1.0 };
        spherical.theta += self.spherical_delta.theta * factor;
        spherical.phi += self.spherical_delta.phi * factor;
        spherical.phi = spherical.phi.clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * factor;

        let new_position = self.target + spherical.to_offset();
        let moved = camera.position.distance_squared(new_position) > SETTLE_EPSILON * SETTLE_EPSILON
            || camera.target != self.target;

        camera.position = new_position;
        camera.target = self.target;

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= keep;
            self.spherical_delta.phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.spherical_delta.theta = 0.0;
            self.spherical_delta.phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        moved
    }

    /// True once no rotation or pan is pending
    pub fn is_settled(&self) -> bool {
        self.spherical_delta.theta.abs() < SETTLE_EPSILON
            && self.spherical_delta.phi.abs() < SETTLE_EPSILON
            && self.pan_offset.length() < SETTLE_EPSILON
            && self.scale == 1.0
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    fn pan_by_pixels(&mut self, dx: f32, dy: f32, camera: &PerspectiveCamera, viewport_height: f32) {
        // Half the visible height at the target's distance
        let target_distance =
            (camera.position - self.target).length() * (camera.fov.to_radians() * 0.5).tan();
        let right = camera.right();
        let up = right.cross(camera.forward()).normalize_or_zero();

        let left_amount = 2.0 * dx * target_distance / viewport_height * self.pan_speed;
        let up_amount = 2.0 * dy * target_distance / viewport_height * self.pan_speed;
        self.pan(-right * left_amount + up * up_amount);
    }
}
