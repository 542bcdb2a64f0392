use glam::Vec3;
use crate::core::Controller;
use crate::frame::FrameInfo;
use crate::orbit::OrbitControls;
use crate::scene::{Mesh, PointLight, SceneState};

/// Wall-clock milliseconds to animation time
pub const TIME_SCALE: f64 = 0.0005;
/// Angular frequency of the light path, per unit of animation time
pub const LIGHT_FREQUENCY: f64 = 0.7;
pub const LIGHT_AMPLITUDE: f32 = 20.0;
/// Centre of the light path on X
pub const LIGHT_X_CENTER: f32 = -2.0;
pub const INTENSITY_GAIN: f32 = 0.08;
pub const INTENSITY_FLOOR: f32 = 0.2;
/// Radians added to the rotating mesh's X and Y angles each frame
pub const ROTATION_STEP: f32 = 0.01;

/// Brightest the point light gets
pub const MAX_INTENSITY: f32 = LIGHT_AMPLITUDE * INTENSITY_GAIN + INTENSITY_FLOOR;

/// Light placement for one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub x: f32,
    pub z: f32,
    pub intensity: f32,
}

/// Light placement at scaled animation time `t`.
///
/// Phases are computed in f64: epoch milliseconds scaled by `TIME_SCALE`
/// are around 1e9 and f32 would lose the whole fractional part.
pub fn light_sample_at(t: f64) -> LightSample {
    let phase = t * LIGHT_FREQUENCY;
    let value = (phase.sin() * LIGHT_AMPLITUDE as f64) as f32;
    let other = (phase.cos() * LIGHT_AMPLITUDE as f64) as f32;

    LightSample {
        x: LIGHT_X_CENTER + value,
        z: other + value,
        intensity: (value * INTENSITY_GAIN).abs() + INTENSITY_FLOOR,
    }
}

/// Light placement for a wall-clock timestamp in milliseconds
pub fn light_sample(timestamp_ms: i64) -> LightSample {
    light_sample_at(timestamp_ms as f64 * TIME_SCALE)
}

/// Move the light along its path. The height is left alone.
pub fn update_light(light: &mut PointLight, timestamp_ms: i64) {
    let sample = light_sample(timestamp_ms);
    light.position = Vec3::new(sample.x, light.position.y, sample.z);
    light.intensity = sample.intensity;
}

/// Advance the spinning mesh by one frame
pub fn spin(mesh: &mut Mesh) {
    mesh.rotation.x += ROTATION_STEP;
    mesh.rotation.y += ROTATION_STEP;
}

/// Scene changes for one frame: light path and spin, without input or drawing.
/// A pure function of the previous state and the frame timestamp.
pub fn advance(scene: &mut SceneState, frame: &FrameInfo) {
    update_light(&mut scene.point_light, frame.timestamp_ms);
    spin(scene.rotating_mesh_mut());
}

/// Something that can draw the scene as it stands
pub trait SceneRenderer {
    type Error;

    fn draw(&mut self, scene: &SceneState) -> Result<(), Self::Error>;
}

/// Runs one frame: controls, light, spin, draw, in that order
#[derive(Debug, Clone)]
pub struct FrameDriver {
    controls: OrbitControls,
}

impl FrameDriver {
    pub fn new(controls: OrbitControls) -> Self {
        Self { controls }
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn frame<R: SceneRenderer>(
        &mut self,
        scene: &mut SceneState,
        frame: &FrameInfo,
        controller: &dyn Controller,
        renderer: &mut R,
    ) -> Result<(), R::Error> {
        let height = scene.viewport.height as f32;
        self.controls.handle_input(controller, &scene.camera, height);
        self.controls.update(&mut scene.camera);

        advance(scene, frame);

        renderer.draw(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_light_at_time_zero() {
        let sample = light_sample_at(0.0);
        assert_eq!(sample.x, LIGHT_X_CENTER);
        assert_eq!(sample.z, LIGHT_AMPLITUDE);
        assert_eq!(sample.intensity, INTENSITY_FLOOR);
    }

    #[test]
    fn test_light_at_quarter_period() {
        // sin = 1, cos = 0
        let sample = light_sample_at(PI / 2.0 / LIGHT_FREQUENCY);
        assert!((sample.x - 18.0).abs() < 1e-4);
        assert!((sample.z - 20.0).abs() < 1e-4);
        assert!((sample.intensity - MAX_INTENSITY).abs() < 1e-5);
    }

    #[test]
    fn test_max_intensity_constant() {
        assert!((MAX_INTENSITY - 1.8).abs() < 1e-6);
    }

    #[test]
    fn test_light_sample_scales_milliseconds() {
        let from_millis = light_sample(2_000);
        let direct = light_sample_at(1.0);
        assert!((from_millis.x - direct.x).abs() < 1e-5);
        assert!((from_millis.z - direct.z).abs() < 1e-5);
        assert!((from_millis.intensity - direct.intensity).abs() < 1e-6);
    }

    #[test]
    fn test_update_light_keeps_height() {
        let mut light = PointLight {
            color: 0xffffff,
            intensity: 1.0,
            position: Vec3::new(-3.0, 3.0, 10.0),
            cast_shadow: true,
            shadow: crate::scene::ShadowParams { map_size: 16, near: 0.5, far: 500.0, bias: 0.0 },
        };
        update_light(&mut light, 0);
        assert_eq!(light.position, Vec3::new(-2.0, 3.0, 20.0));
        assert_eq!(light.intensity, 0.2);
    }
}
