use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use glam::{EulerRot, Mat4, Quat, Vec3};
use crate::camera::{PerspectiveCamera, DEFAULT_FAR, DEFAULT_FOV_DEGREES, DEFAULT_NEAR};
use crate::core::Viewport;

pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 5.0);
pub const LIGHT_START: Vec3 = Vec3::new(-3.0, 3.0, 10.0);
/// 2^12 texels per side
pub const DEFAULT_SHADOW_MAP_SIZE: u32 = 4096;
pub const FLOOR_SIZE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Box { width: f32, height: f32, depth: f32 },
    /// Lies in the local XY plane, facing +Z
    Plane { width: f32, height: f32 },
}

impl Geometry {
    pub const fn unit_box() -> Self {
        Geometry::Box { width: 1.0, height: 1.0, depth: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Unlit flat colour
    Basic,
    /// Diffuse only
    Lambert,
    /// Diffuse plus specular highlight
    Phong,
    /// Surface normal mapped to RGB
    Normal,
    /// Distance from the camera as greyscale
    Depth,
}

impl MaterialKind {
    /// Identifier understood by the scene shader
    pub fn shader_id(self) -> u32 {
        match self {
            MaterialKind::Basic => 0,
            MaterialKind::Lambert => 1,
            MaterialKind::Phong => 2,
            MaterialKind::Normal => 3,
            MaterialKind::Depth => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    /// `0xRRGGBB`, ignored by the normal and depth materials
    pub color: u32,
    pub wireframe: bool,
    pub side: Side,
    pub shininess: f32,
}

impl Material {
    const fn with_kind(kind: MaterialKind, color: u32) -> Self {
        Self { kind, color, wireframe: false, side: Side::Front, shininess: 30.0 }
    }

    pub const fn basic(color: u32) -> Self {
        Self::with_kind(MaterialKind::Basic, color)
    }

    pub const fn lambert(color: u32) -> Self {
        Self::with_kind(MaterialKind::Lambert, color)
    }

    pub const fn phong(color: u32) -> Self {
        Self::with_kind(MaterialKind::Phong, color)
    }

    pub const fn normal() -> Self {
        Self::with_kind(MaterialKind::Normal, 0xffffff)
    }

    pub const fn depth() -> Self {
        Self::with_kind(MaterialKind::Depth, 0xffffff)
    }

    pub const fn wireframe(mut self) -> Self {
        self.wireframe = true;
        self
    }

    pub const fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: &'static str,
    pub geometry: Geometry,
    pub material: Material,
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z
    pub rotation: Vec3,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(name: &'static str, geometry: Geometry, material: Material) -> Self {
        Self {
            name,
            geometry,
            material,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_rotation_translation(rotation, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: u32,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    /// Depth offset applied when comparing against the shadow map
    pub bias: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
    pub cast_shadow: bool,
    pub shadow: ShadowParams,
}

/// Everything the frame loop reads or mutates.
///
/// Built once by [`SceneState::bootstrap`]; afterwards only the point light
/// and the mesh at `rotating` change from frame to frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    pub viewport: Viewport,
    pub camera: PerspectiveCamera,
    pub ambient: AmbientLight,
    pub point_light: PointLight,
    pub meshes: Vec<Mesh>,
    pub rotating: usize,
}

impl SceneState {
    /// Build the demo scene for a viewport.
    /// An empty viewport leaves the camera at a square aspect until the first resize.
    pub fn bootstrap(viewport: Viewport, shadow_map_size: u32) -> Self {
        let aspect = if viewport.is_empty() { 1.0 } else { viewport.aspect() };
        let mut camera = PerspectiveCamera::new(DEFAULT_FOV_DEGREES, aspect, DEFAULT_NEAR, DEFAULT_FAR);
        camera.position = CAMERA_START;

        let ambient = AmbientLight { color: 0xffffff, intensity: 0.20 };

        let point_light = PointLight {
            color: 0xffffff,
            intensity: 1.0,
            position: LIGHT_START,
            cast_shadow: true,
            shadow: ShadowParams {
                map_size: shadow_map_size,
                near: 0.5,
                far: 500.0,
                bias: 0.0005,
            },
        };

        let meshes = vec![
            Mesh::new("lambert cube", Geometry::unit_box(), Material::lambert(0x5f002f))
                .at(Vec3::new(-2.0, 0.0, 0.0))
                .casting_shadow(),
            Mesh::new("normal cube", Geometry::unit_box(), Material::normal().wireframe())
                .rotated(Vec3::new(FRAC_PI_4, 0.0, 45f32.to_radians()))
                .casting_shadow(),
            Mesh::new("phong cube", Geometry::unit_box(), Material::phong(0x4515f0))
                .at(Vec3::new(2.0, 0.0, 0.0))
                .casting_shadow(),
            Mesh::new(
                "floor",
                Geometry::Plane { width: FLOOR_SIZE, height: FLOOR_SIZE },
                Material::lambert(0x00ff00).double_sided(),
            )
            .at(Vec3::new(0.0, floor_height(), 0.0))
            .rotated(Vec3::new(FRAC_PI_2, 0.0, 0.0))
            .receiving_shadow(),
        ];

        log::info!("Scene bootstrapped: {} meshes, shadow map {}px", meshes.len(), shadow_map_size);

        Self {
            viewport,
            camera,
            ambient,
            point_light,
            meshes,
            rotating: 0,
        }
    }

    /// Resynchronise the camera with a new drawable size.
    /// Returns false when the viewport is empty and nothing changed.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if !self.camera.set_viewport(viewport) {
            return false;
        }
        self.viewport = viewport;
        true
    }

    pub fn rotating_mesh(&self) -> &Mesh {
        &self.meshes[self.rotating]
    }

    pub fn rotating_mesh_mut(&mut self) -> &mut Mesh {
        &mut self.meshes[self.rotating]
    }
}

/// A unit cube spinning about its centre reaches at most this far below it.
/// Placing the floor here lets a vertex graze it without passing through.
pub fn floor_height() -> f32 {
    let face_diagonal = 2f32.sqrt();
    -((face_diagonal * face_diagonal + 1.0).sqrt() / 2.0)
}
