use std::collections::HashSet;
use glam::Vec3;
use crate::scene::Geometry;
use crate::types::Vertex;

/// Triangles plus the line list used to draw them as wireframe
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
    pub edges: Vec<u16>,
}

impl MeshData {
    pub fn from_geometry(geometry: &Geometry) -> Self {
        match *geometry {
            Geometry::Box { width, height, depth } => box_mesh(Vec3::new(width, height, depth)),
            Geometry::Plane { width, height } => plane_mesh(width, height),
        }
    }
}

/// (normal, u, v) per face with u × v = normal, so corners wind counter-clockwise
const BOX_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

fn box_mesh(size: Vec3) -> MeshData {
    let half = size * 0.5;
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in BOX_FACES {
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner = (normal + u * su + v * sv) * half;
            vertices.push(Vertex {
                position: corner.to_array(),
                normal: normal.to_array(),
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let edges = wireframe_edges(&indices);
    MeshData { vertices, indices, edges }
}

fn plane_mesh(width: f32, height: f32) -> MeshData {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let vertices = [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)]
        .map(|(x, y)| Vertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
        })
        .to_vec();
    let indices = vec![0, 1, 2, 0, 2, 3];
    let edges = wireframe_edges(&indices);
    MeshData { vertices, indices, edges }
}

/// Every triangle edge once, as pairs for a line list
pub fn wireframe_edges(indices: &[u16]) -> Vec<u16> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for triangle in indices.chunks_exact(3) {
        for (a, b) in [(triangle[0], triangle[1]), (triangle[1], triangle[2]), (triangle[2], triangle[0])] {
            if seen.insert((a.min(b), a.max(b))) {
                edges.extend_from_slice(&[a, b]);
            }
        }
    }
    edges
}
