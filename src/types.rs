use glam::Mat4;

/// Vertex with position and normal
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-frame uniform shared by every draw
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// xyz = position, w = intensity
    pub light_position: [f32; 4],
    /// rgb = linear colour, w = shadow depth bias
    pub light_color: [f32; 4],
    /// rgb = linear colour premultiplied by intensity, w = shadow texel size
    pub ambient: [f32; 4],
    /// x = near, y = far
    pub clip: [f32; 4],
}

/// Per-mesh uniform
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// rgb = linear colour, w = shininess
    pub color: [f32; 4],
    /// x = material id, y = receives shadow
    pub params: [u32; 4],
}

impl ObjectUniform {
    pub fn new(model: Mat4, color: [f32; 3], shininess: f32, material: u32, receive_shadow: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: [color[0], color[1], color[2], shininess],
            params: [material, receive_shadow as u32, 0, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // WGSL uniform layout: sizes must be multiples of 16
    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<GlobalsUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<GlobalsUniform>(), 2 * 64 + 5 * 16);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 2 * 64 + 2 * 16);
    }

    #[test]
    fn test_vertex_layout_stride() {
        assert_eq!(Vertex::layout().array_stride, 24);
    }

    #[test]
    fn test_normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(glam::Vec3::new(2.0, 1.0, 1.0));
        let uniform = ObjectUniform::new(model, [1.0, 1.0, 1.0], 30.0, 1, true);
        let normal = Mat4::from_cols_array_2d(&uniform.normal_matrix);
        assert_eq!(normal.col(0).x, 0.5);
        assert_eq!(uniform.params, [1, 1, 0, 0]);
    }
}
