use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Clip-space vertex of the full-screen quad (attribute location 0, `vec3`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 3],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Two counter-clockwise triangles covering clip space.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { pos: [-1.0, -1.0, 0.0] },
    QuadVertex { pos: [1.0, -1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0, 0.0] },
    QuadVertex { pos: [-1.0, -1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0, 0.0] },
    QuadVertex { pos: [-1.0, 1.0, 0.0] },
];

/// Immutable vertex buffer holding [`QUAD_VERTICES`].
pub struct FullscreenQuad {
    vbo: wgpu::Buffer,
}

impl FullscreenQuad {
    pub fn new(device: &wgpu::Device) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quadshade fullscreen quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self { vbo }
    }

    pub const fn vertex_count(&self) -> u32 {
        QUAD_VERTICES.len() as u32
    }

    /// Binds the quad and issues the single draw call.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.draw(0..self.vertex_count(), 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> f32 {
        0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
    }

    #[test]
    fn quad_is_two_ccw_triangles_covering_clip_space() {
        let mut total = 0.0;
        for tri in QUAD_VERTICES.chunks(3) {
            let area = signed_area(tri[0].pos, tri[1].pos, tri[2].pos);
            assert!(area > 0.0, "triangle must be counter-clockwise");
            total += area;
        }
        assert_eq!(total, 4.0);
    }

    #[test]
    fn vertex_stride_is_three_floats() {
        assert_eq!(QuadVertex::layout().array_stride, 12);
    }
}
