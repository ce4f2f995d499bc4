//! GPU plumbing shared by the overlay renderers.
//!
//! Both overlay renderers draw a unit quad instanced once per shape, with a
//! viewport uniform at binding 0 converting logical pixels to NDC. The pieces
//! here own that common part so each renderer only describes its instance
//! layout and any extra bindings.

use std::marker::PhantomData;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::Viewport;
use crate::render::{RenderCtx, RenderTarget};

/// Smallest instance buffer allocated, in instances.
const MIN_INSTANCE_CAPACITY: usize = 64;

fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: component, alpha: component }
}

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct ViewportUniform {
    viewport: [f32; 2],
    _pad: [f32; 2],
}

impl ViewportUniform {
    fn from_viewport(viewport: Viewport) -> Self {
        Self {
            viewport: [viewport.width.max(1.0), viewport.height.max(1.0)],
            _pad: [0.0; 2],
        }
    }
}

/// Layout entry for the viewport uniform every overlay shader reads at binding 0.
fn viewport_layout_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ViewportUniform>() as u64),
        },
        count: None,
    }
}

// ── unit quad ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct UnitQuadVertex {
    pos: [f32; 2], // 0..1
}

impl UnitQuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<UnitQuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const UNIT_QUAD_VERTICES: [UnitQuadVertex; 4] = [
    UnitQuadVertex { pos: [0.0, 0.0] },
    UnitQuadVertex { pos: [1.0, 0.0] },
    UnitQuadVertex { pos: [1.0, 1.0] },
    UnitQuadVertex { pos: [0.0, 1.0] },
];

const UNIT_QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

// ── overlay pipeline ──────────────────────────────────────────────────────

/// What distinguishes one overlay renderer's pipeline from another.
pub(super) struct OverlayDesc {
    pub label: &'static str,
    pub wgsl: &'static str,
    /// Entries after the viewport uniform (bindings 1..).
    pub extra_entries: &'static [wgpu::BindGroupLayoutEntry],
    pub instance_layout: wgpu::VertexBufferLayout<'static>,
}

/// Pipeline, viewport uniform and unit quad for one surface format.
///
/// The bind group is supplied by the owner through [`bind`](Self::bind)
/// because extra bindings (atlas, sampler) differ per renderer.
pub(super) struct OverlayPipeline {
    format: wgpu::TextureFormat,
    label: &'static str,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    viewport_ubo: wgpu::Buffer,
    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
}

impl OverlayPipeline {
    pub(super) fn new(ctx: &RenderCtx<'_>, desc: &OverlayDesc) -> Self {
        let device = ctx.device;
        let label = desc.label;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(desc.wgsl.into()),
        });

        let entries: Vec<_> = std::iter::once(viewport_layout_entry())
            .chain(desc.extra_entries.iter().cloned())
            .collect();
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[UnitQuadVertex::layout(), desc.instance_layout.clone()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&UNIT_QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&UNIT_QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!("{label}: pipeline built for {:?}", ctx.surface_format);

        Self {
            format: ctx.surface_format,
            label,
            pipeline,
            bind_group_layout,
            bind_group: None,
            viewport_ubo,
            quad_vbo,
            quad_ibo,
        }
    }

    /// Whether this pipeline can render into `format`.
    pub(super) fn matches(&self, format: wgpu::TextureFormat) -> bool {
        self.format == format
    }

    /// Creates the bind group: the viewport uniform plus `extra` (bindings 1..).
    pub(super) fn bind(&mut self, device: &wgpu::Device, extra: &[wgpu::BindGroupEntry<'_>]) {
        let entries: Vec<_> = std::iter::once(wgpu::BindGroupEntry {
            binding: 0,
            resource: self.viewport_ubo.as_entire_binding(),
        })
        .chain(extra.iter().cloned())
        .collect();

        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.label),
            layout: &self.bind_group_layout,
            entries: &entries,
        }));
    }

    /// Uploads the viewport and draws `count` instances from `instances`
    /// over the target's current contents.
    pub(super) fn draw(
        &self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        instances: &wgpu::Buffer,
        count: u32,
    ) {
        let Some(bind_group) = self.bind_group.as_ref() else {
            log::warn!("{}: drawn before bind(); skipped", self.label);
            return;
        };

        let u = ViewportUniform::from_viewport(ctx.viewport);
        ctx.queue.write_buffer(&self.viewport_ubo, 0, bytemuck::bytes_of(&u));

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instances.slice(..));
        rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..UNIT_QUAD_INDICES.len() as u32, 0, 0..count);
    }
}

// ── instance buffer ───────────────────────────────────────────────────────

/// Growable vertex buffer of `T` instances.
pub(super) struct InstanceBuffer<T> {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> InstanceBuffer<T> {
    pub(super) fn new(label: &'static str) -> Self {
        Self { label, buffer: None, capacity: 0, _marker: PhantomData }
    }

    /// Writes `instances`, reallocating when they no longer fit.
    pub(super) fn upload(&mut self, ctx: &RenderCtx<'_>, instances: &[T]) -> &wgpu::Buffer {
        let current = if self.buffer.is_some() { self.capacity } else { 0 };

        let buffer = match (self.buffer.take(), grown_capacity(current, instances.len())) {
            (Some(buffer), None) => buffer,
            (_, cap) => {
                let cap = cap.unwrap_or(MIN_INSTANCE_CAPACITY);
                self.capacity = cap;
                ctx.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(self.label),
                    size: (cap * std::mem::size_of::<T>()) as u64,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            }
        };

        ctx.queue.write_buffer(&buffer, 0, bytemuck::cast_slice(instances));
        self.buffer.insert(buffer)
    }
}

/// New capacity when `required` instances exceed `current`, else `None`.
///
/// Grows to the next power of two, never below [`MIN_INSTANCE_CAPACITY`].
fn grown_capacity(current: usize, required: usize) -> Option<usize> {
    if current > 0 && required <= current {
        return None;
    }
    Some(required.next_power_of_two().max(MIN_INSTANCE_CAPACITY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_grows_by_powers_of_two_from_a_floor() {
        assert_eq!(grown_capacity(0, 0), Some(64));
        assert_eq!(grown_capacity(0, 3), Some(64));
        assert_eq!(grown_capacity(64, 64), None);
        assert_eq!(grown_capacity(64, 65), Some(128));
        assert_eq!(grown_capacity(128, 1000), Some(1024));
    }

    #[test]
    fn viewport_uniform_is_std140_sized_and_never_zero() {
        assert_eq!(std::mem::size_of::<ViewportUniform>(), 16);
        let u = ViewportUniform::from_viewport(Viewport::new(0.0, 600.0));
        assert_eq!(u.viewport, [1.0, 600.0]);
    }

    #[test]
    fn blend_is_premultiplied_over() {
        let b = premul_alpha_blend();
        assert_eq!(b.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(b.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(b.color, b.alpha);
    }
}
