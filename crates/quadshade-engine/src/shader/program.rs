use std::borrow::Cow;

use crate::render::{FullscreenQuad, QuadVertex, RenderTarget};

use super::layout::{
    bind_group_layout_entries, palette_format, AgentRecord, ENTRY_POINT, FRAME_BINDING, PALETTE_BINDING,
    PALETTE_WIDTH, POPULATION_BINDING, POPULATION_BYTES, POPULATION_CAPACITY, SAMPLER_BINDING,
};
use super::link::LinkedProgram;
use super::uniforms::UniformBlock;

/// A linked program living on the GPU.
///
/// Owns the render pipeline and every resource bound to it: the frame uniform
/// buffer, the population buffer, the palette texture and its sampler. All of
/// it is released when the program is dropped.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,

    frame_ubo: wgpu::Buffer,
    population_ubo: wgpu::Buffer,
    palette: wgpu::Texture,

    uniforms: UniformBlock,
    uses_population: bool,
}

impl ShaderProgram {
    /// Creates the pipeline for `linked`, rendering into `surface_format`.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        linked: LinkedProgram,
    ) -> Self {
        let (vertex, fragment, uniforms, uses_population) = linked.into_parts();

        let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quadshade vertex stage"),
            source: wgpu::ShaderSource::Naga(Cow::Owned(vertex)),
        });
        let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quadshade fragment stage"),
            source: wgpu::ShaderSource::Naga(Cow::Owned(fragment)),
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quadshade program bgl"),
            entries: &bind_group_layout_entries(),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quadshade program pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quadshade program pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(ENTRY_POINT),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(ENTRY_POINT),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // Stage modules are only needed for pipeline creation.
        drop(vs);
        drop(fs);

        let frame_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quadshade frame ubo"),
            size: uniforms.size().max(16),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let population_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quadshade population ubo"),
            size: POPULATION_BYTES,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let palette = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("quadshade palette"),
            size: wgpu::Extent3d {
                width: PALETTE_WIDTH,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: palette_format(surface_format),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let palette_view = palette.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quadshade palette sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quadshade program bind group"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: FRAME_BINDING,
                    resource: frame_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: POPULATION_BINDING,
                    resource: population_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: PALETTE_BINDING,
                    resource: wgpu::BindingResource::TextureView(&palette_view),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        log::info!(
            "shader program ready ({} uniforms: {})",
            uniforms.members().len(),
            uniforms
                .members()
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self {
            pipeline,
            bind_group,
            frame_ubo,
            population_ubo,
            palette,
            uniforms,
            uses_population,
        }
    }

    /// Staged frame uniforms.
    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.uniforms.set_float(name, value);
    }

    pub fn set_vec2(&mut self, name: &str, value: [f32; 2]) {
        self.uniforms.set_vec2(name, value);
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.uniforms.set_int(name, value);
    }

    /// Uploads the staged uniforms. Call once per frame before [`draw`](Self::draw).
    pub fn flush_uniforms(&self, queue: &wgpu::Queue) {
        if self.uniforms.bytes().is_empty() {
            return;
        }
        queue.write_buffer(&self.frame_ubo, 0, self.uniforms.bytes());
    }

    /// Uploads population records. Records past the buffer capacity are
    /// dropped; nothing is uploaded when no stage reads the buffer.
    pub fn write_population(&self, queue: &wgpu::Queue, agents: &[AgentRecord]) {
        if let Some(agents) = population_upload(agents, self.uses_population) {
            queue.write_buffer(&self.population_ubo, 0, bytemuck::cast_slice(agents));
        }
    }

    /// Uploads the palette as `PALETTE_WIDTH` RGBA8 texels.
    pub fn write_palette(&self, queue: &wgpu::Queue, rgba: &[u8]) {
        let expected = (PALETTE_WIDTH * 4) as usize;
        if rgba.len() != expected {
            log::warn!("palette is {} bytes, expected {expected}; ignored", rgba.len());
            return;
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.palette,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(PALETTE_WIDTH * 4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: PALETTE_WIDTH,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Records the full-screen draw into `target`, on top of its current contents.
    pub fn draw(&self, target: &mut RenderTarget<'_>, quad: &FullscreenQuad) {
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("quadshade program pass"),
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
        rpass.set_bind_group(0, &self.bind_group, &[]);
        quad.draw(&mut rpass);
    }
}

/// The records to upload, or `None` when there is nothing to write.
fn population_upload(agents: &[AgentRecord], uses_population: bool) -> Option<&[AgentRecord]> {
    if !uses_population {
        log::debug!("program does not read the population buffer; {} records skipped", agents.len());
        return None;
    }
    if agents.len() > POPULATION_CAPACITY {
        log::warn!(
            "population has {} records, buffer holds {POPULATION_CAPACITY}; truncating",
            agents.len()
        );
    }
    let agents = &agents[..agents.len().min(POPULATION_CAPACITY)];
    (!agents.is_empty()).then_some(agents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents(n: usize) -> Vec<AgentRecord> {
        (0..n).map(|i| [i as f32, 0.0, 4.0, 0.5]).collect()
    }

    #[test]
    fn population_is_skipped_when_no_stage_reads_it() {
        assert_eq!(population_upload(&agents(3), false), None);
    }

    #[test]
    fn population_is_truncated_to_capacity() {
        let all = agents(POPULATION_CAPACITY + 5);
        let upload = population_upload(&all, true).unwrap();
        assert_eq!(upload.len(), POPULATION_CAPACITY);
        assert_eq!(upload[POPULATION_CAPACITY - 1], all[POPULATION_CAPACITY - 1]);
    }

    #[test]
    fn empty_population_uploads_nothing() {
        assert_eq!(population_upload(&[], true), None);
    }
}
