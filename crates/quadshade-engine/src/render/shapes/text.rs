use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};
use crate::text::FontSystem;

use super::common::{InstanceBuffer, OverlayDesc, OverlayPipeline};

// ── atlas constants ────────────────────────────────────────────────────────

const ATLAS_SIZE: u32 = 1024;
const GLYPH_PADDING: u32 = 1; // pixels between glyphs in the atlas

/// Atlas rectangle of a rasterized glyph, in UV space.
#[derive(Debug, Copy, Clone, PartialEq)]
struct CachedGlyph {
    uv_min: [f32; 2],
    uv_max: [f32; 2],
}

impl CachedGlyph {
    fn at(x: u32, y: u32, w: u32, h: u32) -> Self {
        let size = ATLAS_SIZE as f32;
        Self {
            uv_min: [x as f32 / size, y as f32 / size],
            uv_max: [(x + w) as f32 / size, (y + h) as f32 / size],
        }
    }
}

/// Shelf packer for the glyph atlas. Pure CPU bookkeeping.
#[derive(Debug, Clone, PartialEq)]
struct ShelfPacker {
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    full: bool,
}

impl Default for ShelfPacker {
    fn default() -> Self {
        Self {
            cursor_x: GLYPH_PADDING,
            cursor_y: GLYPH_PADDING,
            row_height: 0,
            full: false,
        }
    }
}

impl ShelfPacker {
    /// Reserves a `w`×`h` cell and returns its top-left corner.
    fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.full {
            return None;
        }

        // Advance to a new shelf row when the glyph doesn't fit horizontally.
        if self.cursor_x + w + GLYPH_PADDING > ATLAS_SIZE {
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.cursor_x = GLYPH_PADDING;
            self.row_height = 0;
        }

        if self.cursor_y + h + GLYPH_PADDING > ATLAS_SIZE {
            log::warn!(
                "TextRenderer: glyph atlas is full ({ATLAS_SIZE}x{ATLAS_SIZE}); \
                 some glyphs will not be rendered"
            );
            self.full = true;
            return None;
        }

        let at = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);
        Some(at)
    }
}

// ── atlas ─────────────────────────────────────────────────────────────────

/// R8 coverage atlas filled on demand. Glyphs live for the renderer's lifetime.
struct GlyphAtlas {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    packer: ShelfPacker,
    cache: HashMap<GlyphRasterConfig, CachedGlyph>,
}

impl GlyphAtlas {
    fn new(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("quadshade glyph atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quadshade glyph sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            texture,
            sampler,
            packer: ShelfPacker::default(),
            cache: HashMap::new(),
        }
    }

    /// Returns the cached glyph for `key`, rasterizing and uploading it first
    /// if needed. `None` for blank glyphs or when the atlas is full.
    fn glyph(
        &mut self,
        queue: &wgpu::Queue,
        font: &fontdue::Font,
        key: GlyphRasterConfig,
    ) -> Option<CachedGlyph> {
        if let Some(hit) = self.cache.get(&key) {
            return Some(*hit);
        }

        let (metrics, bitmap) = font.rasterize_config(key);
        let (w, h) = (metrics.width as u32, metrics.height as u32);
        if w == 0 || h == 0 {
            return None;
        }
        let (x, y) = self.packer.place(w, h)?;

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            &bitmap,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );

        let glyph = CachedGlyph::at(x, y, w, h);
        self.cache.insert(key, glyph);
        Some(glyph)
    }
}

/// Atlas texture (1) and its sampler (2), after the viewport uniform.
const ATLAS_ENTRIES: &[wgpu::BindGroupLayoutEntry] = &[
    wgpu::BindGroupLayoutEntry {
        binding: 1,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    },
    wgpu::BindGroupLayoutEntry {
        binding: 2,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    },
];

// ── renderer ──────────────────────────────────────────────────────────────

/// Renderer for `DrawCmd::Text`.
///
/// Glyphs are rasterized with fontdue at physical pixel size on first use.
/// The cache key is `GlyphRasterConfig` (font, glyph, px), so a HUD line that
/// only changes its digits rasterizes nothing new after the first few frames.
pub struct TextRenderer {
    atlas: Option<GlyphAtlas>,
    pipeline: Option<OverlayPipeline>,
    instances: InstanceBuffer<GlyphInstance>,
    layout: Layout<()>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            atlas: None,
            pipeline: None,
            instances: InstanceBuffer::new("quadshade text instances"),
            layout: Layout::new(CoordinateSystem::PositiveYDown),
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders all `DrawCmd::Text` entries in `draw_list`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &DrawList,
        font_system: &FontSystem,
    ) {
        if !draw_list.iter().any(|c| matches!(c, DrawCmd::Text(_))) {
            return;
        }

        let atlas = self.atlas.get_or_insert_with(|| GlyphAtlas::new(ctx.device));
        let scale = ctx.scale_factor.max(0.01);
        let mut instances = Vec::new();

        for cmd in draw_list.iter() {
            let DrawCmd::Text(cmd) = cmd else { continue };
            let Some(font) = font_system.get(cmd.font) else {
                log::warn!("TextRenderer: unknown FontId {:?}, skipping", cmd.font);
                continue;
            };
            let color = [cmd.color.r, cmd.color.g, cmd.color.b, cmd.color.a];

            // Physical pixels, pen snapped so glyphs land on texel centers.
            self.layout.reset(&LayoutSettings {
                x: (cmd.origin.x * scale).round(),
                y: (cmd.origin.y * scale).round(),
                ..LayoutSettings::default()
            });
            self.layout.append(&[font], &TextStyle::new(&cmd.text, cmd.size * scale, 0));

            for g in self.layout.glyphs() {
                if !g.char_data.rasterize() || g.width == 0 || g.height == 0 {
                    continue;
                }
                let Some(cached) = atlas.glyph(ctx.queue, font, g.key) else { continue };

                instances.push(GlyphInstance {
                    dst_min: [g.x / scale, g.y / scale],
                    dst_max: [(g.x + g.width as f32) / scale, (g.y + g.height as f32) / scale],
                    uv_min: cached.uv_min,
                    uv_max: cached.uv_max,
                    color,
                });
            }
        }

        if instances.is_empty() {
            return;
        }

        if !self.pipeline.as_ref().is_some_and(|p| p.matches(ctx.surface_format)) {
            let mut pipeline = OverlayPipeline::new(
                ctx,
                &OverlayDesc {
                    label: "quadshade text",
                    wgsl: include_str!("shaders/text.wgsl"),
                    extra_entries: ATLAS_ENTRIES,
                    instance_layout: GlyphInstance::layout(),
                },
            );
            pipeline.bind(
                ctx.device,
                &[
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&atlas.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                    },
                ],
            );
            self.pipeline = Some(pipeline);
        }
        let Some(pipeline) = self.pipeline.as_ref() else { return };

        let buffer = self.instances.upload(ctx, &instances);
        pipeline.draw(ctx, target, buffer, instances.len() as u32);
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (48 bytes):
///
///  offset  0  dst_min  [f32; 2]   loc 1
///  offset  8  dst_max  [f32; 2]   loc 2
///  offset 16  uv_min   [f32; 2]   loc 3
///  offset 24  uv_max   [f32; 2]   loc 4
///  offset 32  color    [f32; 4]   loc 5
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    color: [f32; 4],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2, // dst_min
        2 => Float32x2, // dst_max
        3 => Float32x2, // uv_min
        4 => Float32x2, // uv_max
        5 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_instance_is_48_bytes() {
        assert_eq!(std::mem::size_of::<GlyphInstance>(), 48);
    }

    #[test]
    fn packer_fills_a_row_then_wraps() {
        let mut p = ShelfPacker::default();
        assert_eq!(p.place(10, 12), Some((1, 1)));
        assert_eq!(p.place(10, 8), Some((12, 1)));

        // Too wide for what is left of the row.
        let wide = ATLAS_SIZE - 20;
        assert_eq!(p.place(wide, 4), Some((1, 14)));
    }

    #[test]
    fn cached_glyph_uvs_cover_the_placed_cell() {
        let g = CachedGlyph::at(256, 512, 128, 64);
        assert_eq!(g.uv_min, [0.25, 0.5]);
        assert_eq!(g.uv_max, [0.375, 0.5625]);
    }

    #[test]
    fn packer_reports_full_atlas_once_and_stays_full() {
        let mut p = ShelfPacker::default();
        assert_eq!(p.place(4, ATLAS_SIZE), None);
        assert!(p.full);
        assert_eq!(p.place(1, 1), None);
    }
}
