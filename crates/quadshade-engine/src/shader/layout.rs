//! Fixed resource layout shared by every program.
//!
//! All resources live in bind group 0:
//!
//! | binding | GLSL declaration                                  |
//! |---------|---------------------------------------------------|
//! | 0       | `uniform Frame { ... }` (free-form members)       |
//! | 1       | `uniform Population { vec4 agents[N]; }`, N <= 64 |
//! | 2       | `uniform texture2D palette`                       |
//! | 3       | `uniform sampler palette_sampler`                 |

/// Bind group index used for every resource.
pub const BIND_GROUP: u32 = 0;

pub const FRAME_BINDING: u32 = 0;
pub const POPULATION_BINDING: u32 = 1;
pub const PALETTE_BINDING: u32 = 2;
pub const SAMPLER_BINDING: u32 = 3;

/// Maximum number of population records the buffer holds.
pub const POPULATION_CAPACITY: usize = 64;

/// Width in texels of the 1D palette (stored as a `width x 1` 2D texture).
pub const PALETTE_WIDTH: u32 = 256;

/// One population record: `[x, y, radius, hue]`.
pub type AgentRecord = [f32; 4];

/// Size in bytes of the population uniform buffer.
pub const POPULATION_BYTES: u64 = (POPULATION_CAPACITY * std::mem::size_of::<AgentRecord>()) as u64;

/// Entry point name expected in every stage.
pub const ENTRY_POINT: &str = "main";

/// Palette texel format for programs rendering into `surface_format`.
///
/// Palette bytes are display colors. The texture decodes them exactly when
/// the target re-encodes on store, so a sampled texel lands unchanged.
pub(crate) fn palette_format(surface_format: wgpu::TextureFormat) -> wgpu::TextureFormat {
    if surface_format.is_srgb() {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

/// Bind group layout entries matching the table above.
pub(crate) fn bind_group_layout_entries() -> [wgpu::BindGroupLayoutEntry; 4] {
    let visibility = wgpu::ShaderStages::VERTEX_FRAGMENT;
    let uniform = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };

    [
        uniform(FRAME_BINDING),
        uniform(POPULATION_BINDING),
        wgpu::BindGroupLayoutEntry {
            binding: PALETTE_BINDING,
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: SAMPLER_BINDING,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}
