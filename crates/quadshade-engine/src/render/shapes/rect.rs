use bytemuck::{Pod, Zeroable};

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::shapes::RectCmd;
use crate::scene::{DrawCmd, DrawList};

use super::common::{InstanceBuffer, OverlayDesc, OverlayPipeline};

/// Solid rectangle renderer for the overlay.
///
/// Rects arrive in logical pixels with premultiplied colors and are drawn as
/// one instanced call in list order.
pub struct RectRenderer {
    pipeline: Option<OverlayPipeline>,
    instances: InstanceBuffer<RectInstance>,
}

impl Default for RectRenderer {
    fn default() -> Self {
        Self {
            pipeline: None,
            instances: InstanceBuffer::new("quadshade rect instances"),
        }
    }
}

impl RectRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders every `DrawCmd::Rect` in `draw_list` into `target`, in list order.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, draw_list: &DrawList) {
        let instances = collect_instances(draw_list);
        if instances.is_empty() {
            return;
        }

        if !self.pipeline.as_ref().is_some_and(|p| p.matches(ctx.surface_format)) {
            let mut pipeline = OverlayPipeline::new(
                ctx,
                &OverlayDesc {
                    label: "quadshade rect",
                    wgsl: include_str!("shaders/rect.wgsl"),
                    extra_entries: &[],
                    instance_layout: RectInstance::layout(),
                },
            );
            pipeline.bind(ctx.device, &[]);
            self.pipeline = Some(pipeline);
        }
        let Some(pipeline) = self.pipeline.as_ref() else { return };

        let buffer = self.instances.upload(ctx, &instances);
        pipeline.draw(ctx, target, buffer, instances.len() as u32);
    }
}

/// Builds one instance per non-empty rect, in paint order.
fn collect_instances(draw_list: &DrawList) -> Vec<RectInstance> {
    draw_list
        .iter()
        .filter_map(|cmd| match cmd {
            DrawCmd::Rect(RectCmd { rect, color }) => {
                let r = rect.normalized();
                (!r.is_empty()).then(|| RectInstance {
                    origin: [r.origin.x, r.origin.y],
                    size: [r.size.x, r.size.y],
                    color: [color.r, color.g, color.b, color.a],
                })
            }
            _ => None,
        })
        .collect()
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct RectInstance {
    origin: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
}

impl RectInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RectInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Rect, Vec2};
    use crate::paint::Color;
    use crate::text::FontId;

    #[test]
    fn collects_rects_in_order_and_skips_empty_and_text() {
        let mut list = DrawList::new();
        list.push_solid_rect(Rect::new(10.0, 20.0, 30.0, 40.0), Color::from_straight(1.0, 0.0, 0.0, 1.0));
        list.push_text("x", FontId(0), 12.0, Color::transparent(), Vec2::zero());
        list.push_solid_rect(Rect::new(0.0, 0.0, 0.0, 5.0), Color::transparent());
        list.push_solid_rect(Rect::new(5.0, 5.0, -2.0, 3.0), Color::transparent());

        let instances = collect_instances(&list);
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].origin, [10.0, 20.0]);
        assert_eq!(instances[0].size, [30.0, 40.0]);
        assert_eq!(instances[0].color, [1.0, 0.0, 0.0, 1.0]);
        // Negative width normalizes to a positive extent.
        assert_eq!(instances[1].origin, [3.0, 5.0]);
        assert_eq!(instances[1].size, [2.0, 3.0]);
    }
}
