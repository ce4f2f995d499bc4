use crate::scene::DrawList;
use crate::text::FontSystem;

use super::shapes::rect::RectRenderer;
use super::shapes::text::TextRenderer;
use super::{RenderCtx, RenderTarget};

/// Overlay compositor: solid rects first, then text on top.
#[derive(Default)]
pub struct HudRenderer {
    rects: RectRenderer,
    text: TextRenderer,
}

impl HudRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `list` over whatever `target` already holds.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        list: &DrawList,
        fonts: &FontSystem,
    ) {
        if list.is_empty() {
            return;
        }
        self.rects.render(ctx, target, list);
        self.text.render(ctx, target, list, fonts);
    }
}
