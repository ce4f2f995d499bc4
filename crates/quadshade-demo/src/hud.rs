//! Debug overlay: text lines laid out on the CPU into a draw list.

use quadshade_engine::coords::{Rect, Vec2, Viewport};
use quadshade_engine::paint::Color;
use quadshade_engine::scene::DrawList;
use quadshade_engine::text::FontId;

use crate::camera::ViewportState;

/// Distance from the window's top-right corner.
const PAD: f32 = 10.0;
/// Space between the panel edge and its content.
const INNER: f32 = 8.0;
const LINE_GAP: f32 = 4.0;
const BG_ALPHA: f32 = 0.35;

/// Values shown by the overlay for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HudStats {
    /// Smoothed frame time in seconds.
    pub frame_time: f32,
    pub pointer: Option<Vec2>,
    pub frame: u64,
    pub view: ViewportState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HudLine {
    Text(String),
    Separator,
}

impl HudStats {
    pub fn lines(&self) -> Vec<HudLine> {
        let fps = if self.frame_time > 0.0 { 1.0 / self.frame_time } else { 0.0 };
        let pointer = match self.pointer {
            Some(p) => format!("Mouse Position: ({:.0},{:.0})", p.x, p.y),
            None => "Mouse Position: <invalid>".to_string(),
        };

        vec![
            HudLine::Text(format!("Framerate: {fps:.0}Hz ({:.2}ms)", self.frame_time * 1000.0)),
            HudLine::Separator,
            HudLine::Text(pointer),
            HudLine::Text(format!("Frame: {}", self.frame)),
            HudLine::Text(format!(
                "Zoom: {:.2}  Pan: ({:.1},{:.1})",
                self.view.zoom, self.view.pan.x, self.view.pan.y
            )),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HudItem {
    Text { text: String, origin: Vec2 },
    Rule(Rect),
}

/// Overlay geometry in logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct HudLayout {
    pub panel: Rect,
    pub items: Vec<HudItem>,
}

/// Stacks `lines` top to bottom and anchors the auto-sized panel `PAD`
/// pixels from the top-right corner of `viewport`.
pub fn layout(
    lines: &[HudLine],
    viewport: Viewport,
    line_height: f32,
    measure: impl Fn(&str) -> Vec2,
) -> HudLayout {
    // First pass: content size relative to the panel origin.
    let mut y = INNER;
    let mut width: f32 = 0.0;
    let mut placed = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            y += LINE_GAP;
        }
        match line {
            HudLine::Text(text) => {
                let size = measure(text);
                width = width.max(size.x);
                placed.push((line, y));
                y += size.y.max(line_height);
            }
            HudLine::Separator => {
                placed.push((line, y));
                y += 1.0;
            }
        }
    }

    let panel_w = width + 2.0 * INNER;
    let panel_h = y + INNER;
    let origin = Vec2::new(viewport.width - PAD - panel_w, PAD);

    let items = placed
        .into_iter()
        .map(|(line, dy)| match line {
            HudLine::Text(text) => HudItem::Text {
                text: text.clone(),
                origin: origin + Vec2::new(INNER, dy),
            },
            HudLine::Separator => {
                HudItem::Rule(Rect::new(origin.x + INNER, origin.y + dy, width, 1.0))
            }
        })
        .collect();

    HudLayout {
        panel: Rect::new(origin.x, origin.y, panel_w, panel_h),
        items,
    }
}

impl HudLayout {
    /// Records the panel background, separators and text into `list`.
    pub fn record(&self, list: &mut DrawList, font: FontId, font_size: f32) {
        list.push_solid_rect(self.panel, Color::BLACK.with_alpha(BG_ALPHA));
        let rule = Color::from_straight(0.43, 0.43, 0.5, 0.5);

        for item in &self.items {
            match item {
                HudItem::Rule(r) => list.push_solid_rect(*r, rule),
                HudItem::Text { text, origin } => {
                    list.push_text(text.clone(), font, font_size, Color::WHITE, *origin)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport::new(1200.0, 800.0);

    fn stats() -> HudStats {
        HudStats {
            frame_time: 0.02,
            pointer: Some(Vec2::new(12.4, 300.6)),
            frame: 42,
            view: ViewportState { pan: Vec2::new(1.5, -3.0), zoom: 2.0 },
        }
    }

    fn texts(lines: &[HudLine]) -> Vec<&str> {
        lines
            .iter()
            .filter_map(|l| match l {
                HudLine::Text(t) => Some(t.as_str()),
                HudLine::Separator => None,
            })
            .collect()
    }

    /// Monospace stand-in: 10 px per char, 20 px tall.
    fn mono(text: &str) -> Vec2 {
        Vec2::new(text.chars().count() as f32 * 10.0, 20.0)
    }

    #[test]
    fn lines_follow_the_overlay_format() {
        let lines = stats().lines();
        assert_eq!(
            texts(&lines),
            vec![
                "Framerate: 50Hz (20.00ms)",
                "Mouse Position: (12,301)",
                "Frame: 42",
                "Zoom: 2.00  Pan: (1.5,-3.0)",
            ]
        );
        assert_eq!(lines[1], HudLine::Separator);
    }

    #[test]
    fn pointer_outside_the_window_is_invalid() {
        let s = HudStats { pointer: None, ..stats() };
        assert!(texts(&s.lines()).contains(&"Mouse Position: <invalid>"));
    }

    #[test]
    fn zero_frame_time_does_not_divide_by_zero() {
        let s = HudStats { frame_time: 0.0, ..stats() };
        assert_eq!(texts(&s.lines())[0], "Framerate: 0Hz (0.00ms)");
    }

    #[test]
    fn panel_hugs_the_top_right_corner() {
        let lines = vec![HudLine::Text("abcd".into()), HudLine::Separator, HudLine::Text("ab".into())];
        let hud = layout(&lines, VP, 20.0, mono);

        // 40 px of text + 2 * 8 inner.
        assert_eq!(hud.panel.size.x, 56.0);
        assert_eq!(hud.panel.max().x, VP.width - PAD);
        assert_eq!(hud.panel.origin.y, PAD);
        // 8 + 20 + 4 + 1 + 4 + 20 + 8
        assert_eq!(hud.panel.size.y, 65.0);

        assert_eq!(
            hud.items,
            vec![
                HudItem::Text { text: "abcd".into(), origin: Vec2::new(1142.0, 18.0) },
                HudItem::Rule(Rect::new(1142.0, 42.0, 40.0, 1.0)),
                HudItem::Text { text: "ab".into(), origin: Vec2::new(1142.0, 47.0) },
            ]
        );
    }
}
