use super::DrawCmd;

/// Recorded draw stream for a frame.
///
/// `push()` is O(1); `clear()` keeps the allocation so a list reused across
/// frames stops allocating once warmed.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawCmd>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn push(&mut self, cmd: DrawCmd) {
        self.items.push(cmd);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates items in paint order (back-to-front).
    pub fn iter(&self) -> impl Iterator<Item = &DrawCmd> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Rect, Vec2};
    use crate::paint::Color;
    use crate::text::FontId;

    #[test]
    fn keeps_insertion_order_and_clears() {
        let mut list = DrawList::new();
        list.push_solid_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::transparent());
        list.push_text("hud", FontId(0), 14.0, Color::transparent(), Vec2::zero());

        let kinds: Vec<_> = list
            .iter()
            .map(|c| matches!(c, DrawCmd::Rect(_)))
            .collect();
        assert_eq!(kinds, vec![true, false]);

        list.clear();
        assert!(list.is_empty());
    }
}
