//! Scene (draw stream) types.
//!
//! Overlay content is recorded into a [`DrawList`] each frame and consumed by
//! the renderers under `render::shapes`. Items paint in insertion order.

mod cmd;
mod list;

pub mod shapes;

pub use cmd::DrawCmd;
pub use list::DrawList;
