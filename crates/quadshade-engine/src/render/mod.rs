//! GPU rendering subsystem.
//!
//! - [`FullscreenQuad`] holds the fixed two-triangle quad the shader program draws.
//! - [`HudRenderer`] composes the overlay from a `scene` draw list.
//!
//! Convention for overlay geometry:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shader converts to NDC using a viewport uniform.

mod ctx;
mod hud;
mod quad;
pub mod shapes;

pub use ctx::{RenderCtx, RenderTarget};
pub use hud::HudRenderer;
pub use quad::{FullscreenQuad, QuadVertex, QUAD_VERTICES};
