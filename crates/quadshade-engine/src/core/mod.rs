//! Contract between the runtime (platform loop) and the application.
//!
//! The runtime owns the window, GPU context and input state; the application
//! sees them only through the contexts defined here.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, InitCtx, WindowCtx};
