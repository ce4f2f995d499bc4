//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, and wires them to the GPU layer.

mod run_state;
mod runtime;

pub use run_state::RunState;
pub use runtime::{Runtime, RuntimeConfig};
