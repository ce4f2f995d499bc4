//! quadshade engine crate.
//!
//! Platform + GPU runtime for a single-window full-screen shader shell:
//! window/loop ([`window`]), GPU context ([`device`]), GLSL program
//! compilation and uniforms ([`shader`]), the full-screen quad and HUD
//! overlay renderers ([`render`]).

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod time;
pub mod window;

pub mod coords;
pub mod paint;
pub mod render;
pub mod scene;
pub mod shader;
pub mod text;
