//! Shader program construction.
//!
//! GLSL stage sources are compiled and linked on the CPU with naga
//! ([`compile_program`], [`load_program`]); the resulting [`LinkedProgram`] is
//! turned into a wgpu pipeline by [`ShaderProgram`]. Uniforms are pushed by
//! name through the program and uploaded once per frame.
//!
//! Every program shares the bind group layout described in [`layout`].

mod compile;
mod error;
pub mod layout;
mod link;
mod program;
mod source;
mod uniforms;

pub use compile::{compile_program, compile_stage, CompiledStage};
pub use error::{ShaderError, Stage};
pub use layout::AgentRecord;
pub use link::{link, LinkedProgram};
pub use program::ShaderProgram;
pub use source::{load_program, read_file, ShaderPaths};
pub use uniforms::{UniformBlock, UniformKind, UniformMember};
