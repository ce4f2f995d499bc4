//! Overlay colors.

mod color;

pub use color::Color;
