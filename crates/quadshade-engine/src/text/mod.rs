//! Font loading and measurement for the overlay.

mod font_system;

pub use font_system::{FontId, FontLoadError, FontSystem};
