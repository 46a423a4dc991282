//! Shared compile-time constants for the morphing tree scene.

pub mod class;
pub mod morph_rates;
pub mod procedural_shader;
pub mod render_settings;
pub mod tree;
