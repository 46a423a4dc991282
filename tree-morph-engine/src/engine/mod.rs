//! Scene engine: layouts, the morph model, rendering and app wiring.

pub mod camera;
pub mod config;
pub mod core;
pub mod error;
pub mod layout;
pub mod mesh;
pub mod pose;
pub mod render;
pub mod scene;
pub mod scene_mode;
pub mod shading;
pub mod systems;
