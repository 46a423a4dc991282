//! Morphing Christmas-tree scene.
//!
//! Tens of thousands of foliage points and a few hundred instanced ornaments
//! drift in a scattered cloud and gather into a tree on demand. Everything
//! animates by per-tick exponential smoothing toward the pose of the current
//! [`engine::scene_mode::SceneMode`].

pub mod engine;
pub mod rpc;

pub use engine::core::app_setup::create_app;
