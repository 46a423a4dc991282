//! Diagnostics systems.
//!
//! FPS is pushed to the host page over RPC and, on native builds, drawn as a
//! small overlay.

/// FPS notifications and the native overlay text.
pub mod fps_tracking;
