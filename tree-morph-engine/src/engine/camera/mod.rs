//! Orbit camera around the tree.
//!
//! Damped left-drag orbit, wheel zoom between fixed limits, and a slow
//! auto-rotation while the tree is assembled.

/// Orbit camera resource, spawn helper and controller system.
pub mod orbit_camera;
