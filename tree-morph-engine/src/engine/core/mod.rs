//! Application setup and state.
//!
//! Builds the Bevy app for native and wasm targets, owns the two-state
//! lifecycle and the window configuration.

/// App construction: plugins, resources, schedules.
pub mod app_setup;

/// Lifecycle state and small shared markers.
pub mod app_state;

/// Canvas binding on the web, a plain window natively.
pub mod window_config;
