//! JSON-RPC 2.0 bridge between the scene and its host page.
//!
//! When built for the web the app runs inside an iframe and talks to the
//! parent window over `postMessage`. Native builds keep the same queues but
//! never send anything.
//!
//! ```text
//! Host page (parent)  <──postMessage──>  Bevy (iframe)
//!        │                                    │
//!        ├─ Request (with id) ──────────────> │
//!        │                                    ├─ handle_rpc_request
//!        │ <───────────── Response (with id) ─┤
//!        │ <──────── Notification (no id) ────┤
//! ```
//!
//! ## Methods
//!
//! - `toggle_mode`: flip between scattered and tree shape
//! - `select_frame { frame_id }`: fly a photo frame to the focal pose
//! - `deselect_frame`: return the focused frame to the tree
//! - `toggle_audio`: pause or resume the background track
//! - `get_state`: `{ mode, focused_frame, morph_factor }`
//! - `get_fps`: `{ fps }`
//!
//! ## Notifications
//!
//! - `mode_changed { mode }`
//! - `frame_focus_changed { frame_id }` (null when nothing is focused)
//! - `audio_changed { playing }`
//! - `fps_update { fps }`, every 0.5 s
//!
//! ## Errors
//!
//! - `-32601`: Method not found
//! - `-32602`: Invalid params (missing or out-of-range `frame_id`)
//!
//! A request without an id is treated as a notification: its action runs,
//! nothing is sent back.

/// Message queues, the request dispatcher and the wasm listener.
pub mod web_rpc;
