/// Camera starts on +Z looking at the origin.
pub const CAMERA_POSITION: [f32; 3] = [0.0, 0.0, 22.0];
pub const CAMERA_FOV_DEGREES: f32 = 50.0;

/// Orbit zoom limits.
pub const CAMERA_MIN_DISTANCE: f32 = 10.0;
pub const CAMERA_MAX_DISTANCE: f32 = 40.0;

/// Orbit velocity damping per tick.
pub const CAMERA_DAMPING: f32 = 0.05;

/// Radians of orbit per pixel of mouse drag.
pub const CAMERA_DRAG_SENSITIVITY: f32 = 0.005;

/// Auto-rotate speed while assembled (a speed of 1.0 is one orbit per 60 s).
pub const CAMERA_AUTO_ROTATE_SPEED: f32 = 0.5;

pub const BLOOM_INTENSITY: f32 = 0.3;

pub const AMBIENT_BRIGHTNESS: f32 = 300.0;
pub const KEY_LIGHT_POSITION: [f32; 3] = [15.0, 20.0, 10.0];
pub const KEY_LIGHT_INTENSITY: f32 = 2_000_000.0;
pub const RIM_LIGHT_POSITION: [f32; 3] = [-15.0, 5.0, -10.0];
pub const RIM_LIGHT_INTENSITY: f32 = 1_000_000.0;
pub const FILL_LIGHT_POSITION: [f32; 3] = [0.0, -5.0, 5.0];
pub const FILL_LIGHT_INTENSITY: f32 = 200_000.0;
pub const FILL_LIGHT_RANGE: f32 = 15.0;
pub const SPOT_LIGHT_ANGLE: f32 = 0.4;

pub const BACKGROUND_AUDIO_VOLUME: f32 = 0.5;

/// FPS notifications to the host are throttled to this period in seconds.
pub const FPS_NOTIFY_INTERVAL: f32 = 0.5;
