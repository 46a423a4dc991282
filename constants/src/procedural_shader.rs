/// Foliage vertex-stage constants. Keep in sync with `assets/shaders/foliage.wgsl`.

/// Spatial frequency of the wind displacement noise.
pub const NOISE_FREQUENCY: f32 = 0.5;

/// Time scale of the noise field.
pub const NOISE_TIME_SCALE: f32 = 0.5;

/// Per-axis offsets along the time dimension so x/y/z displacements decorrelate.
pub const NOISE_AXIS_OFFSETS: [f32; 3] = [0.0, 10.0, 20.0];

/// amp = NOISE_AMPLITUDE * (0.5 + 0.5 * ease)
pub const NOISE_AMPLITUDE: f32 = 0.15;

/// Point sprite size in pixels at unit view depth, before pixel ratio and random variance.
pub const POINT_SIZE: f32 = 40.0;

/// glimmer = sin(time * GLIMMER_SPEED + random * GLIMMER_PHASE_SPREAD)
pub const GLIMMER_SPEED: f32 = 3.0;
pub const GLIMMER_PHASE_SPREAD: f32 = 10.0;

/// Above this the point flashes white, below its negation gold.
pub const GLIMMER_THRESHOLD: f32 = 0.9;

/// Sprite radius in uv units and where the soft edge begins.
pub const SPRITE_RADIUS: f32 = 0.5;
pub const SPRITE_SOFT_EDGE: f32 = 0.3;

/// Device pixel ratio is clamped to this range.
pub const MAX_PIXEL_RATIO: f32 = 2.0;
