/// Tree cone height in world units; apex at +HEIGHT/2, base at -HEIGHT/2.
pub const TREE_HEIGHT: f32 = 12.0;

/// Cone radius at the base of the tree.
pub const TREE_BASE_RADIUS: f32 = 5.0;

/// Radius of the sphere the scattered pose is sampled from.
pub const SCATTER_RADIUS: f32 = 25.0;

pub const FOLIAGE_COUNT: usize = 15_000;
pub const ORNAMENT_COUNT: usize = 250;
pub const GIFT_COUNT: usize = 30;
pub const ACCENT_DOLL_COUNT: usize = 15;
pub const PHOTO_FRAME_COUNT: usize = 6;
pub const SNOW_COUNT: usize = 2_000;
pub const STAR_FIELD_COUNT: usize = 5_000;

/// Upper bound on foliage points the quad-expanded mesh may hold (4 vertices per point, u32 indexable).
pub const MAX_FOLIAGE_COUNT: usize = 500_000;

/// Upper bound on any instanced population.
pub const MAX_INSTANCE_COUNT: usize = 65_536;

/// Fraction of ornaments rendered as boxes rather than spheres.
pub const ORNAMENT_BOX_FRACTION: f32 = 0.3;

/// Ornament uniform scale range: min + U(0, span).
pub const ORNAMENT_SCALE_MIN: f32 = 0.15;
pub const ORNAMENT_SCALE_SPAN: f32 = 0.25;

/// Ornaments sit at 90% of the cone radius plus up to this much jitter.
pub const ORNAMENT_SHELL_FACTOR: f32 = 0.9;
pub const ORNAMENT_SHELL_JITTER: f32 = 0.2;

/// Gift skirt ring: radius min + U(0, span).
pub const GIFT_RING_MIN_RADIUS: f32 = 2.5;
pub const GIFT_RING_SPAN: f32 = 4.0;

/// Gift box edge length: min + U(0, span) per axis.
pub const GIFT_SIZE_MIN: f32 = 0.8;
pub const GIFT_SIZE_SPAN: f32 = 0.8;

/// Dolls hang this far outside the cone surface.
pub const DOLL_SURFACE_OFFSET: f32 = 0.8;
pub const DOLL_SCALE: f32 = 0.35;

/// Frames sit this far outside the cone surface.
pub const FRAME_SURFACE_OFFSET: f32 = 1.2;

/// Angular step between consecutive frames, as a fraction of PI.
pub const FRAME_SPIRAL_STEP: f32 = 0.8;

/// Scattered frames ring at this fraction of the scatter radius, y in [MIN, MIN + SPAN].
pub const FRAME_SCATTER_RING: f32 = 0.5;
pub const FRAME_SCATTER_Y_MIN: f32 = -5.0;
pub const FRAME_SCATTER_Y_SPAN: f32 = 5.0;

/// Focused frame pose, local to the tree root.
pub const FRAME_FOCUS_POSITION: [f32; 3] = [0.0, 2.0, 18.0];
pub const FRAME_FOCUS_SCALE: f32 = 2.5;

/// Star topper parking spot while scattered; assembled it sits just above the apex.
pub const STAR_SCATTER_POSITION: [f32; 3] = [10.0, 20.0, -10.0];
pub const STAR_APEX_OFFSET: f32 = 0.5;

/// Snow volume is a cube of this edge centred on the origin.
pub const SNOW_EXTENT: f32 = 60.0;
pub const SNOW_SWAY: f32 = 0.05;
pub const SNOW_FALL_MIN: f32 = 0.05;
pub const SNOW_FALL_SPAN: f32 = 0.1;
pub const SNOW_FLAKE_SIZE: f32 = 0.075;

/// Backdrop stars sit in a shell from RADIUS out to RADIUS + DEPTH, biased outward.
pub const STAR_FIELD_RADIUS: f32 = 100.0;
pub const STAR_FIELD_DEPTH: f32 = 50.0;
/// Largest star radius in world units; each star draws 0.5..1 of it.
pub const STAR_FIELD_SIZE: f32 = 0.4;
/// size * (TWINKLE_BASE + sin(x + TWINKLE_SPEED * t + TWINKLE_PHASE)) / TWINKLE_BASE
pub const STAR_FIELD_TWINKLE_BASE: f32 = 30.0;
pub const STAR_FIELD_TWINKLE_SPEED: f32 = 2.0;
pub const STAR_FIELD_TWINKLE_PHASE: f32 = 100.0;

/// Everything on the tree hangs off a root shifted down by this amount.
pub const TREE_ROOT_OFFSET: [f32; 3] = [0.0, -2.0, 0.0];
