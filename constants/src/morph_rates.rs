/// Per-tick exponential smoothing fractions, tuned for a ~60 Hz frame cadence.
/// A different tick rate needs these revisited.

pub const FOLIAGE_MORPH_RATE: f32 = 0.03;
pub const ORNAMENT_RATE: f32 = 0.04;
pub const GIFT_RATE: f32 = 0.05;
pub const DOLL_RATE: f32 = 0.04;
pub const STAR_RATE: f32 = 0.05;
pub const FRAME_RATE: f32 = 0.04;

/// Idle spin applied to scattered dolls, radians per tick on X and Y.
pub const DOLL_IDLE_SPIN: f32 = 0.01;

/// Star self-rotation around Y, radians per tick.
pub const STAR_SPIN: f32 = 0.01;

/// Star wobble: rotation.z = sin(t * FREQ) * AMPLITUDE.
pub const STAR_WOBBLE_FREQUENCY: f32 = 2.0;
pub const STAR_WOBBLE_AMPLITUDE: f32 = 0.1;
