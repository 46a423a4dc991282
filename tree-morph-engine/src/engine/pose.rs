//! Exponential smoothing toward a target pose.
//!
//! Every animated value in the scene moves by a fixed fraction of its
//! remaining distance each tick: `current' = current + (target - current) * rate`.
//! With `rate` in [0, 1] the result always lies on the segment between the
//! two, never overshoots and never divides.

use bevy::math::{EulerRot, Quat, Vec3};

/// Values that can be stepped toward a target by a per-tick fraction.
pub trait Smooth: Copy {
    fn step_toward(self, target: Self, rate: f32) -> Self;
}

impl Smooth for f32 {
    #[inline]
    fn step_toward(self, target: Self, rate: f32) -> Self {
        self + (target - self) * rate
    }
}

impl Smooth for Vec3 {
    #[inline]
    fn step_toward(self, target: Self, rate: f32) -> Self {
        self + (target - self) * rate
    }
}

/// Advance `current` one tick toward `target`.
#[inline]
pub fn step<T: Smooth>(current: T, target: T, rate: f32) -> T {
    current.step_toward(target, rate)
}

/// Position plus XYZ Euler rotation.
///
/// Rotation is kept as Euler angles rather than a quaternion so each axis
/// interpolates independently, matching how the poses are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Vec3,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
    };

    pub fn new(translation: Vec3, rotation: Vec3) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Vec3::ZERO,
        }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }
}

impl Smooth for Pose {
    #[inline]
    fn step_toward(self, target: Self, rate: f32) -> Self {
        Self {
            translation: self.translation.step_toward(target.translation, rate),
            rotation: self.rotation.step_toward(target.rotation, rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_steps_each_component_independently() {
        let from = Pose::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let to = Pose::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        let next = step(from, to, 0.5);
        assert_eq!(next.translation, Vec3::new(5.0, 5.0, 0.0));
        assert_eq!(next.rotation, Vec3::new(0.5, 1.0, 0.0));
    }

    #[test]
    fn full_rate_lands_on_target() {
        assert_eq!(step(3.0_f32, -7.0, 1.0), -7.0);
    }
}
