//! Pose generators for every population in the scene.
//!
//! Each population has two layouts: where it sits while scattered and where
//! it sits on the assembled tree. Both are drawn once from a seeded
//! [`fastrand::Rng`], so a fixed seed always reproduces the same scene.
//!
//! The tree is a cone of height `h` centred on the origin: the apex sits at
//! `+h/2` and the base ring at `-h/2`.

use std::f32::consts::{PI, TAU};

use bevy::math::Vec3;
use constants::tree::{
    DOLL_SURFACE_OFFSET, FRAME_SCATTER_RING, FRAME_SCATTER_Y_MIN, FRAME_SCATTER_Y_SPAN,
    FRAME_SPIRAL_STEP, FRAME_SURFACE_OFFSET, GIFT_RING_MIN_RADIUS, GIFT_RING_SPAN,
    ORNAMENT_SHELL_FACTOR, ORNAMENT_SHELL_JITTER,
};

use crate::engine::pose::Pose;

/// Horizontal radial directions shorter than this have no usable heading.
const OUTWARD_EPSILON: f32 = 1e-6;

/// Golden angle in radians, `PI * (3 - sqrt(5))`.
pub fn golden_angle() -> f32 {
    PI * (3.0 - 5.0_f32.sqrt())
}

/// Tree and scatter dimensions shared by every layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub tree_height: f32,
    pub tree_base_radius: f32,
    pub scatter_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tree_height: constants::tree::TREE_HEIGHT,
            tree_base_radius: constants::tree::TREE_BASE_RADIUS,
            scatter_radius: constants::tree::SCATTER_RADIUS,
        }
    }
}

impl LayoutConfig {
    /// Cone radius at a normalised height, 0 at the base and 1 at the apex.
    pub fn cone_radius(&self, y_norm: f32) -> f32 {
        self.tree_base_radius * (1.0 - y_norm)
    }

    /// World height for a normalised height.
    pub fn height_at(&self, y_norm: f32) -> f32 {
        (y_norm - 0.5) * self.tree_height
    }
}

/// One generated pose. `rotation` is `None` for layouts that only place points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityPose {
    pub position: Vec3,
    pub rotation: Option<Vec3>,
}

impl EntityPose {
    pub fn point(position: Vec3) -> Self {
        Self {
            position,
            rotation: None,
        }
    }

    pub fn oriented(position: Vec3, rotation: Vec3) -> Self {
        Self {
            position,
            rotation: Some(rotation),
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation.unwrap_or(Vec3::ZERO))
    }
}

/// Which distribution to draw from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutKind<'a> {
    /// Uniform volume inside the scatter sphere. With `tumble` each pose also
    /// gets a random rotation in `[0, PI)` per axis.
    Scattered { tumble: bool },
    /// Uniform area inside the cone cross-section at a uniform height.
    FoliageCone,
    /// Just inside the cone surface, rotated to follow the azimuth.
    OrnamentShell,
    /// Ring around the base. Each box rests on the floor, so its height
    /// (taken from the caller's per-entity scale) lifts its centre.
    GiftRing { box_heights: &'a [f32] },
    /// Golden-angle spiral just outside the cone, denser toward the base.
    GoldenSpiral,
    /// Evenly spaced spiral outside the cone for the photo frames.
    FrameSpiral,
    /// Loose ring at half the scatter radius for scattered photo frames.
    FrameRing,
}

/// Draw `count` poses of the given layout.
pub fn generate(
    count: usize,
    kind: LayoutKind<'_>,
    config: &LayoutConfig,
    rng: &mut fastrand::Rng,
) -> Vec<EntityPose> {
    match kind {
        LayoutKind::Scattered { tumble } => (0..count)
            .map(|_| {
                let position = scattered_point(config.scatter_radius, rng);
                if tumble {
                    EntityPose::oriented(position, random_tumble(rng))
                } else {
                    EntityPose::point(position)
                }
            })
            .collect(),
        LayoutKind::FoliageCone => (0..count)
            .map(|_| EntityPose::point(foliage_point(config, rng)))
            .collect(),
        LayoutKind::OrnamentShell => (0..count).map(|_| ornament_pose(config, rng)).collect(),
        LayoutKind::GiftRing { box_heights } => (0..count)
            .map(|i| gift_pose(config, box_heights.get(i).copied().unwrap_or(0.0), rng))
            .collect(),
        LayoutKind::GoldenSpiral => {
            let start_theta = rng.f32() * TAU;
            (0..count)
                .map(|i| golden_spiral_pose(i, count, start_theta, config))
                .collect()
        }
        LayoutKind::FrameSpiral => (0..count)
            .map(|i| frame_spiral_pose(i, count, config))
            .collect(),
        LayoutKind::FrameRing => (0..count).map(|_| frame_ring_pose(config, rng)).collect(),
    }
}

/// Uniform point in a ball: the cube root keeps density constant with radius.
fn scattered_point(radius: f32, rng: &mut fastrand::Rng) -> Vec3 {
    let r = radius * rng.f32().cbrt();
    let theta = rng.f32() * TAU;
    let phi = (2.0 * rng.f32() - 1.0).acos();
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

fn random_tumble(rng: &mut fastrand::Rng) -> Vec3 {
    Vec3::new(rng.f32() * PI, rng.f32() * PI, rng.f32() * PI)
}

fn foliage_point(config: &LayoutConfig, rng: &mut fastrand::Rng) -> Vec3 {
    let y_norm = rng.f32();
    let y = config.height_at(y_norm);
    let r = config.cone_radius(y_norm) * rng.f32().sqrt();
    let theta = rng.f32() * TAU;
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

fn ornament_pose(config: &LayoutConfig, rng: &mut fastrand::Rng) -> EntityPose {
    let y_norm = rng.f32();
    let y = config.height_at(y_norm);
    let r =
        config.cone_radius(y_norm) * ORNAMENT_SHELL_FACTOR + rng.f32() * ORNAMENT_SHELL_JITTER;
    let theta = rng.f32() * TAU;
    let tilt = rng.f32() * 0.5;
    EntityPose::oriented(
        Vec3::new(r * theta.cos(), y, r * theta.sin()),
        Vec3::new(tilt, theta, 0.0),
    )
}

fn gift_pose(config: &LayoutConfig, box_height: f32, rng: &mut fastrand::Rng) -> EntityPose {
    let angle = rng.f32() * TAU;
    let r = GIFT_RING_MIN_RADIUS + rng.f32() * GIFT_RING_SPAN;
    let y = -config.tree_height / 2.0 + box_height / 2.0;
    let spin = rng.f32() * TAU;
    EntityPose::oriented(
        Vec3::new(r * angle.cos(), y, r * angle.sin()),
        Vec3::new(0.0, spin, 0.0),
    )
}

fn golden_spiral_pose(
    index: usize,
    count: usize,
    start_theta: f32,
    config: &LayoutConfig,
) -> EntityPose {
    let dist_from_tip = ((index as f32 + 0.5) / count as f32).sqrt();
    let y_norm = 1.0 - dist_from_tip;
    let y = config.height_at(y_norm);
    let r = config.cone_radius(y_norm) + DOLL_SURFACE_OFFSET;
    let theta = start_theta + index as f32 * golden_angle();
    let position = Vec3::new(r * theta.cos(), y, r * theta.sin());
    EntityPose::oriented(position, outward_rotation(position))
}

fn frame_spiral_pose(index: usize, count: usize, config: &LayoutConfig) -> EntityPose {
    let y_ratio = (index as f32 + 0.5) / count as f32;
    let y = config.height_at(y_ratio);
    let r = config.cone_radius(y_ratio) + FRAME_SURFACE_OFFSET;
    let theta = index as f32 * FRAME_SPIRAL_STEP * PI;
    let position = Vec3::new(r * theta.cos(), y, r * theta.sin());
    EntityPose::oriented(position, outward_rotation(position))
}

fn frame_ring_pose(config: &LayoutConfig, rng: &mut fastrand::Rng) -> EntityPose {
    let theta = rng.f32() * TAU;
    let r = config.scatter_radius * FRAME_SCATTER_RING;
    let y = FRAME_SCATTER_Y_MIN + rng.f32() * FRAME_SCATTER_Y_SPAN;
    let rotation = Vec3::new(rng.f32() * PI, rng.f32() * PI, 0.0);
    EntityPose::oriented(Vec3::new(r * theta.cos(), y, r * theta.sin()), rotation)
}

/// Euler XYZ rotation that turns an entity's +Z axis away from the tree axis.
///
/// Equivalent to looking from `p` at `(2 p.x, p.y, 2 p.z)` with +Y up, which
/// reduces to a pure yaw. Points on (or extremely near) the axis have no
/// outward heading and get the zero rotation.
pub fn outward_rotation(position: Vec3) -> Vec3 {
    let (x, z) = (position.x, position.z);
    if (x * x + z * z).sqrt() < OUTWARD_EPSILON {
        return Vec3::ZERO;
    }
    Vec3::new(0.0, x.atan2(z), 0.0)
}
