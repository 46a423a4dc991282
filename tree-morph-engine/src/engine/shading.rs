//! CPU mirror of `shaders/foliage.wgsl`.
//!
//! Keeps the per-point shading math available off the GPU: the tests check
//! the shader's behaviour through these functions, and anything that needs
//! to know where a foliage point is drawn (picking, debugging) can ask here.
//! Any change to one side must be made to the other.

use bevy::math::{Vec3, Vec4};
use constants::procedural_shader::{
    GLIMMER_PHASE_SPREAD, GLIMMER_SPEED, GLIMMER_THRESHOLD, NOISE_AMPLITUDE, NOISE_AXIS_OFFSETS,
    NOISE_FREQUENCY, NOISE_TIME_SCALE, POINT_SIZE, SPRITE_RADIUS, SPRITE_SOFT_EDGE,
};

pub const BOTTOM_COLOR: Vec3 = Vec3::new(1.0, 0.08, 0.58);
pub const TOP_COLOR: Vec3 = Vec3::new(1.0, 0.9, 0.95);
pub const GLIMMER_WHITE: Vec3 = Vec3::ONE;
pub const GLIMMER_GOLD: Vec3 = Vec3::new(1.0, 0.84, 0.0);

/// Per-frame uniforms of the foliage stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoliageUniforms {
    pub time: f32,
    pub morph_factor: f32,
    pub pixel_ratio: f32,
    pub tree_height: f32,
}

/// Cubic smoothstep of the morph factor, `t^2 (3 - 2t)`.
#[inline]
pub fn ease(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Wind displacement amplitude for an eased morph factor.
#[inline]
pub fn noise_amplitude(eased: f32) -> f32 {
    NOISE_AMPLITUDE * (0.5 + 0.5 * eased)
}

/// Blend from the scatter to the tree position, then add wind.
pub fn displaced_position(scatter: Vec3, target: Vec3, uniforms: &FoliageUniforms) -> Vec3 {
    let eased = ease(uniforms.morph_factor);
    let base = scatter.lerp(target, eased);
    base + wind_noise(base, uniforms.time) * noise_amplitude(eased)
}

/// Three decorrelated simplex samples at the same spatial point.
pub fn wind_noise(position: Vec3, time: f32) -> Vec3 {
    let px = position.x * NOISE_FREQUENCY;
    let py = position.y * NOISE_FREQUENCY;
    let t = time * NOISE_TIME_SCALE;
    let [ox, oy, oz] = NOISE_AXIS_OFFSETS;
    Vec3::new(
        simplex_noise_3d(Vec3::new(px, py, t + ox)),
        simplex_noise_3d(Vec3::new(px, py, t + oy)),
        simplex_noise_3d(Vec3::new(px, py, t + oz)),
    )
}

/// Sprite diameter in pixels at view-space depth `view_z` (negative in front of the camera).
pub fn point_size(random: f32, pixel_ratio: f32, view_z: f32) -> f32 {
    POINT_SIZE * pixel_ratio * (0.5 + 0.5 * random) / -view_z
}

/// Pink at the base fading to near white at the apex.
pub fn height_color(y: f32, tree_height: f32) -> Vec3 {
    let mix = ((y + tree_height * 0.5) / tree_height).clamp(0.0, 1.0);
    BOTTOM_COLOR.lerp(TOP_COLOR, mix)
}

pub fn glimmer(time: f32, random: f32) -> f32 {
    (time * GLIMMER_SPEED + random * GLIMMER_PHASE_SPREAD).sin()
}

/// Sparkle override: white on strong positive glimmer, gold on strong negative.
pub fn apply_glimmer(color: Vec3, glimmer: f32) -> Vec3 {
    if glimmer > GLIMMER_THRESHOLD {
        GLIMMER_WHITE
    } else if glimmer < -GLIMMER_THRESHOLD {
        GLIMMER_GOLD
    } else {
        color
    }
}

/// Final point colour before alpha.
pub fn point_color(position: Vec3, random: f32, uniforms: &FoliageUniforms) -> Vec3 {
    apply_glimmer(
        height_color(position.y, uniforms.tree_height),
        glimmer(uniforms.time, random),
    )
}

/// Round soft sprite. `None` means the fragment is discarded.
pub fn sprite_alpha(uv: [f32; 2]) -> Option<f32> {
    let d = ((uv[0] - 0.5).powi(2) + (uv[1] - 0.5).powi(2)).sqrt();
    if d > SPRITE_RADIUS {
        return None;
    }
    Some(1.0 - smoothstep(SPRITE_SOFT_EDGE, SPRITE_RADIUS, d))
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// Simplex noise, after Ashima Arts / Ian McEwan (MIT). Range is roughly [-1, 1].

fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: Vec4) -> Vec4 {
    mod289_4(((x * 34.0) + 1.0) * x)
}

fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - r * 0.853_734_7
}

/// `step(edge, x)` per component: 0 where `x < edge`, else 1.
fn step3(edge: Vec3, x: Vec3) -> Vec3 {
    Vec3::select(x.cmplt(edge), Vec3::ZERO, Vec3::ONE)
}

fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmplt(edge), Vec4::ZERO, Vec4::ONE)
}

pub fn simplex_noise_3d(v: Vec3) -> f32 {
    const C: [f32; 2] = [1.0 / 6.0, 1.0 / 3.0];

    // First corner
    let i = (v + Vec3::splat(v.dot(Vec3::splat(C[1])))).floor();
    let x0 = v - i + Vec3::splat(i.dot(Vec3::splat(C[0])));

    // Other corners
    let g = step3(Vec3::new(x0.y, x0.z, x0.x), x0);
    let l = Vec3::ONE - g;
    let l_zxy = Vec3::new(l.z, l.x, l.y);
    let i1 = g.min(l_zxy);
    let i2 = g.max(l_zxy);

    let x1 = x0 - i1 + Vec3::splat(C[0]);
    let x2 = x0 - i2 + Vec3::splat(C[1]);
    let x3 = x0 - Vec3::splat(0.5);

    // Permutations
    let i = mod289_3(i);
    let p = permute(
        permute(
            permute(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                + Vec4::splat(i.y)
                + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + Vec4::splat(i.x)
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    // Gradients: 7x7 points over a square, mapped onto an octahedron.
    let n_ = 1.0 / 7.0;
    let ns = Vec3::new(2.0 * n_, 0.5 * n_ - 1.0, n_);

    let j = p - (p * ns.z * ns.z).floor() * 49.0;
    let x_ = (j * ns.z).floor();
    let y_ = (j - x_ * 7.0).floor();

    let x = x_ * ns.x + Vec4::splat(ns.y);
    let y = y_ * ns.x + Vec4::splat(ns.y);
    let h = Vec4::ONE - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);

    let s0 = b0.floor() * 2.0 + Vec4::ONE;
    let s1 = b1.floor() * 2.0 + Vec4::ONE;
    let sh = -step4(h, Vec4::ZERO);

    let a0 = Vec4::new(b0.x, b0.z, b0.y, b0.w)
        + Vec4::new(s0.x, s0.z, s0.y, s0.w) * Vec4::new(sh.x, sh.x, sh.y, sh.y);
    let a1 = Vec4::new(b1.x, b1.z, b1.y, b1.w)
        + Vec4::new(s1.x, s1.z, s1.y, s1.w) * Vec4::new(sh.z, sh.z, sh.w, sh.w);

    let mut p0 = Vec3::new(a0.x, a0.y, h.x);
    let mut p1 = Vec3::new(a0.z, a0.w, h.y);
    let mut p2 = Vec3::new(a1.x, a1.y, h.z);
    let mut p3 = Vec3::new(a1.z, a1.w, h.w);

    // Normalise gradients
    let norm = taylor_inv_sqrt(Vec4::new(p0.dot(p0), p1.dot(p1), p2.dot(p2), p3.dot(p3)));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    // Mix final noise value
    let m = (Vec4::splat(0.6) - Vec4::new(x0.dot(x0), x1.dot(x1), x2.dot(x2), x3.dot(x3)))
        .max(Vec4::ZERO);
    let m = m * m;
    42.0 * (m * m).dot(Vec4::new(p0.dot(x0), p1.dot(x1), p2.dot(x2), p3.dot(x3)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_is_opaque_at_centre() {
        assert_eq!(sprite_alpha([0.5, 0.5]), Some(1.0));
    }

    #[test]
    fn sprite_discards_outside_radius() {
        assert_eq!(sprite_alpha([1.0, 1.0]), None);
        assert_eq!(sprite_alpha([0.5, 1.0]), Some(0.0));
    }

    #[test]
    fn glimmer_overrides_only_past_threshold() {
        let base = Vec3::new(0.3, 0.3, 0.3);
        assert_eq!(apply_glimmer(base, 0.95), GLIMMER_WHITE);
        assert_eq!(apply_glimmer(base, -0.95), GLIMMER_GOLD);
        assert_eq!(apply_glimmer(base, 0.9), base);
    }
}
