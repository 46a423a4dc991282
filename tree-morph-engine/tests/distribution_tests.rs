//! Statistical and geometric checks on the layout generators.

use std::f32::consts::TAU;

use bevy::math::{EulerRot, Quat, Vec3};
use tree_morph_engine::engine::layout::{
    LayoutConfig, LayoutKind, generate, golden_angle, outward_rotation,
};

fn azimuth(p: Vec3) -> f32 {
    p.z.atan2(p.x)
}

fn angular_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}

mod scattered {
    use super::*;

    #[test]
    fn radius_follows_cube_law() {
        let config = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(0xC0FFEE);
        let poses = generate(
            100_000,
            LayoutKind::Scattered { tumble: false },
            &config,
            &mut rng,
        );

        // (r / R)^3 is uniform for a uniform ball.
        let mut bins = [0usize; 10];
        for pose in &poses {
            let u = (pose.position.length() / config.scatter_radius).powi(3);
            assert!(u <= 1.0 + 1e-4);
            bins[((u * 10.0) as usize).min(9)] += 1;
        }
        for (i, count) in bins.iter().enumerate() {
            assert!(
                (9_500..=10_500).contains(count),
                "bin {i} holds {count} of 100000"
            );
        }
    }

    #[test]
    fn tumble_only_when_requested() {
        let config = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(3);
        let still = generate(10, LayoutKind::Scattered { tumble: false }, &config, &mut rng);
        let tumbling = generate(10, LayoutKind::Scattered { tumble: true }, &config, &mut rng);
        assert!(still.iter().all(|p| p.rotation.is_none()));
        assert!(tumbling.iter().all(|p| p.rotation.is_some()));
    }
}

mod cone {
    use super::*;

    #[test]
    fn foliage_stays_inside_the_cone() {
        let config = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(42);
        for pose in generate(20_000, LayoutKind::FoliageCone, &config, &mut rng) {
            let p = pose.position;
            let half = config.tree_height / 2.0;
            assert!(p.y >= -half - 1e-4 && p.y <= half + 1e-4);
            let y_norm = (p.y + half) / config.tree_height;
            let radial = (p.x * p.x + p.z * p.z).sqrt();
            assert!(radial <= config.cone_radius(y_norm) + 1e-3);
        }
    }

    #[test]
    fn gifts_ring_the_base() {
        let config = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(8);
        let heights = vec![1.0; 30];
        let poses = generate(
            30,
            LayoutKind::GiftRing {
                box_heights: &heights,
            },
            &config,
            &mut rng,
        );
        for pose in poses {
            let radial = (pose.position.x.powi(2) + pose.position.z.powi(2)).sqrt();
            assert!((2.5 - 1e-4..=6.5 + 1e-4).contains(&radial));
            assert!((pose.position.y - (-config.tree_height / 2.0 + 0.5)).abs() < 1e-4);
        }
    }
}

mod golden_spiral {
    use super::*;

    #[test]
    fn consecutive_entities_step_by_the_golden_angle() {
        let config = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(1);
        let poses = generate(15, LayoutKind::GoldenSpiral, &config, &mut rng);
        for pair in poses.windows(2) {
            let step = azimuth(pair[1].position) - azimuth(pair[0].position);
            assert!(angular_distance(step, golden_angle()) < 1e-3);
        }
    }

    #[test]
    fn spiral_descends_from_the_apex() {
        let config = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(2);
        let poses = generate(15, LayoutKind::GoldenSpiral, &config, &mut rng);
        for pair in poses.windows(2) {
            assert!(pair[1].position.y < pair[0].position.y);
        }
    }

    #[test]
    fn azimuths_are_distinct() {
        let config = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(4);
        let poses = generate(15, LayoutKind::GoldenSpiral, &config, &mut rng);
        for (i, a) in poses.iter().enumerate() {
            for b in &poses[i + 1..] {
                assert!(angular_distance(azimuth(a.position), azimuth(b.position)) > 0.05);
            }
        }
    }

    fn max_azimuth_gap(count: usize, seed: u64) -> f32 {
        let config = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(seed);
        let poses = generate(count, LayoutKind::GoldenSpiral, &config, &mut rng);
        let mut angles: Vec<f32> = poses
            .iter()
            .map(|p| azimuth(p.position).rem_euclid(TAU))
            .collect();
        angles.sort_by(f32::total_cmp);
        let wrap = angles[0] + TAU - angles[angles.len() - 1];
        angles
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .fold(wrap, f32::max)
    }

    #[test]
    fn largest_gap_never_grows_with_count() {
        // Same seed per count, so every spiral shares its start angle.
        for seed in [3, 17, 20251224] {
            let mut previous = max_azimuth_gap(2, seed);
            for count in 3..=60 {
                let gap = max_azimuth_gap(count, seed);
                assert!(
                    gap <= previous + 1e-4,
                    "seed {seed}: gap grew from {previous} to {gap} at count {count}"
                );
                previous = gap;
            }
            assert!(previous < max_azimuth_gap(2, seed));
        }
    }

    #[test]
    fn first_five_azimuths_differ_by_more_than_a_degree() {
        let config = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(9);
        let poses = generate(5, LayoutKind::GoldenSpiral, &config, &mut rng);
        for (i, a) in poses.iter().enumerate() {
            for b in &poses[i + 1..] {
                let apart = angular_distance(azimuth(a.position), azimuth(b.position));
                assert!(apart > 1.0_f32.to_radians());
            }
        }
    }
}

mod orientation {
    use super::*;

    #[test]
    fn frames_face_away_from_the_axis() {
        let config = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(5);
        for pose in generate(6, LayoutKind::FrameSpiral, &config, &mut rng) {
            let r = pose.rotation.unwrap_or(Vec3::ZERO);
            let facing = Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z) * Vec3::Z;
            let outward = Vec3::new(pose.position.x, 0.0, pose.position.z).normalize();
            assert!(facing.dot(outward) > 0.999);
        }
    }

    #[test]
    fn on_axis_points_get_zero_rotation() {
        assert_eq!(outward_rotation(Vec3::new(0.0, 3.0, 0.0)), Vec3::ZERO);
    }
}
