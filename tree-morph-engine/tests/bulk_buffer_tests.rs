//! Instance buffer bookkeeping for the bulk renderer.

use bevy::color::Color;
use bevy::math::Vec3;
use bevy::transform::components::{GlobalTransform, Transform};
use tree_morph_engine::engine::layout::{EntityPose, LayoutConfig};
use tree_morph_engine::engine::render::bulk::{
    BulkInstances, InstanceData, MorphPopulation, PosePopulation,
};
use tree_morph_engine::engine::scene::ornaments::gift_population;
use tree_morph_engine::engine::scene_mode::{ModeSnapshot, SceneMode};

mod layout {
    use super::*;

    #[test]
    fn instance_is_128_bytes() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 128);
    }
}

mod dirty_marking {
    use super::*;

    #[test]
    fn one_revision_per_tick() {
        let mut rng = fastrand::Rng::with_seed(31);
        let gifts = gift_population(30, &LayoutConfig::default(), &mut rng).unwrap();
        let mut morph = MorphPopulation::new(gifts, 0.05);
        let mut bulk = morph.instances(&GlobalTransform::IDENTITY);
        assert_eq!(bulk.revision(), 0);
        let snapshot = ModeSnapshot::new(SceneMode::TreeShape, 0.0);
        for tick in 1..=10 {
            morph.tick(snapshot, &GlobalTransform::IDENTITY, &mut bulk);
            assert_eq!(bulk.revision(), tick);
        }
    }

    #[test]
    fn reading_does_not_mark() {
        let bulk = BulkInstances::new(vec![]);
        let _ = bulk.instances();
        assert_eq!(bulk.revision(), 0);
        assert!(bulk.is_empty());
    }

    #[test]
    fn slots_follow_current_pose() {
        let population = PosePopulation::new(
            "pair",
            &[EntityPose::point(Vec3::ZERO), EntityPose::point(Vec3::X)],
            &[EntityPose::point(Vec3::Y * 4.0), EntityPose::point(Vec3::Z * 4.0)],
            vec![Vec3::ONE; 2],
            vec![Color::WHITE; 2],
        )
        .unwrap();
        let mut morph = MorphPopulation::new(population, 0.5);
        let mut bulk = morph.instances(&GlobalTransform::IDENTITY);
        morph.tick(
            ModeSnapshot::new(SceneMode::TreeShape, 0.0),
            &GlobalTransform::IDENTITY,
            &mut bulk,
        );
        for (id, slot) in bulk.instances().iter().enumerate() {
            let current = morph.population.current(id).unwrap().translation;
            assert!(slot.translation().distance(current) < 1e-5);
        }
    }


    #[test]
    fn mismatched_lengths_are_rejected() {
        let result = PosePopulation::new(
            "broken",
            &[EntityPose::point(Vec3::ZERO)],
            &[],
            vec![Vec3::ONE],
            vec![Color::WHITE],
        );
        assert!(result.is_err());
    }
}

mod world_placement {
    use super::*;

    #[test]
    fn populations_under_different_parents_keep_their_own_offset() {
        let lowered = GlobalTransform::from(Transform::from_xyz(0.0, -2.0, 0.0));
        let snapshot = ModeSnapshot::new(SceneMode::TreeShape, 0.0);
        let pose = [EntityPose::point(Vec3::Y)];

        let mut under_root = MorphPopulation::new(
            PosePopulation::new("root", &pose, &pose, vec![Vec3::ONE], vec![Color::WHITE]).unwrap(),
            0.1,
        );
        let mut at_origin = under_root.clone();

        let mut root_bulk = under_root.instances(&lowered);
        let mut origin_bulk = at_origin.instances(&GlobalTransform::IDENTITY);
        under_root.tick(snapshot, &lowered, &mut root_bulk);
        at_origin.tick(snapshot, &GlobalTransform::IDENTITY, &mut origin_bulk);

        assert!(root_bulk.instances()[0].translation().distance(Vec3::new(0.0, -1.0, 0.0)) < 1e-5);
        assert!(origin_bulk.instances()[0].translation().distance(Vec3::Y) < 1e-5);
    }

    #[test]
    fn normal_matrix_follows_parent_rotation() {
        let turned = GlobalTransform::from(Transform::from_rotation(
            bevy::math::Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        ));
        let pose = [EntityPose::point(Vec3::ZERO)];
        let morph = MorphPopulation::new(
            PosePopulation::new("turned", &pose, &pose, vec![Vec3::ONE], vec![Color::WHITE]).unwrap(),
            0.1,
        );
        let bulk = morph.instances(&turned);
        let normal = bulk.instances()[0].normal;
        // +X maps to -Z under a quarter turn about Y.
        assert!((normal[0][2] + 1.0).abs() < 1e-5);
    }
}
