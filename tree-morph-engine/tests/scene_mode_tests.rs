//! Mode toggling and the populations that follow it.

use bevy::math::Vec3;
use tree_morph_engine::engine::layout::LayoutConfig;
use tree_morph_engine::engine::scene::accents::{AccentKind, AccentMotion, doll_motions};
use tree_morph_engine::engine::scene::foliage::FoliageMorph;
use tree_morph_engine::engine::scene::ornaments::ornament_populations;
use tree_morph_engine::engine::scene_mode::{ModeSnapshot, SceneMode};

mod toggling {
    use super::*;

    #[test]
    fn starts_scattered_and_alternates() {
        let mut mode = SceneMode::default();
        assert_eq!(mode, SceneMode::Scattered);
        mode.toggle();
        assert_eq!(mode, SceneMode::TreeShape);
        assert_eq!(mode.as_str(), "tree_shape");
        mode.toggle();
        assert_eq!(mode, SceneMode::Scattered);
    }

    #[test]
    fn morph_target_tracks_mode() {
        assert_eq!(SceneMode::Scattered.morph_target(), 0.0);
        assert_eq!(SceneMode::TreeShape.morph_target(), 1.0);
    }
}

mod convergence {
    use super::*;

    #[test]
    fn ornaments_settle_on_the_tree() {
        let mut rng = fastrand::Rng::with_seed(99);
        let mut pops = ornament_populations(250, &LayoutConfig::default(), &mut rng).unwrap();
        let population = &mut pops.spheres;
        let initial: Vec<f32> = (0..population.len())
            .map(|id| {
                let current = population.current(id).unwrap().translation;
                current.distance(population.target(id).unwrap().translation)
            })
            .collect();

        for _ in 0..500 {
            population.step_all(SceneMode::TreeShape, 0.04);
        }

        for (id, start) in initial.iter().enumerate() {
            let current = population.current(id).unwrap().translation;
            let remaining = current.distance(population.target(id).unwrap().translation);
            assert!(remaining <= start * 0.01 + 1e-4);
        }
    }

    #[test]
    fn foliage_factor_follows_mode() {
        let mut morph = FoliageMorph::new(0.03);
        for _ in 0..500 {
            morph.tick(ModeSnapshot::new(SceneMode::TreeShape, 0.0));
        }
        assert!(morph.factor > 0.99 && morph.factor <= 1.0);
        for _ in 0..500 {
            morph.tick(ModeSnapshot::new(SceneMode::Scattered, 0.0));
        }
        assert!(morph.factor < 0.01 && morph.factor >= 0.0);
    }
}

mod accents {
    use super::*;

    #[test]
    fn scattered_dolls_keep_spinning() {
        let mut rng = fastrand::Rng::with_seed(17);
        let mut dolls = doll_motions(15, &LayoutConfig::default(), 0.04, &mut rng);
        let doll = &mut dolls[0];
        let before = doll.current.rotation;
        doll.tick(ModeSnapshot::new(SceneMode::Scattered, 0.0));
        assert!((doll.current.rotation.x - before.x - 0.01).abs() < 1e-6);
        assert!((doll.current.rotation.y - before.y - 0.01).abs() < 1e-6);
    }

    #[test]
    fn assembled_dolls_face_outward() {
        let mut rng = fastrand::Rng::with_seed(18);
        let mut dolls = doll_motions(15, &LayoutConfig::default(), 0.04, &mut rng);
        for doll in &mut dolls {
            assert!(matches!(doll.kind, AccentKind::Doll(_)));
            for _ in 0..600 {
                doll.tick(ModeSnapshot::new(SceneMode::TreeShape, 0.0));
            }
            assert!(doll.current.rotation.distance(doll.target.rotation) < 1e-3);
        }
    }

    #[test]
    fn star_wobbles_with_time() {
        let mut star = AccentMotion::star(12.0, 0.05);
        star.tick(ModeSnapshot::new(SceneMode::TreeShape, 0.75));
        assert!((star.current.rotation.z - (1.5_f32).sin() * 0.1).abs() < 1e-6);
        assert!((star.current.rotation.y - 0.01).abs() < 1e-6);
        let expected = Vec3::new(10.0, 20.0, -10.0).lerp(Vec3::new(0.0, 6.5, 0.0), 0.05);
        assert!(star.current.translation.distance(expected) < 1e-4);
    }
}
