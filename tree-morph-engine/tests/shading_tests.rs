//! Foliage shading math, mirrored from the vertex and fragment stages.

use bevy::math::Vec3;
use tree_morph_engine::engine::shading::{
    BOTTOM_COLOR, FoliageUniforms, TOP_COLOR, displaced_position, ease, height_color,
    noise_amplitude, point_size, simplex_noise_3d,
};

mod easing {
    use super::*;

    #[test]
    fn fixed_points() {
        assert_eq!(ease(0.0), 0.0);
        assert_eq!(ease(1.0), 1.0);
        assert!((ease(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn monotone_on_unit_interval() {
        let mut previous = 0.0;
        for i in 1..=100 {
            let value = ease(i as f32 / 100.0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn wind_grows_as_tree_forms() {
        assert!((noise_amplitude(0.0) - 0.075).abs() < 1e-6);
        assert!((noise_amplitude(1.0) - 0.15).abs() < 1e-6);
    }
}

mod noise {
    use super::*;

    #[test]
    fn bounded_and_deterministic() {
        for i in 0..2_000 {
            let p = Vec3::new(i as f32 * 0.173, (i % 37) as f32 * 0.41, (i % 11) as f32 * 1.7);
            let n = simplex_noise_3d(p);
            assert!(n.abs() <= 1.1, "noise {n} at {p}");
            assert_eq!(n, simplex_noise_3d(p));
        }
    }

    #[test]
    fn not_constant() {
        let a = simplex_noise_3d(Vec3::new(0.3, 0.7, 0.1));
        let b = simplex_noise_3d(Vec3::new(2.3, 1.7, 5.1));
        assert_ne!(a, b);
    }
}

mod vertex {
    use super::*;

    #[test]
    fn assembled_points_hover_near_target() {
        let uniforms = FoliageUniforms {
            time: 3.2,
            morph_factor: 1.0,
            pixel_ratio: 1.0,
            tree_height: 12.0,
        };
        let target = Vec3::new(1.0, 2.0, -0.5);
        let p = displaced_position(Vec3::new(20.0, -5.0, 3.0), target, &uniforms);
        assert!(p.distance(target) < 0.3);
    }

    #[test]
    fn sprites_shrink_with_distance() {
        let near = point_size(0.5, 1.0, -10.0);
        let far = point_size(0.5, 1.0, -20.0);
        assert!((near - 2.0 * far).abs() < 1e-4);
        assert!(point_size(1.0, 1.0, -10.0) > point_size(0.0, 1.0, -10.0));
    }

    #[test]
    fn height_gradient_is_clamped() {
        assert!(height_color(-100.0, 12.0).distance(BOTTOM_COLOR) < 1e-6);
        assert!(height_color(100.0, 12.0).distance(TOP_COLOR) < 1e-6);
    }
}

mod shader_constants {
    use std::collections::HashMap;

    use constants::procedural_shader::{
        GLIMMER_PHASE_SPREAD, GLIMMER_SPEED, GLIMMER_THRESHOLD, NOISE_AMPLITUDE,
        NOISE_AXIS_OFFSETS, NOISE_FREQUENCY, NOISE_TIME_SCALE, POINT_SIZE, SPRITE_RADIUS,
        SPRITE_SOFT_EDGE,
    };
    use tree_morph_engine::engine::shading::{BOTTOM_COLOR, GLIMMER_GOLD, TOP_COLOR};

    const FOLIAGE_WGSL: &str = include_str!("../assets/shaders/foliage.wgsl");

    /// Module-scope `const NAME: type = value;` declarations, values flattened.
    /// Accepts scalar literals (`0.15`, `40.0`) and `vec3<f32>(a, b, c)`.
    fn wgsl_consts(source: &str) -> HashMap<String, Vec<f32>> {
        source
            .lines()
            .filter_map(|line| line.strip_prefix("const "))
            .map(|decl| {
                let (name, rest) = decl.split_once(':').expect("const without type");
                let (_, value) = rest.split_once('=').expect("const without value");
                let value = value.trim().trim_end_matches(';').trim();
                let components = match value.split_once('(') {
                    Some((_, args)) => args.trim_end_matches(')').split(',').collect(),
                    None => vec![value],
                };
                let parsed = components
                    .into_iter()
                    .map(|c| c.trim().parse::<f32>().expect("non-numeric const"))
                    .collect();
                (name.trim().to_string(), parsed)
            })
            .collect()
    }

    fn expected() -> Vec<(&'static str, Vec<f32>)> {
        vec![
            ("NOISE_FREQUENCY", vec![NOISE_FREQUENCY]),
            ("NOISE_TIME_SCALE", vec![NOISE_TIME_SCALE]),
            ("NOISE_AXIS_OFFSETS", NOISE_AXIS_OFFSETS.to_vec()),
            ("NOISE_AMPLITUDE", vec![NOISE_AMPLITUDE]),
            ("POINT_SIZE", vec![POINT_SIZE]),
            ("GLIMMER_SPEED", vec![GLIMMER_SPEED]),
            ("GLIMMER_PHASE_SPREAD", vec![GLIMMER_PHASE_SPREAD]),
            ("GLIMMER_THRESHOLD", vec![GLIMMER_THRESHOLD]),
            ("BOTTOM_COLOR", BOTTOM_COLOR.to_array().to_vec()),
            ("TOP_COLOR", TOP_COLOR.to_array().to_vec()),
            ("GLIMMER_GOLD", GLIMMER_GOLD.to_array().to_vec()),
            ("SPRITE_RADIUS", vec![SPRITE_RADIUS]),
            ("SPRITE_SOFT_EDGE", vec![SPRITE_SOFT_EDGE]),
        ]
    }

    #[test]
    fn parser_reads_scalars_and_vectors() {
        let source = "const A: f32 = 0.15;\nconst B: vec3<f32> = vec3<f32>(1.0, 0.08, 40.0);\n";
        let parsed = wgsl_consts(source);
        assert_eq!(parsed["A"], vec![0.15]);
        assert_eq!(parsed["B"], vec![1.0, 0.08, 40.0]);
    }

    #[test]
    fn shader_literals_match_rust_constants() {
        let parsed = wgsl_consts(FOLIAGE_WGSL);
        for (name, values) in expected() {
            let Some(shader) = parsed.get(name) else {
                panic!("foliage.wgsl does not declare {name}");
            };
            assert_eq!(shader, &values, "{name} differs between foliage.wgsl and Rust");
        }
    }

    #[test]
    fn every_shader_constant_has_a_rust_counterpart() {
        let known: Vec<&str> = expected().into_iter().map(|(name, _)| name).collect();
        for name in wgsl_consts(FOLIAGE_WGSL).keys() {
            assert!(known.contains(&name.as_str()), "{name} has no Rust counterpart");
        }
    }
}
