use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use bevy::window::PrimaryWindow;
use constants::procedural_shader::MAX_PIXEL_RATIO;

use crate::engine::config::{SceneRng, TreeConfig};
use crate::engine::layout::{LayoutConfig, LayoutKind, generate};
use crate::engine::mesh::point_index_mesh::{FoliageCloud, create_foliage_mesh};
use crate::engine::pose::step;
use crate::engine::render::foliage_material::{FoliageMaterial, FoliageParams};
use crate::engine::scene::TreeRoot;
use crate::engine::scene_mode::{ModeSnapshot, SceneMode};

/// Scalar blend between the scatter cloud (0) and the tree (1), eased on the GPU.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct FoliageMorph {
    pub factor: f32,
    pub rate: f32,
}

impl FoliageMorph {
    pub fn new(rate: f32) -> Self {
        Self { factor: 0.0, rate }
    }

    pub fn tick(&mut self, snapshot: ModeSnapshot) {
        self.factor = step(self.factor, snapshot.mode.morph_target(), self.rate);
    }
}

#[derive(Resource)]
pub struct FoliageMaterialHandle(pub Handle<FoliageMaterial>);

/// Per-point attributes of the foliage cloud.
#[derive(Debug, Clone, Default)]
pub struct FoliagePoints {
    pub tree: Vec<Vec3>,
    pub scatter: Vec<Vec3>,
    pub random: Vec<f32>,
}

impl FoliagePoints {
    pub fn generate(count: usize, layout: &LayoutConfig, rng: &mut fastrand::Rng) -> Self {
        let scatter = generate(count, LayoutKind::Scattered { tumble: false }, layout, rng);
        let tree = generate(count, LayoutKind::FoliageCone, layout, rng);
        Self {
            tree: tree.into_iter().map(|p| p.position).collect(),
            scatter: scatter.into_iter().map(|p| p.position).collect(),
            random: (0..count).map(|_| rng.f32()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

/// Device pixel ratio as the sprite sizing expects it.
pub fn pixel_ratio(scale_factor: f32) -> f32 {
    scale_factor.clamp(1.0, MAX_PIXEL_RATIO)
}

pub fn spawn_foliage(
    mut commands: Commands,
    config: Res<TreeConfig>,
    mut rng: ResMut<SceneRng>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<FoliageMaterial>>,
    roots: Query<Entity, With<TreeRoot>>,
) {
    let Ok(root) = roots.single() else {
        warn!("No tree root; foliage not spawned");
        return;
    };

    let points = FoliagePoints::generate(config.foliage_count, &config.layout(), &mut rng.0);
    let mesh = meshes.add(create_foliage_mesh(&points.tree, &points.scatter, &points.random));
    let material = materials.add(FoliageMaterial {
        params: FoliageParams {
            tree_height: config.tree_height,
            pixel_ratio: 1.0,
            ..default()
        },
    });

    commands.spawn((
        Mesh3d(mesh),
        MeshMaterial3d(material.clone()),
        Transform::default(),
        NoFrustumCulling,
        Pickable::IGNORE,
        FoliageCloud,
        ChildOf(root),
        Name::new("foliage"),
    ));
    commands.insert_resource(FoliageMaterialHandle(material));
    commands.insert_resource(FoliageMorph::new(config.rates.foliage));

    info!("✓ Foliage spawned: {} points", points.len());
}

pub fn tick_foliage_morph(
    mode: Res<SceneMode>,
    time: Res<Time>,
    morph: Option<ResMut<FoliageMorph>>,
) {
    if let Some(mut morph) = morph {
        morph.tick(ModeSnapshot::capture(&mode, &time));
    }
}

/// Push time, morph factor and pixel ratio into the material uniform.
pub fn sync_foliage_uniforms(
    morph: Option<Res<FoliageMorph>>,
    handle: Option<Res<FoliageMaterialHandle>>,
    time: Res<Time>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut materials: ResMut<Assets<FoliageMaterial>>,
) {
    let (Some(morph), Some(handle)) = (morph, handle) else {
        return;
    };
    let Some(material) = materials.get_mut(&handle.0) else {
        return;
    };

    let scale_factor = windows
        .single()
        .map(|window| window.scale_factor())
        .unwrap_or(1.0);

    material.params.time = time.elapsed_secs();
    material.params.morph_factor = morph.factor;
    material.params.pixel_ratio = pixel_ratio(scale_factor);
}
