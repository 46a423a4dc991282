use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use constants::class::{GIFT_PALETTE, ORNAMENT_PALETTE};
use constants::tree::{
    GIFT_SIZE_MIN, GIFT_SIZE_SPAN, ORNAMENT_BOX_FRACTION, ORNAMENT_SCALE_MIN, ORNAMENT_SCALE_SPAN,
};

use crate::engine::config::{SceneRng, TreeConfig};
use crate::engine::error::GenerationError;
use crate::engine::layout::{EntityPose, LayoutConfig, LayoutKind, generate};
use crate::engine::render::bulk::{MorphPopulation, PosePopulation};
use crate::engine::scene::TreeRoot;

/// Which bulk population an instanced entity draws.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkKind {
    OrnamentSpheres,
    OrnamentBoxes,
    Gifts,
    Snow,
    StarField,
}

impl BulkKind {
    pub fn label(self) -> &'static str {
        match self {
            BulkKind::OrnamentSpheres => "ornament_spheres",
            BulkKind::OrnamentBoxes => "ornament_boxes",
            BulkKind::Gifts => "gifts",
            BulkKind::Snow => "snow",
            BulkKind::StarField => "star_field",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrnamentShape {
    Sphere,
    Box,
}

/// Ornaments split by shape. Each keeps its own stable ids.
#[derive(Debug, Clone)]
pub struct OrnamentPopulations {
    pub spheres: PosePopulation,
    pub boxes: PosePopulation,
}

fn pick(palette: &[Color], rng: &mut fastrand::Rng) -> Color {
    palette
        .get(rng.usize(..palette.len().max(1)))
        .copied()
        .unwrap_or(Color::WHITE)
}

#[derive(Default)]
struct Partition {
    scatter: Vec<EntityPose>,
    target: Vec<EntityPose>,
    scale: Vec<Vec3>,
    color: Vec<Color>,
}

impl Partition {
    fn into_population(self, name: &'static str) -> Result<PosePopulation, GenerationError> {
        PosePopulation::new(name, &self.scatter, &self.target, self.scale, self.color)
    }
}

/// Draw every ornament's shape, colour and size, then both of its poses.
pub fn ornament_populations(
    count: usize,
    layout: &LayoutConfig,
    rng: &mut fastrand::Rng,
) -> Result<OrnamentPopulations, GenerationError> {
    let traits: Vec<(OrnamentShape, Color, f32)> = (0..count)
        .map(|_| {
            let shape = if rng.f32() > 1.0 - ORNAMENT_BOX_FRACTION {
                OrnamentShape::Box
            } else {
                OrnamentShape::Sphere
            };
            let color = pick(ORNAMENT_PALETTE, rng);
            let scale = ORNAMENT_SCALE_MIN + rng.f32() * ORNAMENT_SCALE_SPAN;
            (shape, color, scale)
        })
        .collect();

    let scatter = generate(count, LayoutKind::Scattered { tumble: true }, layout, rng);
    let target = generate(count, LayoutKind::OrnamentShell, layout, rng);

    let mut spheres = Partition::default();
    let mut boxes = Partition::default();
    for (((shape, color, scale), scatter), target) in traits.into_iter().zip(scatter).zip(target) {
        let bucket = match shape {
            OrnamentShape::Sphere => &mut spheres,
            OrnamentShape::Box => &mut boxes,
        };
        bucket.scatter.push(scatter);
        bucket.target.push(target);
        bucket.scale.push(Vec3::splat(scale));
        bucket.color.push(color);
    }

    Ok(OrnamentPopulations {
        spheres: spheres.into_population("ornament spheres")?,
        boxes: boxes.into_population("ornament boxes")?,
    })
}

/// Gift boxes: per-axis size first, so the floor ring can seat each box on its height.
pub fn gift_population(
    count: usize,
    layout: &LayoutConfig,
    rng: &mut fastrand::Rng,
) -> Result<PosePopulation, GenerationError> {
    let scale: Vec<Vec3> = (0..count)
        .map(|_| {
            Vec3::new(
                GIFT_SIZE_MIN + rng.f32() * GIFT_SIZE_SPAN,
                GIFT_SIZE_MIN + rng.f32() * GIFT_SIZE_SPAN,
                GIFT_SIZE_MIN + rng.f32() * GIFT_SIZE_SPAN,
            )
        })
        .collect();
    let color: Vec<Color> = (0..count).map(|_| pick(GIFT_PALETTE, rng)).collect();
    let heights: Vec<f32> = scale.iter().map(|s| s.y).collect();

    let scatter = generate(count, LayoutKind::Scattered { tumble: true }, layout, rng);
    let target = generate(
        count,
        LayoutKind::GiftRing {
            box_heights: &heights,
        },
        layout,
        rng,
    );

    PosePopulation::new("gifts", &scatter, &target, scale, color)
}

/// Spawn one instanced entity for a posed population.
///
/// The entity sits at the root's origin, so the root transform places the
/// first buffer until transform propagation catches up.
pub fn spawn_bulk_population(
    commands: &mut Commands,
    (root, root_transform): (Entity, &Transform),
    mesh: Handle<Mesh>,
    kind: BulkKind,
    morph: MorphPopulation,
) {
    let instances = morph.instances(&GlobalTransform::from(*root_transform));
    commands.spawn((
        Mesh3d(mesh),
        Transform::default(),
        Visibility::default(),
        NoFrustumCulling,
        Pickable::IGNORE,
        instances,
        morph,
        kind,
        ChildOf(root),
        Name::new(kind.label()),
    ));
}

pub fn spawn_ornaments_and_gifts(
    mut commands: Commands,
    config: Res<TreeConfig>,
    mut rng: ResMut<SceneRng>,
    mut meshes: ResMut<Assets<Mesh>>,
    roots: Query<(Entity, &Transform), With<TreeRoot>>,
    mut exit: EventWriter<AppExit>,
) {
    let Ok(root) = roots.single() else {
        warn!("No tree root; ornaments not spawned");
        return;
    };
    let layout = config.layout();

    let populations = ornament_populations(config.ornament_count, &layout, &mut rng.0)
        .and_then(|ornaments| {
            gift_population(config.gift_count, &layout, &mut rng.0).map(|gifts| (ornaments, gifts))
        });
    let (ornaments, gifts) = match populations {
        Ok(populations) => populations,
        Err(err) => {
            error!("Ornament generation failed: {err}");
            exit.write(AppExit::error());
            return;
        }
    };

    info!(
        "✓ Ornaments spawned: {} spheres, {} boxes, {} gifts",
        ornaments.spheres.len(),
        ornaments.boxes.len(),
        gifts.len()
    );

    let sphere = meshes.add(Sphere::new(1.0).mesh().uv(16, 16));
    let cube = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
    let rates = config.rates;

    spawn_bulk_population(
        &mut commands,
        root,
        sphere,
        BulkKind::OrnamentSpheres,
        MorphPopulation::new(ornaments.spheres, rates.ornaments),
    );
    spawn_bulk_population(
        &mut commands,
        root,
        cube.clone(),
        BulkKind::OrnamentBoxes,
        MorphPopulation::new(ornaments.boxes, rates.ornaments),
    );
    spawn_bulk_population(
        &mut commands,
        root,
        cube,
        BulkKind::Gifts,
        MorphPopulation::new(gifts, rates.gifts),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_ornament_lands_in_exactly_one_shape() {
        let mut rng = fastrand::Rng::with_seed(11);
        let pops = ornament_populations(250, &LayoutConfig::default(), &mut rng).unwrap();
        assert_eq!(pops.spheres.len() + pops.boxes.len(), 250);
        assert!(pops.boxes.len() > 30 && pops.boxes.len() < 130);
    }

    #[test]
    fn ornament_scales_stay_in_range() {
        let mut rng = fastrand::Rng::with_seed(12);
        let pops = ornament_populations(100, &LayoutConfig::default(), &mut rng).unwrap();
        for id in 0..pops.spheres.len() {
            let s = pops.spheres.scale(id).unwrap();
            assert!(s.x >= ORNAMENT_SCALE_MIN && s.x < ORNAMENT_SCALE_MIN + ORNAMENT_SCALE_SPAN);
            assert_eq!(s.x, s.z);
        }
    }

    #[test]
    fn gifts_start_scattered_and_target_the_floor() {
        let layout = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(13);
        let gifts = gift_population(30, &layout, &mut rng).unwrap();
        for id in 0..gifts.len() {
            assert_eq!(gifts.current(id), gifts.scatter(id));
            let target = gifts.target(id).unwrap();
            let half_height = gifts.scale(id).unwrap().y / 2.0;
            assert!((target.translation.y - half_height + layout.tree_height / 2.0).abs() < 1e-4);
        }
    }
}
