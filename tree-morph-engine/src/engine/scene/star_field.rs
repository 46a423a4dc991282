use std::f32::consts::TAU;

use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use constants::class::{STAR_FIELD_COLOR, STAR_FIELD_GLOW};
use constants::tree::{
    STAR_FIELD_DEPTH, STAR_FIELD_RADIUS, STAR_FIELD_SIZE, STAR_FIELD_TWINKLE_BASE,
    STAR_FIELD_TWINKLE_PHASE, STAR_FIELD_TWINKLE_SPEED,
};

use crate::engine::config::{SceneRng, TreeConfig};
use crate::engine::render::bulk::{BulkInstances, InstanceData};
use crate::engine::scene::ornaments::BulkKind;

/// Static backdrop stars. Positions never move; only the size pulses.
#[derive(Component, Debug, Clone)]
pub struct StarField {
    positions: Vec<Vec3>,
    sizes: Vec<f32>,
}

impl StarField {
    /// Walk the shell radius inward from `RADIUS + DEPTH` by a random fraction
    /// of `DEPTH / count` per star, so the outer shell is the densest.
    pub fn new(count: usize, rng: &mut fastrand::Rng) -> Self {
        let increment = STAR_FIELD_DEPTH / count.max(1) as f32;
        let mut radius = STAR_FIELD_RADIUS + STAR_FIELD_DEPTH;
        let mut positions = Vec::with_capacity(count);
        let mut sizes = Vec::with_capacity(count);
        for _ in 0..count {
            radius -= increment * rng.f32();
            let polar = (1.0 - 2.0 * rng.f32()).acos();
            let azimuth = rng.f32() * TAU;
            positions.push(Vec3::new(
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
                radius * polar.sin() * azimuth.cos(),
            ));
            sizes.push((0.5 + 0.5 * rng.f32()) * STAR_FIELD_SIZE);
        }
        Self { positions, sizes }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Radius of star `id` at `elapsed_secs`.
    pub fn twinkle_size(&self, id: usize, elapsed_secs: f32) -> f32 {
        let phase = self.positions[id].x
            + STAR_FIELD_TWINKLE_SPEED * elapsed_secs
            + STAR_FIELD_TWINKLE_PHASE;
        self.sizes[id] * (STAR_FIELD_TWINKLE_BASE + phase.sin()) / STAR_FIELD_TWINKLE_BASE
    }

    fn instance_at(
        &self,
        id: usize,
        world: Mat4,
        elapsed_secs: f32,
        color: LinearRgba,
    ) -> InstanceData {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(self.twinkle_size(id, elapsed_secs)),
            Quat::IDENTITY,
            self.positions[id],
        );
        InstanceData::from_model(world * model, color)
    }

    pub fn instance_data(&self, world: Mat4, elapsed_secs: f32) -> Vec<InstanceData> {
        let color = glow_color();
        (0..self.len())
            .map(|id| self.instance_at(id, world, elapsed_secs, color))
            .collect()
    }

    pub fn tick(&self, elapsed_secs: f32, world: &GlobalTransform, bulk: &mut BulkInstances) {
        let world = world.compute_matrix();
        let color = glow_color();
        let mut slots = bulk.write();
        for (id, slot) in slots.iter_mut().enumerate().take(self.len()) {
            *slot = self.instance_at(id, world, elapsed_secs, color);
        }
    }
}

fn glow_color() -> LinearRgba {
    let base = LinearRgba::from(STAR_FIELD_COLOR);
    LinearRgba::rgb(
        base.red * STAR_FIELD_GLOW,
        base.green * STAR_FIELD_GLOW,
        base.blue * STAR_FIELD_GLOW,
    )
}

pub fn spawn_star_field(
    mut commands: Commands,
    config: Res<TreeConfig>,
    mut rng: ResMut<SceneRng>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if config.star_count == 0 {
        return;
    }

    let field = StarField::new(config.star_count, &mut rng.0);
    let bulk = BulkInstances::new(field.instance_data(Mat4::IDENTITY, 0.0));
    let star = meshes.add(Sphere::new(1.0).mesh().ico(0).unwrap_or_else(|err| {
        warn!("Falling back to UV sphere for backdrop stars: {err}");
        Sphere::new(1.0).mesh().uv(4, 3)
    }));

    info!("✓ Star field spawned: {} stars", field.len());
    commands.spawn((
        Mesh3d(star),
        Transform::default(),
        Visibility::default(),
        NoFrustumCulling,
        Pickable::IGNORE,
        bulk,
        field,
        BulkKind::StarField,
        Name::new(BulkKind::StarField.label()),
    ));
}

pub fn tick_star_field(
    time: Res<Time>,
    mut fields: Query<(&StarField, &GlobalTransform, &mut BulkInstances)>,
) {
    let elapsed = time.elapsed_secs();
    for (field, world, mut bulk) in &mut fields {
        field.tick(elapsed, world, &mut bulk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_stay_inside_the_shell() {
        let mut rng = fastrand::Rng::with_seed(12);
        let field = StarField::new(5_000, &mut rng);
        for p in field.positions() {
            let r = p.length();
            assert!(r >= STAR_FIELD_RADIUS - 1e-3);
            assert!(r <= STAR_FIELD_RADIUS + STAR_FIELD_DEPTH + 1e-3);
        }
    }

    #[test]
    fn shell_radius_only_shrinks() {
        let mut rng = fastrand::Rng::with_seed(13);
        let field = StarField::new(300, &mut rng);
        for pair in field.positions().windows(2) {
            assert!(pair[1].length() <= pair[0].length() + 1e-3);
        }
    }

    #[test]
    fn twinkle_stays_within_one_part_in_thirty() {
        let mut rng = fastrand::Rng::with_seed(14);
        let field = StarField::new(50, &mut rng);
        for id in 0..field.len() {
            let base = field.sizes[id];
            for step in 0..40 {
                let size = field.twinkle_size(id, step as f32 * 0.1);
                assert!((size - base).abs() <= base / STAR_FIELD_TWINKLE_BASE + 1e-6);
            }
        }
    }

    #[test]
    fn tick_marks_dirty_once() {
        let mut rng = fastrand::Rng::with_seed(15);
        let field = StarField::new(40, &mut rng);
        let mut bulk = BulkInstances::new(field.instance_data(Mat4::IDENTITY, 0.0));
        field.tick(1.0, &GlobalTransform::IDENTITY, &mut bulk);
        assert_eq!(bulk.revision(), 1);
        assert_eq!(bulk.len(), 40);
    }
}
