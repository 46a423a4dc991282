use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use constants::class::SNOW_COLOR;
use constants::tree::{SNOW_EXTENT, SNOW_FALL_MIN, SNOW_FALL_SPAN, SNOW_FLAKE_SIZE, SNOW_SWAY};

use crate::engine::config::{SceneRng, TreeConfig};
use crate::engine::render::bulk::{BulkInstances, InstanceData};
use crate::engine::scene::ornaments::BulkKind;

/// Falling flakes with constant per-flake velocity. Independent of the scene mode.
#[derive(Component, Debug, Clone)]
pub struct SnowField {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    rng: fastrand::Rng,
}

impl SnowField {
    pub fn new(count: usize, rng: &mut fastrand::Rng) -> Self {
        let positions = (0..count)
            .map(|_| {
                Vec3::new(
                    (rng.f32() - 0.5) * SNOW_EXTENT,
                    (rng.f32() - 0.5) * SNOW_EXTENT,
                    (rng.f32() - 0.5) * SNOW_EXTENT,
                )
            })
            .collect();
        let velocities = (0..count)
            .map(|_| {
                Vec3::new(
                    (rng.f32() - 0.5) * SNOW_SWAY,
                    -SNOW_FALL_MIN - rng.f32() * SNOW_FALL_SPAN,
                    (rng.f32() - 0.5) * SNOW_SWAY,
                )
            })
            .collect();
        Self {
            positions,
            velocities,
            rng: rng.fork(),
        }
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

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Move every flake by its velocity; flakes below the floor re-enter at the top.
    pub fn step(&mut self) {
        let half = SNOW_EXTENT / 2.0;
        for (position, velocity) in self.positions.iter_mut().zip(&self.velocities) {
            *position += *velocity;
            if position.y < -half {
                position.y = half;
                position.x = (self.rng.f32() - 0.5) * SNOW_EXTENT;
                position.z = (self.rng.f32() - 0.5) * SNOW_EXTENT;
            }
        }
    }

    pub fn instance_data(&self, world: Mat4) -> Vec<InstanceData> {
        let color = LinearRgba::from(SNOW_COLOR);
        self.positions
            .iter()
            .map(|p| InstanceData::from_model(world * Mat4::from_translation(*p), color))
            .collect()
    }

    /// Advance one tick and rewrite every slot, marking the buffer dirty once.
    pub fn tick(&mut self, world: &GlobalTransform, bulk: &mut BulkInstances) {
        self.step();
        let world = world.compute_matrix();
        let color = LinearRgba::from(SNOW_COLOR);
        let mut slots = bulk.write();
        for (slot, position) in slots.iter_mut().zip(&self.positions) {
            *slot = InstanceData::from_model(world * Mat4::from_translation(*position), color);
        }
    }
}

pub fn spawn_snow(
    mut commands: Commands,
    config: Res<TreeConfig>,
    mut rng: ResMut<SceneRng>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let field = SnowField::new(config.snow_count, &mut rng.0);
    let bulk = BulkInstances::new(field.instance_data(Mat4::IDENTITY));
    let flake = meshes.add(Sphere::new(SNOW_FLAKE_SIZE).mesh().ico(1).unwrap_or_else(|err| {
        warn!("Falling back to UV sphere for snow: {err}");
        Sphere::new(SNOW_FLAKE_SIZE).mesh().uv(6, 4)
    }));

    info!("✓ Snow spawned: {} flakes", field.len());
    commands.spawn((
        Mesh3d(flake),
        Transform::default(),
        Visibility::default(),
        NoFrustumCulling,
        Pickable::IGNORE,
        bulk,
        field,
        BulkKind::Snow,
        Name::new(BulkKind::Snow.label()),
    ));
}

pub fn tick_snow(mut fields: Query<(&mut SnowField, &GlobalTransform, &mut BulkInstances)>) {
    for (mut field, world, mut bulk) in &mut fields {
        field.tick(world, &mut bulk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flakes_always_fall() {
        let mut rng = fastrand::Rng::with_seed(5);
        let field = SnowField::new(500, &mut rng);
        for v in field.velocities() {
            assert!(v.y <= -SNOW_FALL_MIN && v.y >= -SNOW_FALL_MIN - SNOW_FALL_SPAN);
            assert!(v.x.abs() <= SNOW_SWAY / 2.0 && v.z.abs() <= SNOW_SWAY / 2.0);
        }
    }

    #[test]
    fn flakes_stay_inside_the_volume() {
        let mut rng = fastrand::Rng::with_seed(6);
        let mut field = SnowField::new(200, &mut rng);
        for _ in 0..2_000 {
            field.step();
        }
        let half = SNOW_EXTENT / 2.0;
        for p in field.positions() {
            assert!(p.y >= -half - SNOW_FALL_MIN - SNOW_FALL_SPAN && p.y <= half);
        }
    }

    #[test]
    fn tick_marks_dirty_once() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut field = SnowField::new(50, &mut rng);
        let mut bulk = BulkInstances::new(field.instance_data(Mat4::IDENTITY));
        field.tick(&GlobalTransform::IDENTITY, &mut bulk);
        assert_eq!(bulk.revision(), 1);
    }

    #[test]
    fn slots_are_placed_by_the_field_transform() {
        let mut rng = fastrand::Rng::with_seed(8);
        let mut field = SnowField::new(20, &mut rng);
        let mut bulk = BulkInstances::new(field.instance_data(Mat4::IDENTITY));
        let world = GlobalTransform::from(Transform::from_xyz(3.0, 1.0, 0.0));
        field.tick(&world, &mut bulk);
        for (slot, position) in bulk.instances().iter().zip(field.positions()) {
            let expected = *position + Vec3::new(3.0, 1.0, 0.0);
            assert!(slot.translation().distance(expected) < 1e-5);
        }
    }
}
