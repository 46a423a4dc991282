//! CPU side of the bulk instance renderer.
//!
//! A bulk population is stored struct-of-arrays and indexed by a stable id:
//! the GPU slot for entity `i` is always slot `i`. Each tick writes every slot
//! and then marks the buffer dirty exactly once through [`BulkWrite`].
//!
//! Slots hold world-space matrices: the owning entity's `GlobalTransform` is
//! folded into every instance on the CPU, so the shader never reads the
//! per-mesh uniform.

use bevy::color::ColorToComponents;
use bevy::prelude::*;
use bytemuck::{Pod, Zeroable};

use crate::engine::error::GenerationError;
use crate::engine::layout::EntityPose;
use crate::engine::pose::{Pose, step};
use crate::engine::scene_mode::{ModeSnapshot, SceneMode};

/// Per-instance vertex data: model matrix, normal matrix and linear colour.
/// Eight `vec4`s, 128 bytes, read at shader locations 3..=10.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub color: [f32; 4],
}

impl InstanceData {
    /// Compose `world * T * R(XYZ) * S` for a pose and per-axis scale.
    pub fn from_pose(world: Mat4, pose: &Pose, scale: Vec3, color: LinearRgba) -> Self {
        let local = Mat4::from_scale_rotation_translation(scale, pose.quat(), pose.translation);
        Self::from_model(world * local, color)
    }

    pub fn from_model(model: Mat4, color: LinearRgba) -> Self {
        let linear = Mat3::from_mat4(model);
        let normal = if linear.determinant().abs() > f32::EPSILON {
            linear.inverse().transpose()
        } else {
            Mat3::IDENTITY
        };
        Self {
            model: model.to_cols_array_2d(),
            normal: [
                normal.x_axis.extend(0.0).to_array(),
                normal.y_axis.extend(0.0).to_array(),
                normal.z_axis.extend(0.0).to_array(),
            ],
            color: color.to_f32_array(),
        }
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::from_slice(&self.model[3][..3])
    }
}

/// Flat GPU instance array plus a revision counter the render world compares
/// against to decide whether to upload.
#[derive(Component, Debug, Default, Clone)]
pub struct BulkInstances {
    instances: Vec<InstanceData>,
    revision: u64,
}

impl BulkInstances {
    pub fn new(instances: Vec<InstanceData>) -> Self {
        Self {
            instances,
            revision: 0,
        }
    }

    pub fn instances(&self) -> &[InstanceData] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Open a batch write over every slot. The buffer is marked dirty once
    /// when the returned guard drops, however many slots were written.
    pub fn write(&mut self) -> BulkWrite<'_> {
        BulkWrite { bulk: self }
    }
}

/// Write guard over a [`BulkInstances`] buffer.
pub struct BulkWrite<'a> {
    bulk: &'a mut BulkInstances,
}

impl std::ops::Deref for BulkWrite<'_> {
    type Target = [InstanceData];

    fn deref(&self) -> &Self::Target {
        &self.bulk.instances
    }
}

impl std::ops::DerefMut for BulkWrite<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.bulk.instances
    }
}

impl Drop for BulkWrite<'_> {
    fn drop(&mut self) {
        self.bulk.revision = self.bulk.revision.wrapping_add(1);
    }
}

/// Struct-of-arrays storage for a posed population.
///
/// `scatter` and `target` are fixed at creation. `current` starts at the
/// scatter pose and is only ever moved by [`PosePopulation::step_all`].
#[derive(Debug, Clone)]
pub struct PosePopulation {
    scatter: Vec<Pose>,
    target: Vec<Pose>,
    current: Vec<Pose>,
    scale: Vec<Vec3>,
    color: Vec<LinearRgba>,
}

impl PosePopulation {
    pub fn new(
        name: &'static str,
        scatter: &[EntityPose],
        target: &[EntityPose],
        scale: Vec<Vec3>,
        color: Vec<Color>,
    ) -> Result<Self, GenerationError> {
        let expected = scatter.len();
        for actual in [target.len(), scale.len(), color.len()] {
            if actual != expected {
                return Err(GenerationError::LengthMismatch {
                    population: name,
                    expected,
                    actual,
                });
            }
        }

        let scatter: Vec<Pose> = scatter.iter().map(EntityPose::pose).collect();
        Ok(Self {
            current: scatter.clone(),
            scatter,
            target: target.iter().map(EntityPose::pose).collect(),
            scale,
            color: color.into_iter().map(LinearRgba::from).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn scatter(&self, id: usize) -> Option<&Pose> {
        self.scatter.get(id)
    }

    pub fn target(&self, id: usize) -> Option<&Pose> {
        self.target.get(id)
    }

    pub fn current(&self, id: usize) -> Option<&Pose> {
        self.current.get(id)
    }

    pub fn scale(&self, id: usize) -> Option<Vec3> {
        self.scale.get(id).copied()
    }

    /// Goal pose of entity `id` under `mode`.
    pub fn goal(&self, id: usize, mode: SceneMode) -> Option<&Pose> {
        mode.select(self.scatter.get(id), self.target.get(id))
    }

    /// Move every entity one step toward its goal for `mode`.
    pub fn step_all(&mut self, mode: SceneMode, rate: f32) {
        let goals = mode.select(&self.scatter, &self.target);
        for (current, goal) in self.current.iter_mut().zip(goals) {
            *current = step(*current, *goal, rate);
        }
    }

    /// GPU instance data for every entity at its current pose, placed by `world`.
    pub fn instance_data(&self, world: Mat4) -> Vec<InstanceData> {
        (0..self.len()).map(|i| self.instance_at(i, world)).collect()
    }

    fn instance_at(&self, id: usize, world: Mat4) -> InstanceData {
        InstanceData::from_pose(world, &self.current[id], self.scale[id], self.color[id])
    }

    /// Write the current pose of every entity into its slot of `out`.
    pub fn write_slots(&self, world: Mat4, out: &mut [InstanceData]) {
        for (id, slot) in out.iter_mut().enumerate().take(self.len()) {
            *slot = self.instance_at(id, world);
        }
    }
}

/// A posed population and the rate it eases at.
#[derive(Component, Debug, Clone)]
pub struct MorphPopulation {
    pub population: PosePopulation,
    pub rate: f32,
}

impl MorphPopulation {
    pub fn new(population: PosePopulation, rate: f32) -> Self {
        Self { population, rate }
    }

    /// Initial instance buffer matching the scatter pose.
    pub fn instances(&self, world: &GlobalTransform) -> BulkInstances {
        BulkInstances::new(self.population.instance_data(world.compute_matrix()))
    }

    /// Step every entity toward its goal, rewrite every slot, mark dirty once.
    pub fn tick(
        &mut self,
        snapshot: ModeSnapshot,
        world: &GlobalTransform,
        bulk: &mut BulkInstances,
    ) {
        self.population.step_all(snapshot.mode, self.rate);
        let mut slots = bulk.write();
        self.population.write_slots(world.compute_matrix(), &mut slots);
    }
}

pub fn tick_morph_populations(
    mode: Res<SceneMode>,
    time: Res<Time>,
    mut populations: Query<(&mut MorphPopulation, &GlobalTransform, &mut BulkInstances)>,
) {
    let snapshot = ModeSnapshot::capture(&mode, &time);
    for (mut population, world, mut bulk) in &mut populations {
        population.tick(snapshot, world, &mut bulk);
    }
}
