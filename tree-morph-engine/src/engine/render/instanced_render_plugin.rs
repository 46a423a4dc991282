use crate::engine::render::bulk::{BulkInstances, InstanceData};
use bevy::{
    core_pipeline::core_3d::Transparent3d,
    ecs::{
        query::QueryItem,
        system::{SystemParamItem, lifetimeless::*},
    },
    pbr::{
        MeshPipeline, MeshPipelineKey, RenderMeshInstances, SetMeshBindGroup, SetMeshViewBindGroup,
    },
    prelude::*,
    render::{
        Render, RenderApp, RenderSet,
        extract_component::{ExtractComponent, ExtractComponentPlugin},
        mesh::{
            MeshVertexBufferLayoutRef, RenderMesh, RenderMeshBufferInfo, allocator::MeshAllocator,
        },
        render_asset::RenderAssets,
        render_phase::{
            AddRenderCommand, DrawFunctions, PhaseItem, PhaseItemExtraIndex, RenderCommand,
            RenderCommandResult, SetItemPipeline, TrackedRenderPass, ViewSortedRenderPhases,
        },
        render_resource::*,
        renderer::{RenderDevice, RenderQueue},
        sync_world::MainEntity,
        view::ExtractedView,
    },
};

const BULK_INSTANCE_SHADER_PATH: &str = "shaders/bulk_instances.wgsl";

/// First shader location of the per-instance attributes; 0..=2 belong to the mesh.
const INSTANCE_LOCATION_BASE: u32 = 3;

/// Draws every entity carrying [`BulkInstances`] with one instanced draw call,
/// uploading its instance buffer only when the main world bumped the revision.
pub struct InstancedBulkRenderPlugin;

impl Plugin for InstancedBulkRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ExtractComponentPlugin::<BulkInstances>::default());

        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };

        render_app
            .add_render_command::<Transparent3d, DrawBulkInstances>()
            .init_resource::<SpecializedMeshPipelines<BulkInstancePipeline>>()
            .add_systems(
                Render,
                (
                    queue_bulk_instances.in_set(RenderSet::QueueMeshes),
                    prepare_instance_buffers.in_set(RenderSet::PrepareResources),
                ),
            );
    }

    fn finish(&self, app: &mut App) {
        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };
        render_app.init_resource::<BulkInstancePipeline>();
    }
}

/// Render-world copy of a bulk population's instances.
#[derive(Component, Clone)]
pub struct ExtractedBulkInstances {
    pub revision: u64,
    pub instances: Vec<InstanceData>,
}

impl ExtractComponent for BulkInstances {
    type QueryData = &'static BulkInstances;
    type QueryFilter = ();
    type Out = ExtractedBulkInstances;

    fn extract_component(item: QueryItem<'_, Self::QueryData>) -> Option<Self::Out> {
        Some(ExtractedBulkInstances {
            revision: item.revision(),
            instances: item.instances().to_vec(),
        })
    }
}

/// GPU vertex buffer holding one population's instances.
#[derive(Component)]
pub struct BulkInstanceBuffer {
    pub buffer: Buffer,
    pub length: usize,
    pub revision: u64,
}

/// What the prepare stage has to do with an extracted population this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    /// Nothing to draw.
    Skip,
    /// No buffer yet, or the population changed size.
    Create,
    /// Same size, new revision: overwrite in place.
    Write,
    /// Same revision as last upload.
    Keep,
}

pub fn plan_upload(existing: Option<(usize, u64)>, length: usize, revision: u64) -> UploadAction {
    if length == 0 {
        return UploadAction::Skip;
    }
    match existing {
        None => UploadAction::Create,
        Some((current_length, _)) if current_length != length => UploadAction::Create,
        Some((_, uploaded)) if uploaded == revision => UploadAction::Keep,
        Some(_) => UploadAction::Write,
    }
}

#[derive(Resource)]
struct BulkInstancePipeline {
    shader: Handle<Shader>,
    mesh_pipeline: MeshPipeline,
}

impl FromWorld for BulkInstancePipeline {
    fn from_world(world: &mut World) -> Self {
        let mesh_pipeline = world.resource::<MeshPipeline>();

        Self {
            shader: world.load_asset(BULK_INSTANCE_SHADER_PATH),
            mesh_pipeline: mesh_pipeline.clone(),
        }
    }
}

impl SpecializedMeshPipeline for BulkInstancePipeline {
    type Key = MeshPipelineKey;

    fn specialize(
        &self,
        key: Self::Key,
        layout: &MeshVertexBufferLayoutRef,
    ) -> Result<RenderPipelineDescriptor, SpecializedMeshPipelineError> {
        let mut descriptor = self.mesh_pipeline.specialize(key, layout)?;
        descriptor.label = Some("bulk_instance_pipeline".into());
        descriptor.vertex.shader = self.shader.clone();

        // Model matrix columns, normal matrix columns, colour.
        let attributes = (0..8u32)
            .map(|column| VertexAttribute {
                format: VertexFormat::Float32x4,
                offset: column as u64 * 16,
                shader_location: INSTANCE_LOCATION_BASE + column,
            })
            .collect();

        descriptor.vertex.buffers.push(VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as u64,
            step_mode: VertexStepMode::Instance,
            attributes,
        });

        if let Some(fragment) = descriptor.fragment.as_mut() {
            fragment.shader = self.shader.clone();
        }

        Ok(descriptor)
    }
}

fn prepare_instance_buffers(
    mut commands: Commands,
    mut query: Query<(
        Entity,
        &ExtractedBulkInstances,
        Option<&mut BulkInstanceBuffer>,
    )>,
    render_device: Res<RenderDevice>,
    render_queue: Res<RenderQueue>,
) {
    for (entity, extracted, existing) in &mut query {
        let state = existing.as_ref().map(|b| (b.length, b.revision));
        match plan_upload(state, extracted.instances.len(), extracted.revision) {
            UploadAction::Skip => {
                if existing.is_some() {
                    commands.entity(entity).remove::<BulkInstanceBuffer>();
                }
            }
            UploadAction::Create => {
                let buffer = render_device.create_buffer_with_data(&BufferInitDescriptor {
                    label: Some("bulk_instance_buffer"),
                    contents: bytemuck::cast_slice(extracted.instances.as_slice()),
                    usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
                });
                commands.entity(entity).insert(BulkInstanceBuffer {
                    buffer,
                    length: extracted.instances.len(),
                    revision: extracted.revision,
                });
            }
            UploadAction::Write => {
                if let Some(mut instance_buffer) = existing {
                    render_queue.write_buffer(
                        &instance_buffer.buffer,
                        0,
                        bytemuck::cast_slice(extracted.instances.as_slice()),
                    );
                    instance_buffer.revision = extracted.revision;
                }
            }
            UploadAction::Keep => {}
        }
    }
}

fn queue_bulk_instances(
    transparent_3d_draw_functions: Res<DrawFunctions<Transparent3d>>,
    bulk_pipeline: Res<BulkInstancePipeline>,
    mut pipelines: ResMut<SpecializedMeshPipelines<BulkInstancePipeline>>,
    pipeline_cache: Res<PipelineCache>,
    meshes: Res<RenderAssets<RenderMesh>>,
    render_mesh_instances: Res<RenderMeshInstances>,
    bulk_meshes: Query<(Entity, &MainEntity), With<ExtractedBulkInstances>>,
    mut transparent_render_phases: ResMut<ViewSortedRenderPhases<Transparent3d>>,
    views: Query<(&ExtractedView, &Msaa)>,
) {
    let draw_bulk_instances = transparent_3d_draw_functions
        .read()
        .id::<DrawBulkInstances>();

    for (view, msaa) in &views {
        let Some(transparent_phase) = transparent_render_phases.get_mut(&view.retained_view_entity)
        else {
            continue;
        };

        let msaa_key = MeshPipelineKey::from_msaa_samples(msaa.samples());
        let view_key = msaa_key | MeshPipelineKey::from_hdr(view.hdr);
        let rangefinder = view.rangefinder3d();

        for (entity, main_entity) in &bulk_meshes {
            let Some(mesh_instance) = render_mesh_instances.render_mesh_queue_data(*main_entity)
            else {
                continue;
            };
            let Some(mesh) = meshes.get(mesh_instance.mesh_asset_id) else {
                continue;
            };

            let key =
                view_key | MeshPipelineKey::from_primitive_topology(mesh.primitive_topology());
            let pipeline = match pipelines.specialize(
                &pipeline_cache,
                &bulk_pipeline,
                key,
                &mesh.layout,
            ) {
                Ok(pipeline) => pipeline,
                Err(err) => {
                    error!("Bulk instance pipeline specialisation failed: {err}");
                    continue;
                }
            };

            transparent_phase.add(Transparent3d {
                entity: (entity, *main_entity),
                pipeline,
                draw_function: draw_bulk_instances,
                distance: rangefinder.distance_translation(&mesh_instance.translation),
                batch_range: 0..1,
                extra_index: PhaseItemExtraIndex::None,
                indexed: mesh.indexed(),
            });
        }
    }
}

type DrawBulkInstances = (
    SetItemPipeline,
    SetMeshViewBindGroup<0>,
    SetMeshBindGroup<1>,
    DrawMeshBulkInstances,
);

struct DrawMeshBulkInstances;

impl<P: PhaseItem> RenderCommand<P> for DrawMeshBulkInstances {
    type Param = (
        SRes<RenderAssets<RenderMesh>>,
        SRes<RenderMeshInstances>,
        SRes<MeshAllocator>,
    );
    type ViewQuery = ();
    type ItemQuery = Read<BulkInstanceBuffer>;

    #[inline]
    fn render<'w>(
        item: &P,
        _view: (),
        instance_buffer: Option<&'w BulkInstanceBuffer>,
        (meshes, render_mesh_instances, mesh_allocator): SystemParamItem<'w, '_, Self::Param>,
        pass: &mut TrackedRenderPass<'w>,
    ) -> RenderCommandResult {
        let mesh_allocator = mesh_allocator.into_inner();

        let Some(mesh_instance) = render_mesh_instances.render_mesh_queue_data(item.main_entity())
        else {
            return RenderCommandResult::Skip;
        };
        let Some(gpu_mesh) = meshes.into_inner().get(mesh_instance.mesh_asset_id) else {
            return RenderCommandResult::Skip;
        };
        let Some(instance_buffer) = instance_buffer else {
            return RenderCommandResult::Skip;
        };
        let Some(vertex_buffer_slice) =
            mesh_allocator.mesh_vertex_slice(&mesh_instance.mesh_asset_id)
        else {
            return RenderCommandResult::Skip;
        };

        pass.set_vertex_buffer(0, vertex_buffer_slice.buffer.slice(..));
        pass.set_vertex_buffer(1, instance_buffer.buffer.slice(..));

        match &gpu_mesh.buffer_info {
            RenderMeshBufferInfo::Indexed {
                index_format,
                count,
            } => {
                let Some(index_buffer_slice) =
                    mesh_allocator.mesh_index_slice(&mesh_instance.mesh_asset_id)
                else {
                    return RenderCommandResult::Skip;
                };

                pass.set_index_buffer(index_buffer_slice.buffer.slice(..), 0, *index_format);
                pass.draw_indexed(
                    index_buffer_slice.range.start..(index_buffer_slice.range.start + count),
                    vertex_buffer_slice.range.start as i32,
                    0..instance_buffer.length as u32,
                );
            }
            RenderMeshBufferInfo::NonIndexed => {
                pass.draw(vertex_buffer_slice.range, 0..instance_buffer.length as u32);
            }
        }
        RenderCommandResult::Success
    }
}
