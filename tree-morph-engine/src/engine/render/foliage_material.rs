use bevy::{
    pbr::{MaterialPipeline, MaterialPipelineKey},
    prelude::*,
    reflect::TypePath,
    render::{
        mesh::{MeshVertexAttribute, MeshVertexBufferLayoutRef},
        render_resource::{
            AsBindGroup, RenderPipelineDescriptor, ShaderRef, ShaderType,
            SpecializedMeshPipelineError, VertexFormat,
        },
    },
};

const FOLIAGE_SHADER_PATH: &str = "shaders/foliage.wgsl";

/// Scatter-cloud position of the point this vertex belongs to.
pub const ATTRIBUTE_SCATTER_POSITION: MeshVertexAttribute =
    MeshVertexAttribute::new("FoliageScatterPosition", 988_540_917, VertexFormat::Float32x3);

/// Per-point random scalar in [0, 1), shared by the point's four corners.
pub const ATTRIBUTE_POINT_RANDOM: MeshVertexAttribute =
    MeshVertexAttribute::new("FoliagePointRandom", 988_540_918, VertexFormat::Float32);

#[derive(Debug, Clone, Copy, Default, PartialEq, ShaderType)]
#[repr(C)]
pub struct FoliageParams {
    pub time: f32,
    pub morph_factor: f32,
    pub pixel_ratio: f32,
    pub tree_height: f32,
}

/// Additive point-sprite material for the foliage cloud. The tree position
/// lives in `Mesh::ATTRIBUTE_POSITION`, the scatter position and random
/// scalar in custom attributes, and the quad corner in `Mesh::ATTRIBUTE_UV_0`.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct FoliageMaterial {
    #[uniform(0)]
    pub params: FoliageParams,
}

impl Material for FoliageMaterial {
    fn vertex_shader() -> ShaderRef {
        FOLIAGE_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        FOLIAGE_SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            ATTRIBUTE_SCATTER_POSITION.at_shader_location(1),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(2),
            ATTRIBUTE_POINT_RANDOM.at_shader_location(3),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        descriptor.primitive.cull_mode = None;
        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = false;
        }
        Ok(())
    }
}
