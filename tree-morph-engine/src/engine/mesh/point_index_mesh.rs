use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use crate::engine::render::foliage_material::{
    ATTRIBUTE_POINT_RANDOM, ATTRIBUTE_SCATTER_POSITION,
};

/// Quad corners in uv space, shared by every point.
const CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Marker for the foliage point-cloud entity.
#[derive(Component)]
pub struct FoliageCloud;

/// Build the foliage mesh: four vertices per point carrying the same tree
/// position, scatter position and random value, expanded to a screen-aligned
/// quad in the vertex shader.
pub fn create_foliage_mesh(tree: &[Vec3], scatter: &[Vec3], random: &[f32]) -> Mesh {
    let count = tree.len().min(scatter.len()).min(random.len());

    let mut positions = Vec::with_capacity(count * 4);
    let mut scatter_positions = Vec::with_capacity(count * 4);
    let mut uvs = Vec::with_capacity(count * 4);
    let mut randoms = Vec::with_capacity(count * 4);
    let mut indices = Vec::with_capacity(count * 6);

    for point in 0..count {
        let base = (point * 4) as u32;
        for corner in CORNERS {
            positions.push(tree[point].to_array());
            scatter_positions.push(scatter[point].to_array());
            uvs.push(corner);
            randoms.push(random[point]);
        }
        indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(ATTRIBUTE_SCATTER_POSITION, scatter_positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_attribute(ATTRIBUTE_POINT_RANDOM, randoms)
    .with_inserted_indices(Indices::U32(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_vertices_and_six_indices_per_point() {
        let tree = [Vec3::ZERO, Vec3::Y];
        let scatter = [Vec3::X, Vec3::Z];
        let mesh = create_foliage_mesh(&tree, &scatter, &[0.25, 0.75]);
        assert_eq!(mesh.count_vertices(), 8);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(12));
    }
}
