//! Procedural meshes that Bevy's primitive shapes do not cover.

/// Quad-expanded point mesh for the foliage cloud.
pub mod point_index_mesh;

/// Octahedron for the star topper.
pub mod star_mesh;
