//! Rendering for the two kinds of population.
//!
//! Foliage is a single point-sprite mesh animated entirely in its shader.
//! Ornaments, gifts and snow are instanced meshes whose per-instance
//! transforms are stepped on the CPU and re-uploaded when they change.

/// Per-instance data, posed populations and their tick.
pub mod bulk;

/// Material driving `shaders/foliage.wgsl`.
pub mod foliage_material;

/// Instanced draw pipeline for [`bulk::BulkInstances`].
///
/// One draw call per population, instance buffer rewritten only on a new revision.
pub mod instanced_render_plugin;
