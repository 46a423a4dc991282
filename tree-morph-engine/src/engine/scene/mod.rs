//! Scene content: the tree root and every population hanging off it.
//!
//! Spawners run once, chained, on entering `AppState::Running` and all draw
//! from the shared `SceneRng` in a fixed order. Tick systems run every frame
//! in `MorphSet::Tick`.

use bevy::prelude::*;
use constants::tree::TREE_ROOT_OFFSET;

/// Dolls and the star topper.
pub mod accents;

/// Optional looping background track.
pub mod audio;

/// Foliage point cloud and its morph factor.
pub mod foliage;

/// Clickable photo frames and the focus controller.
pub mod frames;

/// Ambient, spot and point lights.
pub mod lighting;

/// Instanced ornaments and gift boxes.
pub mod ornaments;

/// Falling snow.
pub mod snow;

/// Distant twinkling star backdrop.
pub mod star_field;

/// Parent of everything that belongs to the tree.
#[derive(Component)]
pub struct TreeRoot;

pub fn spawn_tree_root(mut commands: Commands) {
    commands.spawn((
        TreeRoot,
        Transform::from_translation(Vec3::from_array(TREE_ROOT_OFFSET)),
        Visibility::default(),
        Name::new("tree_root"),
    ));
}
