use bevy::prelude::*;

/// `Loading` waits for the scene config; `Running` has every population spawned.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

#[derive(Component)]
pub struct FpsText;
