use bevy::prelude::*;
use serde::Serialize;

use crate::rpc::web_rpc::WebRpcInterface;

/// Global scene pose: everything either drifts in the scatter cloud or
/// gathers into the tree.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneMode {
    #[default]
    Scattered,
    TreeShape,
}

impl SceneMode {
    pub fn toggle(&mut self) {
        *self = self.toggled();
    }

    pub fn toggled(self) -> Self {
        match self {
            SceneMode::Scattered => SceneMode::TreeShape,
            SceneMode::TreeShape => SceneMode::Scattered,
        }
    }

    pub fn is_assembled(self) -> bool {
        self == SceneMode::TreeShape
    }

    /// Pick the scattered or assembled value for this mode.
    #[inline]
    pub fn select<T>(self, scattered: T, assembled: T) -> T {
        match self {
            SceneMode::Scattered => scattered,
            SceneMode::TreeShape => assembled,
        }
    }

    /// Target of the foliage morph factor.
    pub fn morph_target(self) -> f32 {
        self.select(0.0, 1.0)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SceneMode::Scattered => "scattered",
            SceneMode::TreeShape => "tree_shape",
        }
    }
}

/// Immutable per-tick copy of the mode and the clock, handed to every tick
/// function so none of them reads global state mid-update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeSnapshot {
    pub mode: SceneMode,
    pub elapsed_secs: f32,
}

impl ModeSnapshot {
    pub fn new(mode: SceneMode, elapsed_secs: f32) -> Self {
        Self { mode, elapsed_secs }
    }

    pub fn capture(mode: &SceneMode, time: &Time) -> Self {
        Self::new(*mode, time.elapsed_secs())
    }
}

/// Request to flip the scene mode. Sent by the keyboard handler and the host bridge.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ToggleSceneMode;

/// Frame ordering for everything that animates: input is applied first, then
/// every population ticks against the same snapshot, then GPU-facing state is synced.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MorphSet {
    Input,
    Tick,
    Sync,
}

pub fn keyboard_toggle_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut toggles: EventWriter<ToggleSceneMode>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        toggles.write(ToggleSceneMode);
    }
}

/// Apply queued toggles. Runs once per frame, before any tick.
pub fn apply_mode_toggles(
    mut toggles: EventReader<ToggleSceneMode>,
    mut mode: ResMut<SceneMode>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for _ in toggles.read() {
        mode.toggle();
        info!("Scene mode -> {}", mode.as_str());
        rpc_interface.send_notification(
            "mode_changed",
            serde_json::json!({
                "mode": mode.as_str()
            }),
        );
    }
}
