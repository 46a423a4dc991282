use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::picking::mesh_picking::MeshPickingPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::camera::orbit_camera::{camera_controller, spawn_camera};
use crate::engine::config::{ConfigLoader, TreeConfig, resolve_config_system, start_loading};
use crate::engine::core::app_state::AppState;
use crate::engine::core::window_config::create_window_config;
use crate::engine::render::bulk::tick_morph_populations;
use crate::engine::render::foliage_material::FoliageMaterial;
use crate::engine::render::instanced_render_plugin::InstancedBulkRenderPlugin;
use crate::engine::scene::accents::{spawn_accents, tick_accents};
use crate::engine::scene::audio::{
    ToggleAudio, apply_audio_toggles, keyboard_audio_system, spawn_background_audio,
    watch_audio_failures,
};
use crate::engine::scene::foliage::{spawn_foliage, sync_foliage_uniforms, tick_foliage_morph};
use crate::engine::scene::frames::{PhotoFramePlugin, spawn_frames};
use crate::engine::scene::lighting::spawn_lighting;
use crate::engine::scene::ornaments::spawn_ornaments_and_gifts;
use crate::engine::scene::snow::{spawn_snow, tick_snow};
use crate::engine::scene::spawn_tree_root;
use crate::engine::scene::star_field::{spawn_star_field, tick_star_field};
use crate::engine::scene_mode::{
    MorphSet, SceneMode, ToggleSceneMode, apply_mode_toggles, keyboard_toggle_system,
};
use crate::engine::systems::fps_tracking::{
    fps_notification_system, fps_text_update_system, spawn_fps_overlay,
};
use crate::rpc::web_rpc::WebRpcPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(MeshPickingPlugin)
        .add_plugins(MaterialPlugin::<FoliageMaterial>::default())
        .add_plugins(InstancedBulkRenderPlugin)
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(JsonAssetPlugin::<TreeConfig>::new(&["json"]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(PhotoFramePlugin);

    app.init_state::<AppState>()
        .init_resource::<SceneMode>()
        .init_resource::<ConfigLoader>()
        .add_event::<ToggleSceneMode>()
        .add_event::<ToggleAudio>()
        .configure_sets(
            Update,
            (MorphSet::Input, MorphSet::Tick, MorphSet::Sync)
                .chain()
                .run_if(in_state(AppState::Running)),
        )
        .add_systems(
            Startup,
            (start_loading, spawn_camera, spawn_lighting, spawn_fps_overlay),
        )
        .add_systems(
            Update,
            resolve_config_system.run_if(in_state(AppState::Loading)),
        )
        .add_systems(
            OnEnter(AppState::Running),
            (
                spawn_tree_root,
                spawn_foliage,
                spawn_ornaments_and_gifts,
                spawn_accents,
                spawn_frames,
                spawn_snow,
                spawn_star_field,
                spawn_background_audio,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                (keyboard_toggle_system, keyboard_audio_system).before(MorphSet::Input),
                (apply_mode_toggles, apply_audio_toggles).in_set(MorphSet::Input),
                (
                    tick_foliage_morph,
                    tick_morph_populations,
                    tick_accents,
                    tick_snow,
                    tick_star_field,
                )
                    .in_set(MorphSet::Tick),
                (sync_foliage_uniforms, camera_controller).in_set(MorphSet::Sync),
                (
                    watch_audio_failures,
                    fps_notification_system,
                    fps_text_update_system,
                ),
            )
                .run_if(in_state(AppState::Running)),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        level: Level::INFO,
        filter: "wgpu=error,naga=warn,tree_morph_engine=info".to_string(),
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
