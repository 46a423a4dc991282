use bevy::asset::LoadState;
use bevy::audio::Volume;
use bevy::prelude::*;
use constants::render_settings::BACKGROUND_AUDIO_VOLUME;

use crate::engine::config::TreeConfig;
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Component)]
pub struct BackgroundTrack;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ToggleAudio;

/// Start the configured track on a loop. No track configured means silence.
pub fn spawn_background_audio(
    mut commands: Commands,
    config: Res<TreeConfig>,
    asset_server: Res<AssetServer>,
) {
    let Some(path) = config.audio_track.as_ref() else {
        debug!("No audio track configured");
        return;
    };

    info!("Loading background track {path}");
    commands.spawn((
        AudioPlayer::new(asset_server.load(path.clone())),
        PlaybackSettings::LOOP.with_volume(Volume::Linear(BACKGROUND_AUDIO_VOLUME)),
        BackgroundTrack,
        Name::new("background_track"),
    ));
}

pub fn keyboard_audio_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut toggles: EventWriter<ToggleAudio>,
) {
    if keyboard.just_pressed(KeyCode::KeyM) {
        toggles.write(ToggleAudio);
    }
}

pub fn apply_audio_toggles(
    mut toggles: EventReader<ToggleAudio>,
    sinks: Query<&AudioSink, With<BackgroundTrack>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for _ in toggles.read() {
        let Ok(sink) = sinks.single() else {
            debug!("Audio toggle ignored, no track playing");
            continue;
        };
        sink.toggle_playback();
        let playing = !sink.is_paused();
        info!("Background audio {}", if playing { "resumed" } else { "paused" });
        rpc_interface.send_notification(
            "audio_changed",
            serde_json::json!({
                "playing": playing
            }),
        );
    }
}

/// A track that fails to load is dropped with a warning; the scene keeps running.
pub fn watch_audio_failures(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    tracks: Query<(Entity, &AudioPlayer), With<BackgroundTrack>>,
) {
    for (entity, player) in &tracks {
        if let Some(LoadState::Failed(err)) = asset_server.get_load_state(&player.0) {
            warn!("Background track unavailable, continuing without audio: {err}");
            commands.entity(entity).despawn();
        }
    }
}
