use std::collections::BTreeMap;
use std::path::PathBuf;

use bevy::asset::io::AssetReaderError;
use bevy::asset::{AssetLoadError, LoadState};
use bevy::prelude::*;
use constants::morph_rates::{
    DOLL_RATE, FOLIAGE_MORPH_RATE, FRAME_RATE, GIFT_RATE, ORNAMENT_RATE, STAR_RATE,
};
use constants::tree::{
    ACCENT_DOLL_COUNT, FOLIAGE_COUNT, GIFT_COUNT, MAX_FOLIAGE_COUNT, MAX_INSTANCE_COUNT,
    ORNAMENT_COUNT, PHOTO_FRAME_COUNT, SCATTER_RADIUS, SNOW_COUNT, STAR_FIELD_COUNT,
    TREE_BASE_RADIUS, TREE_HEIGHT,
};
use serde::{Deserialize, Serialize};

use crate::engine::core::app_state::AppState;
use crate::engine::error::GenerationError;
use crate::engine::layout::LayoutConfig;

pub const TREE_CONFIG_PATH: &str = "scene/tree_config.json";

/// Per-tick smoothing fractions for each animated population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphRates {
    pub foliage: f32,
    pub ornaments: f32,
    pub gifts: f32,
    pub dolls: f32,
    pub star: f32,
    pub frames: f32,
}

impl Default for MorphRates {
    fn default() -> Self {
        Self {
            foliage: FOLIAGE_MORPH_RATE,
            ornaments: ORNAMENT_RATE,
            gifts: GIFT_RATE,
            dolls: DOLL_RATE,
            star: STAR_RATE,
            frames: FRAME_RATE,
        }
    }
}

/// Scene configuration. Every field has a default; the JSON file overrides any subset.
#[derive(Asset, TypePath, Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub tree_height: f32,
    pub tree_base_radius: f32,
    pub scatter_radius: f32,
    pub foliage_count: usize,
    pub ornament_count: usize,
    pub gift_count: usize,
    pub accent_doll_count: usize,
    pub photo_frame_count: usize,
    pub snow_count: usize,
    /// Backdrop stars; zero disables the backdrop.
    pub star_count: usize,
    /// Fixed seed for reproducible layouts; random when absent.
    pub seed: Option<u64>,
    /// Frame id to photo asset path.
    pub photo_paths: BTreeMap<usize, String>,
    pub audio_track: Option<String>,
    pub rates: MorphRates,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            tree_height: TREE_HEIGHT,
            tree_base_radius: TREE_BASE_RADIUS,
            scatter_radius: SCATTER_RADIUS,
            foliage_count: FOLIAGE_COUNT,
            ornament_count: ORNAMENT_COUNT,
            gift_count: GIFT_COUNT,
            accent_doll_count: ACCENT_DOLL_COUNT,
            photo_frame_count: PHOTO_FRAME_COUNT,
            snow_count: SNOW_COUNT,
            star_count: STAR_FIELD_COUNT,
            seed: None,
            photo_paths: BTreeMap::new(),
            audio_track: None,
            rates: MorphRates::default(),
        }
    }
}

impl TreeConfig {
    /// Reject anything that would produce NaN poses or overflow a buffer.
    pub fn validate(&self) -> Result<(), GenerationError> {
        for (field, value) in [
            ("tree_height", self.tree_height),
            ("tree_base_radius", self.tree_base_radius),
            ("scatter_radius", self.scatter_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GenerationError::InvalidDimension { field, value });
            }
        }

        for (population, count, limit) in [
            ("foliage", self.foliage_count, MAX_FOLIAGE_COUNT),
            ("ornament", self.ornament_count, MAX_INSTANCE_COUNT),
            ("gift", self.gift_count, MAX_INSTANCE_COUNT),
            ("accent doll", self.accent_doll_count, MAX_INSTANCE_COUNT),
            ("photo frame", self.photo_frame_count, MAX_INSTANCE_COUNT),
            ("snow", self.snow_count, MAX_INSTANCE_COUNT),
            ("star", self.star_count, MAX_INSTANCE_COUNT),
        ] {
            if count > limit {
                return Err(GenerationError::PopulationTooLarge {
                    population,
                    count,
                    limit,
                });
            }
        }

        let rates = &self.rates;
        for (population, rate) in [
            ("foliage", rates.foliage),
            ("ornaments", rates.ornaments),
            ("gifts", rates.gifts),
            ("dolls", rates.dolls),
            ("star", rates.star),
            ("frames", rates.frames),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(GenerationError::RateOutOfRange { population, rate });
            }
        }

        Ok(())
    }

    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            tree_height: self.tree_height,
            tree_base_radius: self.tree_base_radius,
            scatter_radius: self.scatter_radius,
        }
    }

    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}

/// Outcome of trying to read the config asset.
#[derive(Debug)]
pub enum ConfigSource {
    Loaded(TreeConfig),
    Missing,
    Malformed(String),
}

/// Decide the configuration to run with: a missing file falls back to the
/// defaults, an unreadable or invalid one is fatal.
pub fn resolve_config(source: ConfigSource) -> Result<TreeConfig, GenerationError> {
    let config = match source {
        ConfigSource::Loaded(config) => config,
        ConfigSource::Missing => {
            warn!("{TREE_CONFIG_PATH} not found, using built-in defaults");
            TreeConfig::default()
        }
        ConfigSource::Malformed(message) => {
            return Err(GenerationError::MalformedConfig {
                path: PathBuf::from(TREE_CONFIG_PATH),
                message,
            });
        }
    };
    config.validate()?;
    Ok(config)
}

/// Random source shared by every population spawner, drawn in a fixed order.
#[derive(Resource)]
pub struct SceneRng(pub fastrand::Rng);

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<TreeConfig>>,
}

pub fn start_loading(mut config_loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    info!("Loading scene config from {TREE_CONFIG_PATH}");
    config_loader.handle = Some(asset_server.load(TREE_CONFIG_PATH));
}

/// Wait for the config asset, then either start the scene or exit.
pub fn resolve_config_system(
    config_loader: Res<ConfigLoader>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<TreeConfig>>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(handle) = config_loader.handle.as_ref() else {
        return;
    };

    let source = match asset_server.get_load_state(handle) {
        Some(LoadState::Loaded) => match configs.get(handle) {
            Some(config) => ConfigSource::Loaded(config.clone()),
            None => return,
        },
        Some(LoadState::Failed(err)) => match err.as_ref() {
            AssetLoadError::AssetReaderError(AssetReaderError::NotFound(_)) => {
                ConfigSource::Missing
            }
            other => ConfigSource::Malformed(other.to_string()),
        },
        _ => return,
    };

    match resolve_config(source) {
        Ok(config) => {
            info!(
                "✓ Scene config resolved: {} foliage points, {} ornaments, {} gifts, seed {:?}",
                config.foliage_count, config.ornament_count, config.gift_count, config.seed
            );
            commands.insert_resource(SceneRng(config.rng()));
            commands.insert_resource(config);
            next_state.set(AppState::Running);
        }
        Err(err) => {
            error!("Refusing to build scene: {err}");
            exit.write(AppExit::error());
        }
    }
}
