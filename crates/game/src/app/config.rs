use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use iso_engine::world::Basis;
use iso_engine::{resolve_app_paths, GravityConfig, LoopConfig, MovementConfig, StartupError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub(crate) const CONFIG_ENV_VAR: &str = "ISO_CONFIG";
const MAX_GRID_SIZE: u32 = 512;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) window: WindowConfig,
    pub(crate) view: ViewConfig,
    pub(crate) world: WorldConfig,
    pub(crate) movement: MovementConfig,
    pub(crate) gravity: GravityConfig,
    pub(crate) render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    pub(crate) title: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// `null` or `0` renders uncapped.
    pub(crate) max_render_fps: Option<u32>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Iso World".to_string(),
            width: 1280,
            height: 720,
            max_render_fps: Some(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ViewConfig {
    pub(crate) basis: Basis,
    pub(crate) fit_margin_px: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            basis: Basis::default(),
            fit_margin_px: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WorldConfig {
    pub(crate) grid_size: u32,
    pub(crate) seed: u64,
    pub(crate) min_height: f64,
    pub(crate) max_height: f64,
    pub(crate) height_jitter_range: u32,
    pub(crate) pit_chance: f64,
    pub(crate) wireframe_chance: f64,
    /// Tiles no taller than this use the floor palette.
    pub(crate) floor_max_height: f64,
    pub(crate) min_fill: f64,
    pub(crate) max_fill: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            seed: 0x5EED,
            min_height: 1.0,
            max_height: 4.0,
            height_jitter_range: 3,
            pit_chance: 0.1,
            wireframe_chance: 0.05,
            floor_max_height: 1.5,
            min_fill: 0.85,
            max_fill: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RenderConfig {
    /// Largest random offset, in pixels, applied to the player each frame.
    pub(crate) actor_wiggle_px: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            actor_wiggle_px: 0.5,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value at {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Where the config comes from. An explicit path must exist; the default
/// path may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConfigSource {
    Explicit(PathBuf),
    Default(PathBuf),
}

impl ConfigSource {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Ok(Self::Explicit(PathBuf::from(path))),
            None => Ok(Self::Default(resolve_app_paths()?.default_config_path)),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        match self {
            Self::Explicit(path) | Self::Default(path) => path,
        }
    }
}

pub(crate) fn load_game_config(source: &ConfigSource) -> Result<GameConfig, ConfigError> {
    match source {
        ConfigSource::Default(path) if !path.is_file() => {
            info!(path = %path.display(), "config_defaults_used");
            Ok(GameConfig::default())
        }
        _ => read_config_file(source.path()),
    }
}

fn read_config_file(path: &Path) -> Result<GameConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw, path)?;
    info!(path = %path.display(), "config_loaded");
    Ok(config)
}

pub(crate) fn parse_config(raw: &str, path: &Path) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config: GameConfig = serde_path_to_error::deserialize(&mut deserializer).map_err(
        |error| {
            let json_path = error.path().to_string();
            ConfigError::Parse {
                path: path.to_path_buf(),
                json_path,
                source: error.into_inner(),
            }
        },
    )?;
    config.validate()?;
    Ok(config)
}

impl GameConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let window = &self.window;
        ensure(window.width > 0, "window.width", "must be positive")?;
        ensure(window.height > 0, "window.height", "must be positive")?;
        ensure(
            self.view.fit_margin_px.is_finite() && self.view.fit_margin_px >= 0.0,
            "view.fit_margin_px",
            "must be finite and non-negative",
        )?;
        let basis = self.view.basis;
        ensure(
            [basis.a, basis.b, basis.c, basis.d]
                .iter()
                .all(|value| value.is_finite()),
            "view.basis",
            "must be finite",
        )?;

        let world = &self.world;
        ensure(
            (1..=MAX_GRID_SIZE).contains(&world.grid_size),
            "world.grid_size",
            format!("must be in 1..={MAX_GRID_SIZE}"),
        )?;
        ensure(
            world.min_height.is_finite() && world.min_height > 0.0,
            "world.min_height",
            "must be finite and positive",
        )?;
        ensure(
            world.max_height.is_finite() && world.max_height >= world.min_height,
            "world.max_height",
            "must be finite and at least world.min_height",
        )?;
        ensure(
            is_probability(world.pit_chance),
            "world.pit_chance",
            "must be in [0, 1]",
        )?;
        ensure(
            is_probability(world.wireframe_chance),
            "world.wireframe_chance",
            "must be in [0, 1]",
        )?;
        ensure(
            world.floor_max_height.is_finite(),
            "world.floor_max_height",
            "must be finite",
        )?;
        ensure(
            is_probability(world.min_fill) && is_probability(world.max_fill),
            "world.min_fill",
            "fill bounds must be in [0, 1]",
        )?;
        ensure(
            world.min_fill <= world.max_fill,
            "world.max_fill",
            "must be at least world.min_fill",
        )?;

        let movement = &self.movement;
        ensure(
            movement.walk_speed > 0.0 && movement.walk_speed <= 1.0,
            "movement.walk_speed",
            "must be in (0, 1]",
        )?;
        ensure(
            movement.diagonal_factor > 0.0 && movement.diagonal_factor <= 1.0,
            "movement.diagonal_factor",
            "must be in (0, 1]",
        )?;
        ensure(
            movement.z_climb_max.is_finite() && movement.z_climb_max >= 0.0,
            "movement.z_climb_max",
            "must be finite and non-negative",
        )?;

        let gravity = &self.gravity;
        ensure(
            gravity.gravity.is_finite() && gravity.gravity >= 0.0,
            "gravity.gravity",
            "must be finite and non-negative",
        )?;
        ensure(
            gravity.max_fall_speed.is_finite() && gravity.max_fall_speed > 0.0,
            "gravity.max_fall_speed",
            "must be finite and positive",
        )?;
        ensure(
            gravity.levitate_speed.is_finite() && gravity.levitate_speed >= 0.0,
            "gravity.levitate_speed",
            "must be finite and non-negative",
        )?;
        ensure(
            gravity.world_floor.map_or(true, f64::is_finite),
            "gravity.world_floor",
            "must be null or finite",
        )?;

        ensure(
            self.render.actor_wiggle_px.is_finite() && self.render.actor_wiggle_px >= 0.0,
            "render.actor_wiggle_px",
            "must be finite and non-negative",
        )
    }

    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_title: self.window.title.clone(),
            window_width: self.window.width,
            window_height: self.window.height,
            max_render_fps: self.window.max_render_fps,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

fn ensure(
    condition: bool,
    field: &'static str,
    reason: impl Into<String>,
) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason.into(),
        })
    }
}
