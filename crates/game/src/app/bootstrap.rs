use iso_engine::world::LayoutError;
use iso_engine::{LoopConfig, Scene};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{load_game_config, ConfigError, ConfigSource};
use super::gameplay;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to generate world: {0}")]
    Layout(#[from] LayoutError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    let source = ConfigSource::resolve()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %source.path().display(),
        "startup"
    );

    let game_config = load_game_config(&source)?;
    let config = game_config.loop_config();
    let scene = gameplay::build_scene(game_config)?;

    Ok(AppWiring { config, scene })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
