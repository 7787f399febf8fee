use iso_engine::world::LayoutError;
use iso_engine::Scene;

use super::config::GameConfig;

mod level;
mod scene_impl;
#[cfg(test)]
mod tests;

pub(crate) use scene_impl::IsoWorldScene;

pub(crate) fn build_scene(config: GameConfig) -> Result<Box<dyn Scene>, LayoutError> {
    Ok(Box::new(IsoWorldScene::new(config)?))
}
