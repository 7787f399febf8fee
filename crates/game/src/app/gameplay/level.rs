use iso_engine::world::{GridBounds, LayoutError, TileDescriptor, TileKey, TileLayout, TileStyle};
use rand::Rng;

use crate::app::config::WorldConfig;

/// Seeded random terrain over a square grid. Pits are left out of the
/// layout; the spawn tile is always a low floor tile.
pub(crate) fn generate_layout<R: Rng + ?Sized>(
    config: &WorldConfig,
    rng: &mut R,
) -> Result<TileLayout, LayoutError> {
    let bounds = GridBounds::square(config.grid_size);
    let spawn = spawn_tile(bounds);
    let mut tiles = Vec::with_capacity((bounds.width() * bounds.height()) as usize);

    for key in bounds.draw_order() {
        if key == spawn {
            tiles.push((
                key,
                TileDescriptor::new(config.min_height).with_style(TileStyle::Floor),
            ));
            continue;
        }
        if rng.gen_bool(config.pit_chance) {
            continue;
        }

        let height = sample(rng, config.min_height, config.max_height);
        let fill = sample(rng, config.min_fill, config.max_fill);
        let style = if height <= config.floor_max_height {
            TileStyle::Floor
        } else if rng.gen_bool(config.wireframe_chance) {
            TileStyle::Wireframe
        } else {
            TileStyle::Solid
        };
        let jitter = match style {
            TileStyle::Floor => 0,
            _ => config.height_jitter_range,
        };
        tiles.push((
            key,
            TileDescriptor::new(height)
                .with_style(style)
                .with_fill(fill)
                .with_jitter(jitter),
        ));
    }

    TileLayout::new(bounds, tiles)
}

/// Centre tile of `bounds`, rounding toward the high corner on even sizes.
pub(crate) fn spawn_tile(bounds: GridBounds) -> TileKey {
    TileKey::new(
        bounds.min.x + (bounds.width() / 2) as i32,
        bounds.min.y + (bounds.height() / 2) as i32,
    )
}

fn sample<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    }
}
