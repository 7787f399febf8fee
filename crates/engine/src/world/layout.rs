use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::TileKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileStyle {
    #[default]
    Solid,
    Wireframe,
    Floor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDescriptor {
    pub height: f64,
    pub z: f64,
    pub style: TileStyle,
    pub fill_percentage: f64,
    pub height_jitter_range: u32,
}

impl TileDescriptor {
    pub fn new(height: f64) -> Self {
        Self {
            height,
            z: 0.0,
            style: TileStyle::Solid,
            fill_percentage: 1.0,
            height_jitter_range: 0,
        }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    pub fn with_style(mut self, style: TileStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_fill(mut self, fill_percentage: f64) -> Self {
        self.fill_percentage = fill_percentage;
        self
    }

    pub fn with_jitter(mut self, height_jitter_range: u32) -> Self {
        self.height_jitter_range = height_jitter_range;
        self
    }
}

/// Vertical extent of whatever stands on a tile, in tile height units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub z: f64,
    pub height: f64,
}

impl Surface {
    pub fn top(self) -> f64 {
        self.z + self.height
    }

    /// Pixel-space actor `z` that rests on this surface (negative is up).
    pub fn floor_px(self, scale: f64) -> f64 {
        -self.top() * scale
    }
}

/// Answers "what surface is under this tile". `None` is a pit.
pub trait Terrain {
    fn surface_at(&self, key: TileKey) -> Option<Surface>;
}

/// Inclusive integer tile rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub min: TileKey,
    pub max: TileKey,
}

impl GridBounds {
    pub fn new(min: TileKey, max: TileKey) -> Self {
        Self {
            min: TileKey::new(min.x.min(max.x), min.y.min(max.y)),
            max: TileKey::new(min.x.max(max.x), min.y.max(max.y)),
        }
    }

    /// `size × size` tiles starting at the origin.
    pub fn square(size: u32) -> Self {
        let last = size.saturating_sub(1).min(i32::MAX as u32) as i32;
        Self::new(TileKey::new(0, 0), TileKey::new(last, last))
    }

    pub fn contains(&self, key: TileKey) -> bool {
        (self.min.x..=self.max.x).contains(&key.x) && (self.min.y..=self.max.y).contains(&key.y)
    }

    pub fn width(&self) -> u32 {
        self.max.x.abs_diff(self.min.x) + 1
    }

    pub fn height(&self) -> u32 {
        self.max.y.abs_diff(self.min.y) + 1
    }

    /// Side length in tiles of the square that covers the bounds, used for
    /// zoom-to-fit.
    pub fn extent(&self) -> f64 {
        self.width().max(self.height()) as f64
    }

    /// Every cell, farthest row first and left to right within a row.
    pub fn draw_order(self) -> impl Iterator<Item = TileKey> {
        (self.min.y..=self.max.y)
            .rev()
            .flat_map(move |y| (self.min.x..=self.max.x).map(move |x| TileKey::new(x, y)))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("tile {key} has invalid height {height}; heights must be finite and non-negative")]
    InvalidHeight { key: TileKey, height: f64 },
    #[error("tile {key} has non-finite z {z}")]
    InvalidZ { key: TileKey, z: f64 },
    #[error("tile {key} has fill percentage {fill} outside [0, 1]")]
    FillOutOfRange { key: TileKey, fill: f64 },
    #[error("tile {key} lies outside the layout bounds")]
    OutsideBounds { key: TileKey },
}

/// Read-only map from tile to descriptor. Missing tiles are pits.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayout {
    bounds: GridBounds,
    tiles: BTreeMap<TileKey, TileDescriptor>,
}

impl TileLayout {
    pub fn new(
        bounds: GridBounds,
        tiles: impl IntoIterator<Item = (TileKey, TileDescriptor)>,
    ) -> Result<Self, LayoutError> {
        let mut map = BTreeMap::new();
        for (key, descriptor) in tiles {
            validate_descriptor(bounds, key, &descriptor)?;
            map.insert(key, descriptor);
        }
        Ok(Self { bounds, tiles: map })
    }

    pub fn lookup(&self, key: TileKey) -> Option<&TileDescriptor> {
        self.tiles.get(&key)
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileKey, &TileDescriptor)> {
        self.tiles.iter().map(|(key, descriptor)| (*key, descriptor))
    }
}

impl Terrain for TileLayout {
    fn surface_at(&self, key: TileKey) -> Option<Surface> {
        self.lookup(key).map(|descriptor| Surface {
            z: descriptor.z,
            height: descriptor.height,
        })
    }
}

fn validate_descriptor(
    bounds: GridBounds,
    key: TileKey,
    descriptor: &TileDescriptor,
) -> Result<(), LayoutError> {
    if !bounds.contains(key) {
        return Err(LayoutError::OutsideBounds { key });
    }
    if !descriptor.height.is_finite() || descriptor.height < 0.0 {
        return Err(LayoutError::InvalidHeight {
            key,
            height: descriptor.height,
        });
    }
    if !descriptor.z.is_finite() {
        return Err(LayoutError::InvalidZ {
            key,
            z: descriptor.z,
        });
    }
    if !(0.0..=1.0).contains(&descriptor.fill_percentage) {
        return Err(LayoutError::FillOutOfRange {
            key,
            fill: descriptor.fill_percentage,
        });
    }
    Ok(())
}
