use std::collections::BTreeMap;

use rand::Rng;

use super::grid::{GridPoint, PixelPoint, TileKey};
use super::layout::{GridBounds, Surface, Terrain, TileLayout, TileStyle};
use super::transform::Transform;

/// Render geometry derived from one [`TileDescriptor`](super::layout::TileDescriptor).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderVoxel {
    pub key: TileKey,
    /// Shrunk footprint: low-x/low-y, high-x/low-y, high-x/high-y, low-x/high-y.
    pub footprint: [GridPoint; 4],
    pub height: f64,
    pub z: f64,
    pub style: TileStyle,
    pub fill: f64,
}

/// The three visible quads of a voxel in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelFaces {
    pub top: [PixelPoint; 4],
    /// Face along the low-y edge.
    pub left: [PixelPoint; 4],
    /// Face along the high-x edge.
    pub right: [PixelPoint; 4],
}

impl RenderVoxel {
    pub fn surface(&self) -> Surface {
        Surface {
            z: self.z,
            height: self.height,
        }
    }

    /// The top face sits `(z + height)·scale` px above the ground plane and the
    /// body extrudes `height·scale` px down from it.
    pub fn faces(&self, transform: &Transform) -> VoxelFaces {
        let scale = transform.scale();
        prism_faces(
            transform,
            &self.footprint,
            -self.z * scale,
            self.height * scale,
        )
    }
}

/// Faces of an upright prism standing on `footprint`, with its base shifted
/// `base_lift_px` vertically on screen (negative is up) and `height_px` tall.
pub fn prism_faces(
    transform: &Transform,
    footprint: &[GridPoint; 4],
    base_lift_px: f64,
    height_px: f64,
) -> VoxelFaces {
    let top_lift = base_lift_px - height_px;
    let top = footprint.map(|corner| transform.to_pixel(corner).offset_y(top_lift));
    let base = footprint.map(|corner| transform.to_pixel(corner).offset_y(base_lift_px));
    VoxelFaces {
        top,
        left: [top[0], top[1], base[1], base[0]],
        right: [top[1], top[2], base[2], base[1]],
    }
}

/// Unit square centred on `key`, shrunk toward its centre by `(1 - fill) / 2`
/// on every side.
pub fn footprint(key: TileKey, fill: f64) -> [GridPoint; 4] {
    footprint_at(GridPoint::from(key), fill)
}

/// [`footprint`] around an arbitrary grid point.
pub fn footprint_at(center: GridPoint, fill: f64) -> [GridPoint; 4] {
    let half = 0.5 - (1.0 - fill) / 2.0;
    [
        GridPoint::new(center.x - half, center.y - half),
        GridPoint::new(center.x + half, center.y - half),
        GridPoint::new(center.x + half, center.y + half),
        GridPoint::new(center.x - half, center.y + half),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccupantKind {
    Player,
    Cursor,
}

/// Something drawn between voxels at a fractional grid position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occupant {
    pub kind: OccupantKind,
    pub position: GridPoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawItem {
    Voxel(TileKey),
    Occupant(Occupant),
}

/// One frame's back-to-front draw list plus the numbers behind it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawSequence {
    pub items: Vec<DrawItem>,
    pub voxel_count: usize,
    pub occupant_indices: Vec<(OccupantKind, usize)>,
}

impl DrawSequence {
    pub fn clear(&mut self) {
        self.items.clear();
        self.voxel_count = 0;
        self.occupant_indices.clear();
    }

    pub fn occupant_index(&self, kind: OccupantKind) -> Option<usize> {
        self.occupant_indices
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, index)| *index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoxelRenderSet {
    bounds: GridBounds,
    voxels: BTreeMap<TileKey, RenderVoxel>,
    draw_order: Vec<TileKey>,
}

impl VoxelRenderSet {
    pub fn from_layout<R: Rng + ?Sized>(layout: &TileLayout, rng: &mut R) -> Self {
        let mut set = Self {
            bounds: layout.bounds(),
            voxels: BTreeMap::new(),
            draw_order: Vec::new(),
        };
        set.rebuild(layout, rng);
        set
    }

    /// Re-rolls every jittered height. Descriptors are never touched.
    pub fn rebuild<R: Rng + ?Sized>(&mut self, layout: &TileLayout, rng: &mut R) {
        self.bounds = layout.bounds();
        self.voxels.clear();
        for (key, descriptor) in layout.iter() {
            let height = if descriptor.height_jitter_range > 0 {
                descriptor.height + rng.gen_range(0..descriptor.height_jitter_range) as f64
            } else {
                descriptor.height
            };
            self.voxels.insert(
                key,
                RenderVoxel {
                    key,
                    footprint: footprint(key, descriptor.fill_percentage),
                    height,
                    z: descriptor.z,
                    style: descriptor.style,
                    fill: descriptor.fill_percentage,
                },
            );
        }
        self.draw_order = self.voxels.keys().copied().collect();
        self.draw_order
            .sort_by_key(|key| (std::cmp::Reverse(key.y), key.x));
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    pub fn voxel(&self, key: TileKey) -> Option<&RenderVoxel> {
        self.voxels.get(&key)
    }

    /// Voxels back to front.
    pub fn iter_draw_order(&self) -> impl Iterator<Item = &RenderVoxel> {
        self.draw_order.iter().filter_map(|key| self.voxels.get(key))
    }

    pub fn faces(&self, key: TileKey, transform: &Transform) -> Option<VoxelFaces> {
        self.voxel(key).map(|voxel| voxel.faces(transform))
    }

    /// Number of voxels drawn before an occupant standing at `position`.
    ///
    /// The occupant goes right after the last voxel that is behind or under
    /// its rounded tile. Rows farther back are behind it, and so is every
    /// tile at or left of it within its own row.
    pub fn occupant_draw_index(&self, position: GridPoint) -> usize {
        let occupied = position.occupied_tile();
        let mut counter = 0;
        for key in &self.draw_order {
            if !is_behind_or_under(*key, occupied) {
                return counter;
            }
            counter += 1;
        }
        counter
    }

    pub fn draw_sequence(&self, occupants: &[Occupant]) -> DrawSequence {
        let mut sequence = DrawSequence::default();
        self.fill_draw_sequence(occupants, &mut sequence);
        sequence
    }

    /// Walks every grid cell of the bounds back to front and interleaves the
    /// occupants. Each occupant is emitted exactly once.
    pub fn fill_draw_sequence(&self, occupants: &[Occupant], out: &mut DrawSequence) {
        out.clear();
        out.voxel_count = self.voxels.len();
        out.occupant_indices.extend(
            occupants
                .iter()
                .map(|occupant| (occupant.kind, self.occupant_draw_index(occupant.position))),
        );

        let mut rendered = vec![false; occupants.len()];
        let mut voxel_counter = 0;
        for key in self.bounds.draw_order() {
            emit_occupants_at(
                occupants,
                &out.occupant_indices,
                voxel_counter,
                &mut rendered,
                &mut out.items,
            );
            if self.voxels.contains_key(&key) {
                out.items.push(DrawItem::Voxel(key));
                voxel_counter += 1;
            }
        }

        for (slot, occupant) in occupants.iter().enumerate() {
            if !rendered[slot] {
                rendered[slot] = true;
                out.items.push(DrawItem::Occupant(*occupant));
            }
        }
    }
}

impl Terrain for VoxelRenderSet {
    fn surface_at(&self, key: TileKey) -> Option<Surface> {
        self.voxel(key).map(RenderVoxel::surface)
    }
}

fn is_behind_or_under(tile: TileKey, occupied: TileKey) -> bool {
    tile.y > occupied.y || (tile.y == occupied.y && tile.x <= occupied.x)
}

fn emit_occupants_at(
    occupants: &[Occupant],
    indices: &[(OccupantKind, usize)],
    voxel_counter: usize,
    rendered: &mut [bool],
    items: &mut Vec<DrawItem>,
) {
    for (slot, occupant) in occupants.iter().enumerate() {
        if rendered[slot] || indices[slot].1 != voxel_counter {
            continue;
        }
        rendered[slot] = true;
        items.push(DrawItem::Occupant(*occupant));
    }
}
