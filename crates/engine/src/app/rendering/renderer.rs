use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{PlayerVisual, SceneWorld};
use crate::world::{
    footprint, footprint_at, prism_faces, DrawItem, GridBounds, GridPoint, OccupantKind,
    PixelPoint, RenderVoxel, TileKey, TileStyle, Transform, VoxelFaces,
};

use super::canvas::{Canvas, FrameCanvas, Rgba};

const CLEAR_COLOR: Rgba = [40, 40, 40, 255];
const GRID_LINE_COLOR: Rgba = [100, 100, 200, 255];
const CURSOR_COLOR: Rgba = [255, 255, 255, 255];
const WIREFRAME_COLOR: Rgba = [200, 200, 210, 255];
const SOLID_PALETTE: FacePalette = FacePalette {
    top: [170, 168, 160, 255],
    left: [120, 118, 112, 255],
    right: [92, 90, 86, 255],
    outline: Some([60, 58, 56, 255]),
};
const FLOOR_PALETTE: FacePalette = FacePalette {
    top: [96, 142, 82, 255],
    left: [72, 104, 62, 255],
    right: [54, 82, 47, 255],
    outline: None,
};
const PLAYER_PALETTE: FacePalette = FacePalette {
    top: [236, 196, 92, 255],
    left: [196, 150, 60, 255],
    right: [160, 118, 44, 255],
    outline: Some([90, 64, 20, 255]),
};
/// Player prism footprint as a share of a tile.
const PLAYER_FILL: f64 = 0.5;
/// Player prism height in the same units as tile heights.
const PLAYER_HEIGHT: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FacePalette {
    top: Rgba,
    left: Rgba,
    right: Rgba,
    outline: Option<Rgba>,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
        })
    }

    /// Zero-sized resizes (minimized windows) keep the previous surface.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        let mut canvas = FrameCanvas::new(self.pixels.frame_mut(), self.width, self.height);
        paint_world(&mut canvas, world);
        self.pixels.render()
    }
}

/// Paints one frame: background, grid overlay, then the painter's walk.
pub fn paint_world(canvas: &mut impl Canvas, world: &SceneWorld) {
    canvas.clear(CLEAR_COLOR);
    let transform = world.transform();
    if let Some(voxels) = world.voxels() {
        draw_grid_lines(canvas, transform, voxels.bounds());
    }

    for item in &world.draw_sequence().items {
        match item {
            DrawItem::Voxel(key) => {
                if let Some(voxel) = world.voxels().and_then(|voxels| voxels.voxel(*key)) {
                    draw_voxel(canvas, transform, voxel);
                }
            }
            DrawItem::Occupant(occupant) => match occupant.kind {
                OccupantKind::Player => {
                    if let Some(player) = world.player() {
                        draw_player(canvas, transform, player);
                    }
                }
                OccupantKind::Cursor => {
                    if let Some(tile) = world.cursor_tile() {
                        draw_cursor(canvas, world, tile);
                    }
                }
            },
        }
    }
}

/// Tile-edge lines framing every cell of `bounds`.
fn draw_grid_lines(canvas: &mut impl Canvas, transform: &Transform, bounds: GridBounds) {
    let low_x = bounds.min.x as f64 - 0.5;
    let high_x = bounds.max.x as f64 + 0.5;
    let low_y = bounds.min.y as f64 - 0.5;
    let high_y = bounds.max.y as f64 + 0.5;

    for step in 0..=bounds.width() {
        let x = low_x + step as f64;
        canvas.draw_line(
            transform.to_pixel(GridPoint::new(x, low_y)),
            transform.to_pixel(GridPoint::new(x, high_y)),
            GRID_LINE_COLOR,
        );
    }
    for step in 0..=bounds.height() {
        let y = low_y + step as f64;
        canvas.draw_line(
            transform.to_pixel(GridPoint::new(low_x, y)),
            transform.to_pixel(GridPoint::new(high_x, y)),
            GRID_LINE_COLOR,
        );
    }
}

fn draw_voxel(canvas: &mut impl Canvas, transform: &Transform, voxel: &RenderVoxel) {
    let faces = voxel.faces(transform);
    match voxel.style {
        TileStyle::Solid => draw_faces(canvas, &faces, SOLID_PALETTE),
        TileStyle::Floor => draw_faces(canvas, &faces, FLOOR_PALETTE),
        TileStyle::Wireframe => {
            canvas.stroke_polygon(&faces.left, WIREFRAME_COLOR);
            canvas.stroke_polygon(&faces.right, WIREFRAME_COLOR);
            canvas.stroke_polygon(&faces.top, WIREFRAME_COLOR);
        }
    }
}

fn draw_faces(canvas: &mut impl Canvas, faces: &VoxelFaces, palette: FacePalette) {
    for (quad, color) in [
        (&faces.left, palette.left),
        (&faces.right, palette.right),
        (&faces.top, palette.top),
    ] {
        canvas.fill_polygon(quad, color);
        if let Some(outline) = palette.outline {
            canvas.stroke_polygon(quad, outline);
        }
    }
}

fn draw_player(canvas: &mut impl Canvas, transform: &Transform, player: &PlayerVisual) {
    let corners = footprint_at(player.position, PLAYER_FILL);
    let faces = prism_faces(
        transform,
        &corners,
        player.z,
        PLAYER_HEIGHT * transform.scale(),
    );
    draw_faces(canvas, &shift_faces(faces, player.wiggle_px), PLAYER_PALETTE);
}

/// Outlines the hovered tile on top of whatever surface it has.
fn draw_cursor(canvas: &mut impl Canvas, world: &SceneWorld, tile: TileKey) {
    let transform = world.transform();
    let lift = world
        .surface_at(tile)
        .map_or(0.0, |surface| surface.floor_px(transform.scale()));
    let outline = footprint(tile, 1.0).map(|corner| transform.to_pixel(corner).offset_y(lift));
    canvas.stroke_polygon(&outline, CURSOR_COLOR);
}

fn shift_faces(faces: VoxelFaces, offset: PixelPoint) -> VoxelFaces {
    VoxelFaces {
        top: faces.top.map(|point| point + offset),
        left: faces.left.map(|point| point + offset),
        right: faces.right.map(|point| point + offset),
    }
}
