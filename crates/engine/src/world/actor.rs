use super::gravity::{GravityIntegrator, VerticalState};
use super::grid::{GridPoint, PixelPoint, TileKey};
use super::layout::{GridBounds, Surface, Terrain};
use super::movement::{MoveContext, MoveReport, MovementConfig, MovementController, MovementIntent};
use super::transform::Transform;

/// Per-tick inputs for [`Actor::tick`].
#[derive(Clone, Copy)]
pub struct ActorTick<'a> {
    pub intent: &'a MovementIntent,
    pub levitate: bool,
    pub scale: f64,
    pub terrain: &'a dyn Terrain,
    pub gravity: &'a GravityIntegrator,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorTickReport {
    pub movement: MoveReport,
    pub grounded: bool,
}

/// The player: grid position, pixel-space height and the controller that
/// moves it between tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    position: GridPoint,
    vertical: VerticalState,
    controller: MovementController,
    footprint_beneath: Option<Surface>,
}

impl Actor {
    pub fn new(position: GridPoint, movement: MovementConfig) -> Self {
        Self {
            position,
            vertical: VerticalState::default(),
            controller: MovementController::new(movement, position),
            footprint_beneath: None,
        }
    }

    pub fn position(&self) -> GridPoint {
        self.position
    }

    pub fn z(&self) -> f64 {
        self.vertical.z
    }

    pub fn vertical_velocity(&self) -> f64 {
        self.vertical.velocity
    }

    pub fn is_on_tile(&self) -> bool {
        self.controller.is_on_tile()
    }

    pub fn tile_origin(&self) -> TileKey {
        self.controller.tile_origin()
    }

    pub fn footprint_beneath(&self) -> Option<Surface> {
        self.footprint_beneath
    }

    pub fn controller(&self) -> &MovementController {
        &self.controller
    }

    /// Gravity first, then movement against the same terrain.
    pub fn tick(&mut self, tick: ActorTick<'_>) -> ActorTickReport {
        self.footprint_beneath = tick.terrain.surface_at(self.position.occupied_tile());
        let gravity = tick.gravity.step(
            &mut self.vertical,
            self.footprint_beneath,
            tick.scale,
            tick.levitate,
        );
        let movement = self.controller.step(
            &mut self.position,
            self.vertical.z,
            tick.intent,
            MoveContext {
                scale: tick.scale,
                terrain: tick.terrain,
            },
        );
        ActorTickReport {
            movement,
            grounded: gravity.grounded,
        }
    }

    /// Teleports onto `tile`, standing on whatever surface is there.
    pub fn place_at(&mut self, tile: TileKey, terrain: &dyn Terrain, scale: f64) {
        self.position = GridPoint::from(tile);
        self.footprint_beneath = terrain.surface_at(tile);
        self.vertical = VerticalState {
            z: self
                .footprint_beneath
                .map_or(0.0, |surface| surface.floor_px(scale)),
            velocity: 0.0,
        };
        self.controller.reset(self.position);
    }

    /// Places the actor on the whole tile under a pointer pixel. Pointers
    /// outside `bounds` leave the actor where it is.
    pub fn place_at_pixel(
        &mut self,
        pixel: PixelPoint,
        transform: &Transform,
        terrain: &dyn Terrain,
        bounds: GridBounds,
    ) -> Option<TileKey> {
        let tile = transform.to_grid(pixel, 0).occupied_tile();
        if !bounds.contains(tile) {
            return None;
        }
        self.place_at(tile, terrain, transform.scale());
        Some(tile)
    }
}
