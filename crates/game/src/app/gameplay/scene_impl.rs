use iso_engine::world::{
    Actor, ActorTick, Direction, GravityIntegrator, GridPoint, LayoutError, MovementIntent,
    PixelPoint, TileKey, TileLayout, Transform, VoxelRenderSet,
};
use iso_engine::{InputAction, InputSnapshot, PanSignal, PlayerVisual, Scene, SceneWorld};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{debug, info};

use crate::app::config::GameConfig;

use super::level::{generate_layout, spawn_tile};

/// Decimal places shown for the pointer's grid coordinate.
const POINTER_GRID_PRECISION: u32 = 2;

const MOVE_BINDINGS: [(Direction, InputAction, InputAction); 4] = [
    (Direction::Up, InputAction::MoveUp, InputAction::StepUp),
    (Direction::Down, InputAction::MoveDown, InputAction::StepDown),
    (Direction::Left, InputAction::MoveLeft, InputAction::StepLeft),
    (Direction::Right, InputAction::MoveRight, InputAction::StepRight),
];

/// The playable world: one layout, one player, one camera.
pub(crate) struct IsoWorldScene {
    config: GameConfig,
    rng: Pcg64,
    layout: TileLayout,
    actor: Actor,
    gravity: GravityIntegrator,
    needs_fit: bool,
    spawned: bool,
    pointer_grid: Option<GridPoint>,
}

impl IsoWorldScene {
    pub(crate) fn new(config: GameConfig) -> Result<Self, LayoutError> {
        let mut rng = Pcg64::seed_from_u64(config.world.seed);
        let layout = generate_layout(&config.world, &mut rng)?;
        Ok(Self::with_layout(config, layout, rng))
    }

    pub(crate) fn with_layout(config: GameConfig, layout: TileLayout, rng: Pcg64) -> Self {
        let spawn = GridPoint::from(spawn_tile(layout.bounds()));
        Self {
            actor: Actor::new(spawn, config.movement),
            gravity: GravityIntegrator::new(&config.gravity),
            config,
            rng,
            layout,
            needs_fit: true,
            spawned: false,
            pointer_grid: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn actor(&self) -> &Actor {
        &self.actor
    }

    #[cfg(test)]
    pub(crate) fn layout(&self) -> &TileLayout {
        &self.layout
    }

    fn fit_view(&self, transform: &mut Transform, window_size: (u32, u32)) {
        let bounds = self.layout.bounds();
        transform.reset_and_fit_to_window(
            window_size,
            bounds.extent(),
            self.config.view.fit_margin_px,
        );
        let centre = GridPoint::new(
            (bounds.min.x + bounds.max.x) as f64 / 2.0,
            (bounds.min.y + bounds.max.y) as f64 / 2.0,
        );
        let centre_px = transform.to_pixel(centre);
        transform.set_offset(
            transform.e() + window_size.0 as f64 / 2.0 - centre_px.x,
            transform.f() + window_size.1 as f64 / 2.0 - centre_px.y,
        );
        info!(
            scale = transform.scale(),
            window_width = window_size.0,
            window_height = window_size.1,
            "view_fitted"
        );
    }

    fn update_view(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        let window_size = input.window_size();
        let has_area = window_size.0 > 0 && window_size.1 > 0;
        if has_area && (self.needs_fit || input.was_pressed(InputAction::ResetView)) {
            self.fit_view(world.transform_mut(), window_size);
            self.needs_fit = false;
        }

        let transform = world.transform_mut();
        transform.apply_zoom_steps(input.zoom_delta_steps());

        if let Some(PanSignal::Start(pointer)) = input.pan_signal() {
            transform.start_pan(pointer);
        }
        if let Some(pointer) = input.cursor_position_px() {
            transform.pan(pointer);
        }
        if input.pan_signal() == Some(PanSignal::Stop) {
            transform.stop_pan();
        }
    }

    fn update_terrain(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        if !input.was_pressed(InputAction::Reshuffle) {
            return;
        }
        if let Some(voxels) = world.voxels_mut() {
            voxels.rebuild(&self.layout, &mut self.rng);
            info!(voxel_count = voxels.len(), "terrain_reshuffled");
        }
    }

    fn update_actor(&mut self, input: &InputSnapshot, world: &SceneWorld) {
        let Some(voxels) = world.voxels() else {
            return;
        };
        let transform = world.transform();

        if !self.spawned && !self.needs_fit {
            self.actor
                .place_at(spawn_tile(self.layout.bounds()), voxels, transform.scale());
            self.spawned = true;
        }
        if let Some(pointer) = input.place_actor_at() {
            match self
                .actor
                .place_at_pixel(pointer, transform, voxels, self.layout.bounds())
            {
                Some(tile) => {
                    self.spawned = true;
                    info!(tile_x = tile.x, tile_y = tile.y, z = self.actor.z(), "actor_placed");
                }
                None => debug!(x = pointer.x, y = pointer.y, "actor_placement_outside_grid"),
            }
        }

        let intent = movement_intent(input);
        self.actor.tick(ActorTick {
            intent: &intent,
            levitate: input.is_down(InputAction::Levitate),
            scale: transform.scale(),
            terrain: voxels,
            gravity: &self.gravity,
        });
    }

    fn update_pointer(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        let bounds = self.layout.bounds();
        let transform = world.transform().clone();
        self.pointer_grid = input
            .cursor_position_px()
            .map(|pointer| transform.to_grid(pointer, POINTER_GRID_PRECISION));
        let cursor_tile: Option<TileKey> = self
            .pointer_grid
            .map(GridPoint::occupied_tile)
            .filter(|tile| bounds.contains(*tile));
        world.set_cursor_tile(cursor_tile);
    }

    fn wiggle(&mut self) -> PixelPoint {
        let amplitude = self.config.render.actor_wiggle_px;
        if amplitude <= 0.0 {
            return PixelPoint::default();
        }
        PixelPoint::new(
            self.rng.gen_range(-amplitude..=amplitude),
            self.rng.gen_range(-amplitude..=amplitude),
        )
    }
}

impl Scene for IsoWorldScene {
    fn load(&mut self, world: &mut SceneWorld) {
        *world.transform_mut() = Transform::new(self.config.view.basis, 0.0, 0.0, 1.0);
        world.set_voxels(VoxelRenderSet::from_layout(&self.layout, &mut self.rng));
        self.needs_fit = true;
        self.spawned = false;
        info!(
            tiles = self.layout.len(),
            grid_width = self.layout.bounds().width(),
            grid_height = self.layout.bounds().height(),
            "world_loaded"
        );
    }

    fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        self.update_view(input, world);
        self.update_terrain(input, world);
        self.update_actor(input, world);
        self.update_pointer(input, world);

        let wiggle_px = self.wiggle();
        world.set_player(self.spawned.then(|| PlayerVisual {
            position: self.actor.position(),
            z: self.actor.z(),
            wiggle_px,
        }));
        world.refresh_draw_sequence();
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        world.clear();
        info!("world_unloaded");
    }

    fn debug_title(&self, world: &SceneWorld) -> Option<String> {
        let transform = world.transform();
        let pointer = match self.pointer_grid {
            Some(grid) => format!("({:.2}, {:.2})", grid.x, grid.y),
            None => "-".to_string(),
        };
        let floor = match self.actor.footprint_beneath() {
            Some(surface) => format!("{:.1}", surface.floor_px(transform.scale())),
            None => "void".to_string(),
        };
        let position = self.actor.position();
        Some(format!(
            "{} | pointer {} | player ({:.2}, {:.2}) z {:.1} | floor {} | scale {:.3}",
            self.config.window.title,
            pointer,
            position.x,
            position.y,
            self.actor.z(),
            floor,
            transform.scale(),
        ))
    }
}

fn movement_intent(input: &InputSnapshot) -> MovementIntent {
    let mut intent = MovementIntent::default();
    for (direction, held, step) in MOVE_BINDINGS {
        intent.set_free_move(direction, input.is_down(held));
        intent.set_to_tile(direction, input.was_pressed(step));
    }
    intent
}
