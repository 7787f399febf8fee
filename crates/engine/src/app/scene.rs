use super::input::{ActionStates, InputAction};
use crate::world::{
    DrawSequence, GridPoint, Occupant, OccupantKind, PixelPoint, Surface, Terrain, TileKey,
    Transform, VoxelRenderSet,
};

/// Middle-button pan gesture edges, carrying the pointer pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanSignal {
    Start(PixelPoint),
    Stop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    cursor_position_px: Option<PixelPoint>,
    place_actor_at: Option<PixelPoint>,
    pan_signal: Option<PanSignal>,
    zoom_delta_steps: i32,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        cursor_position_px: Option<PixelPoint>,
        place_actor_at: Option<PixelPoint>,
        pan_signal: Option<PanSignal>,
        zoom_delta_steps: i32,
        window_size: (u32, u32),
    ) -> Self {
        Self {
            quit_requested,
            actions,
            cursor_position_px,
            place_actor_at,
            pan_signal,
            zoom_delta_steps,
            window_width: window_size.0,
            window_height: window_size.1,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// `true` only on the tick the action's key went down.
    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self.actions = self.actions.with_pressed(action, false);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<PixelPoint>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_place_actor_at(mut self, place_actor_at: Option<PixelPoint>) -> Self {
        self.place_actor_at = place_actor_at;
        self
    }

    pub fn with_pan_signal(mut self, pan_signal: Option<PanSignal>) -> Self {
        self.pan_signal = pan_signal;
        self
    }

    pub fn with_zoom_delta_steps(mut self, zoom_delta_steps: i32) -> Self {
        self.zoom_delta_steps = zoom_delta_steps;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn cursor_position_px(&self) -> Option<PixelPoint> {
        self.cursor_position_px
    }

    pub fn place_actor_at(&self) -> Option<PixelPoint> {
        self.place_actor_at
    }

    pub fn pan_signal(&self) -> Option<PanSignal> {
        self.pan_signal
    }

    pub fn zoom_delta_steps(&self) -> i32 {
        self.zoom_delta_steps
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

/// How the player occupant is drawn this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerVisual {
    pub position: GridPoint,
    /// Pixel-space height, negative is up.
    pub z: f64,
    pub wiggle_px: PixelPoint,
}

/// Everything the renderer reads. Scenes write it during `update`.
#[derive(Debug, Default)]
pub struct SceneWorld {
    transform: Transform,
    voxels: Option<VoxelRenderSet>,
    player: Option<PlayerVisual>,
    cursor_tile: Option<TileKey>,
    draw_sequence: DrawSequence,
}

impl SceneWorld {
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn set_voxels(&mut self, voxels: VoxelRenderSet) {
        self.voxels = Some(voxels);
    }

    pub fn voxels(&self) -> Option<&VoxelRenderSet> {
        self.voxels.as_ref()
    }

    pub fn voxels_mut(&mut self) -> Option<&mut VoxelRenderSet> {
        self.voxels.as_mut()
    }

    pub fn set_player(&mut self, player: Option<PlayerVisual>) {
        self.player = player;
    }

    pub fn player(&self) -> Option<&PlayerVisual> {
        self.player.as_ref()
    }

    pub fn set_cursor_tile(&mut self, cursor_tile: Option<TileKey>) {
        self.cursor_tile = cursor_tile;
    }

    pub fn cursor_tile(&self) -> Option<TileKey> {
        self.cursor_tile
    }

    /// Surface under `key` in the rendered terrain.
    pub fn surface_at(&self, key: TileKey) -> Option<Surface> {
        self.voxels.as_ref().and_then(|voxels| voxels.surface_at(key))
    }

    /// Recomputes the painter's order for the current player and cursor.
    pub fn refresh_draw_sequence(&mut self) {
        let mut occupants = Vec::with_capacity(2);
        if let Some(player) = self.player {
            occupants.push(Occupant {
                kind: OccupantKind::Player,
                position: player.position,
            });
        }
        if let Some(cursor) = self.cursor_tile {
            occupants.push(Occupant {
                kind: OccupantKind::Cursor,
                position: GridPoint::from(cursor),
            });
        }
        match &self.voxels {
            Some(voxels) => voxels.fill_draw_sequence(&occupants, &mut self.draw_sequence),
            None => {
                self.draw_sequence.clear();
                self.draw_sequence.items.extend(
                    occupants
                        .into_iter()
                        .map(crate::world::DrawItem::Occupant),
                );
            }
        }
    }

    pub fn draw_sequence(&self) -> &DrawSequence {
        &self.draw_sequence
    }

    pub fn voxel_count(&self) -> usize {
        self.voxels.as_ref().map_or(0, VoxelRenderSet::len)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{DrawItem, GridBounds, TileDescriptor, TileLayout};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn world_with_row() -> SceneWorld {
        let layout = TileLayout::new(
            GridBounds::square(3),
            (0..3).map(|x| (TileKey::new(x, 1), TileDescriptor::new(1.0))),
        )
        .expect("layout");
        let mut world = SceneWorld::default();
        world.set_voxels(VoxelRenderSet::from_layout(
            &layout,
            &mut Pcg64::seed_from_u64(9),
        ));
        world
    }

    struct CountingScene {
        loads: usize,
        updates: usize,
        unloads: usize,
    }

    impl Scene for CountingScene {
        fn load(&mut self, world: &mut SceneWorld) {
            self.loads += 1;
            world.set_cursor_tile(Some(TileKey::new(0, 0)));
        }

        fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
            self.updates += 1;
            world.transform_mut().apply_zoom_steps(input.zoom_delta_steps());
        }

        fn unload(&mut self, world: &mut SceneWorld) {
            self.unloads += 1;
            world.clear();
        }
    }

    #[test]
    fn snapshot_builders_round_trip_fields() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_pressed(InputAction::Reshuffle)
            .with_cursor_position_px(Some(PixelPoint::new(4.0, 5.0)))
            .with_place_actor_at(Some(PixelPoint::new(1.0, 2.0)))
            .with_pan_signal(Some(PanSignal::Stop))
            .with_zoom_delta_steps(-2)
            .with_window_size((640, 480));

        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.was_pressed(InputAction::MoveLeft));
        assert!(snapshot.was_pressed(InputAction::Reshuffle));
        assert_eq!(snapshot.cursor_position_px(), Some(PixelPoint::new(4.0, 5.0)));
        assert_eq!(snapshot.place_actor_at(), Some(PixelPoint::new(1.0, 2.0)));
        assert_eq!(snapshot.pan_signal(), Some(PanSignal::Stop));
        assert_eq!(snapshot.zoom_delta_steps(), -2);
        assert_eq!(snapshot.window_size(), (640, 480));
        assert!(!snapshot.quit_requested());
    }

    #[test]
    fn draw_sequence_places_player_and_cursor_between_voxels() {
        let mut world = world_with_row();
        world.set_player(Some(PlayerVisual {
            position: GridPoint::new(1.0, 1.0),
            z: -1.0,
            wiggle_px: PixelPoint::default(),
        }));
        world.set_cursor_tile(Some(TileKey::new(0, 2)));
        world.refresh_draw_sequence();

        let sequence = world.draw_sequence();
        assert_eq!(sequence.voxel_count, 3);
        assert_eq!(sequence.occupant_index(OccupantKind::Player), Some(2));
        assert_eq!(sequence.occupant_index(OccupantKind::Cursor), Some(0));
        assert!(matches!(
            sequence.items[0],
            DrawItem::Occupant(Occupant {
                kind: OccupantKind::Cursor,
                ..
            })
        ));
        assert!(matches!(
            sequence.items[3],
            DrawItem::Occupant(Occupant {
                kind: OccupantKind::Player,
                ..
            })
        ));
        assert_eq!(sequence.items.len(), 5);
    }

    #[test]
    fn draw_sequence_without_terrain_still_lists_occupants() {
        let mut world = SceneWorld::default();
        world.set_cursor_tile(Some(TileKey::new(2, 2)));
        world.refresh_draw_sequence();

        assert_eq!(world.draw_sequence().items.len(), 1);
        assert_eq!(world.voxel_count(), 0);
        assert_eq!(world.surface_at(TileKey::new(2, 2)), None);
    }

    #[test]
    fn scene_lifecycle_reaches_world() {
        let mut scene = CountingScene {
            loads: 0,
            updates: 0,
            unloads: 0,
        };
        let mut world = world_with_row();

        scene.load(&mut world);
        scene.update(
            &InputSnapshot::empty().with_zoom_delta_steps(1),
            &mut world,
        );
        assert_eq!(world.transform().scale(), 1.1);
        assert_eq!(world.cursor_tile(), Some(TileKey::new(0, 0)));
        assert_eq!(world.surface_at(TileKey::new(1, 1)).map(|s| s.height), Some(1.0));

        scene.unload(&mut world);
        assert_eq!((scene.loads, scene.updates, scene.unloads), (1, 1, 1));
        assert!(world.voxels().is_none());
        assert!(scene.debug_title(&world).is_none());
    }
}
