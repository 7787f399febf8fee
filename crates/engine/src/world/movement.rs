use serde::{Deserialize, Serialize};
use tracing::debug;

use super::grid::{precise_add, sign_aware_ceiling, sign_aware_floor, GridPoint, TileKey};
use super::layout::Terrain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

const DIRECTION_COUNT: usize = 4;

impl Direction {
    pub const ALL: [Direction; DIRECTION_COUNT] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Y,
            Direction::Left | Direction::Right => Axis::X,
        }
    }

    /// `+1` for travel toward larger grid coordinates.
    pub const fn sign(self) -> i32 {
        match self {
            Direction::Up | Direction::Right => 1,
            Direction::Down | Direction::Left => -1,
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const fn positive(self) -> Direction {
        match self {
            Axis::X => Direction::Right,
            Axis::Y => Direction::Up,
        }
    }

    const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// Held (free) movement and one-shot move-to-tile triggers for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    free_move: [bool; DIRECTION_COUNT],
    to_tile: [bool; DIRECTION_COUNT],
}

impl MovementIntent {
    pub fn with_free_move(mut self, direction: Direction) -> Self {
        self.free_move[direction.index()] = true;
        self
    }

    pub fn with_to_tile(mut self, direction: Direction) -> Self {
        self.to_tile[direction.index()] = true;
        self
    }

    pub fn set_free_move(&mut self, direction: Direction, held: bool) {
        self.free_move[direction.index()] = held;
    }

    pub fn set_to_tile(&mut self, direction: Direction, triggered: bool) {
        self.to_tile[direction.index()] = triggered;
    }

    pub fn free_move(&self, direction: Direction) -> bool {
        self.free_move[direction.index()]
    }

    pub fn to_tile(&self, direction: Direction) -> bool {
        self.to_tile[direction.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveState {
    #[default]
    Idle,
    Transitioning(Direction),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MovementConfig {
    /// Grid units per tick.
    pub walk_speed: f64,
    /// Speed multiplier while both axes are in transit.
    pub diagonal_factor: f64,
    /// Tallest step, in tile height units, an actor can walk up.
    pub z_climb_max: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 0.2,
            diagonal_factor: 0.7,
            z_climb_max: 3.5,
        }
    }
}

/// Read-only world state a movement step needs.
#[derive(Clone, Copy)]
pub struct MoveContext<'a> {
    pub scale: f64,
    pub terrain: &'a dyn Terrain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockedMove {
    pub direction: Direction,
    pub tile: TileKey,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveReport {
    /// Indexed by axis, X first.
    pub blocked: [Option<BlockedMove>; 2],
    pub arrived: bool,
}

impl MoveReport {
    pub fn blocked_moves(&self) -> impl Iterator<Item = BlockedMove> + '_ {
        self.blocked.iter().flatten().copied()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AxisLane {
    state: MoveState,
    pending_reversal: bool,
}

/// Per-actor tile movement: one lane per axis, each either idle on a whole
/// tile or in transit toward the neighbouring one.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementController {
    config: MovementConfig,
    lanes: [AxisLane; 2],
    tile_origin: TileKey,
    latched_to_tile: [bool; DIRECTION_COUNT],
}

impl MovementController {
    pub fn new(config: MovementConfig, position: GridPoint) -> Self {
        Self {
            config,
            lanes: [AxisLane::default(); 2],
            tile_origin: position.occupied_tile(),
            latched_to_tile: [false; DIRECTION_COUNT],
        }
    }

    pub fn config(&self) -> MovementConfig {
        self.config
    }

    pub fn tile_origin(&self) -> TileKey {
        self.tile_origin
    }

    pub fn state(&self, axis: Axis) -> MoveState {
        self.lanes[axis.index()].state
    }

    pub fn is_on_tile(&self) -> bool {
        self.lanes
            .iter()
            .all(|lane| lane.state == MoveState::Idle)
    }

    pub fn latched(&self, direction: Direction) -> bool {
        self.latched_to_tile[direction.index()]
    }

    /// Drops all motion and re-anchors on the tile under `position`.
    pub fn reset(&mut self, position: GridPoint) {
        self.lanes = [AxisLane::default(); 2];
        self.latched_to_tile = [false; DIRECTION_COUNT];
        self.tile_origin = position.occupied_tile();
    }

    pub fn step(
        &mut self,
        position: &mut GridPoint,
        actor_z: f64,
        intent: &MovementIntent,
        ctx: MoveContext<'_>,
    ) -> MoveReport {
        self.latch_triggers(intent);
        for axis in [Axis::X, Axis::Y] {
            self.apply_intent(axis, position, intent);
        }

        let both_moving = !self
            .lanes
            .iter()
            .any(|lane| lane.state == MoveState::Idle);
        let speed = if both_moving {
            self.config.walk_speed * self.config.diagonal_factor
        } else {
            self.config.walk_speed
        };

        let mut report = MoveReport::default();
        for axis in [Axis::X, Axis::Y] {
            self.advance(axis, position, actor_z, speed, ctx, &mut report);
        }
        report
    }

    fn wants(&self, intent: &MovementIntent, direction: Direction) -> bool {
        intent.free_move(direction) || self.latched(direction)
    }

    fn latch_triggers(&mut self, intent: &MovementIntent) {
        for direction in Direction::ALL {
            if intent.to_tile(direction) && !intent.to_tile(direction.opposite()) {
                self.latched_to_tile[direction.index()] = true;
                self.latched_to_tile[direction.opposite().index()] = false;
            }
        }
    }

    fn apply_intent(&mut self, axis: Axis, position: &mut GridPoint, intent: &MovementIntent) {
        let forward = axis.positive();
        let backward = forward.opposite();
        let wants_forward = self.wants(intent, forward);
        let wants_backward = self.wants(intent, backward);

        match self.lanes[axis.index()].state {
            MoveState::Idle => {
                let direction = match (wants_forward, wants_backward) {
                    (true, false) => forward,
                    (false, true) => backward,
                    _ => return,
                };
                let origin = position.occupied_tile();
                set_component(&mut self.tile_origin, axis, component(origin, axis));
                set_coordinate(position, axis, component(origin, axis) as f64);
                self.lanes[axis.index()].state = MoveState::Transitioning(direction);
            }
            MoveState::Transitioning(direction) => {
                let wants_same = self.wants(intent, direction);
                let wants_reverse = self.wants(intent, direction.opposite());
                if wants_reverse && !wants_same {
                    self.lanes[axis.index()].pending_reversal = true;
                }
                self.resolve_reversal(axis, direction);
            }
        }
    }

    /// The tile being left becomes the target: the origin moves one tile along
    /// the old direction and travel flips.
    fn resolve_reversal(&mut self, axis: Axis, direction: Direction) {
        let lane = &mut self.lanes[axis.index()];
        if !lane.pending_reversal {
            return;
        }
        lane.pending_reversal = false;
        lane.state = MoveState::Transitioning(direction.opposite());
        let shifted = component(self.tile_origin, axis).saturating_add(direction.sign());
        set_component(&mut self.tile_origin, axis, shifted);
        self.latched_to_tile[direction.index()] = false;
    }

    fn advance(
        &mut self,
        axis: Axis,
        position: &mut GridPoint,
        actor_z: f64,
        speed: f64,
        ctx: MoveContext<'_>,
        report: &mut MoveReport,
    ) {
        let MoveState::Transitioning(direction) = self.lanes[axis.index()].state else {
            return;
        };
        let origin = component(self.tile_origin, axis);
        let boundary = origin.saturating_add(direction.sign());
        let step = speed * direction.sign() as f64;
        let mut next = precise_add(coordinate(*position, axis), step);
        let reached = if direction.sign() > 0 {
            next >= boundary as f64
        } else {
            next <= boundary as f64
        };
        if reached {
            next = boundary as f64;
        }

        let neighbour_along = if reached {
            boundary
        } else if direction.sign() > 0 {
            sign_aware_ceiling(next)
        } else {
            sign_aware_floor(next)
        };
        let across = other_coordinate(*position, axis).round() as i32;
        let neighbour = match axis {
            Axis::X => TileKey::new(neighbour_along, across),
            Axis::Y => TileKey::new(across, neighbour_along),
        };

        if self.climb_blocked(neighbour, actor_z, ctx) {
            set_coordinate(position, axis, origin as f64);
            self.finish(axis, direction);
            report.blocked[axis.index()] = Some(BlockedMove {
                direction,
                tile: neighbour,
            });
            debug!(
                direction = ?direction,
                tile_x = neighbour.x,
                tile_y = neighbour.y,
                "move_blocked"
            );
            return;
        }

        set_coordinate(position, axis, next);
        if reached {
            set_component(&mut self.tile_origin, axis, boundary);
            self.finish(axis, direction);
            report.arrived = true;
            debug_assert_eq!(coordinate(*position, axis).fract(), 0.0);
        }
    }

    fn finish(&mut self, axis: Axis, direction: Direction) {
        self.lanes[axis.index()] = AxisLane::default();
        self.latched_to_tile[direction.index()] = false;
    }

    fn climb_blocked(&self, neighbour: TileKey, actor_z: f64, ctx: MoveContext<'_>) -> bool {
        let Some(surface) = ctx.terrain.surface_at(neighbour) else {
            return false;
        };
        actor_z - self.config.z_climb_max * ctx.scale > surface.floor_px(ctx.scale)
    }
}

fn coordinate(point: GridPoint, axis: Axis) -> f64 {
    match axis {
        Axis::X => point.x,
        Axis::Y => point.y,
    }
}

fn other_coordinate(point: GridPoint, axis: Axis) -> f64 {
    match axis {
        Axis::X => point.y,
        Axis::Y => point.x,
    }
}

fn set_coordinate(point: &mut GridPoint, axis: Axis, value: f64) {
    match axis {
        Axis::X => point.x = value,
        Axis::Y => point.y = value,
    }
}

fn component(key: TileKey, axis: Axis) -> i32 {
    match axis {
        Axis::X => key.x,
        Axis::Y => key.y,
    }
}

fn set_component(key: &mut TileKey, axis: Axis, value: i32) {
    match axis {
        Axis::X => key.x = value,
        Axis::Y => key.y = value,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::world::layout::Surface;

    #[derive(Default)]
    struct StubTerrain {
        surfaces: HashMap<TileKey, Surface>,
    }

    impl StubTerrain {
        fn with(mut self, x: i32, y: i32, z: f64, height: f64) -> Self {
            self.surfaces.insert(TileKey::new(x, y), Surface { z, height });
            self
        }
    }

    impl Terrain for StubTerrain {
        fn surface_at(&self, key: TileKey) -> Option<Surface> {
            self.surfaces.get(&key).copied()
        }
    }

    fn flat_terrain() -> StubTerrain {
        let mut terrain = StubTerrain::default();
        for x in -5..=5 {
            for y in -5..=5 {
                terrain = terrain.with(x, y, 0.0, 1.0);
            }
        }
        terrain
    }

    fn step_n(
        controller: &mut MovementController,
        position: &mut GridPoint,
        intent: MovementIntent,
        terrain: &StubTerrain,
        ticks: usize,
    ) {
        let ctx = MoveContext {
            scale: 1.0,
            terrain,
        };
        for _ in 0..ticks {
            controller.step(position, -1.0, &intent, ctx);
        }
    }

    #[test]
    fn held_move_reaches_next_tile_exactly() {
        let terrain = flat_terrain();
        let mut position = GridPoint::new(0.0, 0.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);
        let right = MovementIntent::default().with_free_move(Direction::Right);

        step_n(&mut controller, &mut position, right, &terrain, 5);

        assert_eq!(position, GridPoint::new(1.0, 0.0));
        assert!(controller.is_on_tile());
        assert_eq!(controller.tile_origin(), TileKey::new(1, 0));
    }

    #[test]
    fn released_free_move_still_finishes_the_tile() {
        let terrain = flat_terrain();
        let mut position = GridPoint::new(0.0, 0.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);

        step_n(
            &mut controller,
            &mut position,
            MovementIntent::default().with_free_move(Direction::Down),
            &terrain,
            2,
        );
        assert_eq!(position.y, -0.4);
        assert_eq!(controller.state(Axis::Y), MoveState::Transitioning(Direction::Down));

        step_n(
            &mut controller,
            &mut position,
            MovementIntent::default(),
            &terrain,
            3,
        );
        assert_eq!(position, GridPoint::new(0.0, -1.0));
        assert!(controller.is_on_tile());
    }

    #[test]
    fn to_tile_trigger_latches_until_arrival() {
        let terrain = flat_terrain();
        let mut position = GridPoint::new(2.0, 2.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);

        step_n(
            &mut controller,
            &mut position,
            MovementIntent::default().with_to_tile(Direction::Up),
            &terrain,
            1,
        );
        assert!(controller.latched(Direction::Up));

        step_n(
            &mut controller,
            &mut position,
            MovementIntent::default(),
            &terrain,
            4,
        );
        assert_eq!(position, GridPoint::new(2.0, 3.0));
        assert!(!controller.latched(Direction::Up));

        step_n(
            &mut controller,
            &mut position,
            MovementIntent::default(),
            &terrain,
            3,
        );
        assert_eq!(position, GridPoint::new(2.0, 3.0));
    }

    #[test]
    fn alternating_opposite_triggers_always_settle_on_whole_tiles() {
        let terrain = flat_terrain();
        let mut position = GridPoint::new(0.0, 0.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);
        let ctx = MoveContext {
            scale: 1.0,
            terrain: &terrain,
        };

        for tick in 0..40 {
            let direction = if (tick / 3) % 2 == 0 {
                Direction::Right
            } else {
                Direction::Left
            };
            controller.step(
                &mut position,
                -1.0,
                &MovementIntent::default().with_to_tile(direction),
                ctx,
            );
            assert!(controller.latched(direction) || controller.is_on_tile());
            assert!(!controller.latched(direction.opposite()));
            if let MoveState::Transitioning(moving) = controller.state(Axis::X) {
                let origin = controller.tile_origin().x as f64;
                let target = origin + moving.sign() as f64;
                assert!(position.x > origin.min(target) && position.x < origin.max(target));
            }
            if controller.is_on_tile() {
                assert_eq!(position.x.fract(), 0.0);
                assert_eq!(position.x, controller.tile_origin().x as f64);
            }
        }

        for _ in 0..10 {
            controller.step(&mut position, -1.0, &MovementIntent::default(), ctx);
        }
        assert!(controller.is_on_tile());
        assert_eq!(position.x, position.x.round());
        assert_eq!(position.y, 0.0);
    }

    #[test]
    fn left_left_right_left_triggers_settle_one_tile_left() {
        let terrain = flat_terrain();
        let mut position = GridPoint::new(0.0, 0.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);
        let ctx = MoveContext {
            scale: 1.0,
            terrain: &terrain,
        };
        let presses = [
            Direction::Left,
            Direction::Left,
            Direction::Right,
            Direction::Left,
        ];
        let mut trace = Vec::new();

        for direction in presses {
            controller.step(
                &mut position,
                -1.0,
                &MovementIntent::default().with_to_tile(direction),
                ctx,
            );
            trace.push(position.x);
        }
        assert_eq!(trace, vec![-0.2, -0.4, -0.2, -0.4]);

        for _ in 0..10 {
            controller.step(&mut position, -1.0, &MovementIntent::default(), ctx);
            if controller.is_on_tile() {
                assert_eq!(position.x.fract(), 0.0);
            }
        }
        assert_eq!(position, GridPoint::new(-1.0, 0.0));
        assert_eq!(controller.tile_origin(), TileKey::new(-1, 0));
        assert!(controller.is_on_tile());
        assert!(!controller.latched(Direction::Left));
    }

    #[test]
    fn travel_at_the_edge_of_the_tile_range_does_not_overflow() {
        let terrain = StubTerrain::default();
        let ctx = MoveContext {
            scale: 1.0,
            terrain: &terrain,
        };

        let mut position = GridPoint::new(i32::MAX as f64, 0.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);
        controller.step(
            &mut position,
            0.0,
            &MovementIntent::default().with_free_move(Direction::Right),
            ctx,
        );
        assert_eq!(position.x, i32::MAX as f64);
        assert!(controller.is_on_tile());

        let mut position = GridPoint::new(0.0, i32::MIN as f64);
        let mut controller = MovementController::new(MovementConfig::default(), position);
        controller.step(
            &mut position,
            0.0,
            &MovementIntent::default().with_free_move(Direction::Down),
            ctx,
        );
        assert_eq!(position.y, i32::MIN as f64);
        assert!(controller.is_on_tile());
    }

    #[test]
    fn reversal_returns_to_the_tile_being_left() {
        let terrain = flat_terrain();
        let mut position = GridPoint::new(0.0, 0.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);

        step_n(
            &mut controller,
            &mut position,
            MovementIntent::default().with_free_move(Direction::Right),
            &terrain,
            2,
        );
        assert_eq!(position.x, 0.4);

        step_n(
            &mut controller,
            &mut position,
            MovementIntent::default().with_free_move(Direction::Left),
            &terrain,
            1,
        );
        assert_eq!(controller.tile_origin(), TileKey::new(1, 0));
        assert_eq!(
            controller.state(Axis::X),
            MoveState::Transitioning(Direction::Left)
        );
        assert_eq!(position.x, 0.2);

        step_n(
            &mut controller,
            &mut position,
            MovementIntent::default(),
            &terrain,
            1,
        );
        assert_eq!(position.x, 0.0);
        assert!(controller.is_on_tile());
        assert_eq!(controller.tile_origin(), TileKey::new(0, 0));
    }

    #[test]
    fn tall_neighbour_blocks_and_snaps_back_to_origin() {
        let terrain = StubTerrain::default()
            .with(0, 0, 0.0, 0.0)
            .with(1, 0, 0.0, 50.0);
        let mut position = GridPoint::new(0.0, 0.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);
        let ctx = MoveContext {
            scale: 1.0,
            terrain: &terrain,
        };

        for _ in 0..10 {
            let report = controller.step(
                &mut position,
                0.0,
                &MovementIntent::default().with_to_tile(Direction::Right),
                ctx,
            );
            assert_eq!(
                report.blocked_moves().next(),
                Some(BlockedMove {
                    direction: Direction::Right,
                    tile: TileKey::new(1, 0),
                })
            );
            assert_eq!(position, GridPoint::new(0.0, 0.0));
            assert!(controller.is_on_tile());
            assert!(!controller.latched(Direction::Right));
        }
    }

    #[test]
    fn low_step_is_climbable_and_pits_are_open() {
        let terrain = StubTerrain::default()
            .with(0, 0, 0.0, 1.0)
            .with(1, 0, 0.0, 3.0);
        let mut position = GridPoint::new(0.0, 0.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);
        let ctx = MoveContext {
            scale: 2.0,
            terrain: &terrain,
        };
        let right = MovementIntent::default().with_free_move(Direction::Right);

        // Standing on a height 1 tile at scale 2: z = -2. Gate: -2 - 7 = -9 > -6 is false.
        for _ in 0..5 {
            let report = controller.step(&mut position, -2.0, &right, ctx);
            assert_eq!(report.blocked_moves().count(), 0);
        }
        assert_eq!(position.x, 1.0);

        // Nothing at (2, 0): walking off the edge is allowed.
        for _ in 0..5 {
            controller.step(&mut position, -6.0, &right, ctx);
        }
        assert_eq!(position.x, 2.0);
    }

    #[test]
    fn opposite_intents_on_one_axis_cancel() {
        let terrain = flat_terrain();
        let mut position = GridPoint::new(0.0, 0.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);
        let both = MovementIntent::default()
            .with_free_move(Direction::Left)
            .with_free_move(Direction::Right);

        step_n(&mut controller, &mut position, both, &terrain, 3);

        assert_eq!(position, GridPoint::new(0.0, 0.0));
        assert!(controller.is_on_tile());
    }

    #[test]
    fn diagonal_travel_slows_both_axes() {
        let terrain = flat_terrain();
        let mut position = GridPoint::new(0.0, 0.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);
        let diagonal = MovementIntent::default()
            .with_free_move(Direction::Up)
            .with_free_move(Direction::Right);

        step_n(&mut controller, &mut position, diagonal, &terrain, 1);
        assert_eq!(position, GridPoint::new(0.14, 0.14));

        step_n(&mut controller, &mut position, diagonal, &terrain, 7);
        assert_eq!(position, GridPoint::new(1.0, 1.0));
        assert_eq!(controller.tile_origin(), TileKey::new(1, 1));
    }

    #[test]
    fn fast_walk_never_skips_a_tile() {
        let terrain = flat_terrain();
        let config = MovementConfig {
            walk_speed: 2.5,
            ..MovementConfig::default()
        };
        let mut position = GridPoint::new(0.0, 0.0);
        let mut controller = MovementController::new(config, position);

        step_n(
            &mut controller,
            &mut position,
            MovementIntent::default().with_free_move(Direction::Left),
            &terrain,
            1,
        );

        assert_eq!(position, GridPoint::new(-1.0, 0.0));
    }

    #[test]
    fn reset_reanchors_and_clears_triggers() {
        let terrain = flat_terrain();
        let mut position = GridPoint::new(0.0, 0.0);
        let mut controller = MovementController::new(MovementConfig::default(), position);
        step_n(
            &mut controller,
            &mut position,
            MovementIntent::default().with_to_tile(Direction::Up),
            &terrain,
            1,
        );

        controller.reset(GridPoint::new(3.0, -2.0));

        assert!(controller.is_on_tile());
        assert!(!controller.latched(Direction::Up));
        assert_eq!(controller.tile_origin(), TileKey::new(3, -2));
    }
}
