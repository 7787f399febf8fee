//! Windowing-free core: grid math, terrain, draw ordering and actor physics.

mod actor;
mod gravity;
mod grid;
mod layout;
mod movement;
mod transform;
mod voxels;

pub use actor::{Actor, ActorTick, ActorTickReport};
pub use gravity::{FloorPolicy, GravityConfig, GravityIntegrator, GravityOutcome, VerticalState};
pub use grid::{
    precise_add, precise_rem, precise_sub, round_to, sign_aware_ceiling, sign_aware_floor,
    GridPoint, PixelPoint, TileKey, DRIFT_SAFE_DECIMALS,
};
pub use layout::{
    GridBounds, LayoutError, Surface, Terrain, TileDescriptor, TileLayout, TileStyle,
};
pub use movement::{
    Axis, BlockedMove, Direction, MoveContext, MoveReport, MoveState, MovementConfig,
    MovementController, MovementIntent,
};
pub use transform::{Basis, Transform, DEGENERATE_DET_EPSILON, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
pub use voxels::{
    footprint, footprint_at, prism_faces, DrawItem, DrawSequence, Occupant, OccupantKind,
    RenderVoxel, VoxelFaces, VoxelRenderSet,
};
