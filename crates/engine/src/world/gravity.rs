use serde::{Deserialize, Serialize};

use super::layout::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GravityConfig {
    /// Added to the fall velocity every tick, in pixels per tick squared.
    pub gravity: f64,
    pub max_fall_speed: f64,
    pub levitate_speed: f64,
    /// Pixel `z` of the floor under pits. `None` lets actors fall forever.
    pub world_floor: Option<f64>,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            max_fall_speed: 15.0,
            levitate_speed: 3.0,
            world_floor: None,
        }
    }
}

/// What stops a fall where there is no tile.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FloorPolicy {
    #[default]
    Infinite,
    WorldFloor(f64),
}

impl GravityConfig {
    pub fn floor_policy(&self) -> FloorPolicy {
        match self.world_floor {
            Some(height) => FloorPolicy::WorldFloor(height),
            None => FloorPolicy::Infinite,
        }
    }
}

/// Pixel-space vertical state. Negative `z` is up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VerticalState {
    pub z: f64,
    pub velocity: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GravityOutcome {
    /// The floor stopped the actor this tick.
    pub grounded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GravityIntegrator {
    gravity: f64,
    max_fall_speed: f64,
    levitate_speed: f64,
    floor_policy: FloorPolicy,
}

impl GravityIntegrator {
    pub fn new(config: &GravityConfig) -> Self {
        Self {
            gravity: config.gravity,
            max_fall_speed: config.max_fall_speed,
            levitate_speed: config.levitate_speed,
            floor_policy: config.floor_policy(),
        }
    }

    pub fn floor_policy(&self) -> FloorPolicy {
        self.floor_policy
    }

    /// Pixel `z` the actor rests at: the surface beneath, else the policy floor.
    pub fn floor_z(&self, beneath: Option<Surface>, scale: f64) -> Option<f64> {
        match (beneath, self.floor_policy) {
            (Some(surface), _) => Some(surface.floor_px(scale)),
            (None, FloorPolicy::WorldFloor(height)) => Some(height),
            (None, FloorPolicy::Infinite) => None,
        }
    }

    pub fn step(
        &self,
        state: &mut VerticalState,
        beneath: Option<Surface>,
        scale: f64,
        levitate: bool,
    ) -> GravityOutcome {
        if levitate {
            state.velocity = 0.0;
            state.z -= self.levitate_speed;
        } else {
            state.velocity = (state.velocity + self.gravity).min(self.max_fall_speed);
            state.z += state.velocity;
        }

        let mut outcome = GravityOutcome::default();
        if let Some(floor) = self.floor_z(beneath, scale) {
            if state.z > floor {
                outcome.grounded = true;
                state.z = floor;
                state.velocity = 0.0;
            }
        }
        outcome
    }
}
