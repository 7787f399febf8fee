//! Windowed shell: event loop, input collection, frame rendering.

mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{action_for_key, InputAction, KEY_BINDINGS};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{paint_world, Canvas, FrameCanvas, Renderer, Rgba};
pub use scene::{InputSnapshot, PanSignal, PlayerVisual, Scene, SceneWorld};
