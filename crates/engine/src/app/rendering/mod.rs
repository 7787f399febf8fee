mod canvas;
mod renderer;

pub use canvas::{Canvas, FrameCanvas, Rgba};
pub use renderer::{paint_world, Renderer};
