//! WebGPU rendering module
//!
//! The scene is flat colored triangles: tiles, gems and the ball. Overlays
//! and the HUD are DOM elements owned by the shell.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{Viewport, build_scene};
pub use vertex::Vertex;
