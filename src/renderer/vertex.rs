//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const TILE: [f32; 4] = [0.39, 0.40, 0.95, 1.0]; // indigo
    pub const TILE_EDGE: [f32; 4] = [0.31, 0.27, 0.90, 1.0];
    pub const TILE_GLOW: [f32; 4] = [0.39, 0.40, 0.95, 0.3];
    pub const GEM: [f32; 4] = [0.98, 0.80, 0.08, 1.0]; // yellow
    pub const BALL: [f32; 4] = [0.93, 0.28, 0.60, 1.0]; // pink
    pub const BALL_GLOW: [f32; 4] = [0.93, 0.28, 0.60, 0.35];
    pub const BACKGROUND: [f32; 4] = [0.06, 0.09, 0.16, 1.0]; // slate
}
