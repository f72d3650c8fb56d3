//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex with position and color, laid out for a GPU vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl LineVertex {
    pub const STRIDE: usize = std::mem::size_of::<LineVertex>();

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Colors for scene elements
pub mod colors {
    pub const BOUNDARY: [f32; 4] = [0.3, 0.3, 0.4, 1.0];
    pub const WALL_REFLECTING: [f32; 4] = [0.7, 0.7, 0.8, 1.0];
    pub const WALL_ABSORBING: [f32; 4] = [0.15, 0.15, 0.2, 1.0];
    pub const MIRROR: [f32; 4] = [0.6, 0.85, 1.0, 1.0];
    pub const PORTAL: [f32; 4] = [0.6, 0.2, 0.8, 1.0];
    pub const DOOR: [f32; 4] = [0.9, 0.85, 0.3, 1.0];
}
