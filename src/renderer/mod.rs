//! Rendering hand-off
//!
//! Turns the frame's beam segments and obstacles into vertex data. Drawing
//! itself belongs to whatever graphics backend consumes the buffers.

pub mod shapes;
pub mod vertex;

pub use shapes::{boundary_vertices, obstacle_vertices, segment_vertices, tessellate_segment};
pub use vertex::{LineVertex, colors};
