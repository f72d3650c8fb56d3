//! Deterministic simulation module
//!
//! All puzzle logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by entity slot)
//! - No rendering or platform dependencies

pub mod activation;
pub mod entities;
pub mod entity;
pub mod isometry;
pub mod laser;
pub mod scene;
pub mod state;

pub use activation::{TriggerInfo, has_overlaps, level_complete, trigger_info, update_constant_speed_t};
pub use entities::{
    Color, Door, Entities, EntityId, Laser, Mirror, MirrorWallType, Portal, PortalPair, PortalWallType, Target, Trigger,
    Wall, WallType,
};
pub use entity::{EntityArray, Id};
pub use isometry::{apply_isometry, apply_to_point, place_fixed_geometry};
pub use laser::{BeamState, LaserTrace, Termination, TracedSegment, trace_laser};
pub use scene::{ObstacleSegment, Surface, for_each_obstacle_segment};
pub use state::{GameState, Segment, dedup_segments};
