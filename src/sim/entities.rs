//! Scene entities
//!
//! Only the geometric state is serialized. Activation flags and animation
//! timers are rebuilt by the frame update.
//!
//! Walls, doors, targets and triggers keep the placement they were authored
//! with next to their current one. The current placement is that authored
//! geometry moved by the level rotation, so rotating the level out and back
//! never wears it down.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec2};
use serde::{Deserialize, Serialize};

use super::entity::{EntityArray, Id};
use crate::consts::{MIRROR_DEFAULT_LENGTH, PORTAL_WIDTH, TARGET_DEFAULT_RADIUS, TRIGGER_RADIUS};
use crate::geometry::{
    Circle, move_on_stereographic_geodesic, stereographic_circle, stereographic_lerp, stereographic_segment_midpoint,
};

pub type Color = [f32; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallType {
    Reflecting,
    Absorbing,
}

/// Behaviour of the back of a mirror. The front always reflects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirrorWallType {
    Reflecting,
    Absorbing,
}

/// Behaviour of the back of a portal. The front always teleports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortalWallType {
    Portal,
    Reflecting,
    Absorbing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub endpoints: [Vec2; 2],
    /// Placement in the unrotated level
    pub initial_endpoints: [Vec2; 2],
    pub wall_type: WallType,
}

impl Wall {
    pub fn new(e0: Vec2, e1: Vec2, wall_type: WallType) -> Self {
        Self {
            endpoints: [e0, e1],
            initial_endpoints: [e0, e1],
            wall_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub position: Vec2,
    /// Direction of the beam at `position`
    pub angle: f32,
    pub color: Color,
    #[serde(default)]
    pub position_locked: bool,
}

impl Laser {
    pub fn new(position: Vec2, angle: f32, color: Color) -> Self {
        Self {
            position,
            angle,
            color,
            position_locked: false,
        }
    }
}

/// Geodesic offset of the two rim points of a centered object
fn rim_endpoints(center: Vec2, normal_angle: f32, length: f32) -> [Vec2; 2] {
    let along = normal_angle + FRAC_PI_2;
    [
        move_on_stereographic_geodesic(center, along, length / 2.0),
        move_on_stereographic_geodesic(center, along, -length / 2.0),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mirror {
    pub center: Vec2,
    /// Direction the reflective front faces
    pub normal_angle: f32,
    pub length: f32,
    pub wall_type: MirrorWallType,
    #[serde(default)]
    pub position_locked: bool,
}

impl Mirror {
    pub fn new(center: Vec2, normal_angle: f32, length: f32, wall_type: MirrorWallType) -> Self {
        Self {
            center,
            normal_angle,
            length,
            wall_type,
            position_locked: false,
        }
    }

    pub fn calculate_endpoints(&self) -> [Vec2; 2] {
        rim_endpoints(self.center, self.normal_angle, self.length)
    }
}

impl Default for Mirror {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0, MIRROR_DEFAULT_LENGTH, MirrorWallType::Reflecting)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub center: Vec2,
    pub normal_angle: f32,
    pub wall_type: PortalWallType,
    /// Toggled each time the portal is carried across the boundary
    #[serde(default)]
    pub orientation_reversing: bool,
    #[serde(default)]
    pub position_locked: bool,
    #[serde(default)]
    pub rotation_locked: bool,
}

impl Portal {
    pub fn new(center: Vec2, normal_angle: f32) -> Self {
        Self {
            center,
            normal_angle,
            wall_type: PortalWallType::Portal,
            orientation_reversing: false,
            position_locked: false,
            rotation_locked: false,
        }
    }

    pub fn endpoints(&self) -> [Vec2; 2] {
        rim_endpoints(self.center, self.normal_angle, PORTAL_WIDTH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalPair {
    pub portals: [Portal; 2],
}

impl PortalPair {
    pub fn new(a: Portal, b: Portal) -> Self {
        Self { portals: [a, b] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Door {
    pub endpoints: [Vec2; 2],
    /// Placement in the unrotated level
    pub initial_endpoints: [Vec2; 2],
    /// Index of the triggers that drive this door
    pub trigger_index: i32,
    /// Door is open while its trigger is off and closes when it fires
    #[serde(default)]
    pub open_by_default: bool,
    /// Rises toward 1 while the door's trigger is active and decays
    /// otherwise. See `openness` for how open the door actually is.
    #[serde(skip)]
    pub opening_t: f32,
}

impl Door {
    pub fn new(e0: Vec2, e1: Vec2, trigger_index: i32) -> Self {
        Self {
            endpoints: [e0, e1],
            initial_endpoints: [e0, e1],
            trigger_index,
            open_by_default: false,
            opening_t: 0.0,
        }
    }

    /// How far open the door is, 0 closed to 1 fully open
    pub fn openness(&self) -> f32 {
        let t = self.opening_t.clamp(0.0, 1.0);
        if self.open_by_default { 1.0 - t } else { t }
    }

    /// Pieces of the door that currently block beams
    ///
    /// The door opens from its geodesic midpoint: each half retracts toward its
    /// endpoint. Pieces shorter than `min_length` are left out, so a fully
    /// open door yields nothing.
    pub fn segments(&self, min_length: f32) -> impl Iterator<Item = [Vec2; 2]> + use<> {
        let [e0, e1] = self.endpoints;
        let midpoint = stereographic_segment_midpoint(e0, e1);
        let closed = 1.0 - self.openness();
        let halves = [
            [e0, stereographic_lerp(e0, midpoint, closed)],
            [stereographic_lerp(e1, midpoint, closed), e1],
        ];
        halves
            .into_iter()
            .filter(move |[a, b]| a.is_finite() && b.is_finite() && a.distance(*b) >= min_length)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub position: Vec2,
    pub initial_position: Vec2,
    /// Geodesic radius
    pub radius: f32,
    #[serde(skip)]
    pub activated: bool,
    #[serde(skip)]
    pub activated_last_frame: bool,
    #[serde(skip)]
    pub activation_animation_t: f32,
}

impl Target {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            initial_position: position,
            radius,
            activated: false,
            activated_last_frame: false,
            activation_animation_t: 0.0,
        }
    }

    pub fn circle(&self) -> Circle {
        stereographic_circle(self.position, self.radius)
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new(Vec2::ZERO, TARGET_DEFAULT_RADIUS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub position: Vec2,
    pub initial_position: Vec2,
    pub color: Color,
    pub index: i32,
    #[serde(skip)]
    pub activated: bool,
    #[serde(skip)]
    pub activation_animation_t: f32,
}

impl Trigger {
    pub const RADIUS: f32 = TRIGGER_RADIUS;

    pub fn new(position: Vec2, index: i32, color: Color) -> Self {
        Self {
            position,
            initial_position: position,
            color,
            index,
            activated: false,
            activation_animation_t: 0.0,
        }
    }

    pub fn circle(&self) -> Circle {
        stereographic_circle(self.position, Self::RADIUS)
    }
}

/// Handle to any entity a beam can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityId {
    Wall(Id<Wall>),
    Mirror(Id<Mirror>),
    PortalPair(Id<PortalPair>),
    Door(Id<Door>),
}

/// Every entity of a level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entities {
    pub walls: EntityArray<Wall>,
    pub lasers: EntityArray<Laser>,
    pub mirrors: EntityArray<Mirror>,
    pub portal_pairs: EntityArray<PortalPair>,
    pub triggers: EntityArray<Trigger>,
    pub doors: EntityArray<Door>,
    pub targets: EntityArray<Target>,
    /// Rotation applied so far to the authored walls, doors and orbs
    #[serde(default)]
    pub level_rotation: Quat,
}

/// Pull a point back onto the boundary if it drifted outside the disk
pub fn snap_inside_boundary(v: Vec2) -> Vec2 {
    let length = v.length();
    let max_length = Circle::BOUNDARY.radius;
    if length > max_length { v * (max_length / length) } else { v }
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp every position and endpoint to the disk
    ///
    /// Walls, doors and orbs are clamped in their authored placement. Their
    /// current placement may legitimately reach past the boundary after a
    /// rotation and is left to `place_fixed_geometry`.
    pub fn snap_inside_boundary(&mut self) {
        for laser in self.lasers.values_mut() {
            laser.position = snap_inside_boundary(laser.position);
        }
        for mirror in self.mirrors.values_mut() {
            mirror.center = snap_inside_boundary(mirror.center);
        }
        for pair in self.portal_pairs.values_mut() {
            for portal in &mut pair.portals {
                portal.center = snap_inside_boundary(portal.center);
            }
        }
        for wall in self.walls.values_mut() {
            wall.initial_endpoints = wall.initial_endpoints.map(snap_inside_boundary);
        }
        for door in self.doors.values_mut() {
            door.initial_endpoints = door.initial_endpoints.map(snap_inside_boundary);
        }
        for target in self.targets.values_mut() {
            target.initial_position = snap_inside_boundary(target.initial_position);
        }
        for trigger in self.triggers.values_mut() {
            trigger.initial_position = snap_inside_boundary(trigger.initial_position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::stereographic_distance;
    use std::f32::consts::PI;

    #[test]
    fn test_mirror_endpoints_are_centered() {
        let mirror = Mirror::new(Vec2::new(0.5, 0.0), PI, 0.6, MirrorWallType::Reflecting);
        let [a, b] = mirror.calculate_endpoints();
        assert!((stereographic_distance(a, mirror.center) - 0.3).abs() < 1e-4);
        assert!((stereographic_distance(b, mirror.center) - 0.3).abs() < 1e-4);
        // Facing -x, so the rim runs vertically.
        assert!((a.y + b.y).abs() < 1e-5);
        assert!(a.y.abs() > 0.1);
    }

    #[test]
    fn test_portal_width() {
        let portal = Portal::new(Vec2::new(-0.2, 0.3), 1.0);
        let [a, b] = portal.endpoints();
        assert!((stereographic_distance(a, b) - PORTAL_WIDTH).abs() < 1e-4);
    }

    #[test]
    fn test_door_segments_follow_opening() {
        let mut door = Door::new(Vec2::new(0.0, -0.4), Vec2::new(0.0, 0.4), 0);
        let closed: Vec<_> = door.segments(0.001).collect();
        assert_eq!(closed.len(), 2);
        assert!(closed[0][1].distance(closed[1][0]) < 1e-5);

        door.opening_t = 0.5;
        let half_open: Vec<_> = door.segments(0.001).collect();
        assert_eq!(half_open.len(), 2);
        assert!(half_open[0][1].distance(half_open[1][0]) > 0.1);

        door.opening_t = 1.0;
        assert_eq!(door.segments(0.001).count(), 0);
    }

    #[test]
    fn test_open_by_default_door_inverts_trigger_progress() {
        let mut door = Door::new(Vec2::new(0.0, -0.4), Vec2::new(0.0, 0.4), 0);
        door.open_by_default = true;
        assert_eq!(door.openness(), 1.0);
        assert_eq!(door.segments(0.001).count(), 0);

        door.opening_t = 1.0;
        assert_eq!(door.openness(), 0.0);
        assert_eq!(door.segments(0.001).count(), 2);
    }

    #[test]
    fn test_snap_inside_boundary() {
        let mut entities = Entities::new();
        let id = entities.targets.create(Target::new(Vec2::new(3.0, 4.0), 0.05));
        let laser = entities.lasers.create(Laser::new(Vec2::new(0.0, -2.0), 0.0, [1.0; 3]));
        entities.snap_inside_boundary();
        let target = entities.targets.get(id).expect("target exists");
        assert!((target.initial_position - Vec2::new(0.6, 0.8)).length() < 1e-6);
        let laser = entities.lasers.get(laser).expect("laser exists");
        assert!((laser.position - Vec2::new(0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_snap_leaves_current_wall_placement_alone() {
        let mut entities = Entities::new();
        let mut wall = Wall::new(Vec2::new(0.7, 0.0), Vec2::new(0.9, 0.0), WallType::Reflecting);
        // Rotated so one end reaches past the boundary.
        wall.endpoints = [Vec2::new(0.9, 0.0), Vec2::new(1.1, 0.0)];
        let id = entities.walls.create(wall);
        entities.snap_inside_boundary();
        let wall = entities.walls.get(id).expect("wall exists");
        assert_eq!(wall.endpoints[1], Vec2::new(1.1, 0.0));
    }

    #[test]
    fn test_runtime_state_is_not_serialized() {
        let mut target = Target::new(Vec2::new(0.1, 0.2), 0.05);
        target.activated = true;
        let json = serde_json::to_string(&target).expect("serializes");
        let back: Target = serde_json::from_str(&json).expect("deserializes");
        assert!(!back.activated);
        assert_eq!(back.position, target.position);
        assert_eq!(back.initial_position, target.initial_position);
    }

    #[test]
    fn test_level_rotation_survives_serialization() {
        let mut entities = Entities::new();
        entities
            .walls
            .create(Wall::new(Vec2::new(0.1, 0.0), Vec2::new(0.2, 0.0), WallType::Absorbing));
        entities.level_rotation = Quat::from_rotation_y(0.3);
        let json = serde_json::to_string(&entities).expect("serializes");
        let back: Entities = serde_json::from_str(&json).expect("deserializes");
        assert!(back.level_rotation.abs_diff_eq(entities.level_rotation, 1e-6));
        assert_eq!(back.walls.len(), 1);
    }
}
