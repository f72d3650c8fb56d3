//! Rigid motions of the elliptic plane
//!
//! A rotation of the sphere moves the whole level. Whatever rotates past the
//! equator is replaced by its antipode, which is the same point of the
//! elliptic plane seen from inside the disk.
//!
//! Walls, doors and orbs are placed from their authored geometry by the
//! accumulated level rotation. Mirrors, portals and lasers are moved one
//! rotation at a time, since players drag them around between rotations.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec2};

use super::entities::Entities;
use crate::geometry::{
    Circle, Tolerances, antipodal_point, from_stereographic, move_on_stereographic_geodesic, stereographic_line,
    stereographic_line_normal_at, to_stereographic,
};
use crate::{angle_of, oriented};

pub fn apply_to_point(p: Vec2, rotation: Quat) -> Vec2 {
    to_stereographic(rotation * from_stereographic(p))
}

fn outside(p: Vec2) -> bool {
    p.length() > Circle::BOUNDARY.radius
}

/// Rotate both endpoints, keeping the pair on the same copy of the segment
fn transform_endpoints(endpoints: [Vec2; 2], rotation: Quat) -> [Vec2; 2] {
    let moved = endpoints.map(|p| apply_to_point(p, rotation));
    if moved.iter().all(|p| outside(*p)) {
        moved.map(antipodal_point)
    } else {
        moved
    }
}

/// Rotate a point carrying a normal direction
///
/// Returns the new point, the new normal angle and whether the point was
/// flipped to its antipode.
fn transform_with_normal_angle(position: Vec2, normal_angle: f32, rotation: Quat, tol: &Tolerances) -> (Vec2, f32, bool) {
    let second_point = move_on_stereographic_geodesic(position, normal_angle + FRAC_PI_2, tol.nudge_distance);

    let mut new_position = apply_to_point(position, rotation);
    let flipped = outside(new_position);
    if flipped {
        new_position = antipodal_point(new_position);
    }
    let new_second_point = apply_to_point(second_point, rotation);
    let new_line = stereographic_line(new_position, new_second_point, tol);
    let mut new_normal = stereographic_line_normal_at(&new_line, new_position);

    // Track a point on the normal side to keep the normal facing the same way.
    let mut normal_side = apply_to_point(position + oriented(normal_angle) * tol.nudge_distance, rotation);
    if flipped {
        normal_side = antipodal_point(normal_side);
    }
    if new_normal.dot(normal_side - new_position) < 0.0 {
        new_normal = -new_normal;
    }
    (new_position, angle_of(new_normal), flipped)
}

fn transform_orb(position: Vec2, rotation: Quat) -> Vec2 {
    let moved = apply_to_point(position, rotation);
    if outside(moved) { antipodal_point(moved) } else { moved }
}

/// Place walls, doors and orbs at their authored geometry moved by the level
/// rotation
pub fn place_fixed_geometry(entities: &mut Entities) {
    let rotation = entities.level_rotation;
    for wall in entities.walls.values_mut() {
        wall.endpoints = transform_endpoints(wall.initial_endpoints, rotation);
    }
    for door in entities.doors.values_mut() {
        door.endpoints = transform_endpoints(door.initial_endpoints, rotation);
    }
    for target in entities.targets.values_mut() {
        target.position = transform_orb(target.initial_position, rotation);
    }
    for trigger in entities.triggers.values_mut() {
        trigger.position = transform_orb(trigger.initial_position, rotation);
    }
}

/// Rotate the whole level by `rotation` on top of what it has turned so far
pub fn apply_isometry(entities: &mut Entities, rotation: Quat, tol: &Tolerances) {
    entities.level_rotation = (rotation * entities.level_rotation).normalize();
    place_fixed_geometry(entities);

    for mirror in entities.mirrors.values_mut() {
        (mirror.center, mirror.normal_angle, _) =
            transform_with_normal_angle(mirror.center, mirror.normal_angle, rotation, tol);
    }
    for pair in entities.portal_pairs.values_mut() {
        for portal in &mut pair.portals {
            let flipped;
            (portal.center, portal.normal_angle, flipped) =
                transform_with_normal_angle(portal.center, portal.normal_angle, rotation, tol);
            if flipped {
                portal.orientation_reversing = !portal.orientation_reversing;
            }
        }
    }
    for laser in entities.lasers.values_mut() {
        // The beam angle is carried along like a normal.
        (laser.position, laser.angle, _) = transform_with_normal_angle(laser.position, laser.angle, rotation, tol);
    }
}
