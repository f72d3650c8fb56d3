//! Stereographic model of the elliptic plane
//!
//! The 3D coordinate system is the unit sphere restricted to the lower
//! hemisphere (z <= 0). The 2D coordinate system is the unit disk. Points are
//! mapped with the stereographic projection from the north pole, so the south
//! pole lands on the origin and the equator on the boundary circle.
//!
//! Geodesics (great circles) project to either a straight line through the
//! origin or a circle that also passes through the antipode of each of its
//! points.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::circle::{Circle, circle_through_points};
use super::tolerance::Tolerances;
use crate::{oriented, rot90};

/// A geodesic of the elliptic plane as drawn in the disk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StereographicLine {
    /// Euclidean line through the origin, stored as its unit normal
    Line { normal: Vec2 },
    /// Euclidean circle
    Circle(Circle),
}

// https://en.wikipedia.org/wiki/Stereographic_projection#First_formulation
pub fn to_stereographic(p: Vec3) -> Vec2 {
    let d = 1.0 - p.z;
    Vec2::new(p.x / d, p.y / d)
}

pub fn from_stereographic(p: Vec2) -> Vec3 {
    let len_sq = p.length_squared();
    let d = len_sq + 1.0;
    (Vec3::new(2.0 * p.x, 2.0 * p.y, len_sq - 1.0) / d).normalize()
}

/// Unit tangent on the sphere at `from_stereographic(pos)` matching the disk
/// direction `direction`.
///
/// This is the differential of the inverse projection. The projection is
/// conformal, so the disk angle carries over unchanged.
pub fn sphere_tangent(pos: Vec2, direction: Vec2) -> Vec3 {
    let s = 1.0 + pos.length_squared();
    let pd = pos.dot(direction);
    let planar = direction * (2.0 / s) - pos * (4.0 * pd / (s * s));
    Vec3::new(planar.x, planar.y, 4.0 * pd / (s * s)).normalize()
}

/// Move along a great circle starting at `pos` with initial tangent `tangent`
pub fn move_on_spherical_geodesic(pos: Vec3, tangent: Vec3, distance: f32) -> Vec3 {
    let axis = pos.cross(tangent);
    if axis.length_squared() == 0.0 {
        return pos;
    }
    let rotation = Quat::from_axis_angle(axis.normalize(), distance);
    // Rotation drifts off the sphere and the projection amplifies it near the
    // boundary, so renormalize.
    (rotation * pos).normalize()
}

/// Move `pos` along the geodesic leaving it at disk angle `angle` by the
/// signed arc length `distance`.
pub fn move_on_stereographic_geodesic(pos: Vec2, angle: f32, distance: f32) -> Vec2 {
    let tangent = sphere_tangent(pos, oriented(angle));
    to_stereographic(move_on_spherical_geodesic(from_stereographic(pos), tangent, distance))
}

/// Image of the antipodal point on the sphere
///
/// Unstable near the origin, whose antipode is the point at infinity.
pub fn antipodal_point(p: Vec2) -> Vec2 {
    -p / p.length_squared()
}

pub fn spherical_distance(a: Vec3, b: Vec3) -> f32 {
    a.normalize().dot(b.normalize()).clamp(-1.0, 1.0).acos()
}

/// Great-circle distance between two disk points
pub fn stereographic_distance(a: Vec2, b: Vec2) -> f32 {
    spherical_distance(from_stereographic(a), from_stereographic(b))
}

/// Geodesic midpoint of two disk points (the shorter arc on the sphere)
pub fn stereographic_segment_midpoint(e0: Vec2, e1: Vec2) -> Vec2 {
    // Adding two unit vectors gives a rhombus whose diagonal bisects the angle.
    to_stereographic((from_stereographic(e0) + from_stereographic(e1)).normalize())
}

/// Point at fraction `t` along the geodesic from `a` to `b`
pub fn stereographic_lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    let sa = from_stereographic(a);
    let sb = from_stereographic(b);
    let angle = spherical_distance(sa, sb);
    let sin = angle.sin();
    if sin.abs() < 1e-6 {
        return a.lerp(b, t);
    }
    let p = sa * (((1.0 - t) * angle).sin() / sin) + sb * ((t * angle).sin() / sin);
    to_stereographic(p.normalize())
}

fn nearly_collinear(p0: Vec2, p1: Vec2, p2: Vec2, tolerance: f32) -> bool {
    // https://math.stackexchange.com/questions/405966
    let longest_side = p0.distance(p1).max(p0.distance(p2)).max(p1.distance(p2));
    if longest_side == 0.0 {
        return true;
    }
    let parallelogram_area = (p1 - p0).perp_dot(p2 - p0).abs();
    parallelogram_area / longest_side < tolerance
}

/// Geodesic through two points
pub fn stereographic_line(p0: Vec2, p1: Vec2, tol: &Tolerances) -> StereographicLine {
    // The antipode of the origin is at infinity, so take the antipode of the
    // point farther from the origin.
    let p2 = if p0.length_squared() > p1.length_squared() {
        antipodal_point(p0)
    } else {
        antipodal_point(p1)
    };

    if !p2.is_finite() || nearly_collinear(p0, p1, p2, tol.collinearity) {
        return line_through_origin(p0, p1);
    }

    // A great circle passes through the antipode of each of its points. For a
    // point on the boundary that antipode is its mirror image, which carries
    // less information than the antipode of the other point.
    let antipodal = if (p0.length() - 1.0).abs() < tol.near_boundary {
        antipodal_point(p1)
    } else {
        antipodal_point(p0)
    };
    match circle_through_points(p0, p1, antipodal) {
        Some(circle) => StereographicLine::Circle(circle),
        None => line_through_origin(p0, p1),
    }
}

fn line_through_origin(p0: Vec2, p1: Vec2) -> StereographicLine {
    let along = if p0.distance_squared(p1) > 0.0 {
        p0 - p1
    } else if p0.length_squared() > 0.0 {
        p0
    } else {
        Vec2::X
    };
    StereographicLine::Line {
        normal: rot90(along).normalize(),
    }
}

/// Geodesic through `p` whose tangent at `p` points at `tangent_angle`
pub fn stereographic_line_through_point_with_tangent(
    p: Vec2,
    tangent_angle: f32,
    tol: &Tolerances,
) -> StereographicLine {
    let point_ahead = move_on_stereographic_geodesic(p, tangent_angle, tol.nudge_distance);
    stereographic_line(p, point_ahead, tol)
}

/// Local normal of a geodesic at a point on it
///
/// For circles the normal points away from the center.
pub fn stereographic_line_normal_at(line: &StereographicLine, p: Vec2) -> Vec2 {
    match line {
        StereographicLine::Circle(circle) => (p - circle.center).normalize_or_zero(),
        StereographicLine::Line { normal } => *normal,
    }
}

/// Tangent of a geodesic at `point_on_line`, oriented away from `point_before`
pub fn tangent_at_point_on_line(line: &StereographicLine, point_on_line: Vec2, point_before: Vec2) -> Vec2 {
    let tangent = rot90(stereographic_line_normal_at(line, point_on_line));
    // The circle center jumps when the line flips between the circle and line
    // variants, so orient explicitly.
    if tangent.dot(point_on_line - point_before) < 0.0 {
        -tangent
    } else {
        tangent
    }
}

/// Snap a point back onto the curve of `line`
pub fn project_onto_line(line: &StereographicLine, p: Vec2) -> Vec2 {
    match line {
        StereographicLine::Circle(circle) => {
            let offset = (p - circle.center).normalize_or_zero();
            circle.center + offset * circle.radius
        }
        StereographicLine::Line { normal } => p - normal.dot(p) * *normal,
    }
}

/// Disk image of the spherical circle of geodesic radius `radius` around `position`
///
/// The projected center of the spherical circle is not the center of the disk
/// circle; for small radii the difference is not noticeable.
pub fn stereographic_circle(position: Vec2, radius: f32) -> Circle {
    use std::f32::consts::FRAC_PI_2;
    let p0 = move_on_stereographic_geodesic(position, 0.0, radius);
    let p1 = move_on_stereographic_geodesic(position, FRAC_PI_2, radius);
    let p2 = move_on_stereographic_geodesic(position, 2.0 * FRAC_PI_2, radius);
    circle_through_points(p0, p1, p2).unwrap_or(Circle::new(position, radius))
}
