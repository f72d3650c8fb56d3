//! Intersections between geodesics, geodesic segments and circles
//!
//! A segment is a piece of a geodesic between two endpoints. Membership is
//! decided on the sphere, because a large part of a projected circle can lie
//! outside the disk and the shorter planar arc is then not the shorter
//! spherical arc.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::circle::{Circle, PointList, circle_vs_circle_intersection, line_vs_circle_intersection};
use super::stereographic::{
    StereographicLine, antipodal_point, from_stereographic, project_onto_line, stereographic_circle,
    stereographic_line,
};
use super::tolerance::Tolerances;
use crate::{angle_of, angle_to_range_zero_tau, polar_to_cartesian, rot90};

/// A bounded piece of a geodesic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StereographicSegment {
    pub line: StereographicLine,
    pub endpoints: [Vec2; 2],
}

impl StereographicSegment {
    pub fn new(e0: Vec2, e1: Vec2, tol: &Tolerances) -> Self {
        Self {
            line: stereographic_line(e0, e1, tol),
            endpoints: [e0, e1],
        }
    }
}

/// One piece of a segment after splitting at the boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitSegment {
    pub endpoints: [Vec2; 2],
    /// The piece is the antipodal image of the part that left the disk
    pub mirrored: bool,
}

/// Up to two split pieces, the piece inside the disk first
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SplitSegments {
    pieces: [Option<SplitSegment>; 2],
}

impl SplitSegments {
    fn one(piece: SplitSegment) -> Self {
        Self {
            pieces: [Some(piece), None],
        }
    }

    fn two(first: SplitSegment, second: SplitSegment) -> Self {
        Self {
            pieces: [Some(first), Some(second)],
        }
    }

    pub fn len(&self) -> usize {
        self.pieces.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = SplitSegment> + '_ {
        self.pieces.iter().flatten().copied()
    }
}

pub fn stereographic_line_vs_circle_intersection(line: &StereographicLine, circle: &Circle) -> PointList {
    match line {
        StereographicLine::Line { normal } => line_vs_circle_intersection(Vec2::ZERO, rot90(*normal), circle),
        StereographicLine::Circle(c) => circle_vs_circle_intersection(c, circle),
    }
}

pub fn stereographic_line_vs_stereographic_line_intersection(
    a: &StereographicLine,
    b: &StereographicLine,
) -> PointList {
    match (a, b) {
        (StereographicLine::Line { normal: na }, StereographicLine::Line { normal: nb }) => {
            // Both pass through the origin; their other common point is at infinity.
            let mut out = PointList::new();
            if na.perp_dot(*nb) != 0.0 {
                out.push(Vec2::ZERO);
            }
            out
        }
        (StereographicLine::Line { normal }, StereographicLine::Circle(circle))
        | (StereographicLine::Circle(circle), StereographicLine::Line { normal }) => {
            line_vs_circle_intersection(Vec2::ZERO, rot90(*normal), circle)
        }
        (StereographicLine::Circle(c0), StereographicLine::Circle(c1)) => circle_vs_circle_intersection(c0, c1),
    }
}

/// Check whether a point already known to lie on the segment's geodesic lies
/// between its endpoints.
///
/// The point is projected onto the chord of the endpoints on the sphere.
/// Points within `epsilon` of an endpoint are always accepted, so a beam aimed
/// exactly at an endpoint still hits.
pub fn is_point_on_line_also_on_stereographic_segment(endpoint0: Vec2, endpoint1: Vec2, point: Vec2, epsilon: f32) -> bool {
    if point.distance(endpoint0) < epsilon || point.distance(endpoint1) < epsilon {
        return true;
    }

    let e0 = from_stereographic(endpoint0);
    let e1 = from_stereographic(endpoint1);
    let p = from_stereographic(point);

    // The other half of the great circle projects onto the same chord range,
    // so reject points on the wrong hemisphere first. Antipodal endpoints are
    // ambiguous and reject everything.
    let chord_center = (e0 + e1) / 2.0;
    let side = chord_center.normalize_or_zero().dot(p);
    if side <= 0.0 {
        return false;
    }

    let t = e1 - e0;
    let along = p.dot(t);
    along >= e0.dot(t) && along <= e1.dot(t)
}

pub fn stereographic_segment_vs_circle_intersection(
    segment: &StereographicSegment,
    circle: &Circle,
    epsilon: f32,
) -> PointList {
    let [e0, e1] = segment.endpoints;
    stereographic_line_vs_circle_intersection(&segment.line, circle)
        .iter()
        .filter(|p| is_point_on_line_also_on_stereographic_segment(e0, e1, *p, epsilon))
        .collect()
}

pub fn stereographic_segment_vs_stereographic_segment_intersection(
    a: &StereographicSegment,
    b: &StereographicSegment,
    epsilon: f32,
) -> PointList {
    stereographic_line_vs_stereographic_line_intersection(&a.line, &b.line)
        .iter()
        .filter(|p| {
            is_point_on_line_also_on_stereographic_segment(a.endpoints[0], a.endpoints[1], *p, epsilon)
                && is_point_on_line_also_on_stereographic_segment(b.endpoints[0], b.endpoints[1], *p, epsilon)
        })
        .collect()
}

/// True if both points lie on the boundary and are (nearly) each other's antipode
pub fn are_nearly_antipodal(e0: Vec2, e1: Vec2, tol: &Tolerances) -> bool {
    (e0.length() - 1.0).abs() < tol.near_boundary
        && (e1.length() - 1.0).abs() < tol.near_boundary
        && (e0 + e1).length() < tol.antipodal
}

/// Midpoint of the chord between two points, snapped onto `line`
///
/// Used to split arcs between antipodal boundary points, where the geodesic
/// midpoint is undefined. Deriving the midpoint from the concrete line keeps
/// the split consistent with what collision sees. Callers choose which of the
/// two antipodal candidates to keep.
pub fn chord_midpoint_on_line(line: &StereographicLine, e0: Vec2, e1: Vec2) -> Vec2 {
    let chord_midpoint = (e0 + e1) / 2.0;
    match line {
        StereographicLine::Line { .. } => chord_midpoint,
        StereographicLine::Circle(_) => project_onto_line(line, chord_midpoint),
    }
}

/// Split a segment so every piece lies inside the disk
///
/// A segment with one endpoint outside the boundary continues on the
/// antipodal side, so it is cut where it meets the boundary and the outer part
/// is replaced by its antipodal image. A segment between antipodal boundary
/// points is cut at a midpoint derived from its line.
pub fn split_stereographic_segment(endpoint0: Vec2, endpoint1: Vec2, tol: &Tolerances) -> SplitSegments {
    let whole = SplitSegment {
        endpoints: [endpoint0, endpoint1],
        mirrored: false,
    };
    let boundary = Circle::BOUNDARY.radius;
    let inside0 = endpoint0.length() < boundary;
    let inside1 = endpoint1.length() < boundary;

    if inside0 && inside1 {
        return SplitSegments::one(whole);
    }

    let line = stereographic_line(endpoint0, endpoint1, tol);

    if are_nearly_antipodal(endpoint0, endpoint1, tol) {
        let mut midpoint = chord_midpoint_on_line(&line, endpoint0, endpoint1);
        if midpoint.length() > boundary {
            midpoint = antipodal_point(midpoint);
        }
        return SplitSegments::two(
            SplitSegment {
                endpoints: [endpoint0, midpoint],
                mirrored: false,
            },
            SplitSegment {
                endpoints: [midpoint, endpoint1],
                mirrored: false,
            },
        );
    }

    let segment = StereographicSegment {
        line,
        endpoints: [endpoint0, endpoint1],
    };
    let crossings = stereographic_segment_vs_circle_intersection(&segment, &Circle::BOUNDARY, tol.segment_membership);
    let Some(crossing) = crossings.get(0).filter(|_| crossings.len() == 1) else {
        return SplitSegments::one(whole);
    };
    let crossing = crossing.normalize_or_zero();

    let (inside, outside) = if inside0 {
        (endpoint0, endpoint1)
    } else {
        (endpoint1, endpoint0)
    };
    SplitSegments::two(
        SplitSegment {
            endpoints: [inside, crossing],
            mirrored: false,
        },
        SplitSegment {
            endpoints: [antipodal_point(outside), -crossing],
            mirrored: true,
        },
    )
}

/// Centers of the disk images of an orb
///
/// An orb that reaches past the boundary also shows up around the antipode of
/// its center.
pub fn split_stereographic_circle(center: Vec2, radius: f32) -> PointList {
    let mut out = PointList::new();
    out.push(center);
    let circle = stereographic_circle(center, radius);
    if circle.center.length() + circle.radius >= Circle::BOUNDARY.radius && center.length_squared() > 0.0 {
        out.push(antipodal_point(center));
    }
    out
}

/// Angular interval on a circle, `min <= max`, possibly extending past 2π
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleRange {
    pub min: f32,
    pub max: f32,
}

impl AngleRange {
    pub fn contains(&self, angle: f32) -> bool {
        let a = angle_to_range_zero_tau(angle);
        (a >= self.min && a <= self.max) || (a + std::f32::consts::TAU >= self.min && a + std::f32::consts::TAU <= self.max)
    }
}

/// The shorter angular range between two points on a circle
pub fn angle_range_between_points_on_circle(center: Vec2, p0: Vec2, p1: Vec2) -> AngleRange {
    let mut a0 = angle_to_range_zero_tau(angle_of(p0 - center));
    let mut a1 = angle_to_range_zero_tau(angle_of(p1 - center));
    if a0 > a1 {
        std::mem::swap(&mut a0, &mut a1);
    }
    if a1 - a0 > std::f32::consts::PI {
        a0 += std::f32::consts::TAU;
        std::mem::swap(&mut a0, &mut a1);
    }
    AngleRange { min: a0, max: a1 }
}

fn circular_arc_distance(p: Vec2, circle: &Circle, range: AngleRange) -> f32 {
    if range.contains(angle_of(p - circle.center)) {
        return (p.distance(circle.center) - circle.radius).abs();
    }
    let start = circle.center + polar_to_cartesian(circle.radius, range.min);
    let end = circle.center + polar_to_cartesian(circle.radius, range.max);
    p.distance(start).min(p.distance(end))
}

/// Planar distance from a point to the drawn arc of a segment
pub fn euclidean_distance_to_stereographic_segment(e0: Vec2, e1: Vec2, point: Vec2, tol: &Tolerances) -> f32 {
    match stereographic_line(e0, e1, tol) {
        StereographicLine::Line { .. } => {
            let along = e1 - e0;
            let len_sq = along.length_squared();
            if len_sq == 0.0 {
                return point.distance(e0);
            }
            let t = ((point - e0).dot(along) / len_sq).clamp(0.0, 1.0);
            point.distance(e0 + along * t)
        }
        StereographicLine::Circle(circle) => {
            let range = angle_range_between_points_on_circle(circle.center, e0, e1);
            circular_arc_distance(point, &circle, range)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::stereographic::move_on_stereographic_geodesic;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    fn tol() -> Tolerances {
        Tolerances::default()
    }

    #[test]
    fn test_point_on_segment_inclusive_endpoints() {
        let e0 = Vec2::new(0.5, -0.3);
        let e1 = Vec2::new(0.5, 0.3);
        assert!(is_point_on_line_also_on_stereographic_segment(e0, e1, e0, 0.01));
        assert!(is_point_on_line_also_on_stereographic_segment(e0, e1, e1, 0.01));
    }

    #[test]
    fn test_point_on_segment_rejects_other_half() {
        let e0 = Vec2::new(-0.2, 0.0);
        let e1 = Vec2::new(0.2, 0.0);
        assert!(is_point_on_line_also_on_stereographic_segment(e0, e1, Vec2::ZERO, 0.0));
        assert!(!is_point_on_line_also_on_stereographic_segment(e0, e1, Vec2::new(0.6, 0.0), 0.0));
        // Antipodal half of the great circle projects onto the same chord range.
        assert!(!is_point_on_line_also_on_stereographic_segment(e0, e1, Vec2::new(-50.0, 0.0), 0.0));
    }

    #[test]
    fn test_segment_vs_segment_cross() {
        let a = StereographicSegment::new(Vec2::new(-0.5, 0.0), Vec2::new(0.5, 0.0), &tol());
        let b = StereographicSegment::new(Vec2::new(0.2, -0.4), Vec2::new(0.2, 0.4), &tol());
        let hits = stereographic_segment_vs_stereographic_segment_intersection(&a, &b, 0.001);
        assert_eq!(hits.len(), 1);
        // The vertical geodesic bows away from the origin.
        let hit = hits.as_slice()[0];
        assert!(hit.y.abs() < 1e-4);
        assert!(hit.x > 0.2 && hit.x < 0.3);
    }

    #[test]
    fn test_segment_vs_segment_miss() {
        let a = StereographicSegment::new(Vec2::new(-0.5, 0.0), Vec2::new(0.0, 0.0), &tol());
        let b = StereographicSegment::new(Vec2::new(0.3, -0.4), Vec2::new(0.3, 0.4), &tol());
        assert!(stereographic_segment_vs_stereographic_segment_intersection(&a, &b, 0.001).is_empty());
    }

    #[test]
    fn test_segment_vs_circle() {
        let seg = StereographicSegment::new(Vec2::new(-0.5, 0.0), Vec2::new(0.5, 0.0), &tol());
        let hits = stereographic_segment_vs_circle_intersection(&seg, &Circle::new(Vec2::ZERO, 0.1), 0.001);
        assert_eq!(hits.len(), 2);
        let outside = stereographic_segment_vs_circle_intersection(&seg, &Circle::new(Vec2::new(0.0, 0.5), 0.1), 0.001);
        assert!(outside.is_empty());
    }

    #[test]
    fn test_split_inside_segment_is_whole() {
        let split = split_stereographic_segment(Vec2::new(-0.5, 0.1), Vec2::new(0.5, 0.2), &tol());
        assert_eq!(split.len(), 1);
        assert!(split.iter().all(|s| !s.mirrored));
    }

    #[test]
    fn test_split_segment_crossing_boundary() {
        let split = split_stereographic_segment(Vec2::new(0.5, 0.0), Vec2::new(1.5, 0.0), &tol());
        let pieces: Vec<SplitSegment> = split.iter().collect();
        assert_eq!(pieces.len(), 2);
        assert!(!pieces[0].mirrored);
        assert!(pieces[1].mirrored);
        assert!((pieces[0].endpoints[1] - Vec2::X).length() < 1e-3);
        assert!((pieces[1].endpoints[0] - Vec2::new(-1.0 / 1.5, 0.0)).length() < 1e-3);
        assert!((pieces[1].endpoints[1] + Vec2::X).length() < 1e-3);
    }

    #[test]
    fn test_split_antipodal_segment_at_line_midpoint() {
        let e0 = Vec2::new(0.0, 1.0);
        let e1 = Vec2::new(0.0, -1.0);
        let pieces: Vec<SplitSegment> = split_stereographic_segment(e0, e1, &tol()).iter().collect();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].endpoints[1], pieces[1].endpoints[0]);
        assert!(pieces[0].endpoints[1].length() <= 1.0);
    }

    #[test]
    fn test_split_circle() {
        assert_eq!(split_stereographic_circle(Vec2::new(0.2, 0.0), 0.05).len(), 1);
        let near_edge = split_stereographic_circle(Vec2::new(0.98, 0.0), 0.05);
        assert_eq!(near_edge.len(), 2);
        assert!(near_edge.as_slice()[1].x < 0.0);
    }

    #[test]
    fn test_euclidean_distance_to_segment() {
        let d = euclidean_distance_to_stereographic_segment(Vec2::new(-0.5, 0.0), Vec2::new(0.5, 0.0), Vec2::new(0.0, 0.1), &tol());
        assert!((d - 0.1).abs() < 1e-5);
        let beyond = euclidean_distance_to_stereographic_segment(Vec2::new(-0.5, 0.0), Vec2::new(0.5, 0.0), Vec2::new(0.8, 0.0), &tol());
        assert!((beyond - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_angle_range_wraparound() {
        let range = angle_range_between_points_on_circle(Vec2::ZERO, Vec2::new(1.0, -0.1), Vec2::new(1.0, 0.1));
        assert!(range.contains(0.0));
        assert!(!range.contains(PI));
    }

    proptest! {
        #[test]
        fn prop_line_passes_through_both_points(
            r0 in 0.05f32..0.95, a0 in -PI..PI,
            r1 in 0.05f32..0.95, a1 in -PI..PI,
        ) {
            let p0 = crate::polar_to_cartesian(r0, a0);
            let p1 = crate::polar_to_cartesian(r1, a1);
            prop_assume!(p0.distance(p1) > 0.05);

            let line = stereographic_line(p0, p1, &tol());
            if let StereographicLine::Circle(c) = line {
                prop_assume!(c.radius < 100.0);
            }
            for p in [p0, p1] {
                let marker = Circle::new(p, 0.01);
                let hits = stereographic_line_vs_circle_intersection(&line, &marker);
                prop_assert!(!hits.is_empty());
                for hit in hits.iter() {
                    prop_assert!(hit.distance(p) < 0.0101);
                }
            }
        }

        #[test]
        fn prop_geodesic_move_stays_on_line(r in 0.0f32..0.9, a in -PI..PI, dir in -PI..PI, d in 0.05f32..1.0) {
            let p = crate::polar_to_cartesian(r, a);
            let q = move_on_stereographic_geodesic(p, dir, d);
            let line = crate::geometry::stereographic_line_through_point_with_tangent(p, dir, &tol());
            let snapped = project_onto_line(&line, q);
            prop_assert!(snapped.distance(q) < 1e-3 * q.length().max(1.0));
        }
    }
}
