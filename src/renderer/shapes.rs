//! Shape generation for beam and obstacle geometry
//!
//! Geodesics are arcs in the disk, so every segment is sampled along the
//! sphere and drawn as a chain of thin quads.

use glam::Vec2;

use super::vertex::{LineVertex, colors};
use crate::consts::BOUNDARY_RADIUS;
use crate::geometry::{Tolerances, split_stereographic_segment, stereographic_distance, stereographic_lerp};
use crate::sim::entities::{Color, Entities, EntityId, WallType};
use crate::sim::scene::for_each_obstacle_segment;
use crate::sim::state::Segment;

/// Half width of a drawn beam
pub const BEAM_HALF_WIDTH: f32 = 0.004;
/// Geodesic length covered by one sample step
pub const SAMPLE_SPACING: f32 = 0.02;
const MAX_SAMPLES: usize = 256;

/// Points along the geodesic from `endpoints[0]` to `endpoints[1]`,
/// both endpoints included
pub fn tessellate_segment(endpoints: [Vec2; 2], spacing: f32) -> Vec<Vec2> {
    let [a, b] = endpoints;
    let length = stereographic_distance(a, b);
    let steps = if spacing > 0.0 && length.is_finite() {
        ((length / spacing).ceil() as usize).clamp(1, MAX_SAMPLES)
    } else {
        1
    };
    (0..=steps)
        .map(|i| stereographic_lerp(a, b, i as f32 / steps as f32))
        .collect()
}

fn rgba(color: Color, alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha]
}

/// Triangle-list quads along a polyline
pub fn polyline_quads(points: &[Vec2], half_width: f32, color: [f32; 4], out: &mut Vec<LineVertex>) {
    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let dir = (p2 - p1).normalize_or_zero();
        if dir == Vec2::ZERO {
            continue;
        }
        let perp = dir.perp() * half_width;

        let v1a = p1 + perp;
        let v1b = p1 - perp;
        let v2a = p2 + perp;
        let v2b = p2 - perp;

        out.push(LineVertex::new(v1a.x, v1a.y, color));
        out.push(LineVertex::new(v1b.x, v1b.y, color));
        out.push(LineVertex::new(v2a.x, v2a.y, color));

        out.push(LineVertex::new(v2a.x, v2a.y, color));
        out.push(LineVertex::new(v1b.x, v1b.y, color));
        out.push(LineVertex::new(v2b.x, v2b.y, color));
    }
}

/// Vertex buffer for all visible beam segments, skipping duplicates
pub fn segment_vertices(segments: &[Segment]) -> Vec<LineVertex> {
    let mut vertices = Vec::new();
    for segment in segments.iter().filter(|s| !s.ignore) {
        let points = tessellate_segment(segment.endpoints, SAMPLE_SPACING);
        polyline_quads(&points, BEAM_HALF_WIDTH, rgba(segment.color, 1.0), &mut vertices);
    }
    vertices
}

/// The disk boundary as a closed ring of `samples` quads
pub fn boundary_vertices(samples: usize) -> Vec<LineVertex> {
    let samples = samples.max(3);
    let points: Vec<Vec2> = (0..=samples)
        .map(|i| Vec2::from_angle(i as f32 / samples as f32 * std::f32::consts::TAU) * BOUNDARY_RADIUS)
        .collect();
    let mut vertices = Vec::with_capacity(samples * 6);
    polyline_quads(&points, BEAM_HALF_WIDTH, colors::BOUNDARY, &mut vertices);
    vertices
}

/// Every blocking segment, colored by what it is
///
/// Segments crossing the boundary are drawn as their two pieces.
pub fn obstacle_vertices(entities: &Entities, tol: &Tolerances) -> Vec<LineVertex> {
    let mut vertices = Vec::new();
    for_each_obstacle_segment(entities, tol, |obstacle| {
        let color = match obstacle.id {
            EntityId::Wall(id) => match entities.walls.get(id).map(|wall| wall.wall_type) {
                Some(WallType::Absorbing) => colors::WALL_ABSORBING,
                _ => colors::WALL_REFLECTING,
            },
            EntityId::Mirror(_) => colors::MIRROR,
            EntityId::PortalPair(_) => colors::PORTAL,
            EntityId::Door(_) => colors::DOOR,
        };
        let [e0, e1] = obstacle.endpoints;
        for piece in split_stereographic_segment(e0, e1, tol).iter() {
            let points = tessellate_segment(piece.endpoints, SAMPLE_SPACING);
            polyline_quads(&points, BEAM_HALF_WIDTH * 2.0, color, &mut vertices);
        }
    });
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{StereographicLine, stereographic_line};

    #[test]
    fn test_tessellation_follows_geodesic() {
        let endpoints = [Vec2::new(0.5, -0.3), Vec2::new(0.5, 0.3)];
        let points = tessellate_segment(endpoints, 0.05);
        assert!(points.len() > 3);
        assert!((points[0] - endpoints[0]).length() < 1e-5);
        assert!((points[points.len() - 1] - endpoints[1]).length() < 1e-5);

        let StereographicLine::Circle(circle) = stereographic_line(endpoints[0], endpoints[1], &Tolerances::default()) else {
            panic!("segment off the origin should be an arc");
        };
        for p in &points {
            assert!((p.distance(circle.center) - circle.radius).abs() < 1e-3);
        }
    }

    #[test]
    fn test_ignored_segments_are_skipped() {
        let segment = Segment {
            endpoints: [Vec2::ZERO, Vec2::new(0.1, 0.0)],
            color: [1.0, 0.0, 0.0],
            ignore: false,
        };
        let visible = segment_vertices(&[segment]);
        assert!(!visible.is_empty());
        assert_eq!(visible.len() % 6, 0);

        let hidden = Segment { ignore: true, ..segment };
        assert_eq!(segment_vertices(&[segment, hidden]).len(), visible.len());
    }

    #[test]
    fn test_boundary_ring_is_closed() {
        let vertices = boundary_vertices(32);
        assert_eq!(vertices.len(), 32 * 6);
        for v in &vertices {
            let r = Vec2::from(v.position).length();
            assert!((r - 1.0).abs() <= BEAM_HALF_WIDTH * 1.01);
        }
    }

    #[test]
    fn test_obstacles_use_their_colors() {
        use crate::sim::entities::{Door, Wall};
        let mut entities = Entities::new();
        entities.walls.create(Wall::new(Vec2::new(0.5, -0.3), Vec2::new(0.5, 0.3), WallType::Absorbing));
        entities.doors.create(Door::new(Vec2::new(-0.5, -0.3), Vec2::new(-0.5, 0.3), 0));
        let vertices = obstacle_vertices(&entities, &Tolerances::default());
        assert!(vertices.iter().any(|v| v.color == colors::WALL_ABSORBING));
        assert!(vertices.iter().any(|v| v.color == colors::DOOR));
        assert!(!vertices.iter().any(|v| v.color == colors::MIRROR));
    }

    #[test]
    fn test_degenerate_segment_draws_nothing() {
        let segment = Segment {
            endpoints: [Vec2::new(0.2, 0.2); 2],
            color: [0.0, 1.0, 0.0],
            ignore: false,
        };
        assert!(segment_vertices(&[segment]).is_empty());
    }
}
