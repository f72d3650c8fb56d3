//! Laser raycaster
//!
//! A beam is walked one geodesic at a time. Each step finds the nearest
//! obstacle on the beam's geodesic, either ahead of the beam or, failing that,
//! after the beam wraps through the boundary and re-enters from the antipodal
//! side. The hit is then resolved into a reflection, a portal transfer or the
//! end of the beam.
//!
//! The walk is bounded by `max_reflections`, itself capped at
//! `MAX_REFLECTIONS_LIMIT`, no matter how the scene is built.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;

use super::entities::{Entities, EntityId, Laser, MirrorWallType, Portal, WallType};
use super::scene::{Surface, for_each_obstacle_segment, portal_back_as_wall};
use crate::consts::MAX_REFLECTIONS_LIMIT;
use crate::geometry::{
    Circle, StereographicLine, Tolerances, antipodal_point, are_nearly_antipodal, chord_midpoint_on_line,
    is_point_on_line_also_on_stereographic_segment, move_on_stereographic_geodesic, project_onto_line,
    split_stereographic_segment, stereographic_distance, stereographic_line, stereographic_line_normal_at,
    stereographic_line_through_point_with_tangent, stereographic_line_vs_circle_intersection,
    stereographic_line_vs_stereographic_line_intersection,
};
use crate::{angle_of, normalize_angle, oriented, reflect_around_normal, rot90};

/// Position and heading of a beam between two steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamState {
    pub position: Vec2,
    /// Unit direction
    pub direction: Vec2,
    /// Surface the beam just left, never hit again straight ahead
    pub last_hit: Option<(EntityId, usize)>,
}

impl BeamState {
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self {
            position,
            direction: oriented(angle),
            last_hit: None,
        }
    }
}

/// A visible piece of the beam and the geodesic it lies on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracedSegment {
    pub endpoints: [Vec2; 2],
    pub line: StereographicLine,
}

/// Why a beam stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Absorbing wall, absorbing back side or a door
    Absorbed,
    /// The two nearest hits were equally close, e.g. the shared corner of two mirrors
    Tie,
    /// Nothing left to hit in either direction
    Escaped,
    /// Bounce limit reached
    Exhausted,
    /// The beam's geodesic never met the boundary
    Degenerate,
    /// A hit referred to an entity that no longer exists
    MissingEntity,
}

#[derive(Debug, Clone)]
pub struct LaserTrace {
    pub segments: Vec<TracedSegment>,
    pub termination: Termination,
    /// Number of hits that were resolved, at most `max_reflections`
    pub resolved_hits: u32,
    /// State after the last resolved hit
    pub beam: BeamState,
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    point: Vec2,
    /// Distance to the beam position, or squared distance to the wrapped
    /// boundary point for hits behind the beam
    distance: f32,
    line: StereographicLine,
    id: EntityId,
    part: usize,
    /// The hit piece is the antipodal image of part of the entity
    object_mirrored: bool,
    wrapped_around: bool,
}

#[derive(Debug, Default)]
struct Candidates {
    closest: Option<Hit>,
    second_closest: Option<f32>,
    closest_wrapped: Option<Hit>,
    second_closest_wrapped: Option<f32>,
}

fn keep_nearest(best: &mut Option<Hit>, runner_up: &mut Option<f32>, hit: Hit) {
    let current = best.map(|h| h.distance);
    match current {
        Some(distance) if hit.distance >= distance => {
            if runner_up.is_none_or(|d| hit.distance < d) {
                *runner_up = Some(hit.distance);
            }
        }
        _ => {
            if current.is_some() {
                *runner_up = current;
            }
            *best = Some(hit);
        }
    }
}

/// The beam's geodesic and where it crosses the boundary
struct BeamFrame {
    line: StereographicLine,
    /// Boundary point ahead of the beam
    exit: Vec2,
    /// Boundary point the beam re-enters from
    wrapped: Vec2,
}

impl BeamFrame {
    fn new(beam: &BeamState, tol: &Tolerances) -> Option<Self> {
        let line = stereographic_line_through_point_with_tangent(beam.position, angle_of(beam.direction), tol);
        let first = stereographic_line_vs_circle_intersection(&line, &Circle::BOUNDARY)
            .get(0)?
            .normalize_or_zero();
        let (exit, wrapped) = if (first - beam.position).dot(beam.direction) < 0.0 {
            (-first, first)
        } else {
            (first, -first)
        };
        Some(Self { line, exit, wrapped })
    }
}

impl Candidates {
    fn collect(entities: &Entities, beam: &BeamState, frame: &BeamFrame, tol: &Tolerances) -> Self {
        let mut candidates = Candidates::default();
        for_each_obstacle_segment(entities, tol, |obstacle| {
            let [e0, e1] = obstacle.endpoints;
            if !obstacle.splittable {
                candidates.test_piece(e0, e1, obstacle.id, obstacle.part, false, beam, frame, tol);
                return;
            }
            for piece in split_stereographic_segment(e0, e1, tol).iter() {
                let [p0, p1] = piece.endpoints;
                candidates.test_piece(p0, p1, obstacle.id, obstacle.part, piece.mirrored, beam, frame, tol);
            }
        });
        candidates
    }

    #[allow(clippy::too_many_arguments)]
    fn test_piece(
        &mut self,
        e0: Vec2,
        e1: Vec2,
        id: EntityId,
        part: usize,
        object_mirrored: bool,
        beam: &BeamState,
        frame: &BeamFrame,
        tol: &Tolerances,
    ) {
        if e0.distance(e1) < tol.min_segment_length {
            return;
        }
        let line = stereographic_line(e0, e1, tol);
        let hit_last_time = beam.last_hit == Some((id, part));

        for point in stereographic_line_vs_stereographic_line_intersection(&line, &frame.line).iter() {
            if point.length() > Circle::BOUNDARY.radius + tol.boundary_outside {
                continue;
            }
            if !is_point_on_line_also_on_stereographic_segment(e0, e1, point, tol.segment_membership) {
                continue;
            }

            // The surface just left can still be hit after wrapping around.
            if !hit_last_time && (point - beam.position).dot(beam.direction) > 0.0 {
                let hit = Hit {
                    point,
                    distance: point.distance(beam.position),
                    line,
                    id,
                    part,
                    object_mirrored,
                    wrapped_around: false,
                };
                keep_nearest(&mut self.closest, &mut self.second_closest, hit);
            } else {
                let hit = Hit {
                    point,
                    distance: point.distance_squared(frame.wrapped),
                    line,
                    id,
                    part,
                    object_mirrored,
                    wrapped_around: true,
                };
                keep_nearest(&mut self.closest_wrapped, &mut self.second_closest_wrapped, hit);
            }
        }
    }
}

impl LaserTrace {
    /// Record the piece of the beam from `e0` to `e1`
    fn emit(&mut self, frame: &BeamFrame, direction: Vec2, e0: Vec2, e1: Vec2, tol: &Tolerances) {
        // Raw intersection points drift off the arc.
        let e0 = project_onto_line(&frame.line, e0);
        let e1 = project_onto_line(&frame.line, e1);

        if !are_nearly_antipodal(e0, e1, tol) {
            self.segments.push(TracedSegment {
                endpoints: [e0, e1],
                line: frame.line,
            });
            return;
        }

        // Antipodal endpoints are the same point of the elliptic plane, so the
        // arc between them is cut through a point the beam actually passes.
        let mut midpoint = chord_midpoint_on_line(&frame.line, e0, e1);
        if matches!(frame.line, StereographicLine::Circle(_)) && direction.dot(midpoint) < 0.0 {
            midpoint = antipodal_point(midpoint);
        }
        for endpoints in [[e0, midpoint], [midpoint, e1]] {
            self.segments.push(TracedSegment {
                endpoints,
                line: frame.line,
            });
        }
    }
}

/// Walk one laser through the scene
///
/// `max_reflections` is capped at `MAX_REFLECTIONS_LIMIT`.
pub fn trace_laser(entities: &Entities, laser: &Laser, max_reflections: u32, tol: &Tolerances) -> LaserTrace {
    let max_reflections = max_reflections.min(MAX_REFLECTIONS_LIMIT);
    let mut trace = LaserTrace {
        segments: Vec::new(),
        termination: Termination::Exhausted,
        resolved_hits: 0,
        beam: BeamState::new(laser.position, laser.angle),
    };

    // With a limit of zero the beam is still drawn up to the boundary.
    for iteration in 0..max_reflections.max(1) {
        let search = iteration < max_reflections;
        let beam = trace.beam;
        let Some(frame) = BeamFrame::new(&beam, tol) else {
            log::debug!("beam at {:?} has no boundary crossing", beam.position);
            trace.termination = Termination::Degenerate;
            break;
        };

        let candidates = if search {
            Candidates::collect(entities, &beam, &frame, tol)
        } else {
            Candidates::default()
        };

        let (hit, runner_up) = match (candidates.closest, candidates.closest_wrapped) {
            (Some(hit), _) => {
                trace.emit(&frame, beam.direction, beam.position, hit.point, tol);
                (hit, candidates.second_closest)
            }
            (None, Some(hit)) => {
                trace.emit(&frame, beam.direction, beam.position, frame.exit, tol);
                trace.emit(&frame, beam.direction, frame.wrapped, hit.point, tol);
                (hit, candidates.second_closest_wrapped)
            }
            (None, None) => {
                trace.emit(&frame, beam.direction, beam.position, frame.exit, tol);
                trace.emit(&frame, beam.direction, beam.position, frame.wrapped, tol);
                trace.termination = if search {
                    Termination::Escaped
                } else {
                    Termination::Exhausted
                };
                break;
            }
        };

        // Reflecting off either of two equally near surfaces is arbitrary.
        if runner_up.is_some_and(|d| (hit.distance - d).abs() < tol.tie_distance) {
            log::debug!("beam ends at ambiguous hit {:?}", hit.point);
            trace.termination = Termination::Tie;
            break;
        }

        trace.resolved_hits += 1;
        if let Err(termination) = resolve_hit(entities, &mut trace.beam, &frame, &hit, tol) {
            trace.termination = termination;
            break;
        }
    }

    log::debug!(
        "laser at {:?}: {:?} after {} hits, {} segments",
        laser.position,
        trace.termination,
        trace.resolved_hits,
        trace.segments.len()
    );
    trace
}

/// Normal of the hit surface at `point`, facing the side the beam came from
fn surface_normal_towards(line: &StereographicLine, point: Vec2, origin: Vec2) -> Vec2 {
    match line {
        StereographicLine::Circle(circle) => {
            let outward = (point - circle.center).normalize_or_zero();
            if circle.center.distance(origin) < circle.radius {
                -outward
            } else {
                outward
            }
        }
        StereographicLine::Line { normal } => {
            if (origin - point).dot(*normal) < 0.0 {
                -*normal
            } else {
                *normal
            }
        }
    }
}

/// Normal angle of an entity as seen on its antipodal copy
///
/// The copy is reached through the boundary, which mirrors it. The angle is
/// rotated by the change of the geodesic's normal between `point` and its
/// antipode.
fn mirrored_normal_angle(normal_angle: f32, point: Vec2, line: &StereographicLine, mirrored: bool) -> f32 {
    if !mirrored {
        return normal_angle;
    }
    let diff = angle_of(stereographic_line_normal_at(line, point))
        - angle_of(stereographic_line_normal_at(line, antipodal_point(point)));
    normalize_angle(normal_angle - diff + PI)
}

/// Geometry of a beam at the surface it hit
struct Contact {
    point: Vec2,
    line: StereographicLine,
    /// Surface normal facing the beam's origin
    normal: Vec2,
    /// Beam tangent on the same side as `normal`
    tangent: Vec2,
    object_mirrored: bool,
}

impl Contact {
    fn on_front_side(&self, normal_angle: f32, center: Vec2) -> bool {
        let angle = mirrored_normal_angle(normal_angle, center, &self.line, self.object_mirrored);
        oriented(angle).dot(self.normal) > 0.0
    }

    fn reflected_direction(&self) -> Vec2 {
        reflect_around_normal(self.tangent, self.normal)
    }
}

fn resolve_hit(
    entities: &Entities,
    beam: &mut BeamState,
    frame: &BeamFrame,
    hit: &Hit,
    tol: &Tolerances,
) -> Result<(), Termination> {
    let Some(surface) = Surface::resolve(entities, hit.id, hit.part) else {
        log::warn!("beam hit {:?} which is no longer alive", hit.id);
        debug_assert!(false, "beam hit a dead entity {:?}", hit.id);
        return Err(Termination::MissingEntity);
    };

    let origin = if hit.wrapped_around { frame.wrapped } else { beam.position };
    let normal = surface_normal_towards(&hit.line, hit.point, origin);
    let mut tangent = rot90(stereographic_line_normal_at(&frame.line, hit.point));
    if normal.dot(tangent) < 0.0 {
        tangent = -tangent;
    }
    let contact = Contact {
        point: hit.point,
        line: hit.line,
        normal,
        tangent,
        object_mirrored: hit.object_mirrored,
    };

    let reflect = |beam: &mut BeamState| -> Result<(), Termination> {
        beam.direction = contact.reflected_direction();
        beam.position = contact.point;
        beam.last_hit = Some((hit.id, hit.part));
        Ok(())
    };

    match surface {
        Surface::Wall(WallType::Reflecting) => reflect(beam),
        Surface::Wall(WallType::Absorbing) | Surface::Door => Err(Termination::Absorbed),
        Surface::Mirror {
            center,
            normal_angle,
            back,
        } => {
            if contact.on_front_side(normal_angle, center) || back == MirrorWallType::Reflecting {
                reflect(beam)
            } else {
                Err(Termination::Absorbed)
            }
        }
        Surface::Portal { entry, exit, exit_part } => {
            if !contact.on_front_side(entry.normal_angle, entry.center) {
                match portal_back_as_wall(entry.wall_type) {
                    Some(WallType::Reflecting) => return reflect(beam),
                    Some(WallType::Absorbing) => return Err(Termination::Absorbed),
                    None => {}
                }
            }
            let (position, direction) = transfer_through_portal(&contact, &entry, &exit, tol);
            beam.position = position;
            beam.direction = direction;
            beam.last_hit = Some((hit.id, exit_part));
            Ok(())
        }
    }
}

/// Carry a beam from `entry` to `exit`
///
/// The signed geodesic offset of the hit from the entry center is replayed
/// from the exit center, and the angle to the entry normal becomes the angle
/// to the exit normal. Every orientation flip (mirrored entry copy, exit
/// placed on the antipodal copy, a reversing portal) mirrors the result, so
/// the flips compose by parity.
fn transfer_through_portal(contact: &Contact, entry: &Portal, exit: &Portal, tol: &Tolerances) -> (Vec2, Vec2) {
    let entry_normal_angle =
        mirrored_normal_angle(entry.normal_angle, entry.center, &contact.line, contact.object_mirrored);
    let entry_center = if contact.object_mirrored {
        antipodal_point(entry.center)
    } else {
        entry.center
    };

    // Positive offsets lie against the entry normal rotated by 90 degrees.
    let mut offset = stereographic_distance(entry_center, contact.point);
    if (contact.point - entry_center).dot(oriented(entry_normal_angle + FRAC_PI_2)) > 0.0 {
        offset = -offset;
    }
    for flipped in [contact.object_mirrored, entry.orientation_reversing, exit.orientation_reversing] {
        if flipped {
            offset = -offset;
        }
    }

    let mut position = move_on_stereographic_geodesic(exit.center, exit.normal_angle + FRAC_PI_2, offset);
    let exit_mirrored = position.length() >= Circle::BOUNDARY.radius + tol.out_of_boundary;
    if exit_mirrored {
        position = antipodal_point(position);
    }

    let [x0, x1] = exit.endpoints();
    let exit_line = stereographic_line(x0, x1, tol);
    let exit_normal_angle = mirrored_normal_angle(exit.normal_angle, exit.center, &exit_line, exit_mirrored);

    let mut exit_normal = stereographic_line_normal_at(&exit_line, position);
    if exit_normal.dot(oriented(exit_normal_angle)) > 0.0 {
        exit_normal = -exit_normal;
    }
    if contact.normal.dot(oriented(entry_normal_angle)) > 0.0 {
        exit_normal = -exit_normal;
    }

    let angle = angle_of(contact.tangent) - angle_of(contact.normal) + angle_of(exit_normal);
    let mut direction = oriented(angle);
    let flips = [
        contact.object_mirrored,
        exit_mirrored,
        entry.orientation_reversing,
        exit.orientation_reversing,
    ];
    if flips.iter().filter(|&&f| f).count() % 2 == 1 {
        direction = reflect_around_normal(direction, exit_normal);
    }
    (position, direction)
}
