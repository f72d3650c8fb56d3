//! End-to-end beam scenarios through the public API

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use elliptic_lasers::consts::SIM_DT;
use elliptic_lasers::geometry::{Tolerances, move_on_stereographic_geodesic};
use elliptic_lasers::sim::{
    Door, Entities, GameState, Laser, Mirror, MirrorWallType, Target, Termination, Wall, WallType, trace_laser,
};
use elliptic_lasers::{Settings, polar_to_cartesian};
use glam::Vec2;
use proptest::prelude::*;

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

fn tol() -> Tolerances {
    Tolerances::default()
}

fn close(a: Vec2, b: Vec2, eps: f32) -> bool {
    a.distance(b) < eps
}

#[test]
fn test_beam_stops_at_absorbing_wall() {
    let mut entities = Entities::new();
    entities
        .walls
        .create(Wall::new(Vec2::new(0.5, -0.3), Vec2::new(0.5, 0.3), WallType::Absorbing));
    let laser = Laser::new(Vec2::ZERO, 0.0, WHITE);

    let trace = trace_laser(&entities, &laser, 10, &tol());
    assert_eq!(trace.termination, Termination::Absorbed);
    assert_eq!(trace.segments.len(), 1);
    let [start, end] = trace.segments[0].endpoints;
    assert!(close(start, Vec2::ZERO, 1e-5));
    assert!(end.y.abs() < 1e-4);
    assert!(end.x > 0.45 && end.x < 0.6, "hit at {end:?}");
}

#[test]
fn test_beam_bounces_between_mirror_faces_until_exhausted() {
    let mut entities = Entities::new();
    entities
        .mirrors
        .create(Mirror::new(Vec2::new(0.5, 0.0), PI, 0.6, MirrorWallType::Reflecting));
    let laser = Laser::new(Vec2::ZERO, 0.0, WHITE);

    let trace = trace_laser(&entities, &laser, 10, &tol());
    assert_eq!(trace.termination, Termination::Exhausted);
    assert_eq!(trace.resolved_hits, 10);

    // Out to the mirror, then back through the origin to the boundary.
    let [a0, a1] = trace.segments[0].endpoints;
    assert!(close(a0, Vec2::ZERO, 1e-5) && close(a1, Vec2::new(0.5, 0.0), 1e-4));
    let [b0, b1] = trace.segments[1].endpoints;
    assert!(close(b0, Vec2::new(0.5, 0.0), 1e-4) && close(b1, Vec2::new(-1.0, 0.0), 1e-4));
    assert!(trace.segments.iter().all(|s| s.endpoints.iter().all(|p| p.y.abs() < 1e-4)));
}

#[test]
fn test_target_in_beam_is_activated() {
    let mut entities = Entities::new();
    entities.lasers.create(Laser::new(Vec2::ZERO, 0.0, WHITE));
    let target = entities.targets.create(Target::new(Vec2::new(0.5, 0.0), 0.1));

    let mut state = GameState::new(Settings::default());
    state.update(&mut entities, SIM_DT);
    assert!(entities.targets.get(target).is_some_and(|t| t.activated));
}

#[test]
fn test_door_without_trigger_closes() {
    let mut entities = Entities::new();
    let mut door = Door::new(Vec2::new(-0.2, 0.5), Vec2::new(0.2, 0.5), 3);
    door.opening_t = 0.5;
    let door = entities.doors.create(door);
    entities.lasers.create(Laser::new(Vec2::new(0.0, 0.2), FRAC_PI_2, WHITE));

    let mut state = GameState::new(Settings::default());
    state.update(&mut entities, SIM_DT);
    let after_one = entities.doors.get(door).map(|d| d.opening_t).unwrap_or(f32::NAN);
    assert!(after_one < 0.5);

    for _ in 0..60 {
        state.update(&mut entities, SIM_DT);
    }
    assert_eq!(entities.doors.get(door).map(|d| d.opening_t), Some(0.0));
}

#[test]
fn test_beam_at_shared_mirror_corner_ends_there() {
    let length = 0.6;
    let mut entities = Entities::new();
    for side in [FRAC_PI_4, -FRAC_PI_4] {
        // One rim endpoint of each mirror sits on the origin.
        let center = move_on_stereographic_geodesic(Vec2::ZERO, side, length / 2.0);
        entities
            .mirrors
            .create(Mirror::new(center, side + FRAC_PI_2, length, MirrorWallType::Reflecting));
    }
    let laser = Laser::new(Vec2::new(-0.5, 0.0), 0.0, WHITE);

    let trace = trace_laser(&entities, &laser, 10, &tol());
    assert_eq!(trace.termination, Termination::Tie);
    assert_eq!(trace.resolved_hits, 0);
    assert_eq!(trace.segments.len(), 1);
    assert!(close(trace.segments[0].endpoints[1], Vec2::ZERO, 1e-4));
}

#[test]
fn test_zero_reflections_only_reaches_boundary() {
    let mut entities = Entities::new();
    entities
        .walls
        .create(Wall::new(Vec2::new(0.5, -0.3), Vec2::new(0.5, 0.3), WallType::Absorbing));
    let laser = Laser::new(Vec2::ZERO, 0.0, WHITE);

    let trace = trace_laser(&entities, &laser, 0, &tol());
    assert_eq!(trace.resolved_hits, 0);
    assert_eq!(trace.termination, Termination::Exhausted);
    assert_eq!(trace.segments.len(), 2);
    let ends: Vec<Vec2> = trace.segments.iter().map(|s| s.endpoints[1]).collect();
    assert!(ends.iter().any(|p| close(*p, Vec2::new(1.0, 0.0), 1e-4)));
    assert!(ends.iter().any(|p| close(*p, Vec2::new(-1.0, 0.0), 1e-4)));
}

proptest! {
    #[test]
    fn prop_bounce_count_is_bounded(
        gap in 0.1f32..0.6,
        tilt in -0.2f32..0.2,
        angle in -PI..PI,
        max_reflections in 0u32..30,
    ) {
        // Two long mirrors facing each other trap most beams.
        let mut entities = Entities::new();
        entities.mirrors.create(Mirror::new(Vec2::new(gap, 0.0), PI + tilt, 1.2, MirrorWallType::Reflecting));
        entities.mirrors.create(Mirror::new(Vec2::new(-gap, 0.0), tilt, 1.2, MirrorWallType::Reflecting));
        let laser = Laser::new(Vec2::ZERO, angle, WHITE);

        let trace = trace_laser(&entities, &laser, max_reflections, &tol());
        prop_assert!(trace.resolved_hits <= max_reflections);
        // At most two emitted pieces per step, each split at most once.
        prop_assert!(trace.segments.len() <= 4 * (max_reflections as usize + 1));
    }

    #[test]
    fn prop_reflected_direction_is_unit(
        radius in 0.2f32..0.7,
        polar in -PI..PI,
        normal_offset in -1.2f32..1.2,
        aim in -0.3f32..0.3,
    ) {
        let center = polar_to_cartesian(radius, polar);
        let mut entities = Entities::new();
        entities.mirrors.create(Mirror::new(center, polar + PI + normal_offset, 0.6, MirrorWallType::Reflecting));
        let laser = Laser::new(Vec2::ZERO, polar + aim, WHITE);

        let trace = trace_laser(&entities, &laser, 1, &tol());
        if trace.resolved_hits == 1 && trace.termination == Termination::Exhausted {
            prop_assert!((trace.beam.direction.length() - 1.0).abs() < 1e-4);
        }
    }
}
