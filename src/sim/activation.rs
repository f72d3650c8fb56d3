//! Targets, triggers and doors
//!
//! Orbs are switched on by beams touching them. Doors follow the triggers
//! that share their index.

use glam::Vec2;

use super::entities::{Color, Entities, Trigger};
use super::laser::TracedSegment;
use crate::geometry::{
    Circle, StereographicSegment, Tolerances, split_stereographic_circle, split_stereographic_segment,
    stereographic_circle, stereographic_segment_vs_circle_intersection,
    stereographic_segment_vs_stereographic_segment_intersection,
};

/// Move `t` toward 1 while `active`, toward 0 otherwise, taking
/// `time_to_finish` seconds for the full range.
pub fn update_constant_speed_t(t: &mut f32, time_to_finish: f32, active: bool, dt: f32) {
    let speed = 1.0 / time_to_finish;
    let sign = if active { 1.0 } else { -1.0 };
    *t = (*t + speed * dt * sign).clamp(0.0, 1.0);
}

/// Switch every orb off before beams are traced
pub fn reset_activations(entities: &mut Entities) {
    for target in entities.targets.values_mut() {
        target.activated = false;
    }
    for trigger in entities.triggers.values_mut() {
        trigger.activated = false;
    }
}

/// True if a traced beam piece touches the orb at `center`
///
/// An orb reaching past the boundary is also tested at its antipodal image.
pub fn segment_touches_orb(segment: &TracedSegment, center: Vec2, radius: f32, tol: &Tolerances) -> bool {
    let piece = StereographicSegment {
        line: segment.line,
        endpoints: segment.endpoints,
    };
    split_stereographic_circle(center, radius).iter().any(|image| {
        let circle = stereographic_circle(image, radius);
        !stereographic_segment_vs_circle_intersection(&piece, &circle, tol.orb_contact).is_empty()
    })
}

/// Activate every target and trigger the piece touches
pub fn mark_orbs_touched(entities: &mut Entities, segment: &TracedSegment, tol: &Tolerances) {
    for target in entities.targets.values_mut() {
        if segment_touches_orb(segment, target.position, target.radius, tol) {
            target.activated = true;
        }
    }
    for trigger in entities.triggers.values_mut() {
        if segment_touches_orb(segment, trigger.position, Trigger::RADIUS, tol) {
            trigger.activated = true;
        }
    }
}

/// State of the triggers with a given index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerInfo {
    pub color: Color,
    pub active: bool,
}

/// The first activated trigger with `index`, else the first trigger with it
pub fn trigger_info(entities: &Entities, index: i32) -> Option<TriggerInfo> {
    let mut result = None;
    for trigger in entities.triggers.values().filter(|t| t.index == index) {
        let info = TriggerInfo {
            color: trigger.color,
            active: trigger.activated,
        };
        if trigger.activated {
            return Some(info);
        }
        result.get_or_insert(info);
    }
    result
}

/// Advance activation animations and report whether a target just lit up
pub fn update_activation_animations(entities: &mut Entities, activation_seconds: f32, dt: f32) -> bool {
    let mut any_turned_on = false;
    for target in entities.targets.values_mut() {
        if !target.activated_last_frame && target.activated && target.activation_animation_t == 0.0 {
            any_turned_on = true;
        }
        target.activated_last_frame = target.activated;
        update_constant_speed_t(&mut target.activation_animation_t, activation_seconds, target.activated, dt);
    }
    for trigger in entities.triggers.values_mut() {
        update_constant_speed_t(&mut trigger.activation_animation_t, activation_seconds, trigger.activated, dt);
    }
    any_turned_on
}

/// Drive each door's `opening_t` toward 1 while its trigger is active and
/// toward 0 otherwise
///
/// A door whose trigger index matches nothing counts as untriggered.
/// `open_by_default` is applied where the door's blocking pieces are built,
/// so it never changes which way `opening_t` moves.
pub fn update_doors(entities: &mut Entities, door_open_seconds: f32, dt: f32) {
    let triggered: Vec<bool> = entities
        .doors
        .values()
        .map(|door| trigger_info(entities, door.trigger_index).is_some_and(|info| info.active))
        .collect();
    for (door, triggered) in entities.doors.values_mut().zip(triggered) {
        update_constant_speed_t(&mut door.opening_t, door_open_seconds, triggered, dt);
    }
}

fn segments_overlap(a: [Vec2; 2], b: [Vec2; 2], tol: &Tolerances) -> bool {
    for pa in split_stereographic_segment(a[0], a[1], tol).iter() {
        let sa = StereographicSegment::new(pa.endpoints[0], pa.endpoints[1], tol);
        for pb in split_stereographic_segment(b[0], b[1], tol).iter() {
            let sb = StereographicSegment::new(pb.endpoints[0], pb.endpoints[1], tol);
            if !stereographic_segment_vs_stereographic_segment_intersection(&sa, &sb, tol.segment_membership).is_empty() {
                return true;
            }
        }
    }
    false
}

fn segment_overlaps_orb(segment: [Vec2; 2], orb: Circle, tol: &Tolerances) -> bool {
    split_stereographic_segment(segment[0], segment[1], tol).iter().any(|piece| {
        let s = StereographicSegment::new(piece.endpoints[0], piece.endpoints[1], tol);
        !stereographic_segment_vs_circle_intersection(&s, &orb, tol.segment_membership).is_empty()
    })
}

/// Whether any movable object (mirror, portal) overlaps something else, or
/// any orb overlaps a blocking segment.
pub fn has_overlaps(entities: &Entities, tol: &Tolerances) -> bool {
    let statics: Vec<[Vec2; 2]> = entities
        .walls
        .values()
        .map(|wall| wall.endpoints)
        .chain(entities.doors.values().map(|door| door.endpoints))
        .collect();
    let movables: Vec<[Vec2; 2]> = entities
        .mirrors
        .values()
        .map(|mirror| mirror.calculate_endpoints())
        .chain(
            entities
                .portal_pairs
                .values()
                .flat_map(|pair| pair.portals.iter().map(|portal| portal.endpoints())),
        )
        .collect();

    for (i, movable) in movables.iter().enumerate() {
        if statics.iter().any(|s| segments_overlap(*movable, *s, tol)) {
            return true;
        }
        if movables[i + 1..].iter().any(|other| segments_overlap(*movable, *other, tol)) {
            return true;
        }
    }

    let orbs: Vec<Circle> = entities
        .targets
        .values()
        .flat_map(|target| {
            split_stereographic_circle(target.position, target.radius)
                .iter()
                .map(|c| stereographic_circle(c, target.radius))
                .collect::<Vec<_>>()
        })
        .chain(entities.triggers.values().flat_map(|trigger| {
            split_stereographic_circle(trigger.position, Trigger::RADIUS)
                .iter()
                .map(|c| stereographic_circle(c, Trigger::RADIUS))
                .collect::<Vec<_>>()
        }))
        .collect();
    orbs.iter()
        .any(|orb| statics.iter().chain(movables.iter()).any(|s| segment_overlaps_orb(*s, *orb, tol)))
}

/// All targets lit and the layout is valid
pub fn level_complete(entities: &Entities, tol: &Tolerances) -> bool {
    entities.targets.values().all(|target| target.activated) && !has_overlaps(entities, tol)
}
