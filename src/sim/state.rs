//! Per-frame simulation state
//!
//! Everything here is rebuilt by `GameState::update`. The entities own the
//! persistent state; this only holds what the frame produced for the renderer.

use glam::Vec2;

use super::activation::{
    TriggerInfo, level_complete, mark_orbs_touched, reset_activations, trigger_info, update_activation_animations,
    update_doors,
};
use super::entities::{Color, Entities};
use super::isometry::place_fixed_geometry;
use super::laser::{Termination, trace_laser};
use crate::consts::MAX_REFLECTIONS_LIMIT;
use crate::settings::Settings;

/// A visible beam piece handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub endpoints: [Vec2; 2],
    pub color: Color,
    /// Duplicate of an earlier segment, skip when drawing
    pub ignore: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub settings: Settings,
    pub laser_segments: Vec<Segment>,
    /// Why each laser's beam stopped, in laser order
    pub terminations: Vec<Termination>,
    /// A target lit up this frame
    pub any_targets_turned_on: bool,
}

fn lexicographic_order([a, b]: [Vec2; 2]) -> [Vec2; 2] {
    if (a.x, a.y) <= (b.x, b.y) { [a, b] } else { [b, a] }
}

/// Order each segment's endpoints and mark later exact duplicates ignored
///
/// Partial overlaps are left alone.
pub fn dedup_segments(segments: &mut [Segment], epsilon: f32) {
    let epsilon_squared = epsilon * epsilon;
    for segment in segments.iter_mut() {
        segment.endpoints = lexicographic_order(segment.endpoints);
    }
    for i in 0..segments.len() {
        let (earlier, rest) = segments.split_at_mut(i);
        let current = &mut rest[0];
        let duplicate = earlier.iter().filter(|s| !s.ignore).any(|s| {
            s.endpoints[0].distance_squared(current.endpoints[0]) < epsilon_squared
                && s.endpoints[1].distance_squared(current.endpoints[1]) < epsilon_squared
        });
        if duplicate {
            current.ignore = true;
        }
    }
}

impl GameState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Trace every laser and advance orb and door animations by `dt`
    pub fn update(&mut self, entities: &mut Entities, dt: f32) {
        let tol = self.settings.tolerances;
        entities.snap_inside_boundary();
        place_fixed_geometry(entities);
        reset_activations(entities);

        self.laser_segments.clear();
        self.terminations.clear();
        let max_reflections = self.settings.max_reflections.min(MAX_REFLECTIONS_LIMIT);
        let lasers: Vec<_> = entities.lasers.values().cloned().collect();
        for laser in &lasers {
            let trace = trace_laser(entities, laser, max_reflections, &tol);
            for segment in &trace.segments {
                mark_orbs_touched(entities, segment, &tol);
                self.laser_segments.push(Segment {
                    endpoints: segment.endpoints,
                    color: laser.color,
                    ignore: false,
                });
            }
            self.terminations.push(trace.termination);
        }
        dedup_segments(&mut self.laser_segments, self.settings.dedup_epsilon);

        self.any_targets_turned_on = update_activation_animations(entities, self.settings.activation_seconds, dt);
        update_doors(entities, self.settings.door_open_seconds, dt);
    }

    pub fn level_complete(&self, entities: &Entities) -> bool {
        level_complete(entities, &self.settings.tolerances)
    }

    pub fn trigger_info(&self, entities: &Entities, index: i32) -> Option<TriggerInfo> {
        trigger_info(entities, index)
    }

    /// Segments the renderer should draw
    pub fn visible_segments(&self) -> impl Iterator<Item = &Segment> {
        self.laser_segments.iter().filter(|s| !s.ignore)
    }
}
