//! Named tolerances for degenerate-geometry checks
//!
//! Every epsilon used by the geometry and the raycaster lives here so it can be
//! tuned from settings instead of being scattered through the code.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Max height of the triangle (p0, p1, antipode) for a geodesic to be
    /// treated as a straight line through the origin.
    pub collinearity: f32,
    /// Intersections farther than `1 + boundary_outside` from the origin are
    /// outside the playfield. Without slack a beam can slip past a wall that
    /// touches the boundary.
    pub boundary_outside: f32,
    /// Points closer than this to a segment endpoint count as on the segment.
    pub segment_membership: f32,
    /// Slack when testing a beam piece against an orb. Kept tiny so an orb
    /// just behind an absorbing wall stays dark.
    pub orb_contact: f32,
    /// Obstacles shorter than this are skipped. A door that is almost open
    /// would otherwise produce a geodesic with a huge center and radius.
    pub min_segment_length: f32,
    /// Two candidate hits closer than this are an ambiguous corner hit.
    pub tie_distance: f32,
    /// Two boundary points whose sum is shorter than this are antipodal.
    pub antipodal: f32,
    /// A point whose length differs from 1 by less than this is on the boundary.
    pub near_boundary: f32,
    /// Slack before a portal exit point is considered outside the disk.
    pub out_of_boundary: f32,
    /// Geodesic step used to sample a second point when building a line from
    /// a point and a tangent angle.
    pub nudge_distance: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            collinearity: 0.0005,
            boundary_outside: 0.0001,
            segment_membership: 0.01,
            orb_contact: 0.00001,
            min_segment_length: 0.001,
            tie_distance: 0.001,
            antipodal: 0.01,
            near_boundary: 0.01,
            out_of_boundary: 0.001,
            nudge_distance: 0.1,
        }
    }
}

impl Tolerances {
    /// True if every tolerance is finite and positive
    pub fn is_valid(&self) -> bool {
        [
            self.collinearity,
            self.boundary_outside,
            self.segment_membership,
            self.orb_contact,
            self.min_segment_length,
            self.tie_distance,
            self.antipodal,
            self.near_boundary,
            self.out_of_boundary,
            self.nudge_distance,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0)
    }
}
