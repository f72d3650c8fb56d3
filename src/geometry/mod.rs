//! Geometry of the elliptic plane in the stereographic disk model
//!
//! Pure functions only. Nothing here knows about entities or lasers.

pub mod circle;
pub mod intersect;
pub mod stereographic;
pub mod tolerance;

pub use circle::{Circle, PointList, circle_through_points, circle_vs_circle_intersection, line_vs_circle_intersection};
pub use intersect::{
    AngleRange, SplitSegment, SplitSegments, StereographicSegment, angle_range_between_points_on_circle,
    are_nearly_antipodal, chord_midpoint_on_line, euclidean_distance_to_stereographic_segment,
    is_point_on_line_also_on_stereographic_segment, split_stereographic_circle, split_stereographic_segment,
    stereographic_line_vs_circle_intersection, stereographic_line_vs_stereographic_line_intersection,
    stereographic_segment_vs_circle_intersection, stereographic_segment_vs_stereographic_segment_intersection,
};
pub use stereographic::{
    StereographicLine, antipodal_point, from_stereographic, move_on_spherical_geodesic,
    move_on_stereographic_geodesic, project_onto_line, sphere_tangent, spherical_distance, stereographic_circle,
    stereographic_distance, stereographic_lerp, stereographic_line, stereographic_line_normal_at,
    stereographic_line_through_point_with_tangent, stereographic_segment_midpoint, tangent_at_point_on_line,
    to_stereographic,
};
pub use tolerance::Tolerances;
