//! Elliptic Lasers - laser puzzle simulation on the elliptic plane
//!
//! The playfield is the unit disk, the stereographic image of the lower
//! hemisphere. Opposite boundary points are identified, so a beam leaving the
//! disk re-enters from the antipodal side.
//!
//! Core modules:
//! - `geometry`: Stereographic projection, geodesics and intersection routines
//! - `sim`: Entity registry, laser raycaster, activation and door state
//! - `renderer`: Vertex data prepared for an external renderer
//! - `settings`: Data-driven tuning and tolerances

pub mod geometry;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Radius of the disk model boundary
    pub const BOUNDARY_RADIUS: f32 = 1.0;

    /// Upper limit for the per-laser bounce count
    pub const MAX_REFLECTIONS_LIMIT: u32 = 100;

    /// Geodesic width of a portal rim
    pub const PORTAL_WIDTH: f32 = 0.2;
    /// Radius of a trigger orb
    pub const TRIGGER_RADIUS: f32 = 0.05;
    /// Default radius of a target orb
    pub const TARGET_DEFAULT_RADIUS: f32 = 0.05;
    /// Default geodesic length of a mirror
    pub const MIRROR_DEFAULT_LENGTH: f32 = 0.6;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Angle wrapped to [0, 2π)
#[inline]
pub fn angle_to_range_zero_tau(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit vector pointing at `angle`
#[inline]
pub fn oriented(angle: f32) -> Vec2 {
    polar_to_cartesian(1.0, angle)
}

/// Angle of a vector measured from +x
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Rotate a vector by +90 degrees
#[inline]
pub fn rot90(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Mirror a vector across the axis spanned by `normal`
///
/// Keeps the normal component and flips the tangential one: 2(v·n)n - v.
/// A direction pointing away from a surface comes back as the bounce
/// direction. `normal` is expected to be unit length.
#[inline]
pub fn reflect_around_normal(v: Vec2, normal: Vec2) -> Vec2 {
    2.0 * v.dot(normal) * normal - v
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 0.001);
        assert!((normalize_angle(-2.5 * PI) + 0.5 * PI).abs() < 0.001);
        assert!((normalize_angle(3.5 * PI) + 0.5 * PI).abs() < 0.001);
        assert!((normalize_angle(0.5) - 0.5).abs() < 0.001);
        // Both ends of the seam land on the same direction.
        for angle in [PI, -PI, 3.0 * PI] {
            let n = normalize_angle(angle);
            assert!((-PI..=PI).contains(&n));
            assert!((oriented(n) - oriented(PI)).length() < 1e-5);
        }
    }

    #[test]
    fn test_angle_to_range_zero_tau() {
        assert!((angle_to_range_zero_tau(-PI / 2.0) - 1.5 * PI).abs() < 0.001);
        assert!(angle_to_range_zero_tau(2.0 * PI) < 0.001);
    }

    #[test]
    fn test_reflect_around_normal() {
        // Leaving a vertical wall up and to the left
        let reflected = reflect_around_normal(Vec2::new(-1.0, 1.0), Vec2::new(-1.0, 0.0));
        assert!((reflected - Vec2::new(-1.0, -1.0)).length() < 0.001);
        let along_normal = reflect_around_normal(Vec2::X, Vec2::X);
        assert!((along_normal - Vec2::X).length() < 0.001);
    }

    #[test]
    fn test_rot90_and_angle() {
        let v = rot90(Vec2::X);
        assert!((v - Vec2::Y).length() < 1e-6);
        assert!((angle_of(oriented(1.2)) - 1.2).abs() < 1e-5);
    }
}
