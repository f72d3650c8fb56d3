//! Planar circles and the closed-form intersection formulas everything else
//! is built on.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A Euclidean circle in the disk plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Boundary of the disk model
    pub const BOUNDARY: Circle = Circle::new(Vec2::ZERO, crate::consts::BOUNDARY_RADIUS);

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.center.distance(p) < self.radius
    }
}

/// Fixed-capacity list of up to two points
///
/// Every intersection routine returns at most two points, so results stay on
/// the stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointList {
    points: [Vec2; 2],
    len: usize,
}

impl Default for PointList {
    fn default() -> Self {
        Self::new()
    }
}

impl PointList {
    pub const fn new() -> Self {
        Self {
            points: [Vec2::ZERO; 2],
            len: 0,
        }
    }

    /// Append a point. Extra points beyond capacity are dropped.
    pub fn push(&mut self, p: Vec2) {
        debug_assert!(self.len < 2, "PointList holds at most two points");
        if self.len < 2 {
            self.points[self.len] = p;
            self.len += 1;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Vec2] {
        &self.points[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn get(&self, i: usize) -> Option<Vec2> {
        self.as_slice().get(i).copied()
    }
}

impl FromIterator<Vec2> for PointList {
    fn from_iter<I: IntoIterator<Item = Vec2>>(iter: I) -> Self {
        let mut list = PointList::new();
        for p in iter.into_iter().take(2) {
            list.push(p);
        }
        list
    }
}

/// Circle through three points, `None` if they are collinear
// https://www.johndcook.com/blog/2023/06/18/circle-through-three-points/
pub fn circle_through_points(p0: Vec2, p1: Vec2, p2: Vec2) -> Option<Circle> {
    let (x1, y1, x2, y2, x3, y3) = (p0.x, p0.y, p1.x, p1.y, p2.x, p2.y);
    let s1 = x1 * x1 + y1 * y1;
    let s2 = x2 * x2 + y2 * y2;
    let s3 = x3 * x3 + y3 * y3;
    let m11 = x1 * y2 + x2 * y3 + x3 * y1 - (x2 * y1 + x3 * y2 + x1 * y3);
    if m11 == 0.0 {
        return None;
    }
    let m12 = s1 * y2 + s2 * y3 + s3 * y1 - (s2 * y1 + s3 * y2 + s1 * y3);
    let m13 = s1 * x2 + s2 * x3 + s3 * x1 - (s2 * x1 + s3 * x2 + s1 * x3);
    let center = Vec2::new(0.5 * m12 / m11, -0.5 * m13 / m11);
    let radius = center.distance(p0);
    if !center.is_finite() || !radius.is_finite() {
        return None;
    }
    Some(Circle::new(center, radius))
}

/// Intersection of two circles (0 or 2 points; tangent circles give a double point)
pub fn circle_vs_circle_intersection(c0: &Circle, c1: &Circle) -> PointList {
    let mut out = PointList::new();

    let d = c0.center.distance(c1.center);
    if d == 0.0 || d > c0.radius + c1.radius || d < (c0.radius - c1.radius).abs() {
        return out;
    }

    // Geodesics close to the origin are huge circles, where r0² - a² loses
    // every significant digit. r0 - a has a cancellation-free form.
    let r0_minus_a = (c1.radius * c1.radius - (d - c0.radius) * (d - c0.radius)) / (2.0 * d);
    let a = c0.radius - r0_minus_a;
    let h = (r0_minus_a * (c0.radius + a)).max(0.0).sqrt();
    let delta = c1.center - c0.center;
    let base = c0.center + delta * (a / d);
    let offset = Vec2::new(delta.y, -delta.x) * (h / d);

    out.push(base + offset);
    out.push(base - offset);
    out
}

/// Intersection of the infinite line `point + t * direction` with a circle
pub fn line_vs_circle_intersection(line_point: Vec2, line_direction: Vec2, circle: &Circle) -> PointList {
    let mut out = PointList::new();

    let start = line_point - circle.center;
    let a = line_direction.dot(line_direction);
    if a == 0.0 {
        return out;
    }
    let b = start.dot(line_direction) * 2.0;
    let c = start.dot(start) - circle.radius * circle.radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return out;
    }

    // https://en.wikipedia.org/wiki/Loss_of_significance#Instability_of_the_quadratic_equation
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    if q == 0.0 {
        out.push(line_point);
        out.push(line_point);
        return out;
    }
    let t0 = q / a;
    let t1 = c / q;

    out.push(line_point + line_direction * t0);
    out.push(line_point + line_direction * t1);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_through_points() {
        let c = circle_through_points(Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(-1.0, 0.0))
            .expect("points are not collinear");
        assert!(c.center.length() < 1e-5);
        assert!((c.radius - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_through_collinear_points() {
        assert!(circle_through_points(Vec2::ZERO, Vec2::X, Vec2::X * 2.0).is_none());
    }

    #[test]
    fn test_circle_vs_circle() {
        let a = Circle::new(Vec2::ZERO, 1.0);
        let b = Circle::new(Vec2::new(1.0, 0.0), 1.0);
        let hits = circle_vs_circle_intersection(&a, &b);
        assert_eq!(hits.len(), 2);
        for p in hits.iter() {
            assert!((p.length() - 1.0).abs() < 1e-5);
            assert!((p.x - 0.5).abs() < 1e-5);
        }

        let far = Circle::new(Vec2::new(5.0, 0.0), 1.0);
        assert!(circle_vs_circle_intersection(&a, &far).is_empty());
        let inner = Circle::new(Vec2::ZERO, 0.5);
        assert!(circle_vs_circle_intersection(&a, &inner).is_empty());
    }

    #[test]
    fn test_line_vs_circle() {
        let hits = line_vs_circle_intersection(Vec2::ZERO, Vec2::X, &Circle::BOUNDARY);
        assert_eq!(hits.len(), 2);
        let xs: Vec<f32> = hits.iter().map(|p| p.x).collect();
        assert!(xs.iter().any(|x| (x - 1.0).abs() < 1e-6));
        assert!(xs.iter().any(|x| (x + 1.0).abs() < 1e-6));

        let miss = line_vs_circle_intersection(Vec2::new(0.0, 2.0), Vec2::X, &Circle::BOUNDARY);
        assert!(miss.is_empty());
    }
}
