//! Canvas-space geometry helpers.
//!
//! All coordinates are canvas pixels with y growing downward. Angles are in
//! degrees at the API boundary and converted to radians internally.

use serde::{Deserialize, Serialize};

/// A point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Rotate this vector about the origin by `degrees`.
    pub fn rotated(self, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// True when both coordinates are within `eps` of `other`.
    pub fn approx_eq(self, other: Point, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

/// Closest point on segment `a`-`b` to `p`, with the distance to it.
///
/// Returns `None` for zero-length segments so callers can skip them.
pub fn closest_point_on_segment(a: Point, b: Point, p: Point) -> Option<(Point, f64)> {
    let cx = b.x - a.x;
    let cy = b.y - a.y;
    let len_sq = cx * cx + cy * cy;
    if len_sq == 0.0 {
        return None;
    }
    let t = (((p.x - a.x) * cx + (p.y - a.y) * cy) / len_sq).clamp(0.0, 1.0);
    let q = Point::new(a.x + t * cx, a.y + t * cy);
    Some((q, q.distance(p)))
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    ((angle % 360.0) + 360.0) % 360.0
}

/// Angle of the vector `from -> to` in degrees, in `(-180, 180]`.
pub fn angle_between(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}
