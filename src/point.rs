// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Caller-facing points and the small vector toolkit the winding utilities
// are written against.

use crate::geom::Real;
use serde::{Deserialize, Serialize};

pub type Vec3 = [Real; 3];

/// A 2D point, or a 3D one when `z` is present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: Real,
    pub y: Real,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<Real>,
}

/// A closed contour; the last point connects back to the first.
pub type Polygon = Vec<Point>;

impl Point {
    pub const fn new(x: Real, y: Real) -> Self {
        Point { x, y, z: None }
    }

    pub const fn new_3d(x: Real, y: Real, z: Real) -> Self {
        Point { x, y, z: Some(z) }
    }

    pub fn is_3d(&self) -> bool {
        self.z.is_some()
    }

    /// `z`, or 0 for 2D points.
    pub fn z(&self) -> Real {
        self.z.unwrap_or(0.0)
    }

    pub fn to_array(&self) -> Vec3 {
        [self.x, self.y, self.z()]
    }
}

impl From<(Real, Real)> for Point {
    fn from((x, y): (Real, Real)) -> Self {
        Point::new(x, y)
    }
}

impl From<[Real; 2]> for Point {
    fn from([x, y]: [Real; 2]) -> Self {
        Point::new(x, y)
    }
}

impl From<[Real; 3]> for Point {
    fn from([x, y, z]: [Real; 3]) -> Self {
        Point::new_3d(x, y, z)
    }
}

#[inline]
pub fn sub(a: &Point, b: &Point) -> Vec3 {
    [a.x - b.x, a.y - b.y, a.z() - b.z()]
}

#[inline]
pub fn cross(u: Vec3, v: Vec3) -> Vec3 {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

#[inline]
pub fn dot(u: Vec3, v: Vec3) -> Real {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

#[inline]
pub fn length(v: Vec3) -> Real {
    dot(v, v).sqrt()
}

/// Scales `v` to unit length. A zero vector comes back as NaN, which
/// callers use to detect degenerate input.
#[inline]
pub fn normalize(v: Vec3) -> Vec3 {
    let len = length(v);
    [v[0] / len, v[1] / len, v[2] / len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_and_three_component_points() {
        let p = Point::from([1.0, 2.0]);
        assert!(!p.is_3d());
        assert_eq!(p.to_array(), [1.0, 2.0, 0.0]);
        let q = Point::from([1.0, 2.0, 3.0]);
        assert_eq!(q.z(), 3.0);
        assert_eq!(sub(&q, &p), [0.0, 0.0, 3.0]);
    }

    #[test]
    fn normalize_zero_is_nan() {
        assert_eq!(normalize([0.0, 3.0, 4.0]), [0.0, 0.6, 0.8]);
        assert!(normalize([0.0; 3]).iter().all(|c| c.is_nan()));
        assert_eq!(cross([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn serde_omits_missing_z() {
        let json = serde_json::to_string(&Point::new(1.0, 2.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0}"#);
        let back: Point = serde_json::from_str(r#"{"x":1.0,"y":2.0,"z":3.0}"#).unwrap();
        assert_eq!(back, Point::new_3d(1.0, 2.0, 3.0));
    }
}
