// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Polygon orientation and measurement utilities, plus the boolean
// operations built on the tessellator.

pub mod boolean;

pub use boolean::{intersection, subtract, triangulate, union, union_with_rule};

use crate::geom::Real;
use crate::point::{cross, dot, normalize, sub, Point, Vec3};
use serde::{Deserialize, Serialize};

/// Orientation of a closed polygon, seen from +z for 2D input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindingOrder {
    Cw,
    Ccw,
    /// Zero area, or too few points to tell.
    Unknown,
}

pub const WINDING_CW: WindingOrder = WindingOrder::Cw;
pub const WINDING_CCW: WindingOrder = WindingOrder::Ccw;
pub const WINDING_UNKNOWN: WindingOrder = WindingOrder::Unknown;

/// Axis-aligned bounding box in the xy plane. An empty polygon gives an
/// inverted (empty) box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: Real,
    pub y_min: Real,
    pub x_max: Real,
    pub y_max: Real,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        x_min: Real::INFINITY,
        y_min: Real::INFINITY,
        x_max: Real::NEG_INFINITY,
        y_max: Real::NEG_INFINITY,
    };

    pub fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    /// Overlap test; boxes that only touch count as intersecting.
    pub fn intersects(&self, other: &Bounds) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x_min <= other.x_max
            && other.x_min <= self.x_max
            && self.y_min <= other.y_max
            && other.y_min <= self.y_max
    }
}

/// Twice the signed area of triangle `abc` in the xy plane; positive when
/// the turn `a -> b -> c` is counter-clockwise.
pub fn ccw(a: &Point, b: &Point, c: &Point) -> Real {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Unit normal of the polygon's plane.
///
/// By default the normal of the first three points is used. When that is
/// degenerate (collinear or repeated points), or when `use_newell` is set,
/// Newell's method over every edge is used instead.
pub fn normal(polygon: &[Point], use_newell: bool) -> Vec3 {
    if !use_newell && polygon.len() >= 3 {
        let n = normalize(cross(sub(&polygon[1], &polygon[0]), sub(&polygon[2], &polygon[0])));
        if !n.iter().any(|c| c.is_nan()) {
            return n;
        }
    }
    newell(polygon)
}

fn newell(polygon: &[Point]) -> Vec3 {
    let mut n = [0.0; 3];
    for (i, a) in polygon.iter().enumerate() {
        let b = &polygon[(i + 1) % polygon.len()];
        n[0] += (a.y - b.y) * (a.z() + b.z());
        n[1] += (a.z() - b.z()) * (a.x + b.x);
        n[2] += (a.x - b.x) * (a.y + b.y);
    }
    normalize(n)
}

/// Signed area, positive for counter-clockwise polygons.
///
/// 2D polygons use the shoelace formula. Polygons with 3D points, or when
/// `normal` is given, are measured in the plane of that normal, so the
/// sign is relative to it.
pub fn area(polygon: &[Point], normal: Option<Vec3>) -> Real {
    if polygon.len() < 3 {
        return 0.0;
    }
    let planar = normal.is_none() && polygon.iter().all(|p| !p.is_3d());
    if planar {
        let mut sum = 0.0;
        for (i, a) in polygon.iter().enumerate() {
            let b = &polygon[(i + 1) % polygon.len()];
            sum += a.x * b.y - b.x * a.y;
        }
        return 0.5 * sum;
    }

    let n = normal.unwrap_or_else(|| self::normal(polygon, false));
    let mut total = [0.0; 3];
    for (i, a) in polygon.iter().enumerate() {
        let c = cross(a.to_array(), polygon[(i + 1) % polygon.len()].to_array());
        total = [total[0] + c[0], total[1] + c[1], total[2] + c[2]];
    }
    let a = 0.5 * dot(n, total);
    if a.is_nan() {
        0.0
    } else {
        a
    }
}

/// Area centroid in the xy plane. Degenerate polygons fall back to the
/// mean of their points.
pub fn centroid(polygon: &[Point]) -> Point {
    if polygon.is_empty() {
        return Point::default();
    }
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut twice_area = 0.0;
    for (i, a) in polygon.iter().enumerate() {
        let b = &polygon[(i + 1) % polygon.len()];
        let f = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * f;
        cy += (a.y + b.y) * f;
        twice_area += f;
    }
    if twice_area == 0.0 {
        let n = polygon.len() as Real;
        let (sx, sy) = polygon.iter().fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
        return Point::new(sx / n, sy / n);
    }
    // Dividing by the signed area corrects for clockwise input.
    let d = 3.0 * twice_area;
    Point::new(cx / d, cy / d)
}

pub fn winding(polygon: &[Point]) -> WindingOrder {
    let a = area(polygon, None);
    if a > 0.0 {
        WindingOrder::Ccw
    } else if a < 0.0 {
        WindingOrder::Cw
    } else {
        WindingOrder::Unknown
    }
}

pub fn is_ccw(polygon: &[Point]) -> bool {
    winding(polygon) == WindingOrder::Ccw
}

pub fn is_cw(polygon: &[Point]) -> bool {
    winding(polygon) == WindingOrder::Cw
}

/// Reverses the polygon in place if it is counter-clockwise.
pub fn ensure_cw(polygon: &mut [Point]) {
    if is_ccw(polygon) {
        polygon.reverse();
    }
}

/// Reverses the polygon in place if it is clockwise.
pub fn ensure_ccw(polygon: &mut [Point]) {
    if is_cw(polygon) {
        polygon.reverse();
    }
}

pub fn bounds(polygon: &[Point]) -> Bounds {
    polygon.iter().fold(Bounds::EMPTY, |b, p| Bounds {
        x_min: b.x_min.min(p.x),
        y_min: b.y_min.min(p.y),
        x_max: b.x_max.max(p.x),
        y_max: b.y_max.max(p.y),
    })
}

/// Perimeter of the closed polygon.
pub fn length(polygon: &[Point]) -> Real {
    polygon
        .iter()
        .enumerate()
        .map(|(i, a)| crate::point::length(sub(&polygon[(i + 1) % polygon.len()], a)))
        .sum()
}
