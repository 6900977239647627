// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Polygon booleans and triangulation expressed as winding rules over the
// tessellator. Orientation encodes the operation: every contour is
// normalized, projected along +z so orientation is kept verbatim, and the
// rule decides which coverage counts as inside.

use super::{bounds, ccw, ensure_ccw, ensure_cw, Bounds};
use crate::error::TessError;
use crate::geom::Real;
use crate::point::{Point, Polygon};
use crate::sweep::WindingRule;
use crate::tess::run::{run_with, TessOptions, DEFAULT_OPTIONS};
use tracing::debug;

const PLUS_Z: [Real; 3] = [0.0, 0.0, 1.0];

/// Builds the point synthesized at an intersection. It stays 2D unless a
/// source point carries `z`.
fn combine_point(coords: [Real; 3], sources: [Option<&Point>; 4], _weights: [Real; 4]) -> Point {
    if sources.iter().flatten().any(|p| p.is_3d()) {
        Point::new_3d(coords[0], coords[1], coords[2])
    } else {
        Point::new(coords[0], coords[1])
    }
}

fn tessellate(contours: &[Polygon], options: &TessOptions) -> Result<crate::tess::run::TessOutput<Point>, TessError> {
    run_with(contours, options, Point::to_array, combine_point)
}

fn boundary_options(rule: WindingRule) -> TessOptions {
    TessOptions {
        winding_rule: rule,
        boundary_only: true,
        normal: Some(PLUS_Z),
        ..DEFAULT_OPTIONS
    }
}

fn oriented(polygon: &[Point], counter_clockwise: bool) -> Polygon {
    let mut p = polygon.to_vec();
    if counter_clockwise {
        ensure_ccw(&mut p);
    } else {
        ensure_cw(&mut p);
    }
    p
}

fn segments_touch(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    if !bounds(&[*a, *b]).intersects(&bounds(&[*c, *d])) {
        return false;
    }
    ccw(a, b, c) * ccw(a, b, d) <= 0.0 && ccw(c, d, a) * ccw(c, d, b) <= 0.0
}

/// True when two non-adjacent edges of the closed polygon meet. Touching
/// and collinear overlaps count.
fn self_intersects(polygon: &[Point]) -> bool {
    let n = polygon.len();
    (0..n).any(|i| {
        let (a, b) = (&polygon[i], &polygon[(i + 1) % n]);
        (i + 2..n)
            .filter(|&j| (j + 1) % n != i)
            .any(|j| segments_touch(a, b, &polygon[j], &polygon[(j + 1) % n]))
    })
}

/// Triangulates `outer` minus `holes` under the odd rule. Holes whose
/// bounding box misses the outer contour are ignored. Simple input gets no
/// added vertices.
pub fn triangulate(outer: &[Point], holes: &[Polygon]) -> Result<Vec<[Point; 3]>, TessError> {
    if outer.len() < 3 {
        return Ok(Vec::new());
    }
    let outer_box = bounds(outer);
    let mut contours = vec![outer.to_vec()];
    contours.extend(
        holes
            .iter()
            .filter(|h| h.len() >= 3 && bounds(h).intersects(&outer_box))
            .cloned(),
    );

    let planar = contours.iter().flatten().all(|p| !p.is_3d());
    let options = TessOptions {
        normal: planar.then_some(PLUS_Z),
        ..DEFAULT_OPTIONS
    };
    let triangles = tessellate(&contours, &options)?.triangles();
    debug!(contours = contours.len(), triangles = triangles.len(), "triangulated");
    Ok(triangles)
}

/// Outline of everything covered by any polygon.
pub fn union(polygons: &[Polygon]) -> Result<Vec<Polygon>, TessError> {
    union_with_rule(polygons, WindingRule::Positive)
}

/// Union with a caller-chosen rule over the counter-clockwise operands.
pub fn union_with_rule(polygons: &[Polygon], rule: WindingRule) -> Result<Vec<Polygon>, TessError> {
    let operands: Vec<Polygon> = polygons
        .iter()
        .filter(|p| p.len() >= 3)
        .map(|p| oriented(p, true))
        .collect();
    if operands.is_empty() {
        return Ok(Vec::new());
    }

    let boxes: Vec<Bounds> = operands.iter().map(|p| bounds(p)).collect();
    let disjoint = boxes
        .iter()
        .enumerate()
        .all(|(i, a)| boxes[i + 1..].iter().all(|b| !a.intersects(b)));
    if disjoint && !operands.iter().any(|p| self_intersects(p)) {
        return Ok(operands);
    }

    let loops = tessellate(&operands, &boundary_options(rule))?.loops();
    debug!(operands = operands.len(), loops = loops.len(), ?rule, "union");
    Ok(loops)
}

/// Region covered by both `a` and `b`.
pub fn intersection(a: &[Point], b: &[Point]) -> Result<Vec<Polygon>, TessError> {
    if a.len() < 3 || b.len() < 3 || !bounds(a).intersects(&bounds(b)) {
        return Ok(Vec::new());
    }
    let operands = [oriented(a, true), oriented(b, true)];
    let loops = tessellate(&operands, &boundary_options(WindingRule::AbsGeqTwo))?.loops();
    debug!(loops = loops.len(), "intersection");
    Ok(loops)
}

/// `a` with every polygon of `bs` cut away. Returns `a` itself,
/// counter-clockwise, when no subtrahend's bounding box reaches it and `a`
/// does not cross itself.
pub fn subtract(a: &[Point], bs: &[Polygon]) -> Result<Vec<Polygon>, TessError> {
    if a.len() < 3 {
        return Ok(Vec::new());
    }
    let a_box = bounds(a);
    let mut operands = vec![oriented(a, true)];
    operands.extend(
        bs.iter()
            .filter(|b| b.len() >= 3 && bounds(b).intersects(&a_box))
            .map(|b| oriented(b, false)),
    );
    if operands.len() == 1 && !self_intersects(a) {
        return Ok(operands);
    }

    let loops = tessellate(&operands, &boundary_options(WindingRule::Positive))?.loops();
    debug!(subtrahends = operands.len() - 1, loops = loops.len(), "subtract");
    Ok(loops)
}
