// Copyright 2025 Lars Brubaker
// Shared test utilities for glu-tess tests.

#![allow(dead_code)]

use glu_tess::{GluTesselator, Point, Polygon, PrimitiveType, Real, TessError};
use std::cell::RefCell;
use std::rc::Rc;

pub fn pts(coords: &[(Real, Real)]) -> Polygon {
    coords.iter().map(|&p| Point::from(p)).collect()
}

/// Axis-aligned rectangle, counter-clockwise.
pub fn rect(x0: Real, y0: Real, x1: Real, y1: Real) -> Polygon {
    pts(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
}

pub fn reversed(mut p: Polygon) -> Polygon {
    p.reverse();
    p
}

/// Signed area of a triangle in the xy plane.
pub fn triangle_area(t: &[Point; 3]) -> Real {
    let [a, b, c] = t;
    0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y))
}

pub fn total_triangle_area(tris: &[[Point; 3]]) -> Real {
    tris.iter().map(triangle_area).sum()
}

/// Sum of signed loop areas: outlines count positive, holes negative.
pub fn total_loop_area(loops: &[Polygon]) -> Real {
    loops.iter().map(|l| glu_tess::winding::area(l, None)).sum()
}

fn close(a: &Point, b: &Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

/// True when `a` and `b` list the same points in the same cyclic order,
/// whatever point each starts from.
pub fn same_cycle(a: &[Point], b: &[Point]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if a.is_empty() {
        return true;
    }
    (0..b.len()).any(|shift| a.iter().enumerate().all(|(i, p)| close(p, &b[(i + shift) % b.len()])))
}

pub fn flat(contours: &[Polygon]) -> Vec<Vec<[Real; 3]>> {
    contours.iter().map(|c| c.iter().map(Point::to_array).collect()).collect()
}

/// Everything a polygon call emitted, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Recording {
    pub events: Vec<Event>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Begin(PrimitiveType),
    Vertex(usize),
    EdgeFlag(bool),
    End,
}

impl Recording {
    pub fn primitives(&self) -> Vec<(PrimitiveType, Vec<usize>)> {
        let mut out = Vec::new();
        for ev in &self.events {
            match ev {
                Event::Begin(k) => out.push((*k, Vec::new())),
                Event::Vertex(v) => {
                    if let Some((_, vs)) = out.last_mut() {
                        vs.push(*v);
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives()
            .iter()
            .map(|(kind, v)| match kind {
                PrimitiveType::Triangles => v.len() / 3,
                PrimitiveType::TriangleFan | PrimitiveType::TriangleStrip => v.len().saturating_sub(2),
                PrimitiveType::LineLoop => 0,
            })
            .sum()
    }
}

pub type ErrorLog = Rc<RefCell<Vec<TessError>>>;

/// A tessellator with recording begin/vertex/end callbacks (vertex data is
/// the input index) and an error log shared outside the polygon data.
pub fn recording_tesselator() -> (GluTesselator<usize, Recording>, ErrorLog) {
    let mut tess = GluTesselator::new();
    tess.on_begin(|k, r: &mut Recording| r.events.push(Event::Begin(k)));
    tess.on_vertex(|&v, r: &mut Recording| r.events.push(Event::Vertex(v)));
    tess.on_end(|r: &mut Recording| r.events.push(Event::End));
    let log = ErrorLog::default();
    let sink = Rc::clone(&log);
    tess.on_error(move |e, _| sink.borrow_mut().push(e));
    (tess, log)
}

/// Feeds `contours` as one polygon, numbering vertices consecutively.
pub fn feed<P: Default>(tess: &mut GluTesselator<usize, P>, contours: &[Polygon]) {
    let mut next = 0;
    for c in contours {
        tess.begin_contour();
        for p in c {
            tess.add_vertex(p.to_array(), next);
            next += 1;
        }
        tess.end_contour();
    }
}
