// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// One-shot driver over the facade: feed a set of contours, collect the
// emitted primitives.

use super::{GluTesselator, PrimitiveType};
use crate::error::TessError;
use crate::geom::Real;
use crate::sweep::WindingRule;
use serde::{Deserialize, Serialize};

/// Options for a single [`run`]. Missing fields deserialize to
/// [`DEFAULT_OPTIONS`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessOptions {
    pub winding_rule: WindingRule,
    pub boundary_only: bool,
    /// Projection normal; `None` computes one from the input.
    pub normal: Option<[Real; 3]>,
    pub tolerance: Real,
}

pub const DEFAULT_OPTIONS: TessOptions = TessOptions {
    winding_rule: WindingRule::Odd,
    boundary_only: false,
    normal: None,
    tolerance: 0.0,
};

impl Default for TessOptions {
    fn default() -> Self {
        DEFAULT_OPTIONS
    }
}

/// One begin/end bracket of output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Primitive<V = [Real; 3]> {
    pub kind: PrimitiveType,
    pub vertices: Vec<V>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TessOutput<V = [Real; 3]> {
    pub primitives: Vec<Primitive<V>>,
    /// Non-fatal errors reported along the way, such as clamped coordinates.
    pub errors: Vec<TessError>,
}

impl<V> Default for TessOutput<V> {
    fn default() -> Self {
        TessOutput {
            primitives: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<V: Clone> TessOutput<V> {
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Every fan, strip, and triangle list flattened into triangles,
    /// keeping the primitives' orientation.
    pub fn triangles(&self) -> Vec<[V; 3]> {
        let mut out = Vec::new();
        for p in &self.primitives {
            let v = &p.vertices;
            match p.kind {
                PrimitiveType::Triangles => {
                    out.extend(v.chunks_exact(3).map(|t| [t[0].clone(), t[1].clone(), t[2].clone()]));
                }
                PrimitiveType::TriangleFan => {
                    for i in 1..v.len().saturating_sub(1) {
                        out.push([v[0].clone(), v[i].clone(), v[i + 1].clone()]);
                    }
                }
                PrimitiveType::TriangleStrip => {
                    for i in 0..v.len().saturating_sub(2) {
                        if i % 2 == 0 {
                            out.push([v[i].clone(), v[i + 1].clone(), v[i + 2].clone()]);
                        } else {
                            out.push([v[i + 1].clone(), v[i].clone(), v[i + 2].clone()]);
                        }
                    }
                }
                PrimitiveType::LineLoop => {}
            }
        }
        out
    }

    /// The vertex loops of boundary-only output.
    pub fn loops(&self) -> Vec<Vec<V>> {
        self.primitives
            .iter()
            .filter(|p| p.kind == PrimitiveType::LineLoop)
            .map(|p| p.vertices.clone())
            .collect()
    }
}

/// Tessellates `contours` of plain coordinates in one polygon call. New
/// vertices at intersections take the computed position.
pub fn run<C: AsRef<[[Real; 3]]>>(contours: &[C], options: &TessOptions) -> Result<TessOutput, TessError> {
    run_with(contours, options, |p| *p, |coords, _, _| coords)
}

/// Tessellates `contours` of any vertex type. `position` reads a vertex's
/// coordinates and `combine` builds the vertex synthesized at an
/// intersection or merge. Fatal errors are returned; the rest are kept in
/// [`TessOutput::errors`].
pub fn run_with<V, C, F, G>(contours: &[C], options: &TessOptions, position: F, mut combine: G) -> Result<TessOutput<V>, TessError>
where
    V: Clone + 'static,
    C: AsRef<[V]>,
    F: Fn(&V) -> [Real; 3],
    G: FnMut([Real; 3], [Option<&V>; 4], [Real; 4]) -> V + 'static,
{
    let mut tess: GluTesselator<V, TessOutput<V>> = GluTesselator::new();
    tess.set_winding_rule(options.winding_rule);
    tess.set_boundary_only(options.boundary_only);
    tess.set_tolerance(options.tolerance);
    if let Some([x, y, z]) = options.normal {
        tess.set_normal(x, y, z);
    }

    tess.on_begin(|kind, out| {
        out.primitives.push(Primitive {
            kind,
            vertices: Vec::new(),
        })
    });
    tess.on_vertex(|v, out| {
        if let Some(p) = out.primitives.last_mut() {
            p.vertices.push(v.clone());
        }
    });
    tess.on_error(|err, out| out.errors.push(err));
    tess.on_combine(move |coords, data, weights, _| Some(combine(coords, data, weights)));

    tess.begin_polygon(TessOutput::default());
    for contour in contours {
        tess.begin_contour();
        for v in contour.as_ref() {
            tess.add_vertex(position(v), v.clone());
        }
        tess.end_contour();
    }
    let out = tess.end_polygon().unwrap_or_default();

    match out.errors.iter().copied().find(|e| e.is_fatal()) {
        Some(err) => Err(err),
        None => Ok(out),
    }
}
