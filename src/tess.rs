// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of GLU libtess tess.c/h
//
// The tessellator facade: a reusable handle that accepts polygons through
// a begin/end protocol and reports triangles, boundary loops, or the final
// mesh through registered callbacks.

pub mod render;
pub mod run;

use crate::error::{MeshError, TessError};
use crate::geom::Real;
use crate::mesh::{EdgeIdx, Mesh, INVALID};
use crate::sweep::{compute_interior, Combiner, WindingRule, MAX_COORD};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use render::{render_boundary, render_mesh, Emitter};

/// Where the facade is in the `begin_polygon` / `begin_contour` protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TessState {
    Idle,
    Polygon,
    Contour,
}

/// Live configuration readable and writable through
/// [`GluTesselator::set_property`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TessProperty {
    WindingRule,
    BoundaryOnly,
    Tolerance,
}

impl TessProperty {
    pub fn glu_id(self) -> u32 {
        match self {
            TessProperty::WindingRule => 100140,
            TessProperty::BoundaryOnly => 100141,
            TessProperty::Tolerance => 100142,
        }
    }

    pub fn from_glu_id(id: u32) -> Option<TessProperty> {
        Some(match id {
            100140 => TessProperty::WindingRule,
            100141 => TessProperty::BoundaryOnly,
            100142 => TessProperty::Tolerance,
            _ => return None,
        })
    }
}

/// Primitive kinds passed to the begin callback, with their GL enum values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveType {
    pub fn gl_enum(self) -> u32 {
        match self {
            PrimitiveType::LineLoop => 0x0002,
            PrimitiveType::Triangles => 0x0004,
            PrimitiveType::TriangleStrip => 0x0005,
            PrimitiveType::TriangleFan => 0x0006,
        }
    }
}

/// Callback slots, for [`GluTesselator::clear_callback`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    Begin,
    Vertex,
    End,
    Error,
    EdgeFlag,
    Combine,
    Mesh,
}

pub type BeginFn<P> = dyn FnMut(PrimitiveType, &mut P);
pub type VertexFn<D, P> = dyn FnMut(&D, &mut P);
pub type EndFn<P> = dyn FnMut(&mut P);
pub type ErrorFn<P> = dyn FnMut(TessError, &mut P);
pub type EdgeFlagFn<P> = dyn FnMut(bool, &mut P);
/// Receives the new vertex position, up to four source vertices with their
/// weights, and returns data for the new vertex. Returning `None` is only
/// tolerated for merges that do not need new data.
pub type CombineFn<D, P> = dyn FnMut([Real; 3], [Option<&D>; 4], [Real; 4], &mut P) -> Option<D>;
pub type MeshFn<D, P> = dyn FnMut(PolygonMesh<D>, &mut P);

/// A callback to register. Each variant replaces the slot of the same kind.
pub enum Callback<D, P> {
    Begin(Box<BeginFn<P>>),
    Vertex(Box<VertexFn<D, P>>),
    End(Box<EndFn<P>>),
    Error(Box<ErrorFn<P>>),
    EdgeFlag(Box<EdgeFlagFn<P>>),
    Combine(Box<CombineFn<D, P>>),
    Mesh(Box<MeshFn<D, P>>),
}

impl<D, P> Callback<D, P> {
    pub fn kind(&self) -> CallbackKind {
        match self {
            Callback::Begin(_) => CallbackKind::Begin,
            Callback::Vertex(_) => CallbackKind::Vertex,
            Callback::End(_) => CallbackKind::End,
            Callback::Error(_) => CallbackKind::Error,
            Callback::EdgeFlag(_) => CallbackKind::EdgeFlag,
            Callback::Combine(_) => CallbackKind::Combine,
            Callback::Mesh(_) => CallbackKind::Mesh,
        }
    }
}

pub(crate) struct Callbacks<D, P> {
    pub begin: Option<Box<BeginFn<P>>>,
    pub vertex: Option<Box<VertexFn<D, P>>>,
    pub end: Option<Box<EndFn<P>>>,
    pub error: Option<Box<ErrorFn<P>>>,
    pub edge_flag: Option<Box<EdgeFlagFn<P>>>,
    pub combine: Option<Box<CombineFn<D, P>>>,
    pub mesh: Option<Box<MeshFn<D, P>>>,
}

impl<D, P> Default for Callbacks<D, P> {
    fn default() -> Self {
        Callbacks {
            begin: None,
            vertex: None,
            end: None,
            error: None,
            edge_flag: None,
            combine: None,
            mesh: None,
        }
    }
}

impl<D, P> Callbacks<D, P> {
    /// Any of the primitive callbacks makes rendering worthwhile.
    pub fn wants_render(&self) -> bool {
        self.begin.is_some() || self.vertex.is_some() || self.end.is_some() || self.edge_flag.is_some()
    }

    /// Edge flags force independent triangles so every edge can be tagged.
    pub fn flag_boundary(&self) -> bool {
        self.edge_flag.is_some()
    }
}

/// The final mesh handed to a mesh callback: interior faces only, with each
/// vertex's `data` indexing into `data`.
pub struct PolygonMesh<D> {
    pub mesh: Mesh,
    pub data: Vec<D>,
}

impl<D> PolygonMesh<D> {
    /// User data of a mesh vertex, `None` for vertices the sweep created
    /// without combine output.
    pub fn vertex_data(&self, v: u32) -> Option<&D> {
        let idx = self.mesh.verts.get(v)?.data;
        self.data.get(idx as usize)
    }
}

/// Bridges the sweep's index-based combine requests to the user callback,
/// storing whatever it returns in the vertex data table.
struct DataCombiner<'a, D, P> {
    data: &'a mut Vec<D>,
    callback: Option<&'a mut CombineFn<D, P>>,
    polygon_data: &'a mut P,
}

impl<D, P> Combiner for DataCombiner<'_, D, P> {
    fn combine(&mut self, coords: [Real; 3], data: [u32; 4], weights: [Real; 4]) -> Option<u32> {
        let callback = self.callback.as_deref_mut()?;
        let sources = data.map(|i| self.data.get(i as usize));
        let out = callback(coords, sources, weights, &mut *self.polygon_data)?;
        let idx = u32::try_from(self.data.len()).ok().filter(|&i| i != INVALID)?;
        self.data.push(out);
        Some(idx)
    }
}

/// A GLU-style polygon tessellator.
///
/// `D` is the per-vertex user data passed back through the vertex and
/// combine callbacks. `P` is per-polygon data handed to `begin_polygon`,
/// lent to every callback, and returned by `end_polygon`. Errors raised
/// outside a polygon see `P::default()`.
///
/// ```
/// use glu_tess::tess::GluTesselator;
///
/// let mut tess: GluTesselator<usize, Vec<usize>> = GluTesselator::new();
/// tess.on_vertex(|&i, out| out.push(i));
/// tess.begin_polygon(Vec::new());
/// tess.begin_contour();
/// for (i, p) in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]].into_iter().enumerate() {
///     tess.add_vertex(p, i);
/// }
/// tess.end_contour();
/// let out = tess.end_polygon().unwrap();
/// assert_eq!(out.len(), 3);
/// ```
pub struct GluTesselator<D, P = ()> {
    state: TessState,
    winding_rule: WindingRule,
    boundary_only: bool,
    tolerance: Real,
    normal: [Real; 3],
    callbacks: Callbacks<D, P>,

    mesh: Option<Mesh>,
    last_edge: EdgeIdx,
    data: Vec<D>,
    polygon_data: P,
    contours: usize,
}

impl<D, P: Default> Default for GluTesselator<D, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, P: Default> GluTesselator<D, P> {
    pub fn new() -> Self {
        GluTesselator {
            state: TessState::Idle,
            winding_rule: WindingRule::default(),
            boundary_only: false,
            tolerance: 0.0,
            normal: [0.0; 3],
            callbacks: Callbacks::default(),
            mesh: None,
            last_edge: INVALID,
            data: Vec::new(),
            polygon_data: P::default(),
            contours: 0,
        }
    }

    pub fn state(&self) -> TessState {
        self.state
    }

    pub fn winding_rule(&self) -> WindingRule {
        self.winding_rule
    }

    pub fn boundary_only(&self) -> bool {
        self.boundary_only
    }

    pub fn tolerance(&self) -> Real {
        self.tolerance
    }

    pub fn normal(&self) -> [Real; 3] {
        self.normal
    }

    pub fn set_winding_rule(&mut self, rule: WindingRule) {
        self.winding_rule = rule;
    }

    pub fn set_boundary_only(&mut self, boundary_only: bool) {
        self.boundary_only = boundary_only;
    }

    /// Sets the merge tolerance. Values outside `[0, 1]` are rejected with
    /// `InvalidValue`.
    pub fn set_tolerance(&mut self, tolerance: Real) {
        if (0.0..=1.0).contains(&tolerance) {
            self.tolerance = tolerance;
        } else {
            self.report(TessError::InvalidValue);
        }
    }

    /// Sets a property from its numeric value, as `gluTessProperty` does.
    pub fn set_property(&mut self, property: TessProperty, value: Real) {
        match property {
            TessProperty::WindingRule => {
                if value.fract() != 0.0 || !(0.0..=u32::MAX as Real).contains(&value) {
                    self.report(TessError::InvalidValue);
                    return;
                }
                match WindingRule::from_glu_id(value as u32) {
                    Some(rule) => self.winding_rule = rule,
                    None => self.report(TessError::InvalidEnum),
                }
            }
            TessProperty::BoundaryOnly => self.boundary_only = value != 0.0,
            TessProperty::Tolerance => self.set_tolerance(value),
        }
    }

    pub fn get_property(&self, property: TessProperty) -> Real {
        match property {
            TessProperty::WindingRule => self.winding_rule.glu_id() as Real,
            TessProperty::BoundaryOnly => {
                if self.boundary_only {
                    1.0
                } else {
                    0.0
                }
            }
            TessProperty::Tolerance => self.tolerance,
        }
    }

    /// Sets the projection normal. All zeros means compute it from the input.
    pub fn set_normal(&mut self, x: Real, y: Real, z: Real) {
        self.normal = [x, y, z];
    }

    pub fn set_callback(&mut self, callback: Callback<D, P>) {
        let cb = &mut self.callbacks;
        match callback {
            Callback::Begin(f) => cb.begin = Some(f),
            Callback::Vertex(f) => cb.vertex = Some(f),
            Callback::End(f) => cb.end = Some(f),
            Callback::Error(f) => cb.error = Some(f),
            Callback::EdgeFlag(f) => cb.edge_flag = Some(f),
            Callback::Combine(f) => cb.combine = Some(f),
            Callback::Mesh(f) => cb.mesh = Some(f),
        }
    }

    pub fn clear_callback(&mut self, kind: CallbackKind) {
        let cb = &mut self.callbacks;
        match kind {
            CallbackKind::Begin => cb.begin = None,
            CallbackKind::Vertex => cb.vertex = None,
            CallbackKind::End => cb.end = None,
            CallbackKind::Error => cb.error = None,
            CallbackKind::EdgeFlag => cb.edge_flag = None,
            CallbackKind::Combine => cb.combine = None,
            CallbackKind::Mesh => cb.mesh = None,
        }
    }

    pub fn has_callback(&self, kind: CallbackKind) -> bool {
        let cb = &self.callbacks;
        match kind {
            CallbackKind::Begin => cb.begin.is_some(),
            CallbackKind::Vertex => cb.vertex.is_some(),
            CallbackKind::End => cb.end.is_some(),
            CallbackKind::Error => cb.error.is_some(),
            CallbackKind::EdgeFlag => cb.edge_flag.is_some(),
            CallbackKind::Combine => cb.combine.is_some(),
            CallbackKind::Mesh => cb.mesh.is_some(),
        }
    }

    pub fn on_begin(&mut self, f: impl FnMut(PrimitiveType, &mut P) + 'static) {
        self.callbacks.begin = Some(Box::new(f));
    }

    pub fn on_vertex(&mut self, f: impl FnMut(&D, &mut P) + 'static) {
        self.callbacks.vertex = Some(Box::new(f));
    }

    pub fn on_end(&mut self, f: impl FnMut(&mut P) + 'static) {
        self.callbacks.end = Some(Box::new(f));
    }

    pub fn on_error(&mut self, f: impl FnMut(TessError, &mut P) + 'static) {
        self.callbacks.error = Some(Box::new(f));
    }

    pub fn on_edge_flag(&mut self, f: impl FnMut(bool, &mut P) + 'static) {
        self.callbacks.edge_flag = Some(Box::new(f));
    }

    pub fn on_combine(&mut self, f: impl FnMut([Real; 3], [Option<&D>; 4], [Real; 4], &mut P) -> Option<D> + 'static) {
        self.callbacks.combine = Some(Box::new(f));
    }

    pub fn on_mesh(&mut self, f: impl FnMut(PolygonMesh<D>, &mut P) + 'static) {
        self.callbacks.mesh = Some(Box::new(f));
    }

    /// Starts a polygon. `polygon_data` is lent to every callback until
    /// `end_polygon` returns it.
    pub fn begin_polygon(&mut self, polygon_data: P) {
        if self.state != TessState::Idle {
            self.report(TessError::MissingEndPolygon);
            return;
        }
        self.state = TessState::Polygon;
        self.polygon_data = polygon_data;
        self.mesh = None;
        self.data.clear();
        self.contours = 0;
    }

    pub fn begin_contour(&mut self) {
        match self.state {
            TessState::Idle => self.report(TessError::MissingBeginPolygon),
            TessState::Contour => self.report(TessError::MissingEndContour),
            TessState::Polygon => {
                self.state = TessState::Contour;
                self.last_edge = INVALID;
                self.contours += 1;
            }
        }
    }

    /// Adds a vertex to the current contour. Coordinates beyond
    /// `MAX_COORD` are clamped and NaN vertices are dropped; both report
    /// `CoordTooLarge`.
    pub fn add_vertex(&mut self, coords: [Real; 3], data: D) {
        match self.state {
            TessState::Idle => return self.report(TessError::MissingBeginPolygon),
            TessState::Polygon => return self.report(TessError::MissingBeginContour),
            TessState::Contour => {}
        }

        if coords.iter().any(|c| c.is_nan()) {
            return self.report(TessError::CoordTooLarge);
        }
        let clamped = coords.map(|c| c.clamp(-MAX_COORD, MAX_COORD));
        if clamped != coords {
            self.report(TessError::CoordTooLarge);
        }

        let Ok(idx) = u32::try_from(self.data.len()) else {
            return self.report(TessError::OutOfMemory);
        };
        if let Err(err) = self.push_contour_vertex(clamped, idx) {
            return self.report(err.into());
        }
        self.data.push(data);
    }

    /// Links a new vertex after the last one of the open contour.
    fn push_contour_vertex(&mut self, coords: [Real; 3], data: u32) -> Result<(), MeshError> {
        let mesh = self.mesh.get_or_insert_with(Mesh::new);
        let e = if self.last_edge == INVALID {
            let e = mesh.make_edge()?;
            mesh.splice(e, e ^ 1)?;
            e
        } else {
            mesh.split_edge(self.last_edge)?;
            mesh.lnext(self.last_edge)
        };

        let v = mesh.org(e);
        mesh.verts[v].coords = coords;
        mesh.verts[v].data = data;
        // The contour runs along e; its twin carries the opposite sense.
        mesh.edge_mut(e).winding = 1;
        mesh.edge_mut(e ^ 1).winding = -1;
        self.last_edge = e;
        Ok(())
    }

    pub fn end_contour(&mut self) {
        match self.state {
            TessState::Idle => self.report(TessError::MissingBeginPolygon),
            TessState::Polygon => self.report(TessError::MissingBeginContour),
            TessState::Contour => self.state = TessState::Polygon,
        }
    }

    /// Tessellates the polygon, firing the output callbacks, and returns the
    /// polygon data. Returns `None` when called outside a polygon.
    pub fn end_polygon(&mut self) -> Option<P> {
        match self.state {
            TessState::Idle => {
                self.report(TessError::MissingBeginPolygon);
                return None;
            }
            TessState::Contour => {
                self.report(TessError::MissingEndContour);
                return None;
            }
            TessState::Polygon => {}
        }
        self.state = TessState::Idle;

        let mut mesh = self.mesh.take().unwrap_or_default();
        let mut data = std::mem::take(&mut self.data);
        if let Err(err) = self.tessellate(&mut mesh, &mut data) {
            self.report(err);
        } else if self.callbacks.mesh.is_some() {
            mesh.discard_exterior();
            let mut polygon_data = std::mem::take(&mut self.polygon_data);
            if let Some(cb) = self.callbacks.mesh.as_mut() {
                cb(PolygonMesh { mesh, data }, &mut polygon_data);
            }
            self.polygon_data = polygon_data;
        }
        self.last_edge = INVALID;
        Some(std::mem::take(&mut self.polygon_data))
    }

    /// Projects, sweeps, and renders the mesh. Errors are fatal for the
    /// polygon: nothing further is emitted.
    fn tessellate(&mut self, mesh: &mut Mesh, data: &mut Vec<D>) -> Result<(), TessError> {
        let vertices = mesh.vertex_count();
        project_polygon(mesh, self.normal);

        let stats = {
            let mut combiner = DataCombiner {
                data: &mut *data,
                callback: self.callbacks.combine.as_deref_mut(),
                polygon_data: &mut self.polygon_data,
            };
            compute_interior(mesh, self.winding_rule, self.tolerance, &mut combiner)?
        };
        if stats.missing_combine {
            return Err(TessError::NeedCombineCallback);
        }

        if self.boundary_only {
            mesh.set_winding_number(1, true)?;
        } else {
            mesh.tessellate_interior()?;
        }
        debug_assert!(mesh.check().is_ok(), "mesh invalid after tessellation");

        let mut primitives = 0;
        if self.callbacks.wants_render() {
            let mut out = Emitter::new(&mut self.callbacks, data.as_slice(), &mut self.polygon_data);
            primitives = if self.boundary_only {
                render_boundary(mesh, &mut out)
            } else {
                render_mesh(mesh, &mut out)
            };
        }

        debug!(
            vertices,
            contours = self.contours,
            rule = ?self.winding_rule,
            boundary_only = self.boundary_only,
            events = stats.events,
            intersections = stats.intersections,
            merges = stats.merges,
            primitives,
            "polygon tessellated"
        );
        Ok(())
    }

    fn report(&mut self, err: TessError) {
        warn!(error = %err, code = err.code(), state = ?self.state, "tessellator error");
        if let Some(cb) = self.callbacks.error.as_mut() {
            cb(err, &mut self.polygon_data);
        }
    }
}

/// Sweep direction within the projection plane. For a +z normal this gives
/// s = y and t = -x, a rotation, so contour orientation survives projection.
/// Events are therefore swept by increasing y and, among equal y, by
/// decreasing x. Only the visiting order depends on this; the output does not.
const S_UNIT_X: Real = 0.0;
const S_UNIT_Y: Real = 1.0;

fn dot(u: &[Real; 3], v: &[Real; 3]) -> Real {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

fn long_axis(v: &[Real; 3]) -> usize {
    let mut i = 0;
    if v[1].abs() > v[0].abs() {
        i = 1;
    }
    if v[2].abs() > v[i].abs() {
        i = 2;
    }
    i
}

fn short_axis(v: &[Real; 3]) -> usize {
    let mut i = 0;
    if v[1].abs() < v[0].abs() {
        i = 1;
    }
    if v[2].abs() < v[i].abs() {
        i = 2;
    }
    i
}

/// Projects every vertex onto the plane perpendicular to `normal`, filling
/// `s` and `t`. A zero normal is computed from the input, and the
/// projection is then flipped if needed so the contours have positive area.
pub(crate) fn project_polygon(mesh: &mut Mesh, normal: [Real; 3]) {
    let computed = normal == [0.0; 3];
    let norm = if computed { compute_normal(mesh) } else { normal };

    let i = long_axis(&norm);
    let mut s_unit = [0.0; 3];
    let mut t_unit = [0.0; 3];
    s_unit[(i + 1) % 3] = S_UNIT_X;
    s_unit[(i + 2) % 3] = S_UNIT_Y;
    t_unit[(i + 1) % 3] = if norm[i] > 0.0 { -S_UNIT_Y } else { S_UNIT_Y };
    t_unit[(i + 2) % 3] = if norm[i] > 0.0 { S_UNIT_X } else { -S_UNIT_X };

    let verts: Vec<_> = mesh.vertices().collect();
    for &v in &verts {
        let c = mesh.verts[v].coords;
        mesh.verts[v].s = dot(&c, &s_unit);
        mesh.verts[v].t = dot(&c, &t_unit);
    }
    if computed {
        check_orientation(mesh);
    }
}

/// Picks a normal from the two vertices furthest apart along the widest
/// axis and the third vertex that spans the largest triangle with them.
fn compute_normal(mesh: &Mesh) -> [Real; 3] {
    let mut min_val = [2.0 * MAX_COORD; 3];
    let mut max_val = [-2.0 * MAX_COORD; 3];
    let mut min_vert = [INVALID; 3];
    let mut max_vert = [INVALID; 3];

    for v in mesh.vertices() {
        let c = mesh.verts[v].coords;
        for i in 0..3 {
            if c[i] < min_val[i] {
                min_val[i] = c[i];
                min_vert[i] = v;
            }
            if c[i] > max_val[i] {
                max_val[i] = c[i];
                max_vert[i] = v;
            }
        }
    }

    let mut i = 0;
    if max_val[1] - min_val[1] > max_val[0] - min_val[0] {
        i = 1;
    }
    if max_val[2] - min_val[2] > max_val[i] - min_val[i] {
        i = 2;
    }
    if min_val[i] >= max_val[i] {
        // All vertices coincide; any normal works.
        return [0.0, 0.0, 1.0];
    }

    let c1 = mesh.verts[min_vert[i]].coords;
    let c2 = mesh.verts[max_vert[i]].coords;
    let d1 = [c1[0] - c2[0], c1[1] - c2[1], c1[2] - c2[2]];

    let mut norm = [0.0; 3];
    let mut max_len2 = 0.0;
    for v in mesh.vertices() {
        let c = mesh.verts[v].coords;
        let d2 = [c[0] - c2[0], c[1] - c2[1], c[2] - c2[2]];
        let n = [
            d1[1] * d2[2] - d1[2] * d2[1],
            d1[2] * d2[0] - d1[0] * d2[2],
            d1[0] * d2[1] - d1[1] * d2[0],
        ];
        let len2 = dot(&n, &n);
        if len2 > max_len2 {
            max_len2 = len2;
            norm = n;
        }
    }

    if max_len2 <= 0.0 {
        // Collinear input.
        norm = [0.0; 3];
        norm[short_axis(&d1)] = 1.0;
    }
    norm
}

/// Flips `t` when the contours, walked along their own direction, enclose
/// negative area.
fn check_orientation(mesh: &mut Mesh) {
    let mut area = 0.0;
    for f in mesh.face_list() {
        let start = mesh.faces[f].an_edge;
        if mesh.edge(start).winding <= 0 {
            continue;
        }
        let mut e = start;
        loop {
            let (o, d) = (mesh.st(mesh.org(e)), mesh.st(mesh.dst(e)));
            area += (o.s - d.s) * (o.t + d.t);
            e = mesh.lnext(e);
            if e == start {
                break;
            }
        }
    }
    if area < 0.0 {
        let verts: Vec<_> = mesh.vertices().collect();
        for v in verts {
            mesh.verts[v].t = -mesh.verts[v].t;
        }
    }
}

#[cfg(test)]
mod tests;
