// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of GLU libtess sweep.c/h
//
// The sweep-line pass that turns the input contours into a planar
// arrangement whose regions are each marked inside or outside under the
// winding rule. Every interior region comes out monotone.
//
// Invariants maintained between events:
//   - The active regions in the dictionary are ordered by their upper edge.
//   - Adjacent regions differ in winding number by the winding of the edge
//     between them.
//   - No two active edges cross between the sweep line and the next event,
//     except across regions marked dirty (which are checked before the
//     next event is processed).

use crate::arena::Arena;
use crate::dict::{Dict, NodeIdx, DICT_HEAD};
use crate::error::MeshError;
use crate::geom::{
    edge_eval, edge_intersect, edge_sign, vert_close, vert_eq, vert_l1_dist, vert_leq, Real, St,
};
use crate::mesh::{EdgeIdx, Mesh, VertIdx, E_HEAD, F_HEAD, INVALID};
use crate::priorityq::{EventKey, EventQueue};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Largest coordinate magnitude the sweep accepts.
pub const MAX_COORD: Real = 1.0e150;
const SENTINEL_COORD: Real = 4.0 * MAX_COORD;

pub type RegionIdx = u32;

/// Classification of winding numbers into inside and outside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindingRule {
    #[default]
    Odd,
    NonZero,
    Positive,
    Negative,
    AbsGeqTwo,
}

impl WindingRule {
    pub const ALL: [WindingRule; 5] = [
        WindingRule::Odd,
        WindingRule::NonZero,
        WindingRule::Positive,
        WindingRule::Negative,
        WindingRule::AbsGeqTwo,
    ];

    pub fn is_inside(self, n: i32) -> bool {
        match self {
            WindingRule::Odd => n & 1 != 0,
            WindingRule::NonZero => n != 0,
            WindingRule::Positive => n > 0,
            WindingRule::Negative => n < 0,
            WindingRule::AbsGeqTwo => n >= 2 || n <= -2,
        }
    }

    /// The `GLU_TESS_WINDING_*` value.
    pub fn glu_id(self) -> u32 {
        match self {
            WindingRule::Odd => 100130,
            WindingRule::NonZero => 100131,
            WindingRule::Positive => 100132,
            WindingRule::Negative => 100133,
            WindingRule::AbsGeqTwo => 100134,
        }
    }

    pub fn from_glu_id(id: u32) -> Option<WindingRule> {
        WindingRule::ALL.into_iter().find(|r| r.glu_id() == id)
    }
}

/// The strip between an active edge and the next active edge below it.
#[derive(Clone, Debug)]
pub struct ActiveRegion {
    /// Upper edge, directed right to left.
    pub e_up: EdgeIdx,
    pub node_up: NodeIdx,
    pub winding_number: i32,
    pub inside: bool,
    /// One of the two fake edges at t = ±infinity.
    pub sentinel: bool,
    /// Upper or lower edge changed; needs an intersection check.
    pub dirty: bool,
    /// Temporary edge added for a vertex with no right-going edges.
    pub fix_upper_edge: bool,
}

impl ActiveRegion {
    fn new(e_up: EdgeIdx) -> Self {
        ActiveRegion {
            e_up,
            node_up: INVALID,
            winding_number: 0,
            inside: false,
            sentinel: false,
            dirty: false,
            fix_upper_edge: false,
        }
    }
}

/// Synthesizes vertex data when the sweep creates or merges vertices.
///
/// `data` holds up to four source data indices (INVALID where absent) and
/// `weights` their interpolation weights. Returning `None` means no data
/// could be produced.
pub trait Combiner {
    fn combine(&mut self, coords: [Real; 3], data: [u32; 4], weights: [Real; 4]) -> Option<u32>;
}

/// A combiner that never produces data.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCombine;

impl Combiner for NoCombine {
    fn combine(&mut self, _: [Real; 3], _: [u32; 4], _: [Real; 4]) -> Option<u32> {
        None
    }
}

/// What one sweep did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub events: usize,
    pub intersections: usize,
    pub merges: usize,
    /// An intersection needed new vertex data and the combiner gave none.
    pub missing_combine: bool,
}

/// Runs the sweep over `mesh`, whose vertices already carry projected
/// `(s, t)` coordinates. On return every face is marked inside or outside
/// and degenerate two-edge faces are gone.
pub fn compute_interior(
    mesh: &mut Mesh,
    rule: WindingRule,
    tolerance: Real,
    combiner: &mut dyn Combiner,
) -> Result<SweepStats, MeshError> {
    Sweep {
        mesh,
        combiner,
        rule,
        tolerance,
        dict: Dict::new(),
        pq: EventQueue::new(),
        regions: Arena::new(),
        event: INVALID,
        stats: SweepStats::default(),
    }
    .run()
}

/// `true` if `e1` lies at or above `e2` at the current event.
///
/// Both edges are directed right to left. An edge ending exactly at the
/// event is compared by slope instead of by evaluation.
fn edge_leq(mesh: &Mesh, event: VertIdx, e1: EdgeIdx, e2: EdgeIdx) -> bool {
    let ev = mesh.st(event);
    let (d1, d2) = (mesh.dst(e1), mesh.dst(e2));
    let (o1, o2) = (mesh.st(mesh.org(e1)), mesh.st(mesh.org(e2)));

    if d1 == event {
        if d2 == event {
            if vert_leq(o1, o2) {
                return edge_sign(mesh.st(d2), o1, o2) <= 0.0;
            }
            return edge_sign(mesh.st(d1), o2, o1) >= 0.0;
        }
        return edge_sign(mesh.st(d2), ev, o2) <= 0.0;
    }
    if d2 == event {
        return edge_sign(mesh.st(d1), ev, o1) >= 0.0;
    }

    let t1 = edge_eval(mesh.st(d1), ev, o1);
    let t2 = edge_eval(mesh.st(d2), ev, o2);
    t1 >= t2
}

/// Weights of `org` and `dst` for a point on their edge, and the
/// correspondingly weighted share of their coordinates.
fn vertex_weights(mesh: &Mesh, isect: St, org: VertIdx, dst: VertIdx) -> ([Real; 2], [Real; 3]) {
    let t1 = vert_l1_dist(mesh.st(org), isect);
    let t2 = vert_l1_dist(mesh.st(dst), isect);
    let w = if t1 + t2 > 0.0 {
        [0.5 * t2 / (t1 + t2), 0.5 * t1 / (t1 + t2)]
    } else {
        [0.25, 0.25]
    };
    let (a, b) = (mesh.verts[org].coords, mesh.verts[dst].coords);
    let coords = [
        w[0] * a[0] + w[1] * b[0],
        w[0] * a[1] + w[1] * b[1],
        w[0] * a[2] + w[1] * b[2],
    ];
    (w, coords)
}

struct Sweep<'a> {
    mesh: &'a mut Mesh,
    combiner: &'a mut dyn Combiner,
    rule: WindingRule,
    tolerance: Real,
    dict: Dict,
    pq: EventQueue,
    regions: Arena<ActiveRegion>,
    event: VertIdx,
    stats: SweepStats,
}

type SweepResult<T> = Result<T, MeshError>;

impl Sweep<'_> {
    fn run(mut self) -> SweepResult<SweepStats> {
        self.remove_degenerate_edges()?;
        self.init_priority_queue();
        self.init_edge_dict()?;

        while let Some(v) = self.pq.extract_min() {
            self.mesh.verts[v].pq_handle = INVALID;
            // Coincident (or, with a tolerance, nearly coincident) vertices
            // become one event.
            while let Some(next) = self.pq.minimum() {
                if !vert_close(self.mesh.st(next), self.mesh.st(v), self.tolerance) {
                    break;
                }
                self.pq.extract_min();
                self.mesh.verts[next].pq_handle = INVALID;
                let (a, b) = (self.mesh.verts[v].an_edge, self.mesh.verts[next].an_edge);
                self.splice_merge_vertices(a, b)?;
            }
            self.sweep_event(v)?;
        }

        self.done_edge_dict();
        self.remove_degenerate_faces()?;
        debug_assert!(self.mesh.check().is_ok());
        Ok(self.stats)
    }

    // ───────────────────────────── Region helpers ───────────────────────────

    #[inline]
    fn st(&self, v: VertIdx) -> St {
        self.mesh.st(v)
    }

    #[inline]
    fn e_up(&self, reg: RegionIdx) -> EdgeIdx {
        self.regions[reg].e_up
    }

    /// INVALID past the bottom sentinel.
    #[inline]
    fn region_below(&self, reg: RegionIdx) -> RegionIdx {
        self.dict.key(self.dict.pred(self.regions[reg].node_up))
    }

    /// INVALID past the top sentinel.
    #[inline]
    fn region_above(&self, reg: RegionIdx) -> RegionIdx {
        self.dict.key(self.dict.succ(self.regions[reg].node_up))
    }

    #[inline]
    fn is_dirty(&self, reg: RegionIdx) -> bool {
        reg != INVALID && self.regions[reg].dirty
    }

    #[inline]
    fn mark_dirty(&mut self, reg: RegionIdx) {
        if let Some(r) = self.regions.get_mut(reg) {
            r.dirty = true;
        }
    }

    fn event_key(&self, v: VertIdx) -> EventKey {
        let vert = &self.mesh.verts[v];
        EventKey {
            s: vert.s,
            t: vert.t,
            id: vert.id,
        }
    }

    fn add_winding(&mut self, dst: EdgeIdx, src: EdgeIdx) {
        let (w, w_sym) = (self.mesh.edge(src).winding, self.mesh.edge(src ^ 1).winding);
        self.mesh.edge_mut(dst).winding += w;
        self.mesh.edge_mut(dst ^ 1).winding += w_sym;
    }

    fn dict_insert_before(&mut self, node: NodeIdx, reg: RegionIdx) -> SweepResult<NodeIdx> {
        let mesh = &*self.mesh;
        let regions = &self.regions;
        let event = self.event;
        self.dict
            .insert_before(node, reg, |a, b| edge_leq(mesh, event, regions[a].e_up, regions[b].e_up))
            .ok_or(MeshError::ArenaExhausted)
    }

    fn add_region_below(&mut self, reg_above: RegionIdx, e_new_up: EdgeIdx) -> SweepResult<RegionIdx> {
        let reg = self
            .regions
            .alloc(ActiveRegion::new(e_new_up))
            .ok_or(MeshError::ArenaExhausted)?;
        let above = self.regions[reg_above].node_up;
        let node = self.dict_insert_before(above, reg)?;
        self.regions[reg].node_up = node;
        self.mesh.edge_mut(e_new_up).active_region = reg;
        Ok(reg)
    }

    fn delete_region(&mut self, reg: RegionIdx) {
        if let Some(r) = self.regions.free(reg) {
            self.mesh.edge_mut(r.e_up).active_region = INVALID;
            self.dict.delete(r.node_up);
        }
    }

    /// Replaces a temporary upper edge with a real one.
    fn fix_upper_edge(&mut self, reg: RegionIdx, new_edge: EdgeIdx) -> SweepResult<()> {
        debug_assert!(self.regions[reg].fix_upper_edge);
        self.mesh.delete_edge(self.e_up(reg))?;
        let r = &mut self.regions[reg];
        r.fix_upper_edge = false;
        r.e_up = new_edge;
        self.mesh.edge_mut(new_edge).active_region = reg;
        Ok(())
    }

    fn compute_winding(&mut self, reg: RegionIdx) {
        let above = self.region_above(reg);
        let n = self.regions[above].winding_number + self.mesh.edge(self.e_up(reg)).winding;
        let inside = self.rule.is_inside(n);
        let r = &mut self.regions[reg];
        r.winding_number = n;
        r.inside = inside;
    }

    /// Marks the face left of the region's upper edge and retires the region.
    fn finish_region(&mut self, reg: RegionIdx) {
        let e = self.e_up(reg);
        let f = self.mesh.lface(e);
        self.mesh.faces[f].inside = self.regions[reg].inside;
        self.mesh.faces[f].an_edge = e;
        self.delete_region(reg);
    }

    /// The region above the uppermost edge sharing `reg`'s origin, fixing a
    /// temporary edge found there.
    fn top_left_region(&mut self, mut reg: RegionIdx) -> SweepResult<RegionIdx> {
        let org = self.mesh.org(self.e_up(reg));
        loop {
            reg = self.region_above(reg);
            if self.mesh.org(self.e_up(reg)) != org {
                break;
            }
        }
        if self.regions[reg].fix_upper_edge {
            let below = self.region_below(reg);
            let a = self.e_up(below) ^ 1;
            let b = self.mesh.lnext(self.e_up(reg));
            let e = self.mesh.connect(a, b)?;
            self.fix_upper_edge(reg, e)?;
            reg = self.region_above(reg);
        }
        Ok(reg)
    }

    /// The region above the uppermost edge sharing `reg`'s destination.
    fn top_right_region(&self, mut reg: RegionIdx) -> RegionIdx {
        let dst = self.mesh.dst(self.e_up(reg));
        loop {
            reg = self.region_above(reg);
            if self.mesh.dst(self.e_up(reg)) != dst {
                return reg;
            }
        }
    }
}

impl Sweep<'_> {
    // ─────────────────────────── Vertex merging ─────────────────────────────

    fn call_combine(&mut self, v: VertIdx, data: [u32; 4], weights: [Real; 4], needed: bool) {
        let coords = self.mesh.verts[v].coords;
        self.mesh.verts[v].data = match self.combiner.combine(coords, data, weights) {
            Some(d) => d,
            None if !needed => data[0],
            None => {
                self.stats.missing_combine = true;
                INVALID
            }
        };
    }

    /// Merges the origin of `e2` into the origin of `e1`.
    fn splice_merge_vertices(&mut self, e1: EdgeIdx, e2: EdgeIdx) -> SweepResult<()> {
        let (v1, v2) = (self.mesh.org(e1), self.mesh.org(e2));
        let data = [self.mesh.verts[v1].data, self.mesh.verts[v2].data, INVALID, INVALID];
        self.call_combine(v1, data, [0.5, 0.5, 0.0, 0.0], false);
        self.mesh.splice(e1, e2)?;
        self.stats.merges += 1;
        Ok(())
    }

    /// Fills in coordinates and data of a new intersection vertex from the
    /// endpoints of the two crossing edges.
    fn get_intersect_data(&mut self, isect: VertIdx, org_up: VertIdx, dst_up: VertIdx, org_lo: VertIdx, dst_lo: VertIdx) {
        let data = [org_up, dst_up, org_lo, dst_lo].map(|v| self.mesh.verts[v].data);
        let p = self.st(isect);
        let (w_up, c_up) = vertex_weights(self.mesh, p, org_up, dst_up);
        let (w_lo, c_lo) = vertex_weights(self.mesh, p, org_lo, dst_lo);
        self.mesh.verts[isect].coords = [c_up[0] + c_lo[0], c_up[1] + c_lo[1], c_up[2] + c_lo[2]];
        self.call_combine(isect, data, [w_up[0], w_up[1], w_lo[0], w_lo[1]], true);
    }

    // ───────────────────────── Setup and teardown ───────────────────────────

    /// Removes zero-length edges and contours of fewer than three edges.
    fn remove_degenerate_edges(&mut self) -> SweepResult<()> {
        let mut e = self.mesh.edge(E_HEAD).next;
        while e != E_HEAD {
            let mut e_next = self.mesh.edge(e).next;
            let mut e_lnext = self.mesh.lnext(e);

            let zero_length = vert_eq(self.st(self.mesh.org(e)), self.st(self.mesh.dst(e)));
            if zero_length && self.mesh.lnext(e_lnext) != e {
                // The contour keeps at least two edges after the merge.
                self.splice_merge_vertices(e_lnext, e)?;
                self.mesh.delete_edge(e)?;
                e = e_lnext;
                e_lnext = self.mesh.lnext(e);
            }
            if self.mesh.lnext(e_lnext) == e {
                if e_lnext != e {
                    if e_lnext == e_next || e_lnext == e_next ^ 1 {
                        e_next = self.mesh.edge(e_next).next;
                    }
                    self.mesh.delete_edge(e_lnext)?;
                }
                if e == e_next || e == e_next ^ 1 {
                    e_next = self.mesh.edge(e_next).next;
                }
                self.mesh.delete_edge(e)?;
            }
            e = e_next;
        }
        Ok(())
    }

    fn init_priority_queue(&mut self) {
        let events: Vec<(VertIdx, EventKey)> = self.mesh.vertices().map(|v| (v, self.event_key(v))).collect();
        let (pq, handles) = EventQueue::from_events(events.iter().copied());
        for (&(v, _), h) in events.iter().zip(handles) {
            self.mesh.verts[v].pq_handle = h;
        }
        self.pq = pq;
    }

    fn add_sentinel(&mut self, t: Real) -> SweepResult<()> {
        let e = self.mesh.make_edge()?;
        let (org, dst) = (self.mesh.org(e), self.mesh.dst(e));
        self.mesh.verts[org].s = SENTINEL_COORD;
        self.mesh.verts[org].t = t;
        self.mesh.verts[dst].s = -SENTINEL_COORD;
        self.mesh.verts[dst].t = t;
        self.event = dst;

        let reg = self
            .regions
            .alloc(ActiveRegion {
                sentinel: true,
                ..ActiveRegion::new(e)
            })
            .ok_or(MeshError::ArenaExhausted)?;
        let node = self.dict_insert_before(DICT_HEAD, reg)?;
        self.regions[reg].node_up = node;
        Ok(())
    }

    fn init_edge_dict(&mut self) -> SweepResult<()> {
        self.add_sentinel(-SENTINEL_COORD)?;
        self.add_sentinel(SENTINEL_COORD)
    }

    /// Only the sentinels and at most one temporary edge remain at the end.
    fn done_edge_dict(&mut self) {
        loop {
            let reg = self.dict.key(self.dict.min());
            if reg == INVALID {
                break;
            }
            debug_assert!(self.regions[reg].sentinel || self.regions[reg].fix_upper_edge);
            self.delete_region(reg);
        }
    }

    /// Deletes faces bounded by only two edges, folding their winding into
    /// the neighbouring edge.
    fn remove_degenerate_faces(&mut self) -> SweepResult<()> {
        let mut f = self.mesh.faces[F_HEAD].next;
        while f != F_HEAD {
            let next = self.mesh.faces[f].next;
            let e = self.mesh.faces[f].an_edge;
            debug_assert!(self.mesh.lnext(e) != e);
            if self.mesh.lnext(self.mesh.lnext(e)) == e {
                let onext = self.mesh.onext(e);
                self.add_winding(onext, e);
                self.mesh.delete_edge(e)?;
            }
            f = next;
        }
        Ok(())
    }

    // ──────────────────────────── Event handling ────────────────────────────

    fn sweep_event(&mut self, v_event: VertIdx) -> SweepResult<()> {
        self.event = v_event;
        self.stats.events += 1;
        let ev = self.st(v_event);
        trace!(vertex = v_event, s = ev.s, t = ev.t, "sweep event");

        // An edge already in the dictionary means v_event is the right end
        // of processed edges, which locates it without a search.
        let start = self.mesh.verts[v_event].an_edge;
        let mut e = start;
        while self.mesh.edge(e).active_region == INVALID {
            e = self.mesh.onext(e);
            if e == start {
                return self.connect_left_vertex(v_event);
            }
        }

        // Close the regions whose upper and lower edges both end here.
        let reg = self.mesh.edge(e).active_region;
        let reg_up = self.top_left_region(reg)?;
        let reg = self.region_below(reg_up);
        let e_top_left = self.e_up(reg);
        let e_bottom_left = self.finish_left_regions(reg, INVALID)?;

        let first = self.mesh.onext(e_bottom_left);
        if first == e_top_left {
            // No right-going edges.
            self.connect_right_vertex(reg_up, e_bottom_left)
        } else {
            self.add_right_edges(reg_up, first, e_top_left, e_top_left, true)
        }
    }

    /// Finishes the regions from `reg_first` down to (not including)
    /// `reg_last`, relinking the mesh so the left-going edges at the event
    /// match dictionary order. Returns the lowest left-going edge.
    fn finish_left_regions(&mut self, reg_first: RegionIdx, reg_last: RegionIdx) -> SweepResult<EdgeIdx> {
        let mut reg_prev = reg_first;
        let mut e_prev = self.e_up(reg_first);
        while reg_prev != reg_last {
            self.regions[reg_prev].fix_upper_edge = false;
            let reg = self.region_below(reg_prev);
            let mut e = self.e_up(reg);
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self.regions[reg].fix_upper_edge {
                    // Last left-going edge. The face may still gain edges
                    // from the mesh, so it is finished, not just dropped.
                    self.finish_region(reg_prev);
                    break;
                }
                let a = self.mesh.lprev(e_prev);
                e = self.mesh.connect(a, e ^ 1)?;
                self.fix_upper_edge(reg, e)?;
            }

            if self.mesh.onext(e_prev) != e {
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e)?;
                self.mesh.splice(e_prev, e)?;
            }
            self.finish_region(reg_prev);
            e_prev = self.e_up(reg);
            reg_prev = reg;
        }
        Ok(e_prev)
    }

    /// Inserts the right-going edges `e_first .. e_last` (an origin ring
    /// segment) below `reg_up`, then walks all right-going edges at that
    /// origin updating windings and mesh order. `e_top_left` is the
    /// uppermost left-going edge, or INVALID if there is none.
    fn add_right_edges(
        &mut self,
        reg_up: RegionIdx,
        e_first: EdgeIdx,
        e_last: EdgeIdx,
        e_top_left: EdgeIdx,
        clean_up: bool,
    ) -> SweepResult<()> {
        let mut e = e_first;
        loop {
            debug_assert!(self.mesh.edge_goes_right(e));
            self.add_region_below(reg_up, e ^ 1)?;
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        let e_top_left = if e_top_left == INVALID {
            self.mesh.rprev(self.e_up(self.region_below(reg_up)))
        } else {
            e_top_left
        };
        let mut reg_prev = reg_up;
        let mut e_prev = e_top_left;
        let mut first_time = true;
        loop {
            let reg = self.region_below(reg_prev);
            let e = self.e_up(reg) ^ 1;
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break;
            }

            if self.mesh.onext(e) != e_prev {
                // Relink e directly below e_prev.
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e)?;
                let below_prev = self.mesh.oprev(e_prev);
                self.mesh.splice(below_prev, e)?;
            }
            let n = self.regions[reg_prev].winding_number - self.mesh.edge(e).winding;
            self.regions[reg].winding_number = n;
            self.regions[reg].inside = self.rule.is_inside(n);

            // Overlapping right-going edges are merged before any
            // intersection test.
            self.regions[reg_prev].dirty = true;
            if !first_time && self.check_for_right_splice(reg_prev)? {
                self.add_winding(e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete_edge(e_prev)?;
            }
            first_time = false;
            reg_prev = reg;
            e_prev = e;
        }
        self.regions[reg_prev].dirty = true;

        if clean_up {
            self.walk_dirty_regions(reg_prev)?;
        }
        Ok(())
    }
}

impl Sweep<'_> {
    // ──────────────────────── Ordering repairs ──────────────────────────────

    /// Checks the upper edge of `reg_up` against the edge below it at their
    /// right (origin) ends. If one origin lies on the wrong side of the
    /// other edge, splits that edge and splices the origin into it, or
    /// merges the origins if they coincide. Returns whether anything changed.
    fn check_for_right_splice(&mut self, reg_up: RegionIdx) -> SweepResult<bool> {
        let reg_lo = self.region_below(reg_up);
        let (e_up, e_lo) = (self.e_up(reg_up), self.e_up(reg_lo));
        let (org_up, org_lo) = (self.mesh.org(e_up), self.mesh.org(e_lo));
        let (p_up, p_lo) = (self.st(org_up), self.st(org_lo));

        if vert_leq(p_up, p_lo) {
            if edge_sign(self.st(self.mesh.dst(e_lo)), p_up, p_lo) > 0.0 {
                return Ok(false);
            }
            if !vert_eq(p_up, p_lo) {
                // org_up lies below e_lo.
                self.mesh.split_edge(e_lo ^ 1)?;
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, oprev)?;
                self.mark_dirty(reg_up);
                self.mark_dirty(reg_lo);
            } else if org_up != org_lo {
                let handle = self.mesh.verts[org_up].pq_handle;
                if handle != INVALID {
                    self.pq.delete(handle);
                    self.mesh.verts[org_up].pq_handle = INVALID;
                }
                let oprev = self.mesh.oprev(e_lo);
                self.splice_merge_vertices(oprev, e_up)?;
            }
        } else {
            if edge_sign(self.st(self.mesh.dst(e_up)), p_lo, p_up) < 0.0 {
                return Ok(false);
            }
            // org_lo lies above e_up.
            let above = self.region_above(reg_up);
            self.mark_dirty(above);
            self.mark_dirty(reg_up);
            self.mesh.split_edge(e_up ^ 1)?;
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(oprev, e_up)?;
        }
        Ok(true)
    }

    /// The same check at the left (destination) ends, which have already
    /// been processed.
    fn check_for_left_splice(&mut self, reg_up: RegionIdx) -> SweepResult<bool> {
        let reg_lo = self.region_below(reg_up);
        let (e_up, e_lo) = (self.e_up(reg_up), self.e_up(reg_lo));
        let (d_up, d_lo) = (self.st(self.mesh.dst(e_up)), self.st(self.mesh.dst(e_lo)));
        debug_assert!(!vert_eq(d_up, d_lo));

        if vert_leq(d_up, d_lo) {
            if edge_sign(d_up, d_lo, self.st(self.mesh.org(e_up))) < 0.0 {
                return Ok(false);
            }
            // d_lo lies above e_up.
            let above = self.region_above(reg_up);
            self.mark_dirty(above);
            self.mark_dirty(reg_up);
            let e = self.mesh.split_edge(e_up)?;
            self.mesh.splice(e_lo ^ 1, e)?;
            let f = self.mesh.lface(e);
            self.mesh.faces[f].inside = self.regions[reg_up].inside;
        } else {
            if edge_sign(d_lo, d_up, self.st(self.mesh.org(e_lo))) > 0.0 {
                return Ok(false);
            }
            // d_up lies below e_lo.
            self.mark_dirty(reg_up);
            self.mark_dirty(reg_lo);
            let e = self.mesh.split_edge(e_lo)?;
            let lnext = self.mesh.lnext(e_up);
            self.mesh.splice(lnext, e_lo ^ 1)?;
            let f = self.mesh.rface(e);
            self.mesh.faces[f].inside = self.regions[reg_up].inside;
        }
        Ok(true)
    }

    /// Checks the upper and lower edges of `reg_up` for an intersection
    /// right of the sweep line. A crossing splits both edges at a new
    /// queued vertex. Returns `true` if it recursed into
    /// `walk_dirty_regions`, in which case the caller is done.
    fn check_for_intersect(&mut self, reg_up: RegionIdx) -> SweepResult<bool> {
        let reg_lo = self.region_below(reg_up);
        let (e_up, e_lo) = (self.e_up(reg_up), self.e_up(reg_lo));
        let (org_up, org_lo) = (self.mesh.org(e_up), self.mesh.org(e_lo));
        let (dst_up, dst_lo) = (self.mesh.dst(e_up), self.mesh.dst(e_lo));
        let event = self.event;
        let ev = self.st(event);
        let (p_org_up, p_org_lo) = (self.st(org_up), self.st(org_lo));
        let (p_dst_up, p_dst_lo) = (self.st(dst_up), self.st(dst_lo));

        debug_assert!(!vert_eq(p_dst_lo, p_dst_up));
        debug_assert!(!self.regions[reg_up].fix_upper_edge && !self.regions[reg_lo].fix_upper_edge);

        if org_up == org_lo {
            return Ok(false);
        }
        if p_org_up.t.min(p_dst_up.t) > p_org_lo.t.max(p_dst_lo.t) {
            // t ranges do not overlap.
            return Ok(false);
        }
        if vert_leq(p_org_up, p_org_lo) {
            if edge_sign(p_dst_lo, p_org_up, p_org_lo) > 0.0 {
                return Ok(false);
            }
        } else if edge_sign(p_dst_up, p_org_lo, p_org_up) < 0.0 {
            return Ok(false);
        }

        // The edges intersect, at least marginally.
        let mut isect = edge_intersect(p_dst_up, p_org_up, p_dst_lo, p_org_lo);
        if vert_leq(isect, ev) {
            // Numerical error put it left of the sweep line.
            isect = ev;
        }
        let org_min = if vert_leq(p_org_up, p_org_lo) { p_org_up } else { p_org_lo };
        if vert_leq(org_min, isect) {
            isect = org_min;
        }

        if vert_eq(isect, p_org_up) || vert_eq(isect, p_org_lo) {
            // At one of the right endpoints.
            self.check_for_right_splice(reg_up)?;
            return Ok(false);
        }

        let up_wrong_side = !vert_eq(p_dst_up, ev) && edge_sign(p_dst_up, ev, isect) >= 0.0;
        let lo_wrong_side = !vert_eq(p_dst_lo, ev) && edge_sign(p_dst_lo, ev, isect) <= 0.0;
        if up_wrong_side || lo_wrong_side {
            // A new edge would pass on the wrong side of (or through) the
            // event; fall back to splicing at the event itself.
            if dst_lo == event {
                self.mesh.split_edge(e_up ^ 1)?;
                self.mesh.splice(e_lo ^ 1, e_up)?;
                let reg_up = self.top_left_region(reg_up)?;
                let below = self.region_below(reg_up);
                let e_up = self.e_up(below);
                self.finish_left_regions(below, reg_lo)?;
                let oprev = self.mesh.oprev(e_up);
                self.add_right_edges(reg_up, oprev, e_up, e_up, true)?;
                return Ok(true);
            }
            if dst_up == event {
                self.mesh.split_edge(e_lo ^ 1)?;
                let lnext = self.mesh.lnext(e_up);
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(lnext, oprev)?;
                let reg_lo = reg_up;
                let reg_up = self.top_right_region(reg_up);
                let e = self.mesh.rprev(self.e_up(self.region_below(reg_up)));
                self.mesh.edge_mut(e_lo).active_region = INVALID;
                let new_lo = self.mesh.oprev(e_lo);
                self.regions[reg_lo].e_up = new_lo;
                let e_lo = self.finish_left_regions(reg_lo, INVALID)?;
                let first = self.mesh.onext(e_lo);
                let last = self.mesh.rprev(e_up);
                self.add_right_edges(reg_up, first, last, e, true)?;
                return Ok(true);
            }
            // Called from connect_right_vertex: split the offending edge at
            // the event and leave the splice to the caller.
            if edge_sign(p_dst_up, ev, isect) >= 0.0 {
                let above = self.region_above(reg_up);
                self.mark_dirty(above);
                self.mark_dirty(reg_up);
                self.mesh.split_edge(e_up ^ 1)?;
                let o = self.mesh.org(e_up);
                self.mesh.verts[o].s = ev.s;
                self.mesh.verts[o].t = ev.t;
            }
            if edge_sign(p_dst_lo, ev, isect) <= 0.0 {
                self.mark_dirty(reg_up);
                self.mark_dirty(reg_lo);
                self.mesh.split_edge(e_lo ^ 1)?;
                let o = self.mesh.org(e_lo);
                self.mesh.verts[o].s = ev.s;
                self.mesh.verts[o].t = ev.t;
            }
            return Ok(false);
        }

        // General case: split both edges and splice them into a new vertex.
        // Splicing into e_up keeps the face walk on the processed side,
        // where faces are small.
        self.mesh.split_edge(e_up ^ 1)?;
        self.mesh.split_edge(e_lo ^ 1)?;
        let oprev = self.mesh.oprev(e_lo);
        self.mesh.splice(oprev, e_up)?;
        let v = self.mesh.org(e_up);
        self.mesh.verts[v].s = isect.s;
        self.mesh.verts[v].t = isect.t;
        let key = self.event_key(v);
        self.mesh.verts[v].pq_handle = self.pq.insert(v, key);
        self.get_intersect_data(v, org_up, dst_up, org_lo, dst_lo);
        self.stats.intersections += 1;
        trace!(vertex = v, s = isect.s, t = isect.t, "edge intersection");

        let above = self.region_above(reg_up);
        self.mark_dirty(above);
        self.mark_dirty(reg_up);
        self.mark_dirty(reg_lo);
        Ok(false)
    }

    /// Restores the dictionary invariants for every dirty region, starting
    /// near `reg_up` and walking down then up.
    fn walk_dirty_regions(&mut self, mut reg_up: RegionIdx) -> SweepResult<()> {
        let mut reg_lo = self.region_below(reg_up);
        loop {
            while self.is_dirty(reg_lo) {
                reg_up = reg_lo;
                reg_lo = self.region_below(reg_lo);
            }
            if !self.is_dirty(reg_up) {
                reg_lo = reg_up;
                reg_up = self.region_above(reg_up);
                if !self.is_dirty(reg_up) {
                    return Ok(());
                }
            }
            self.regions[reg_up].dirty = false;
            let mut e_up = self.e_up(reg_up);
            let mut e_lo = self.e_up(reg_lo);

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo) && self.check_for_left_splice(reg_up)? {
                // A temporary edge is no longer needed once the vertex it
                // served has a real right-going edge.
                if self.regions[reg_lo].fix_upper_edge {
                    self.delete_region(reg_lo);
                    self.mesh.delete_edge(e_lo)?;
                    reg_lo = self.region_below(reg_up);
                    e_lo = self.e_up(reg_lo);
                } else if self.regions[reg_up].fix_upper_edge {
                    self.delete_region(reg_up);
                    self.mesh.delete_edge(e_up)?;
                    reg_up = self.region_above(reg_lo);
                    e_up = self.e_up(reg_up);
                }
            }

            if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                let event = self.event;
                let (d_up, d_lo) = (self.mesh.dst(e_up), self.mesh.dst(e_lo));
                if d_up != d_lo
                    && !self.regions[reg_up].fix_upper_edge
                    && !self.regions[reg_lo].fix_upper_edge
                    && (d_up == event || d_lo == event)
                {
                    if self.check_for_intersect(reg_up)? {
                        return Ok(());
                    }
                } else {
                    self.check_for_right_splice(reg_up)?;
                }
            }

            if self.mesh.org(e_up) == self.mesh.org(e_lo) && self.mesh.dst(e_up) == self.mesh.dst(e_lo) {
                // Two edges forming a degenerate loop.
                self.add_winding(e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete_edge(e_up)?;
                reg_up = self.region_above(reg_lo);
            }
        }
    }

    // ───────────────────── Vertices without a region yet ────────────────────

    /// The event has no right-going edges. Adds a temporary edge to the
    /// closer of the two right endpoints above and below, so the face
    /// closed here stays monotone. The edge is replaced once a real
    /// right-going edge appears.
    fn connect_right_vertex(&mut self, mut reg_up: RegionIdx, mut e_bottom_left: EdgeIdx) -> SweepResult<()> {
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.region_below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
            self.check_for_intersect(reg_up)?;
        }

        // The edge above or below may now pass through the event.
        let ev = self.st(self.event);
        if vert_eq(self.st(self.mesh.org(e_up)), ev) {
            let oprev = self.mesh.oprev(e_top_left);
            self.mesh.splice(oprev, e_up)?;
            reg_up = self.top_left_region(reg_up)?;
            let below = self.region_below(reg_up);
            e_top_left = self.e_up(below);
            self.finish_left_regions(below, reg_lo)?;
            degenerate = true;
        }
        if vert_eq(self.st(self.mesh.org(e_lo)), ev) {
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, oprev)?;
            e_bottom_left = self.finish_left_regions(reg_lo, INVALID)?;
            degenerate = true;
        }
        if degenerate {
            let first = self.mesh.onext(e_bottom_left);
            return self.add_right_edges(reg_up, first, e_top_left, e_top_left, true);
        }

        let target = if vert_leq(self.st(self.mesh.org(e_lo)), self.st(self.mesh.org(e_up))) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let lprev = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect(lprev, target)?;

        // No cleanup yet, or e_new could vanish before it is marked.
        let next = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, next, next, false)?;
        let reg = self.mesh.edge(e_new ^ 1).active_region;
        self.regions[reg].fix_upper_edge = true;
        self.walk_dirty_regions(reg_up)
    }

    /// The event lies on the upper edge of `reg_up`.
    fn connect_left_degenerate(&mut self, reg_up: RegionIdx, v_event: VertIdx) -> SweepResult<()> {
        let e = self.e_up(reg_up);
        let ev = self.st(v_event);
        if vert_eq(self.st(self.mesh.org(e)), ev) {
            // e's origin is still queued: merge and let it be processed later.
            let an = self.mesh.verts[v_event].an_edge;
            return self.splice_merge_vertices(e, an);
        }

        if !vert_eq(self.st(self.mesh.dst(e)), ev) {
            // Split e at the event and splice the event into it.
            self.mesh.split_edge(e ^ 1)?;
            if self.regions[reg_up].fix_upper_edge {
                let unused = self.mesh.onext(e);
                self.mesh.delete_edge(unused)?;
                self.regions[reg_up].fix_upper_edge = false;
            }
            let an = self.mesh.verts[v_event].an_edge;
            self.mesh.splice(an, e)?;
            return self.sweep_event(v_event);
        }

        // The event coincides with e's destination, already processed:
        // splice in the extra right-going edges.
        let reg_up = self.top_right_region(reg_up);
        let reg = self.region_below(reg_up);
        let mut e_top_right = self.e_up(reg) ^ 1;
        let e_last = self.mesh.onext(e_top_right);
        let mut e_top_left = e_last;
        if self.regions[reg].fix_upper_edge {
            // The lone temporary edge gives way to the real ones.
            self.delete_region(reg);
            self.mesh.delete_edge(e_top_right)?;
            e_top_right = self.mesh.oprev(e_top_left);
        }
        let an = self.mesh.verts[v_event].an_edge;
        self.mesh.splice(an, e_top_right)?;
        if !self.mesh.edge_goes_left(e_top_left) {
            e_top_left = INVALID;
        }
        let first = self.mesh.onext(e_top_right);
        self.add_right_edges(reg_up, first, e_last, e_top_left, true)
    }

    /// The event touches no processed edge: locate its region by search.
    /// Inside regions get a connecting edge so faces stay monotone; outside
    /// the polygon the vertex just adds its right-going edges.
    fn connect_left_vertex(&mut self, v_event: VertIdx) -> SweepResult<()> {
        let e_probe = self.mesh.verts[v_event].an_edge ^ 1;
        let node = {
            let mesh = &*self.mesh;
            let regions = &self.regions;
            let event = self.event;
            self.dict
                .search(INVALID, |_, k| edge_leq(mesh, event, e_probe, regions[k].e_up))
        };
        let reg_up = self.dict.key(node);
        if reg_up == INVALID {
            return Ok(());
        }
        let reg_lo = self.region_below(reg_up);
        if reg_lo == INVALID {
            return Ok(());
        }
        let (e_up, e_lo) = (self.e_up(reg_up), self.e_up(reg_lo));
        let ev = self.st(v_event);

        if edge_sign(self.st(self.mesh.dst(e_up)), ev, self.st(self.mesh.org(e_up))) == 0.0 {
            return self.connect_left_degenerate(reg_up, v_event);
        }

        let reg = if vert_leq(self.st(self.mesh.dst(e_lo)), self.st(self.mesh.dst(e_up))) {
            reg_up
        } else {
            reg_lo
        };

        if self.regions[reg_up].inside || self.regions[reg].fix_upper_edge {
            let an = self.mesh.verts[v_event].an_edge;
            let e_new = if reg == reg_up {
                let lnext = self.mesh.lnext(e_up);
                self.mesh.connect(an ^ 1, lnext)?
            } else {
                let dnext = self.mesh.dnext(e_lo);
                self.mesh.connect(dnext, an)? ^ 1
            };
            if self.regions[reg].fix_upper_edge {
                self.fix_upper_edge(reg, e_new)?;
            } else {
                let r = self.add_region_below(reg_up, e_new)?;
                self.compute_winding(r);
            }
            self.sweep_event(v_event)
        } else {
            let an = self.mesh.verts[v_event].an_edge;
            self.add_right_edges(reg_up, an, an, INVALID, true)
        }
    }
}
