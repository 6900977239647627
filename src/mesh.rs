// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of GLU libtess mesh.c/h
//
// Half-edge mesh (Guibas/Stolfi quad-edge restricted to the primal graph)
// stored in generational arenas:
//   - INVALID: u32::MAX stands for a null link.
//   - Half-edges live in pairs, one arena slot per pair. Half-edge `e` is
//     slot `e >> 1`, side `e & 1`, and sym(e) = e ^ 1.
//   - Dummy list heads: vertex 0, face 0, edge pair 0 (half-edges 0 and 1).
//   - Killed elements are tombstoned and their slots reused.

mod check;
mod mono;

use crate::arena::{Arena, Handle};
use crate::error::MeshError;
use crate::geom::{vert_leq, Real, St};

pub const INVALID: u32 = u32::MAX;

pub type VertIdx = u32;
pub type FaceIdx = u32;
pub type EdgeIdx = u32;

pub const V_HEAD: VertIdx = 0;
pub const F_HEAD: FaceIdx = 0;
pub const E_HEAD: EdgeIdx = 0;
pub const E_HEAD_SYM: EdgeIdx = 1;

#[inline(always)]
pub fn sym(e: EdgeIdx) -> EdgeIdx {
    e ^ 1
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub next: VertIdx,
    pub prev: VertIdx,
    /// A half-edge with this vertex as origin.
    pub an_edge: EdgeIdx,
    pub coords: [Real; 3],
    /// Projected sweep-plane coordinates.
    pub s: Real,
    pub t: Real,
    /// Event queue handle while the vertex is queued.
    pub pq_handle: u32,
    /// Creation order; the final tie-break of the event order.
    pub id: u32,
    /// Index into the caller's vertex data table, INVALID if none.
    pub data: u32,
}

impl Default for Vertex {
    fn default() -> Self {
        Vertex {
            next: INVALID,
            prev: INVALID,
            an_edge: INVALID,
            coords: [0.0; 3],
            s: 0.0,
            t: 0.0,
            pq_handle: INVALID,
            id: INVALID,
            data: INVALID,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Face {
    pub next: FaceIdx,
    pub prev: FaceIdx,
    pub an_edge: EdgeIdx,
    /// Scratch flag used while grouping faces into fans and strips.
    pub marked: bool,
    pub inside: bool,
}

impl Default for Face {
    fn default() -> Self {
        Face {
            next: INVALID,
            prev: INVALID,
            an_edge: INVALID,
            marked: false,
            inside: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HalfEdge {
    /// Global edge list. The list runs over even half-edges; the odd twin's
    /// `next` holds the predecessor's twin.
    pub next: EdgeIdx,
    /// Next edge CCW around the origin.
    pub onext: EdgeIdx,
    /// Next edge CCW around the left face.
    pub lnext: EdgeIdx,
    pub org: VertIdx,
    pub lface: FaceIdx,
    /// Sweep region bounded above by this edge, INVALID when not active.
    pub active_region: u32,
    /// Winding change when crossing from the right face to the left face.
    pub winding: i32,
}

impl Default for HalfEdge {
    fn default() -> Self {
        HalfEdge {
            next: INVALID,
            onext: INVALID,
            lnext: INVALID,
            org: INVALID,
            lface: INVALID,
            active_region: INVALID,
            winding: 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EdgePair(pub [HalfEdge; 2]);

/// The half-edge mesh of one tessellation call.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub verts: Arena<Vertex>,
    pub faces: Arena<Face>,
    pub edges: Arena<EdgePair>,
    next_vertex_id: u32,
}

impl Mesh {
    /// An empty mesh holding only the dummy list heads.
    pub fn new() -> Self {
        let mut verts = Arena::new();
        let mut faces = Arena::new();
        let mut edges = Arena::new();

        let v_head = verts.alloc(Vertex {
            next: V_HEAD,
            prev: V_HEAD,
            ..Vertex::default()
        });
        let f_head = faces.alloc(Face {
            next: F_HEAD,
            prev: F_HEAD,
            ..Face::default()
        });
        let e_head = edges.alloc(EdgePair([
            HalfEdge {
                next: E_HEAD,
                ..HalfEdge::default()
            },
            HalfEdge {
                next: E_HEAD_SYM,
                ..HalfEdge::default()
            },
        ]));
        debug_assert_eq!((v_head, f_head, e_head), (Some(0), Some(0), Some(0)));

        Mesh {
            verts,
            faces,
            edges,
            next_vertex_id: 0,
        }
    }

    // ──────────────────────────── Half-edge access ──────────────────────────

    #[inline]
    pub fn edge(&self, e: EdgeIdx) -> &HalfEdge {
        &self.edges[e >> 1].0[(e & 1) as usize]
    }

    #[inline]
    pub fn edge_mut(&mut self, e: EdgeIdx) -> &mut HalfEdge {
        &mut self.edges[e >> 1].0[(e & 1) as usize]
    }

    #[inline]
    pub fn onext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edge(e).onext
    }

    #[inline]
    pub fn lnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edge(e).lnext
    }

    #[inline]
    pub fn org(&self, e: EdgeIdx) -> VertIdx {
        self.edge(e).org
    }

    #[inline]
    pub fn dst(&self, e: EdgeIdx) -> VertIdx {
        self.edge(e ^ 1).org
    }

    #[inline]
    pub fn lface(&self, e: EdgeIdx) -> FaceIdx {
        self.edge(e).lface
    }

    #[inline]
    pub fn rface(&self, e: EdgeIdx) -> FaceIdx {
        self.edge(e ^ 1).lface
    }

    /// Sym->Lnext
    #[inline]
    pub fn oprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edge(e ^ 1).lnext
    }

    /// Onext->Sym
    #[inline]
    pub fn lprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edge(e).onext ^ 1
    }

    /// Lnext->Sym
    #[inline]
    pub fn dprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edge(e).lnext ^ 1
    }

    /// Sym->Onext
    #[inline]
    pub fn rprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edge(e ^ 1).onext
    }

    /// Rprev->Sym
    #[inline]
    pub fn dnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edge(e ^ 1).onext ^ 1
    }

    /// Oprev->Sym
    #[inline]
    pub fn rnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edge(e ^ 1).lnext ^ 1
    }

    #[inline]
    pub fn st(&self, v: VertIdx) -> St {
        let v = &self.verts[v];
        St::new(v.s, v.t)
    }

    #[inline]
    pub fn edge_goes_left(&self, e: EdgeIdx) -> bool {
        vert_leq(self.st(self.dst(e)), self.st(self.org(e)))
    }

    #[inline]
    pub fn edge_goes_right(&self, e: EdgeIdx) -> bool {
        vert_leq(self.st(self.org(e)), self.st(self.dst(e)))
    }

    // ──────────────────────── Traversal and inspection ──────────────────────

    /// Vertex indices in list order.
    pub fn vertices(&self) -> impl Iterator<Item = VertIdx> + '_ {
        let mut v = self.verts[V_HEAD].next;
        std::iter::from_fn(move || {
            (v != V_HEAD).then(|| {
                let cur = v;
                v = self.verts[v].next;
                cur
            })
        })
    }

    /// Face indices in list order.
    pub fn face_list(&self) -> impl Iterator<Item = FaceIdx> + '_ {
        let mut f = self.faces[F_HEAD].next;
        std::iter::from_fn(move || {
            (f != F_HEAD).then(|| {
                let cur = f;
                f = self.faces[f].next;
                cur
            })
        })
    }

    /// One half-edge per undirected edge, in list order.
    pub fn edge_list(&self) -> impl Iterator<Item = EdgeIdx> + '_ {
        let mut e = self.edge(E_HEAD).next;
        std::iter::from_fn(move || {
            (e != E_HEAD).then(|| {
                let cur = e;
                e = self.edge(e).next;
                cur
            })
        })
    }

    /// Origins of the loop around face `f`, starting at its representative
    /// edge.
    pub fn face_vertices(&self, f: FaceIdx) -> Vec<VertIdx> {
        let start = self.faces[f].an_edge;
        let mut out = Vec::new();
        let mut e = start;
        loop {
            out.push(self.org(e));
            e = self.lnext(e);
            if e == start {
                break;
            }
        }
        out
    }

    pub fn vertex_count(&self) -> usize {
        self.verts.len() - 1
    }

    pub fn face_count(&self) -> usize {
        self.faces.len() - 1
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len() - 1
    }

    /// A generation-checked handle that stops resolving once the vertex is
    /// killed, even if its slot is later reused.
    pub fn vertex_handle(&self, v: VertIdx) -> Option<Handle> {
        self.verts.handle(v)
    }

    pub fn vertex(&self, handle: Handle) -> Option<&Vertex> {
        self.verts.resolve(handle)
    }

    // ──────────────────────── Element allocation ────────────────────────────

    /// Allocates a half-edge pair and links it into the global edge list
    /// before `e_next`. Returns the even half; its twin is `e ^ 1`.
    fn make_edge_pair(&mut self, e_next: EdgeIdx) -> Result<EdgeIdx, MeshError> {
        let e_next = e_next & !1;
        let e_prev = self.edge(e_next ^ 1).next;

        let slot = self
            .edges
            .alloc(EdgePair([
                HalfEdge {
                    next: e_next,
                    ..HalfEdge::default()
                },
                HalfEdge {
                    next: e_prev,
                    ..HalfEdge::default()
                },
            ]))
            .ok_or(MeshError::ArenaExhausted)?;
        if slot >= 1 << 31 {
            self.edges.free(slot);
            return Err(MeshError::ArenaExhausted);
        }

        let e = slot << 1;
        let e_sym = e | 1;
        {
            let he = self.edge_mut(e);
            he.onext = e;
            he.lnext = e_sym;
        }
        {
            let he = self.edge_mut(e_sym);
            he.onext = e_sym;
            he.lnext = e;
        }
        self.edge_mut(e_prev ^ 1).next = e;
        self.edge_mut(e_next ^ 1).next = e_sym;
        Ok(e)
    }

    /// Allocates a vertex in front of `v_next` and makes it the origin of
    /// every edge in the origin ring of `e_orig`.
    fn make_vertex(&mut self, e_orig: EdgeIdx, v_next: VertIdx) -> Result<VertIdx, MeshError> {
        let v_prev = self.verts[v_next].prev;
        let id = self.next_vertex_id;
        let v = self
            .verts
            .alloc(Vertex {
                next: v_next,
                prev: v_prev,
                an_edge: e_orig,
                id,
                ..Vertex::default()
            })
            .ok_or(MeshError::ArenaExhausted)?;
        self.next_vertex_id = self.next_vertex_id.wrapping_add(1);
        self.verts[v_prev].next = v;
        self.verts[v_next].prev = v;

        let mut e = e_orig;
        loop {
            self.edge_mut(e).org = v;
            e = self.onext(e);
            if e == e_orig {
                break;
            }
        }
        Ok(v)
    }

    /// Allocates a face in front of `f_next` and makes it the left face of
    /// the loop of `e_orig`. The new face inherits `f_next`'s inside flag.
    fn make_face(&mut self, e_orig: EdgeIdx, f_next: FaceIdx) -> Result<FaceIdx, MeshError> {
        let f_prev = self.faces[f_next].prev;
        let inside = self.faces[f_next].inside;
        let f = self
            .faces
            .alloc(Face {
                next: f_next,
                prev: f_prev,
                an_edge: e_orig,
                inside,
                ..Face::default()
            })
            .ok_or(MeshError::ArenaExhausted)?;
        self.faces[f_prev].next = f;
        self.faces[f_next].prev = f;

        let mut e = e_orig;
        loop {
            self.edge_mut(e).lface = f;
            e = self.lnext(e);
            if e == e_orig {
                break;
            }
        }
        Ok(f)
    }

    fn kill_edge(&mut self, e_del: EdgeIdx) {
        let e = e_del & !1;
        let e_next = self.edge(e).next;
        let e_prev = self.edge(e ^ 1).next;
        self.edge_mut(e_next ^ 1).next = e_prev;
        self.edge_mut(e_prev ^ 1).next = e_next;
        self.edges.free(e >> 1);
    }

    /// Re-targets the origin ring of `v_del` to `new_org` and frees it.
    fn kill_vertex(&mut self, v_del: VertIdx, new_org: VertIdx) {
        let e_start = self.verts[v_del].an_edge;
        let mut e = e_start;
        loop {
            self.edge_mut(e).org = new_org;
            e = self.onext(e);
            if e == e_start {
                break;
            }
        }
        let Vertex { prev, next, .. } = self.verts[v_del];
        self.verts[next].prev = prev;
        self.verts[prev].next = next;
        self.verts.free(v_del);
    }

    /// Re-targets the loop of `f_del` to `new_lface` and frees it.
    fn kill_face(&mut self, f_del: FaceIdx, new_lface: FaceIdx) {
        let e_start = self.faces[f_del].an_edge;
        let mut e = e_start;
        loop {
            self.edge_mut(e).lface = new_lface;
            e = self.lnext(e);
            if e == e_start {
                break;
            }
        }
        let (prev, next) = (self.faces[f_del].prev, self.faces[f_del].next);
        self.faces[next].prev = prev;
        self.faces[prev].next = next;
        self.faces.free(f_del);
    }

    /// The raw splice: exchanges a->Onext and b->Onext and patches the two
    /// affected Lnext links.
    fn splice_rings(&mut self, a: EdgeIdx, b: EdgeIdx) {
        let a_onext = self.onext(a);
        let b_onext = self.onext(b);
        self.edge_mut(a_onext ^ 1).lnext = b;
        self.edge_mut(b_onext ^ 1).lnext = a;
        self.edge_mut(a).onext = b_onext;
        self.edge_mut(b).onext = a_onext;
    }

    // ──────────────────────────── Public surgery ────────────────────────────

    /// Creates one edge, two vertices and a loop (face) of two half-edges.
    pub fn make_edge(&mut self) -> Result<EdgeIdx, MeshError> {
        let e = self.make_edge_pair(E_HEAD)?;
        self.make_vertex(e, V_HEAD)?;
        self.make_vertex(e ^ 1, V_HEAD)?;
        self.make_face(e, F_HEAD)?;
        Ok(e)
    }

    /// The basic operation for changing connectivity: exchanges the origin
    /// rings of `e_org` and `e_dst`.
    ///
    /// If the origins differ, the two vertices merge (`e_dst`'s origin is
    /// killed); otherwise the shared vertex splits in two. Likewise the left
    /// faces merge (killing `e_dst`'s) or one loop splits into two.
    pub fn splice(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) -> Result<(), MeshError> {
        if e_org == e_dst {
            return Ok(());
        }

        let joining_vertices = self.org(e_dst) != self.org(e_org);
        if joining_vertices {
            self.kill_vertex(self.org(e_dst), self.org(e_org));
        }
        let joining_loops = self.lface(e_dst) != self.lface(e_org);
        if joining_loops {
            self.kill_face(self.lface(e_dst), self.lface(e_org));
        }

        self.splice_rings(e_dst, e_org);

        if !joining_vertices {
            // The new vertex is e_dst's origin; keep the old one pointing at
            // a half-edge that still belongs to it.
            let old = self.org(e_org);
            self.make_vertex(e_dst, old)?;
            self.verts[old].an_edge = e_org;
        }
        if !joining_loops {
            let old = self.lface(e_org);
            self.make_face(e_dst, old)?;
            self.faces[old].an_edge = e_org;
        }
        Ok(())
    }

    /// Removes edge `e_del`. Faces on either side merge, or a loop splits
    /// in two; vertices or faces left without edges are freed.
    pub fn delete_edge(&mut self, e_del: EdgeIdx) -> Result<(), MeshError> {
        let e_del_sym = e_del ^ 1;

        let joining_loops = self.lface(e_del) != self.rface(e_del);
        if joining_loops {
            self.kill_face(self.lface(e_del), self.rface(e_del));
        }

        if self.onext(e_del) == e_del {
            self.kill_vertex(self.org(e_del), INVALID);
        } else {
            let rface = self.rface(e_del);
            self.faces[rface].an_edge = self.oprev(e_del);
            let org = self.org(e_del);
            self.verts[org].an_edge = self.onext(e_del);

            self.splice_rings(e_del, self.oprev(e_del));
            if !joining_loops {
                let lface = self.lface(e_del);
                self.make_face(e_del, lface)?;
            }
        }

        // e_del's origin side is consistent now; detach the destination.
        if self.onext(e_del_sym) == e_del_sym {
            self.kill_vertex(self.org(e_del_sym), INVALID);
            self.kill_face(self.lface(e_del_sym), INVALID);
        } else {
            let lface = self.lface(e_del);
            self.faces[lface].an_edge = self.oprev(e_del_sym);
            let dst = self.org(e_del_sym);
            self.verts[dst].an_edge = self.onext(e_del_sym);
            self.splice_rings(e_del_sym, self.oprev(e_del_sym));
        }

        self.kill_edge(e_del);
        Ok(())
    }

    /// Creates a new edge `e_new` with `e_new.org == e_org.dst` and a fresh
    /// destination vertex, such that `e_new == e_org.lnext`.
    pub fn add_edge_vertex(&mut self, e_org: EdgeIdx) -> Result<EdgeIdx, MeshError> {
        let e_new = self.make_edge_pair(e_org)?;
        let e_new_sym = e_new ^ 1;

        self.splice_rings(e_new, self.lnext(e_org));

        let dst = self.dst(e_org);
        self.edge_mut(e_new).org = dst;
        self.make_vertex(e_new_sym, dst)?;

        let lface = self.lface(e_org);
        self.edge_mut(e_new).lface = lface;
        self.edge_mut(e_new_sym).lface = lface;
        Ok(e_new)
    }

    /// Splits `e_org` into two edges `e_org` and `e_new` with
    /// `e_new == e_org.lnext`. The new vertex is `e_org.dst == e_new.org`;
    /// both halves keep the same faces and winding.
    pub fn split_edge(&mut self, e_org: EdgeIdx) -> Result<EdgeIdx, MeshError> {
        let temp = self.add_edge_vertex(e_org)?;
        let e_new = temp ^ 1;

        // Move e_org's destination onto the new vertex.
        self.splice_rings(e_org ^ 1, self.oprev(e_org ^ 1));
        self.splice_rings(e_org ^ 1, e_new);

        let mid = self.org(e_new);
        self.edge_mut(e_org ^ 1).org = mid;
        let far = self.dst(e_new);
        self.verts[far].an_edge = e_new ^ 1;
        let rface = self.rface(e_org);
        self.edge_mut(e_new ^ 1).lface = rface;

        let (w, w_sym) = (self.edge(e_org).winding, self.edge(e_org ^ 1).winding);
        self.edge_mut(e_new).winding = w;
        self.edge_mut(e_new ^ 1).winding = w_sym;
        Ok(e_new)
    }

    /// Adds an edge from `e_org.dst` to `e_dst.org` and returns it. If the
    /// two edges share a left face, that face is split and the new loop
    /// becomes `e_new.lface`; otherwise the two loops merge.
    pub fn connect(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) -> Result<EdgeIdx, MeshError> {
        let e_new = self.make_edge_pair(e_org)?;
        let e_new_sym = e_new ^ 1;

        let joining_loops = self.lface(e_dst) != self.lface(e_org);
        if joining_loops {
            self.kill_face(self.lface(e_dst), self.lface(e_org));
        }

        self.splice_rings(e_new, self.lnext(e_org));
        self.splice_rings(e_new_sym, e_dst);

        let org = self.dst(e_org);
        self.edge_mut(e_new).org = org;
        let dst = self.org(e_dst);
        self.edge_mut(e_new_sym).org = dst;
        let lface = self.lface(e_org);
        self.edge_mut(e_new).lface = lface;
        self.edge_mut(e_new_sym).lface = lface;

        self.faces[lface].an_edge = e_new_sym;

        if !joining_loops {
            self.make_face(e_new, lface)?;
        }
        Ok(e_new)
    }

    /// Destroys face `f_zap`, leaving its edges bordering nothing on that
    /// side. Edges with no face on either side are deleted along with any
    /// vertices they isolate.
    pub fn zap_face(&mut self, f_zap: FaceIdx) {
        let e_start = self.faces[f_zap].an_edge;
        let mut e_next = self.lnext(e_start);
        loop {
            let e = e_next;
            e_next = self.lnext(e);

            self.edge_mut(e).lface = INVALID;
            if self.rface(e) == INVALID {
                if self.onext(e) == e {
                    self.kill_vertex(self.org(e), INVALID);
                } else {
                    let org = self.org(e);
                    self.verts[org].an_edge = self.onext(e);
                    self.splice_rings(e, self.oprev(e));
                }
                let e_sym = e ^ 1;
                if self.onext(e_sym) == e_sym {
                    self.kill_vertex(self.org(e_sym), INVALID);
                } else {
                    let org = self.org(e_sym);
                    self.verts[org].an_edge = self.onext(e_sym);
                    self.splice_rings(e_sym, self.oprev(e_sym));
                }
                self.kill_edge(e);
            }
            if e == e_start {
                break;
            }
        }

        let (prev, next) = (self.faces[f_zap].prev, self.faces[f_zap].next);
        self.faces[next].prev = prev;
        self.faces[prev].next = next;
        self.faces.free(f_zap);
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a closed contour the way the facade does: a self-loop, then
    /// one split per additional vertex. Returns the last edge.
    fn contour(mesh: &mut Mesh, pts: &[(Real, Real)]) -> EdgeIdx {
        let mut e = INVALID;
        for &(x, y) in pts {
            if e == INVALID {
                e = mesh.make_edge().unwrap();
                mesh.splice(e, e ^ 1).unwrap();
            } else {
                mesh.split_edge(e).unwrap();
                e = mesh.lnext(e);
            }
            let v = mesh.org(e);
            mesh.verts[v].coords = [x, y, 0.0];
            mesh.verts[v].s = x;
            mesh.verts[v].t = y;
            mesh.edge_mut(e).winding = 1;
            mesh.edge_mut(e ^ 1).winding = -1;
        }
        e
    }

    #[test]
    fn make_edge_creates_two_vertices_and_one_face() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge().unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_count(), 1);
        assert_eq!(sym(sym(e)), e);
        assert_ne!(mesh.org(e), mesh.dst(e));
        assert_eq!(mesh.lface(e), mesh.rface(e));
        mesh.check().unwrap();
    }

    #[test]
    fn splice_with_twin_makes_a_self_loop() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge().unwrap();
        mesh.splice(e, e ^ 1).unwrap();
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.org(e), mesh.dst(e));
        mesh.check().unwrap();
    }

    #[test]
    fn contour_of_four_points_is_one_loop_each_side() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.edge_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.face_vertices(mesh.lface(e)).len(), 4);
        mesh.check().unwrap();
    }

    #[test]
    fn connect_splits_and_delete_rejoins() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        // From e's destination to the corner two steps further round.
        let across = mesh.lnext(mesh.lnext(mesh.lnext(e)));
        let diag = mesh.connect(e, across).unwrap();
        assert_eq!(mesh.org(diag), mesh.dst(e));
        assert_eq!(mesh.dst(diag), mesh.org(across));
        assert_eq!(mesh.face_count(), 3);
        assert_eq!(mesh.face_vertices(mesh.lface(diag)).len(), 3);
        assert_eq!(mesh.face_vertices(mesh.rface(diag)).len(), 3);
        mesh.check().unwrap();

        mesh.delete_edge(diag).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.edge_count(), 4);
        mesh.check().unwrap();
    }

    #[test]
    fn split_edge_keeps_winding_on_both_halves() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]);
        let e_new = mesh.split_edge(e).unwrap();
        assert_eq!(mesh.lnext(e), e_new);
        assert_eq!(mesh.dst(e), mesh.org(e_new));
        assert_eq!(mesh.edge(e_new).winding, mesh.edge(e).winding);
        assert_eq!(mesh.edge(e_new ^ 1).winding, mesh.edge(e ^ 1).winding);
        assert_eq!(mesh.vertex_count(), 4);
        mesh.check().unwrap();
    }

    #[test]
    fn deleted_vertex_handle_goes_stale() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge().unwrap();
        let v = mesh.dst(e);
        let h = mesh.vertex_handle(v).unwrap();
        assert!(mesh.vertex(h).is_some());

        mesh.delete_edge(e).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
        assert!(mesh.vertex(h).is_none());

        // The slot is recycled for the next vertex, but the old handle stays dead.
        mesh.make_edge().unwrap();
        assert!(mesh.vertex(h).is_none());
        mesh.check().unwrap();
    }

    #[test]
    fn zap_face_removes_dangling_edges() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let outside = mesh.rface(e);
        let inside = mesh.lface(e);
        mesh.zap_face(outside);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_count(), 3);
        mesh.zap_face(inside);
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn vertex_ids_increase_in_creation_order() {
        let mut mesh = Mesh::new();
        contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let ids: Vec<u32> = mesh.vertices().map(|v| mesh.verts[v].id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
    }
}
