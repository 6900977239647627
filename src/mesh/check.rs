// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of GLU libtess __gl_meshCheckMesh
//
// Structural validation of the half-edge invariants. Used by debug
// assertions after each phase and by the tests.

use super::{Mesh, E_HEAD, F_HEAD, INVALID, V_HEAD};
use crate::error::MeshError;

fn fail(element: &'static str, index: u32, reason: &'static str) -> MeshError {
    MeshError::Inconsistent {
        element,
        index,
        reason,
    }
}

impl Mesh {
    /// Verifies list linkage, twin pairing, and that every face loop and
    /// vertex ring is closed and consistently labelled.
    pub fn check(&self) -> Result<(), MeshError> {
        let mut f_prev = F_HEAD;
        loop {
            let f = self.faces[f_prev].next;
            if f == F_HEAD {
                break;
            }
            if !self.faces.contains(f) || self.faces[f].prev != f_prev {
                return Err(fail("face", f, "broken face list"));
            }
            let start = self.faces[f].an_edge;
            let mut e = start;
            loop {
                self.check_links(e)?;
                if self.lface(e) != f {
                    return Err(fail("edge", e, "left face does not own its loop"));
                }
                e = self.lnext(e);
                if e == start {
                    break;
                }
            }
            f_prev = f;
        }
        if self.faces[F_HEAD].an_edge != INVALID {
            return Err(fail("face", F_HEAD, "list head owns an edge"));
        }

        let mut v_prev = V_HEAD;
        loop {
            let v = self.verts[v_prev].next;
            if v == V_HEAD {
                break;
            }
            if !self.verts.contains(v) || self.verts[v].prev != v_prev {
                return Err(fail("vertex", v, "broken vertex list"));
            }
            let start = self.verts[v].an_edge;
            let mut e = start;
            loop {
                self.check_links(e)?;
                if self.org(e) != v {
                    return Err(fail("edge", e, "origin ring names another vertex"));
                }
                e = self.onext(e);
                if e == start {
                    break;
                }
            }
            v_prev = v;
        }
        if self.verts[V_HEAD].an_edge != INVALID {
            return Err(fail("vertex", V_HEAD, "list head owns an edge"));
        }

        let mut e_prev = E_HEAD;
        loop {
            let e = self.edge(e_prev).next;
            if e == E_HEAD {
                break;
            }
            if !self.edges.contains(e >> 1) || self.edge(e ^ 1).next != (e_prev ^ 1) {
                return Err(fail("edge", e, "broken edge list"));
            }
            self.check_links(e)?;
            if self.org(e) == INVALID || self.dst(e) == INVALID {
                return Err(fail("edge", e, "missing endpoint"));
            }
            e_prev = e;
        }
        Ok(())
    }

    fn check_links(&self, e: u32) -> Result<(), MeshError> {
        if !self.edges.contains(e >> 1) {
            return Err(fail("edge", e, "dangling half-edge"));
        }
        let (lnext, onext) = (self.lnext(e), self.onext(e));
        if lnext == INVALID || onext == INVALID || !self.edges.contains(lnext >> 1) || !self.edges.contains(onext >> 1) {
            return Err(fail("edge", e, "link to a freed half-edge"));
        }
        if self.onext(self.lnext(e)) ^ 1 != e {
            return Err(fail("edge", e, "lnext/onext disagree"));
        }
        if self.lnext(self.onext(e) ^ 1) != e {
            return Err(fail("edge", e, "onext/lnext disagree"));
        }
        Ok(())
    }
}
