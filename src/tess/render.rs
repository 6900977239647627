// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of GLU libtess render.c/h
//
// Turns the triangulated mesh into callback primitives. Each inside face is
// grown greedily into the largest triangle fan or strip of unrendered
// neighbours; faces that join no group are batched into one TRIANGLES
// primitive at the end.

use super::{Callbacks, PrimitiveType};
use crate::mesh::{EdgeIdx, FaceIdx, Mesh};

/// Output side of rendering: the registered callbacks plus the data they
/// are fed.
pub(crate) struct Emitter<'a, D, P> {
    callbacks: &'a mut Callbacks<D, P>,
    data: &'a [D],
    polygon_data: &'a mut P,
}

impl<'a, D, P> Emitter<'a, D, P> {
    pub fn new(callbacks: &'a mut Callbacks<D, P>, data: &'a [D], polygon_data: &'a mut P) -> Self {
        Emitter {
            callbacks,
            data,
            polygon_data,
        }
    }

    fn flag_boundary(&self) -> bool {
        self.callbacks.flag_boundary()
    }

    fn begin(&mut self, kind: PrimitiveType) {
        if let Some(cb) = self.callbacks.begin.as_mut() {
            cb(kind, &mut *self.polygon_data);
        }
    }

    /// `data` is a vertex's index into the data table.
    fn vertex(&mut self, data: u32) {
        if let (Some(cb), Some(d)) = (self.callbacks.vertex.as_mut(), self.data.get(data as usize)) {
            cb(d, &mut *self.polygon_data);
        }
    }

    fn end(&mut self) {
        if let Some(cb) = self.callbacks.end.as_mut() {
            cb(&mut *self.polygon_data);
        }
    }

    fn edge_flag(&mut self, boundary: bool) {
        if let Some(cb) = self.callbacks.edge_flag.as_mut() {
            cb(boundary, &mut *self.polygon_data);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Group {
    Triangle,
    Fan,
    Strip,
}

#[derive(Clone, Copy, Debug)]
struct FaceCount {
    size: usize,
    start: EdgeIdx,
    group: Group,
}

#[inline]
fn is_marked(mesh: &Mesh, f: FaceIdx) -> bool {
    let face = &mesh.faces[f];
    !face.inside || face.marked
}

/// Marks a face as taken, remembering it so a trial grouping can undo.
#[inline]
fn add_to_trail(mesh: &mut Mesh, f: FaceIdx, trail: &mut Vec<FaceIdx>) {
    mesh.faces[f].marked = true;
    trail.push(f);
}

fn free_trail(mesh: &mut Mesh, trail: Vec<FaceIdx>) {
    for f in trail {
        mesh.faces[f].marked = false;
    }
}

/// Renders every inside face as fans, strips, and independent triangles.
/// Returns the number of primitives emitted.
pub(crate) fn render_mesh<D, P>(mesh: &mut Mesh, out: &mut Emitter<'_, D, P>) -> usize {
    let faces: Vec<FaceIdx> = mesh.face_list().collect();
    for &f in &faces {
        mesh.faces[f].marked = false;
    }

    let mut primitives = 0;
    let mut lonely = Vec::new();
    for &f in &faces {
        if !mesh.faces[f].inside || mesh.faces[f].marked {
            continue;
        }
        let group = maximum_face_group(mesh, f, out.flag_boundary());
        match group.group {
            Group::Triangle => {
                debug_assert_eq!(group.size, 1);
                let face = mesh.lface(group.start);
                add_to_trail(mesh, face, &mut lonely);
            }
            Group::Fan => {
                render_fan(mesh, group.start, group.size, out);
                primitives += 1;
            }
            Group::Strip => {
                render_strip(mesh, group.start, group.size, out);
                primitives += 1;
            }
        }
        debug_assert!(mesh.faces[f].marked);
    }

    if !lonely.is_empty() {
        render_lonely_triangles(mesh, &lonely, out);
        primitives += 1;
    }
    primitives
}

/// Tries the three fans and three strips through `f` and keeps the one
/// covering the most triangles. Edge-flag output only uses single
/// triangles.
fn maximum_face_group(mesh: &mut Mesh, f: FaceIdx, flag_boundary: bool) -> FaceCount {
    let e = mesh.faces[f].an_edge;
    let mut max = FaceCount {
        size: 1,
        start: e,
        group: Group::Triangle,
    };
    if flag_boundary {
        return max;
    }

    let candidates = [e, mesh.lnext(e), mesh.lprev(e)];
    for start in candidates {
        let fan = maximum_fan(mesh, start);
        if fan.size > max.size {
            max = fan;
        }
    }
    for start in candidates {
        let strip = maximum_strip(mesh, start);
        if strip.size > max.size {
            max = strip;
        }
    }
    max
}

/// Size of the largest fan around `e_orig`'s origin containing its left face.
fn maximum_fan(mesh: &mut Mesh, e_orig: EdgeIdx) -> FaceCount {
    let mut trail = Vec::new();
    let mut size = 0;

    let mut e = e_orig;
    while !is_marked(mesh, mesh.lface(e)) {
        let f = mesh.lface(e);
        add_to_trail(mesh, f, &mut trail);
        size += 1;
        e = mesh.onext(e);
    }
    e = e_orig;
    while !is_marked(mesh, mesh.rface(e)) {
        let f = mesh.rface(e);
        add_to_trail(mesh, f, &mut trail);
        size += 1;
        e = mesh.oprev(e);
    }

    free_trail(mesh, trail);
    FaceCount {
        size,
        start: e,
        group: Group::Fan,
    }
}

/// Size of the largest strip through `e_orig`'s left face. A strip must
/// start on a side with an even number of triangles to keep them CCW.
fn maximum_strip(mesh: &mut Mesh, e_orig: EdgeIdx) -> FaceCount {
    let mut trail = Vec::new();
    let (mut tail_size, mut head_size) = (0, 0);

    let mut e = e_orig;
    while !is_marked(mesh, mesh.lface(e)) {
        let f = mesh.lface(e);
        add_to_trail(mesh, f, &mut trail);
        tail_size += 1;
        e = mesh.dprev(e);
        if is_marked(mesh, mesh.lface(e)) {
            break;
        }
        let f = mesh.lface(e);
        add_to_trail(mesh, f, &mut trail);
        tail_size += 1;
        e = mesh.onext(e);
    }
    let e_tail = e;

    e = e_orig;
    while !is_marked(mesh, mesh.rface(e)) {
        let f = mesh.rface(e);
        add_to_trail(mesh, f, &mut trail);
        head_size += 1;
        e = mesh.oprev(e);
        if is_marked(mesh, mesh.rface(e)) {
            break;
        }
        let f = mesh.rface(e);
        add_to_trail(mesh, f, &mut trail);
        head_size += 1;
        e = mesh.dnext(e);
    }
    let e_head = e;

    free_trail(mesh, trail);
    let mut size = tail_size + head_size;
    let start = if tail_size % 2 == 0 {
        e_tail ^ 1
    } else if head_size % 2 == 0 {
        e_head
    } else {
        // Both sides odd: drop one triangle, starting from the head side so
        // the original face stays in the strip.
        size -= 1;
        mesh.onext(e_head)
    };
    FaceCount {
        size,
        start,
        group: Group::Strip,
    }
}

fn render_fan<D, P>(mesh: &mut Mesh, mut e: EdgeIdx, mut size: usize, out: &mut Emitter<'_, D, P>) {
    out.begin(PrimitiveType::TriangleFan);
    out.vertex(mesh.verts[mesh.org(e)].data);
    out.vertex(mesh.verts[mesh.dst(e)].data);

    while !is_marked(mesh, mesh.lface(e)) {
        let f = mesh.lface(e);
        mesh.faces[f].marked = true;
        size -= 1;
        e = mesh.onext(e);
        out.vertex(mesh.verts[mesh.dst(e)].data);
    }

    debug_assert_eq!(size, 0);
    out.end();
}

fn render_strip<D, P>(mesh: &mut Mesh, mut e: EdgeIdx, mut size: usize, out: &mut Emitter<'_, D, P>) {
    out.begin(PrimitiveType::TriangleStrip);
    out.vertex(mesh.verts[mesh.org(e)].data);
    out.vertex(mesh.verts[mesh.dst(e)].data);

    while !is_marked(mesh, mesh.lface(e)) {
        let f = mesh.lface(e);
        mesh.faces[f].marked = true;
        size -= 1;
        e = mesh.dprev(e);
        out.vertex(mesh.verts[mesh.org(e)].data);
        if is_marked(mesh, mesh.lface(e)) {
            break;
        }

        let f = mesh.lface(e);
        mesh.faces[f].marked = true;
        size -= 1;
        e = mesh.onext(e);
        out.vertex(mesh.verts[mesh.dst(e)].data);
    }

    debug_assert_eq!(size, 0);
    out.end();
}

fn render_lonely_triangles<D, P>(mesh: &Mesh, faces: &[FaceIdx], out: &mut Emitter<'_, D, P>) {
    let flag_boundary = out.flag_boundary();
    // None forces a flag before the first vertex.
    let mut edge_state = None;

    out.begin(PrimitiveType::Triangles);
    for &f in faces {
        let start = mesh.faces[f].an_edge;
        let mut e = start;
        loop {
            if flag_boundary {
                // The flag applies from the first vertex of each edge.
                let boundary = !mesh.faces[mesh.rface(e)].inside;
                if edge_state != Some(boundary) {
                    edge_state = Some(boundary);
                    out.edge_flag(boundary);
                }
            }
            out.vertex(mesh.verts[mesh.org(e)].data);
            e = mesh.lnext(e);
            if e == start {
                break;
            }
        }
    }
    out.end();
}

/// Emits one LINE_LOOP per inside face. Returns the number of loops.
pub(crate) fn render_boundary<D, P>(mesh: &Mesh, out: &mut Emitter<'_, D, P>) -> usize {
    let mut loops = 0;
    for f in mesh.face_list() {
        if !mesh.faces[f].inside {
            continue;
        }
        out.begin(PrimitiveType::LineLoop);
        let start = mesh.faces[f].an_edge;
        let mut e = start;
        loop {
            out.vertex(mesh.verts[mesh.org(e)].data);
            e = mesh.lnext(e);
            if e == start {
                break;
            }
        }
        out.end();
        loops += 1;
    }
    loops
}
