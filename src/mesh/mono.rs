// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of GLU libtess tessmono.c/h
//
// Post-sweep passes over the finished mesh: triangulation of the monotone
// interior faces, exterior removal, and boundary extraction.

use super::{FaceIdx, Mesh, F_HEAD, E_HEAD};
use crate::error::MeshError;
use crate::geom::{edge_sign, vert_leq};

impl Mesh {
    /// Triangulates a face known to be monotone in the sweep direction.
    ///
    /// Walks the upper and lower chains from the left and cuts off a
    /// triangle whenever the next chain vertex allows it. `EdgeGoesLeft` /
    /// `EdgeGoesRight` guarantee progress even if numerical error leaves a
    /// few triangles slightly clockwise. The remainder is fanned from the
    /// leftmost vertex.
    pub fn tessellate_mono_region(&mut self, face: FaceIdx) -> Result<(), MeshError> {
        let mut up = self.faces[face].an_edge;
        debug_assert!(self.lnext(up) != up && self.lnext(self.lnext(up)) != up);

        while vert_leq(self.st(self.dst(up)), self.st(self.org(up))) {
            up = self.lprev(up);
        }
        while vert_leq(self.st(self.org(up)), self.st(self.dst(up))) {
            up = self.lnext(up);
        }
        let mut lo = self.lprev(up);

        while self.lnext(up) != lo {
            if vert_leq(self.st(self.dst(up)), self.st(self.org(lo))) {
                // up.dst is on the left: cut triangles off from lo.org.
                while self.lnext(lo) != up {
                    let next = self.lnext(lo);
                    // edge_sign needs its points in sweep order, which only
                    // holds once `next` is known not to go left.
                    let cut = self.edge_goes_left(next)
                        || edge_sign(self.st(self.org(lo)), self.st(self.dst(lo)), self.st(self.dst(next))) <= 0.0;
                    if !cut {
                        break;
                    }
                    lo = self.connect(next, lo)? ^ 1;
                }
                lo = self.lprev(lo);
            } else {
                // lo.org is on the left: cut triangles off from up.dst.
                while self.lnext(lo) != up {
                    let prev = self.lprev(up);
                    let cut = self.edge_goes_right(prev)
                        || edge_sign(self.st(self.dst(up)), self.st(self.org(up)), self.st(self.org(prev))) >= 0.0;
                    if !cut {
                        break;
                    }
                    up = self.connect(up, prev)? ^ 1;
                }
                up = self.lnext(up);
            }
        }

        debug_assert!(self.lnext(lo) != up);
        while self.lnext(self.lnext(lo)) != up {
            let next = self.lnext(lo);
            lo = self.connect(next, lo)? ^ 1;
        }
        Ok(())
    }

    /// Triangulates every face marked inside. Each such face must be
    /// monotone, which the sweep guarantees.
    pub fn tessellate_interior(&mut self) -> Result<(), MeshError> {
        let mut f = self.faces[F_HEAD].next;
        while f != F_HEAD {
            // New triangles are linked in front of `f`, so they are not revisited.
            let next = self.faces[f].next;
            if self.faces[f].inside {
                self.tessellate_mono_region(f)?;
            }
            f = next;
        }
        Ok(())
    }

    /// Zaps every face not marked inside, leaving only interior faces.
    pub fn discard_exterior(&mut self) {
        let mut f = self.faces[F_HEAD].next;
        while f != F_HEAD {
            let next = self.faces[f].next;
            if !self.faces[f].inside {
                self.zap_face(f);
            }
            f = next;
        }
    }

    /// Resets edge windings so boundary edges carry `value` (negated when
    /// the inside lies on the right) and interior edges carry zero. With
    /// `keep_only_boundary`, edges with the same classification on both
    /// sides are deleted instead, merging faces into outline loops.
    pub fn set_winding_number(&mut self, value: i32, keep_only_boundary: bool) -> Result<(), MeshError> {
        let mut e = self.edge(E_HEAD).next;
        while e != E_HEAD {
            let next = self.edge(e).next;
            let l_inside = self.faces[self.lface(e)].inside;
            let r_inside = self.faces[self.rface(e)].inside;
            if l_inside != r_inside {
                self.edge_mut(e).winding = if l_inside { value } else { -value };
            } else if keep_only_boundary {
                self.delete_edge(e)?;
            } else {
                self.edge_mut(e).winding = 0;
            }
            e = next;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::INVALID;
    use super::*;
    use crate::geom::Real;

    fn contour(mesh: &mut Mesh, pts: &[(Real, Real)]) -> u32 {
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
            mesh.verts[v].s = x;
            mesh.verts[v].t = y;
            mesh.edge_mut(e).winding = 1;
            mesh.edge_mut(e ^ 1).winding = -1;
        }
        e
    }

    fn inside_faces(mesh: &Mesh) -> Vec<FaceIdx> {
        mesh.face_list().filter(|&f| mesh.faces[f].inside).collect()
    }

    #[test]
    fn convex_hexagon_becomes_four_triangles() {
        let mut mesh = Mesh::new();
        let e = contour(
            &mut mesh,
            &[(0.0, 0.0), (2.0, -1.0), (4.0, 0.0), (4.0, 2.0), (2.0, 3.0), (0.0, 2.0)],
        );
        let f = mesh.lface(e);
        mesh.faces[f].inside = true;

        mesh.tessellate_interior().unwrap();
        let tris = inside_faces(&mesh);
        assert_eq!(tris.len(), 4);
        for f in tris {
            assert_eq!(mesh.face_vertices(f).len(), 3);
        }
        mesh.check().unwrap();
    }

    #[test]
    fn unit_square_splits_once() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let f = mesh.lface(e);
        mesh.faces[f].inside = true;
        mesh.tessellate_mono_region(f).unwrap();
        assert_eq!(inside_faces(&mesh).len(), 2);
        mesh.check().unwrap();
    }

    #[test]
    fn collinear_run_on_one_chain() {
        // Three collinear vertices along the lower chain.
        let mut mesh = Mesh::new();
        let e = contour(
            &mut mesh,
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (3.0, 1.0), (0.0, 1.0)],
        );
        let f = mesh.lface(e);
        mesh.faces[f].inside = true;
        mesh.tessellate_mono_region(f).unwrap();
        let tris = inside_faces(&mesh);
        assert_eq!(tris.len(), 4);
        for f in tris {
            assert_eq!(mesh.face_vertices(f).len(), 3);
        }
        mesh.check().unwrap();
    }

    #[test]
    fn monotone_zigzag_is_fully_triangulated() {
        // Monotone in s, with reflex vertices on both chains.
        let mut mesh = Mesh::new();
        let e = contour(
            &mut mesh,
            &[
                (0.0, 0.0),
                (1.0, -1.0),
                (2.0, -0.2),
                (3.0, -1.0),
                (4.0, 0.0),
                (3.0, 1.0),
                (2.0, 0.3),
                (1.0, 1.0),
            ],
        );
        let f = mesh.lface(e);
        mesh.faces[f].inside = true;
        mesh.tessellate_mono_region(f).unwrap();
        let tris = inside_faces(&mesh);
        assert_eq!(tris.len(), 6);
        mesh.check().unwrap();
    }

    #[test]
    fn boundary_extraction_drops_interior_edges() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let f = mesh.lface(e);
        mesh.faces[f].inside = true;
        mesh.tessellate_interior().unwrap();
        assert_eq!(mesh.edge_count(), 5);

        mesh.set_winding_number(1, true).unwrap();
        assert_eq!(mesh.edge_count(), 4);
        let inside = inside_faces(&mesh);
        assert_eq!(inside.len(), 1);
        assert_eq!(mesh.face_vertices(inside[0]).len(), 4);
        for e in mesh.edge_list() {
            assert_eq!(mesh.edge(e).winding.abs(), 1);
        }
        mesh.check().unwrap();
    }

    #[test]
    fn discard_exterior_keeps_only_inside_faces() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let f = mesh.lface(e);
        mesh.faces[f].inside = true;
        mesh.discard_exterior();
        assert_eq!(mesh.face_count(), 1);
        assert!(mesh.face_list().all(|f| mesh.faces[f].inside));
        mesh.check().unwrap();
    }
}
