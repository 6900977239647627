// Copyright 2025 Lars Brubaker
// Unit tests for the tessellator facade.

use super::*;
use std::cell::RefCell;
use std::rc::Rc;

type Errors = Rc<RefCell<Vec<TessError>>>;

/// A tessellator collecting vertex data per primitive, plus a shared error log.
fn recording() -> (GluTesselator<u32, Vec<(PrimitiveType, Vec<u32>)>>, Errors) {
    let mut tess = GluTesselator::new();
    tess.on_begin(|kind, out: &mut Vec<(PrimitiveType, Vec<u32>)>| out.push((kind, Vec::new())));
    tess.on_vertex(|&d, out: &mut Vec<(PrimitiveType, Vec<u32>)>| {
        if let Some((_, v)) = out.last_mut() {
            v.push(d);
        }
    });
    let errors: Errors = Rc::default();
    let log = Rc::clone(&errors);
    tess.on_error(move |e, _| log.borrow_mut().push(e));
    (tess, errors)
}

fn contour<P: Default>(tess: &mut GluTesselator<u32, P>, pts: &[(Real, Real)], first_id: u32) {
    tess.begin_contour();
    for (i, &(x, y)) in pts.iter().enumerate() {
        tess.add_vertex([x, y, 0.0], first_id + i as u32);
    }
    tess.end_contour();
}

const SQUARE: [(Real, Real); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
const BOWTIE: [(Real, Real); 4] = [(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)];

fn triangle_count(out: &[(PrimitiveType, Vec<u32>)]) -> usize {
    out.iter()
        .map(|(kind, v)| match kind {
            PrimitiveType::Triangles => v.len() / 3,
            PrimitiveType::TriangleFan | PrimitiveType::TriangleStrip => v.len() - 2,
            PrimitiveType::LineLoop => 0,
        })
        .sum()
}

#[test]
fn square_produces_two_triangles() {
    let (mut tess, errors) = recording();
    tess.begin_polygon(Vec::new());
    contour(&mut tess, &SQUARE, 0);
    let out = tess.end_polygon().unwrap();
    assert_eq!(triangle_count(&out), 2);
    assert!(errors.borrow().is_empty());
    assert_eq!(tess.state(), TessState::Idle);
}

#[test]
fn add_vertex_before_begin_contour_is_rejected() {
    let (mut tess, errors) = recording();
    tess.begin_polygon(Vec::new());
    tess.add_vertex([0.0, 0.0, 0.0], 0);
    assert_eq!(*errors.borrow(), vec![TessError::MissingBeginContour]);
    assert!(tess.mesh.is_none());
    assert!(tess.data.is_empty());
    assert_eq!(tess.state(), TessState::Polygon);

    // The instance stays usable.
    contour(&mut tess, &SQUARE, 0);
    let out = tess.end_polygon().unwrap();
    assert_eq!(triangle_count(&out), 2);
    assert_eq!(errors.borrow().len(), 1);
}

#[test]
fn out_of_order_calls_report_and_do_nothing() {
    let (mut tess, errors) = recording();
    tess.add_vertex([0.0, 0.0, 0.0], 0);
    tess.begin_contour();
    tess.end_contour();
    assert!(tess.end_polygon().is_none());
    assert_eq!(errors.borrow().len(), 4);
    assert!(errors.borrow().iter().all(|&e| e == TessError::MissingBeginPolygon));
    errors.borrow_mut().clear();

    tess.begin_polygon(Vec::new());
    tess.begin_polygon(Vec::new());
    tess.begin_contour();
    tess.begin_contour();
    assert!(tess.end_polygon().is_none());
    assert_eq!(
        *errors.borrow(),
        vec![
            TessError::MissingEndPolygon,
            TessError::MissingEndContour,
            TessError::MissingEndContour
        ]
    );
    assert_eq!(tess.state(), TessState::Contour);

    tess.end_contour();
    tess.end_contour();
    assert_eq!(errors.borrow().last(), Some(&TessError::MissingBeginContour));
    assert!(tess.end_polygon().is_some());
}

#[test]
fn properties_round_trip_through_glu_ids() {
    let (mut tess, errors) = recording();
    for rule in WindingRule::ALL {
        tess.set_property(TessProperty::WindingRule, rule.glu_id() as Real);
        assert_eq!(tess.winding_rule(), rule);
        assert_eq!(tess.get_property(TessProperty::WindingRule), rule.glu_id() as Real);
    }
    tess.set_property(TessProperty::BoundaryOnly, 1.0);
    assert!(tess.boundary_only());
    assert_eq!(tess.get_property(TessProperty::BoundaryOnly), 1.0);
    tess.set_property(TessProperty::Tolerance, 0.25);
    assert_eq!(tess.get_property(TessProperty::Tolerance), 0.25);
    assert!(errors.borrow().is_empty());

    tess.set_property(TessProperty::WindingRule, 42.0);
    tess.set_property(TessProperty::WindingRule, 100130.5);
    tess.set_property(TessProperty::Tolerance, 2.0);
    assert_eq!(
        *errors.borrow(),
        vec![TessError::InvalidEnum, TessError::InvalidValue, TessError::InvalidValue]
    );
    assert_eq!(tess.tolerance(), 0.25);

    for p in [TessProperty::WindingRule, TessProperty::BoundaryOnly, TessProperty::Tolerance] {
        assert_eq!(TessProperty::from_glu_id(p.glu_id()), Some(p));
    }
}

#[test]
fn nan_vertices_are_dropped() {
    let (mut tess, errors) = recording();
    tess.begin_polygon(Vec::new());
    tess.begin_contour();
    tess.add_vertex([0.0, 0.0, 0.0], 0);
    tess.add_vertex([Real::NAN, 5.0, 0.0], 99);
    tess.add_vertex([1.0, 0.0, 0.0], 1);
    tess.add_vertex([0.0, 1.0, 0.0], 2);
    tess.end_contour();
    let out = tess.end_polygon().unwrap();
    assert_eq!(*errors.borrow(), vec![TessError::CoordTooLarge]);
    assert_eq!(triangle_count(&out), 1);
    assert!(out.iter().all(|(_, v)| !v.contains(&99)));
}

#[test]
fn intersection_without_combine_is_fatal() {
    let (mut tess, errors) = recording();
    tess.begin_polygon(Vec::new());
    contour(&mut tess, &BOWTIE, 0);
    let out = tess.end_polygon().unwrap();
    assert!(out.is_empty());
    assert_eq!(*errors.borrow(), vec![TessError::NeedCombineCallback]);

    // A registered combine callback resolves it on the next call.
    tess.on_combine(|_, _, _, _| Some(100));
    tess.begin_polygon(Vec::new());
    contour(&mut tess, &BOWTIE, 0);
    let out = tess.end_polygon().unwrap();
    assert_eq!(triangle_count(&out), 2);
    assert!(out.iter().any(|(_, v)| v.contains(&100)));
}

#[test]
fn combine_sees_source_data_and_weights() {
    let seen: Rc<RefCell<Vec<([Option<u32>; 4], Real)>>> = Rc::default();
    let log = Rc::clone(&seen);
    let (mut tess, _) = recording();
    tess.on_combine(move |coords, data, weights, _| {
        log.borrow_mut().push((data.map(|d| d.copied()), weights.iter().sum()));
        assert!((coords[0] - 1.0).abs() < 1e-12 && (coords[1] - 1.0).abs() < 1e-12);
        Some(7)
    });
    tess.begin_polygon(Vec::new());
    contour(&mut tess, &BOWTIE, 10);
    tess.end_polygon();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    let (data, weight_sum) = seen[0];
    let mut ids: Vec<u32> = data.iter().flatten().copied().collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![10, 11, 12, 13]);
    assert!((weight_sum - 1.0).abs() < 1e-12);
}

#[test]
fn boundary_only_emits_line_loops() {
    let (mut tess, _) = recording();
    tess.set_boundary_only(true);
    tess.begin_polygon(Vec::new());
    contour(&mut tess, &SQUARE, 0);
    let out = tess.end_polygon().unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].0, PrimitiveType::LineLoop);
    let mut ids = out[0].1.clone();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}

#[test]
fn mesh_callback_receives_interior_faces() {
    let mut tess: GluTesselator<u32, Option<(usize, usize, bool)>> = GluTesselator::new();
    tess.on_mesh(|pm, out| {
        let faces = pm.mesh.face_count();
        let with_data = pm.mesh.vertices().filter(|&v| pm.vertex_data(v).is_some()).count();
        let all_inside = pm.mesh.face_list().all(|f| pm.mesh.faces[f].inside);
        *out = Some((faces, with_data, all_inside));
    });
    tess.begin_polygon(None);
    contour(&mut tess, &SQUARE, 0);
    let out = tess.end_polygon().unwrap();
    assert_eq!(out, Some((2, 4, true)));
}

#[test]
fn edge_flag_callback_forces_triangle_lists() {
    let (mut tess, _) = recording();
    tess.on_edge_flag(|_, _| {});
    tess.begin_polygon(Vec::new());
    contour(&mut tess, &[(0.0, 0.0), (3.0, 0.0), (4.0, 2.0), (2.0, 4.0), (-1.0, 2.0)], 0);
    let out = tess.end_polygon().unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].0, PrimitiveType::Triangles);
    assert_eq!(triangle_count(&out), 3);
}

#[test]
fn callbacks_can_be_replaced_and_cleared() {
    let mut tess: GluTesselator<u32, Vec<u32>> = GluTesselator::new();
    let cb: Callback<u32, Vec<u32>> = Callback::Vertex(Box::new(|&d, out| out.push(d)));
    assert_eq!(cb.kind(), CallbackKind::Vertex);
    tess.set_callback(cb);
    assert!(tess.has_callback(CallbackKind::Vertex));

    tess.begin_polygon(Vec::new());
    contour(&mut tess, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], 0);
    assert_eq!(tess.end_polygon().unwrap().len(), 3);

    tess.clear_callback(CallbackKind::Vertex);
    assert!(!tess.has_callback(CallbackKind::Vertex));
    tess.begin_polygon(Vec::new());
    contour(&mut tess, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], 0);
    assert!(tess.end_polygon().unwrap().is_empty());
}

#[test]
fn empty_polygon_emits_nothing() {
    let (mut tess, errors) = recording();
    tess.begin_polygon(Vec::new());
    let out = tess.end_polygon().unwrap();
    assert!(out.is_empty());
    tess.begin_polygon(Vec::new());
    tess.begin_contour();
    tess.end_contour();
    assert!(tess.end_polygon().unwrap().is_empty());
    assert!(errors.borrow().is_empty());
}

#[test]
fn projection_along_z_rotates_plane() {
    let mut mesh = Mesh::new();
    let e = mesh.make_edge().unwrap();
    mesh.splice(e, e ^ 1).unwrap();
    let v = mesh.org(e);
    mesh.verts[v].coords = [3.0, 5.0, 7.0];
    project_polygon(&mut mesh, [0.0, 0.0, 1.0]);
    assert_eq!((mesh.verts[v].s, mesh.verts[v].t), (5.0, -3.0));

    project_polygon(&mut mesh, [0.0, 0.0, -1.0]);
    assert_eq!((mesh.verts[v].s, mesh.verts[v].t), (5.0, 3.0));
}

#[test]
fn sweep_visits_equal_heights_right_to_left() {
    let mut mesh = Mesh::new();
    let e = mesh.make_edge().unwrap();
    let (left, right) = (mesh.org(e), mesh.dst(e));
    mesh.verts[left].coords = [0.0, 1.0, 0.0];
    mesh.verts[right].coords = [2.0, 1.0, 0.0];
    project_polygon(&mut mesh, [0.0, 0.0, 1.0]);
    assert!(crate::geom::vert_leq(mesh.st(right), mesh.st(left)));
    assert!(!crate::geom::vert_leq(mesh.st(left), mesh.st(right)));
}

#[test]
fn computed_normal_orients_contours_positively() {
    for pts in [SQUARE.to_vec(), SQUARE.iter().rev().copied().collect()] {
        let mut tess: GluTesselator<u32> = GluTesselator::new();
        tess.begin_polygon(());
        contour(&mut tess, &pts, 0);
        let mut mesh = tess.mesh.take().unwrap();
        project_polygon(&mut mesh, [0.0; 3]);

        let e = tess.last_edge;
        let mut area = 0.0;
        let mut cur = e;
        loop {
            let (o, d) = (mesh.st(mesh.org(cur)), mesh.st(mesh.dst(cur)));
            area += (o.s - d.s) * (o.t + d.t);
            cur = mesh.lnext(cur);
            if cur == e {
                break;
            }
        }
        assert!(area > 0.0);
    }
}

#[test]
fn compute_normal_handles_degenerate_input() {
    let mut mesh = Mesh::new();
    assert_eq!(compute_normal(&mesh), [0.0, 0.0, 1.0]);

    // Collinear points along x: any normal perpendicular to x will do.
    let mut e = mesh.make_edge().unwrap();
    mesh.splice(e, e ^ 1).unwrap();
    for x in [0.0, 1.0, 2.0] {
        let v = mesh.org(e);
        mesh.verts[v].coords = [x, 0.0, 0.0];
        mesh.split_edge(e).unwrap();
        e = mesh.lnext(e);
    }
    let n = compute_normal(&mesh);
    assert_eq!(n[0], 0.0);
    assert_eq!(n.iter().filter(|c| **c == 1.0).count(), 1);
}
