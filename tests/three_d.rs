// Copyright 2025 Lars Brubaker
// Tests for 3D coordinate input and explicit projection normals.

mod helpers;

use approx::assert_relative_eq;
use glu_tess::winding::{self, triangulate};
use glu_tess::{run, Point, Real, TessOptions, WindingRule, DEFAULT_OPTIONS};

fn opts(rule: WindingRule, normal: Option<[Real; 3]>) -> TessOptions {
    TessOptions {
        winding_rule: rule,
        normal,
        ..DEFAULT_OPTIONS
    }
}

#[test]
fn xy_plane_quad_with_computed_normal() {
    let quad = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
    let out = run(&[quad], &opts(WindingRule::Positive, None)).unwrap();
    let tris = out.triangles();
    assert_eq!(tris.len(), 2);
    assert!(tris.iter().flatten().all(|v| v[2] == 0.0));
}

#[test]
fn xz_plane_quad_with_given_normal() {
    // Lies in y = 0; projecting along y keeps it non-degenerate.
    let quad = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]];
    let out = run(&[quad], &opts(WindingRule::NonZero, Some([0.0, 1.0, 0.0]))).unwrap();
    let tris = out.triangles();
    assert_eq!(tris.len(), 2);
    assert!(tris.iter().flatten().all(|v| v[1] == 0.0));
}

#[test]
fn clockwise_input_is_positive_under_a_computed_normal() {
    let cw = [[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
    let out = run(&[cw], &opts(WindingRule::Positive, None)).unwrap();
    assert_eq!(out.triangles().len(), 2);
}

#[test]
fn negative_z_normal_reverses_winding() {
    let ccw = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
    let up = run(&[ccw], &opts(WindingRule::Positive, Some([0.0, 0.0, 1.0]))).unwrap();
    assert_eq!(up.triangles().len(), 2);

    let down = run(&[ccw], &opts(WindingRule::Positive, Some([0.0, 0.0, -1.0]))).unwrap();
    assert!(down.is_empty());
    let down = run(&[ccw], &opts(WindingRule::Negative, Some([0.0, 0.0, -1.0]))).unwrap();
    assert_eq!(down.triangles().len(), 2);
}

#[test]
fn tilted_square_keeps_its_heights() {
    // Unit square lifted onto the plane z = x + y.
    let square: Vec<Point> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
        .iter()
        .map(|&(x, y)| Point::new_3d(x, y, x + y))
        .collect();
    let tris = triangulate(&square, &[]).unwrap();
    assert_eq!(tris.len(), 2);
    for p in tris.iter().flatten() {
        assert!(p.is_3d());
        assert_relative_eq!(p.z(), p.x + p.y, epsilon = 1e-12);
    }
    let area: Real = tris.iter().map(|t| winding::area(t, None)).sum();
    assert_relative_eq!(area, (3.0 as Real).sqrt(), epsilon = 1e-9);
}

#[test]
fn intersections_interpolate_depth() {
    // A bowtie on the plane z = x; its crossing sits at (1, 1, 1).
    let bowtie = [[0.0, 0.0, 0.0], [2.0, 2.0, 2.0], [2.0, 0.0, 2.0], [0.0, 2.0, 0.0]];
    let out = run(&[bowtie], &opts(WindingRule::NonZero, None)).unwrap();
    let tris = out.triangles();
    assert_eq!(tris.len(), 2);
    let crossing = tris
        .iter()
        .flatten()
        .find(|v| (v[0] - 1.0).abs() < 1e-9 && (v[1] - 1.0).abs() < 1e-9)
        .copied();
    let [_, _, z] = crossing.unwrap();
    assert_relative_eq!(z, 1.0, epsilon = 1e-9);
}

#[test]
fn flat_points_stay_flat() {
    let tris = triangulate(&helpers::rect(0.0, 0.0, 2.0, 2.0), &[]).unwrap();
    assert!(tris.iter().flatten().all(|p| !p.is_3d()));
}
