// Copyright 2025 Lars Brubaker
// Property tests for triangulation and orientation helpers.

mod helpers;

use glu_tess::winding::{self, ensure_ccw, ensure_cw, triangulate};
use glu_tess::{Point, Polygon, Real};
use proptest::prelude::*;
use std::f64::consts::TAU;

/// A star-shaped polygon: one vertex per angular sector, so the outline is
/// simple whatever the radii.
fn star(radii: &[Real], cx: Real, cy: Real) -> Polygon {
    let n = radii.len() as Real;
    radii
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let a = TAU * i as Real / n;
            Point::new(cx + r * a.cos(), cy + r * a.sin())
        })
        .collect()
}

fn close(a: Real, b: Real) -> bool {
    (a - b).abs() <= 1e-7 * a.abs().max(1.0)
}

proptest! {
    #[test]
    fn regular_polygons_fan_out(n in 3usize..48, r in 0.5f64..1000.0, cx in -100.0f64..100.0, cy in -100.0f64..100.0) {
        let poly = star(&vec![r; n], cx, cy);
        let tris = triangulate(&poly, &[]).unwrap();
        prop_assert_eq!(tris.len(), n - 2);
        prop_assert!(close(helpers::total_triangle_area(&tris), winding::area(&poly, None)));
    }

    #[test]
    fn star_polygons_keep_their_area(radii in prop::collection::vec(1.0f64..10.0, 3..40)) {
        let poly = star(&radii, 0.0, 0.0);
        let tris = triangulate(&poly, &[]).unwrap();
        prop_assert!(tris.len() <= radii.len() - 2);
        prop_assert!(close(helpers::total_triangle_area(&tris), winding::area(&poly, None)));
        prop_assert!(tris.iter().all(|t| helpers::triangle_area(t) >= -1e-9));
    }

    #[test]
    fn orientation_helpers_agree_with_area(radii in prop::collection::vec(1.0f64..10.0, 3..20), flip in any::<bool>()) {
        let mut poly = star(&radii, 0.0, 0.0);
        if flip {
            poly.reverse();
        }
        let a = winding::area(&poly, None);

        let mut ccw = poly.clone();
        ensure_ccw(&mut ccw);
        prop_assert!(winding::area(&ccw, None) >= 0.0);
        prop_assert!(close(winding::area(&ccw, None), a.abs()));
        let once = ccw.clone();
        ensure_ccw(&mut ccw);
        prop_assert_eq!(&ccw, &once);

        let mut cw = poly;
        ensure_cw(&mut cw);
        prop_assert!(winding::area(&cw, None) <= 0.0);
        prop_assert!(winding::is_cw(&cw));
    }

    #[test]
    fn union_with_itself_keeps_area(radii in prop::collection::vec(1.0f64..10.0, 3..16)) {
        let poly = star(&radii, 0.0, 0.0);
        let loops = winding::union(&[poly.clone(), poly.clone()]).unwrap();
        prop_assert!(close(helpers::total_loop_area(&loops), winding::area(&poly, None)));
    }
}
