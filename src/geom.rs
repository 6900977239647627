// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of GLU libtess geom.c/h
//
// Predicates over projected sweep-plane coordinates. `s` is the sweep-major
// axis, `t` the minor one; events are ordered by s first, then t.

pub type Real = f64;

/// A point in the sweep plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct St {
    pub s: Real,
    pub t: Real,
}

impl St {
    #[inline]
    pub const fn new(s: Real, t: Real) -> Self {
        St { s, t }
    }

    /// The same point with its axes swapped, so an s-axis computation can be
    /// reused for t.
    #[inline]
    pub const fn transposed(self) -> Self {
        St { s: self.t, t: self.s }
    }
}

/// Lexicographic order on (s, t). Equal points compare `<=` both ways.
#[inline]
pub fn vert_leq(u: St, v: St) -> bool {
    u.s < v.s || (u.s == v.s && u.t <= v.t)
}

#[inline]
pub fn vert_eq(u: St, v: St) -> bool {
    u.s == v.s && u.t == v.t
}

/// True when `u` and `v` differ by at most `tolerance` along both axes.
/// A zero tolerance is exact equality.
#[inline]
pub fn vert_close(u: St, v: St, tolerance: Real) -> bool {
    (u.s - v.s).abs() <= tolerance && (u.t - v.t).abs() <= tolerance
}

/// For `u <= v <= w`, evaluates the t-coordinate of edge uw at v.s and
/// returns `v.t - uw(v.s)`: the signed distance from uw to v. Returns zero
/// when uw is vertical. Interpolates from the nearer endpoint for accuracy.
pub fn edge_eval(u: St, v: St, w: St) -> Real {
    debug_assert!(vert_leq(u, v) && vert_leq(v, w));
    let gap_l = v.s - u.s;
    let gap_r = w.s - v.s;
    if gap_l + gap_r <= 0.0 {
        return 0.0;
    }
    if gap_l < gap_r {
        (v.t - u.t) + (u.t - w.t) * (gap_l / (gap_l + gap_r))
    } else {
        (v.t - w.t) + (w.t - u.t) * (gap_r / (gap_l + gap_r))
    }
}

/// Same sign as `edge_eval(u, v, w)` without the division.
pub fn edge_sign(u: St, v: St, w: St) -> Real {
    debug_assert!(vert_leq(u, v) && vert_leq(v, w));
    let gap_l = v.s - u.s;
    let gap_r = w.s - v.s;
    if gap_l + gap_r > 0.0 {
        (v.t - w.t) * gap_l + (v.t - u.t) * gap_r
    } else {
        0.0
    }
}

#[inline]
pub fn vert_l1_dist(u: St, v: St) -> Real {
    (u.s - v.s).abs() + (u.t - v.t).abs()
}

/// Returns `(b*x + a*y) / (a + b)`, or the midpoint when both weights are
/// zero. Negative weights are clamped to zero, so the result always lies
/// between `x` and `y`.
#[inline]
pub fn real_interpolate(a: Real, x: Real, b: Real, y: Real) -> Real {
    let a = a.max(0.0);
    let b = b.max(0.0);
    if a <= b {
        if b == 0.0 {
            x / 2.0 + y / 2.0
        } else {
            x + (y - x) * (a / (a + b))
        }
    } else {
        y + (x - y) * (b / (a + b))
    }
}

/// Intersection of edges (o1, d1) and (o2, d2). The result lies inside the
/// bounding rectangle of the overlap even when the inputs only touch
/// marginally or not at all.
pub fn edge_intersect(o1: St, d1: St, o2: St, d2: St) -> St {
    let s = intersect_major(o1, d1, o2, d2);
    let t = intersect_major(o1.transposed(), d1.transposed(), o2.transposed(), d2.transposed());
    St::new(s, t)
}

/// The s-coordinate half of `edge_intersect`. The t-coordinate is the same
/// computation on transposed inputs.
fn intersect_major(mut o1: St, mut d1: St, mut o2: St, mut d2: St) -> Real {
    if !vert_leq(o1, d1) {
        std::mem::swap(&mut o1, &mut d1);
    }
    if !vert_leq(o2, d2) {
        std::mem::swap(&mut o2, &mut d2);
    }
    if !vert_leq(o1, o2) {
        std::mem::swap(&mut o1, &mut o2);
        std::mem::swap(&mut d1, &mut d2);
    }

    if !vert_leq(o2, d1) {
        // No overlap along s; split the gap.
        return o2.s / 2.0 + d1.s / 2.0;
    }
    if vert_leq(d1, d2) {
        // Interpolate between o2 and d1.
        let (mut z1, mut z2) = (edge_eval(o1, o2, d1), edge_eval(o2, d1, d2));
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        real_interpolate(z1, o2.s, z2, d1.s)
    } else {
        // Interpolate between o2 and d2.
        let (mut z1, mut z2) = (edge_sign(o1, o2, d1), -edge_sign(o1, d2, d1));
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        real_interpolate(z1, o2.s, z2, d2.s)
    }
}
