// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Geometric predicates on sweep positions.
//
// `x` is the sweep coordinate: events are ordered by x, then by y. The
// `trans_*` variants swap the roles of the two axes and are used when the
// y coordinate of an intersection is computed.

/// A 2D position. Input points, mesh vertices and output vertices all use it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    fn transposed(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Lexicographic order: x first, then y.
#[inline]
pub fn vert_leq(u: Point, v: Point) -> bool {
    u.x < v.x || (u.x == v.x && u.y <= v.y)
}

#[inline]
pub fn vert_eq(u: Point, v: Point) -> bool {
    u.x == v.x && u.y == v.y
}

/// Lexicographic order with the axes transposed: y first, then x.
#[inline]
pub fn trans_leq(u: Point, v: Point) -> bool {
    u.y < v.y || (u.y == v.y && u.x <= v.x)
}

/// Given `u <= v <= w` in sweep order, evaluates the y coordinate of the
/// segment `uw` at `v.x` and returns `v.y` minus it: the signed distance from
/// `uw` to `v`. Zero when `uw` is vertical.
///
/// The interpolation starts from the nearer endpoint so the result stays
/// accurate when `v` is close to either end.
pub fn edge_eval(u: Point, v: Point, w: Point) -> f64 {
    let gap_l = v.x - u.x;
    let gap_r = w.x - v.x;
    if gap_l + gap_r > 0.0 {
        if gap_l < gap_r {
            (v.y - u.y) + (u.y - w.y) * (gap_l / (gap_l + gap_r))
        } else {
            (v.y - w.y) + (w.y - u.y) * (gap_r / (gap_l + gap_r))
        }
    } else {
        0.0
    }
}

/// Same sign as [`edge_eval`] without the division.
pub fn edge_sign(u: Point, v: Point, w: Point) -> f64 {
    let gap_l = v.x - u.x;
    let gap_r = w.x - v.x;
    if gap_l + gap_r > 0.0 {
        (v.y - w.y) * gap_l + (v.y - u.y) * gap_r
    } else {
        0.0
    }
}

/// [`edge_eval`] with the axes transposed.
pub fn trans_eval(u: Point, v: Point, w: Point) -> f64 {
    edge_eval(u.transposed(), v.transposed(), w.transposed())
}

/// [`edge_sign`] with the axes transposed.
pub fn trans_sign(u: Point, v: Point, w: Point) -> f64 {
    edge_sign(u.transposed(), v.transposed(), w.transposed())
}

/// Returns `(b*x + a*y) / (a + b)`, or the midpoint when both weights are
/// zero. Negative weights are clamped to zero, so the result always lies
/// between `x` and `y`.
#[inline]
pub fn real_interpolate(a: f64, x: f64, b: f64, y: f64) -> f64 {
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

/// One coordinate of the intersection of `o1d1` and `o2d2`. `leq` orders the
/// points along the axis being solved, `eval`/`sign` measure distances across
/// it and `coord` reads the solved coordinate.
fn intersect_axis(
    o1: Point,
    d1: Point,
    o2: Point,
    d2: Point,
    leq: fn(Point, Point) -> bool,
    eval: fn(Point, Point, Point) -> f64,
    sign: fn(Point, Point, Point) -> f64,
    coord: fn(Point) -> f64,
) -> f64 {
    let (mut a, mut b, mut c, mut d) = (o1, d1, o2, d2);
    if !leq(a, b) {
        std::mem::swap(&mut a, &mut b);
    }
    if !leq(c, d) {
        std::mem::swap(&mut c, &mut d);
    }
    if !leq(a, c) {
        std::mem::swap(&mut a, &mut c);
        std::mem::swap(&mut b, &mut d);
    }

    if !leq(c, b) {
        // No overlap along this axis: split the gap.
        coord(c) / 2.0 + coord(b) / 2.0
    } else if leq(b, d) {
        // Interpolate between c and b.
        let mut z1 = eval(a, c, b);
        let mut z2 = eval(c, b, d);
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        real_interpolate(z1, coord(c), z2, coord(b))
    } else {
        // cd lies inside ab along this axis.
        let mut z1 = sign(a, c, b);
        let mut z2 = -sign(a, d, b);
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        real_interpolate(z1, coord(c), z2, coord(d))
    }
}

/// Intersection of segments `o1d1` and `o2d2`.
///
/// Each coordinate is interpolated between the middle two of the four
/// endpoints along that axis, so the result always lies inside the bounding
/// box shared by both segments, even when they are nearly parallel.
pub fn edge_intersect(o1: Point, d1: Point, o2: Point, d2: Point) -> Point {
    let x = intersect_axis(o1, d1, o2, d2, vert_leq, edge_eval, edge_sign, |p| p.x);
    let y = intersect_axis(o1, d1, o2, d2, trans_leq, trans_eval, trans_sign, |p| p.y);
    Point { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn vert_leq_basic() {
        assert!(vert_leq(p(0.0, 0.0), p(1.0, 0.0)));
        assert!(vert_leq(p(0.0, 0.0), p(0.0, 1.0)));
        assert!(vert_leq(p(0.0, 0.0), p(0.0, 0.0)));
        assert!(!vert_leq(p(1.0, 0.0), p(0.0, 0.0)));
    }

    #[test]
    fn trans_leq_basic() {
        assert!(trans_leq(p(0.0, 0.0), p(0.0, 1.0)));
        assert!(trans_leq(p(0.0, 0.0), p(1.0, 0.0)));
        assert!(!trans_leq(p(0.0, 1.0), p(0.0, 0.0)));
    }

    #[test]
    fn edge_eval_above_segment() {
        // uw runs along y = 0, v sits one unit above its midpoint.
        let r = edge_eval(p(0.0, 0.0), p(0.5, 1.0), p(1.0, 0.0));
        assert!((r - 1.0).abs() < 1e-12, "got {}", r);
    }

    #[test]
    fn edge_eval_vertical_returns_zero() {
        assert_eq!(edge_eval(p(0.0, 0.0), p(0.0, 0.5), p(0.0, 1.0)), 0.0);
        assert_eq!(edge_sign(p(0.0, 0.0), p(0.0, 0.5), p(0.0, 1.0)), 0.0);
    }

    #[test]
    fn edge_sign_matches_eval_sign() {
        let cases = [
            (p(0.0, 0.0), p(1.0, 2.0), p(3.0, 1.0)),
            (p(0.0, 0.0), p(1.0, -2.0), p(3.0, 1.0)),
            (p(-2.0, 5.0), p(0.0, 1.0), p(0.5, -1.0)),
        ];
        for (u, v, w) in cases {
            let e = edge_eval(u, v, w);
            let s = edge_sign(u, v, w);
            assert_eq!(e > 0.0, s > 0.0, "eval {} sign {}", e, s);
            assert_eq!(e < 0.0, s < 0.0, "eval {} sign {}", e, s);
        }
    }

    #[test]
    fn trans_variants_swap_axes() {
        let (u, v, w) = (p(0.0, 0.0), p(1.0, 0.5), p(0.0, 1.0));
        let r = trans_eval(u, v, w);
        assert!((r - 1.0).abs() < 1e-12, "got {}", r);
        assert!(trans_sign(u, v, w) > 0.0);
    }

    #[test]
    fn point_conversions() {
        assert_eq!(Point::from((1.5, -2.0)), Point::new(1.5, -2.0));
        assert_eq!(Point::from([3.0, 4.0]), Point::new(3.0, 4.0));
    }

    #[test]
    fn real_interpolate_midpoint() {
        assert_eq!(real_interpolate(0.0, 0.0, 0.0, 1.0), 0.5);
    }

    #[test]
    fn real_interpolate_weighted() {
        assert!((real_interpolate(1.0, 0.0, 1.0, 2.0) - 1.0).abs() < 1e-12);
        // The larger weight on x keeps the result closer to x.
        assert!((real_interpolate(1.0, 0.0, 3.0, 4.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn real_interpolate_clamps_negative_weights() {
        let r = real_interpolate(-5.0, 2.0, 1.0, 8.0);
        assert_eq!(r, 2.0);
    }

    #[test]
    fn edge_intersect_crossing() {
        let i = edge_intersect(p(0.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(1.0, 0.0));
        assert!((i.x - 0.5).abs() < 1e-12, "x={}", i.x);
        assert!((i.y - 0.5).abs() < 1e-12, "y={}", i.y);
    }

    #[test]
    fn edge_intersect_off_center() {
        // y = x and y = 3 - 2x cross at (1, 1).
        let i = edge_intersect(p(0.0, 0.0), p(2.0, 2.0), p(0.0, 3.0), p(1.5, 0.0));
        assert!((i.x - 1.0).abs() < 1e-12, "x={}", i.x);
        assert!((i.y - 1.0).abs() < 1e-12, "y={}", i.y);
    }

    #[test]
    fn edge_intersect_stays_in_shared_box() {
        // Nearly parallel segments.
        let i = edge_intersect(
            p(0.0, 0.0),
            p(10.0, 1.0),
            p(0.0, 1e-9),
            p(10.0, 1.0 - 1e-9),
        );
        assert!((0.0..=10.0).contains(&i.x), "x={}", i.x);
        assert!((0.0..=1.0).contains(&i.y), "y={}", i.y);
    }
}
