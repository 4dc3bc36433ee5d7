// Copyright 2025 Lars Brubaker
// Shared test utilities for sweep-tess tests.

#![allow(dead_code)]

use sweep_tess::{Point, TessOption, Tessellation, Tessellator, TessellatorOptions, WindingRule};

pub const EPS: f64 = 1e-9;

pub fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&c| Point::from(c)).collect()
}

/// Axis-aligned rectangle, counter-clockwise.
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
    pts(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
}

/// Same rectangle, clockwise.
pub fn rect_cw(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
    let mut r = rect(x0, y0, x1, y1);
    r.reverse();
    r
}

/// Regular n-gon, counter-clockwise.
pub fn regular_polygon(n: usize, cx: f64, cy: f64, r: f64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            Point::new(cx + r * a.cos(), cy + r * a.sin())
        })
        .collect()
}

/// Signed area of a closed polygon (shoelace).
pub fn polygon_signed_area(poly: &[Point]) -> f64 {
    let n = poly.len();
    let mut area = 0.0;
    for i in 0..n {
        let (a, b) = (poly[i], poly[(i + 1) % n]);
        area += a.x * b.y - b.x * a.y;
    }
    area * 0.5
}

/// Signed area of a triangle; positive when counter-clockwise.
pub fn triangle_signed_area(t: [Point; 3]) -> f64 {
    let [a, b, c] = t;
    0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y))
}

/// Tessellate `contours` with `rule`, panicking on failure.
pub fn tessellate_contours(contours: &[Vec<Point>], rule: WindingRule) -> Tessellation {
    let mut tess = Tessellator::with_options(TessellatorOptions::default().with_winding_rule(rule));
    for c in contours {
        tess.add_contour(c);
    }
    tess.tessellate()
        .unwrap_or_else(|e| panic!("tessellation failed for {:?}: {}", rule, e));
    let out = tess.into_output();
    verify_valid_output(&out);
    out
}

/// Like `tessellate_contours`, flipping the orientation of the contours at
/// the indices in `reversed`.
pub fn tessellate_with_reversed(
    contours: &[Vec<Point>],
    reversed: &[usize],
    rule: WindingRule,
) -> Tessellation {
    let mut tess = Tessellator::with_options(TessellatorOptions::default().with_winding_rule(rule));
    for (i, c) in contours.iter().enumerate() {
        tess.set_option(TessOption::ReverseContours, reversed.contains(&i));
        tess.add_contour(c);
    }
    tess.tessellate()
        .unwrap_or_else(|e| panic!("tessellation failed for {:?}: {}", rule, e));
    let out = tess.into_output();
    verify_valid_output(&out);
    out
}

/// Indices in range, finite vertices, one source per vertex, and no
/// clockwise triangle.
pub fn verify_valid_output(out: &Tessellation) {
    assert_eq!(out.vertices.len(), out.vertex_sources.len());
    for (i, v) in out.vertices.iter().enumerate() {
        assert!(
            v.x.is_finite() && v.y.is_finite(),
            "vertex {} = {:?} is not finite",
            i,
            v
        );
    }
    for (i, tri) in out.triangles.iter().enumerate() {
        for &idx in tri {
            assert!(
                (idx as usize) < out.vertices.len(),
                "triangle {} index {} out of range (vertex count {})",
                i,
                idx,
                out.vertices.len()
            );
        }
        let area = triangle_signed_area(out.triangle(i));
        assert!(area >= -EPS, "triangle {} is clockwise (area {})", i, area);
    }
}

pub fn assert_area_approx(actual: f64, expected: f64, label: &str) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() < tolerance,
        "{}: expected area ~{}, got {} (diff={})",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}
