// Copyright 2025 Lars Brubaker
// Seeded random contours checked against an independent strip-area oracle.

mod helpers;

use helpers::verify_valid_output;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sweep_tess::{Point, TessellationError, Tessellator, TessellatorOptions, WindingRule};

type Segment = (Point, Point);

fn cross(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

/// x of the point where two segments cross, if they do. Parallel segments
/// never swap their vertical order, so they report nothing.
fn crossing_x((p, p2): Segment, (q, q2): Segment) -> Option<f64> {
    let (rx, ry) = (p2.x - p.x, p2.y - p.y);
    let (sx, sy) = (q2.x - q.x, q2.y - q.y);
    let d = cross(rx, ry, sx, sy);
    if d == 0.0 {
        return None;
    }
    let (qpx, qpy) = (q.x - p.x, q.y - p.y);
    let t = cross(qpx, qpy, sx, sy) / d;
    let u = cross(qpx, qpy, rx, ry) / d;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(p.x + t * rx)
    } else {
        None
    }
}

/// Area selected by `rule`, computed by cutting the plane into vertical
/// strips with no vertex or crossing inside. Within a strip the edges are
/// ordered bottom to top; an edge heading right raises the winding number
/// above it by one, an edge heading left lowers it.
fn strip_area(contours: &[Vec<Point>], rule: WindingRule) -> f64 {
    let edges: Vec<Segment> = contours
        .iter()
        .flat_map(|c| (0..c.len()).map(move |i| (c[i], c[(i + 1) % c.len()])))
        .collect();

    let mut xs: Vec<f64> = edges.iter().map(|e| e.0.x).collect();
    for i in 0..edges.len() {
        for j in i + 1..edges.len() {
            xs.extend(crossing_x(edges[i], edges[j]));
        }
    }
    xs.sort_by(f64::total_cmp);
    xs.dedup();

    let mut area = 0.0;
    for w in xs.windows(2) {
        let width = w[1] - w[0];
        if width <= 0.0 {
            continue;
        }
        let xm = 0.5 * (w[0] + w[1]);
        let mut hits: Vec<(f64, i32)> = edges
            .iter()
            .filter(|(a, b)| a.x.min(b.x) < xm && xm < a.x.max(b.x))
            .map(|&(a, b)| {
                let y = a.y + (xm - a.x) * (b.y - a.y) / (b.x - a.x);
                (y, if a.x < b.x { 1 } else { -1 })
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0;
        for pair in hits.windows(2) {
            winding += pair[0].1;
            if rule.is_inside(winding) {
                area += (pair[1].0 - pair[0].0) * width;
            }
        }
    }
    area
}

fn random_contours(rng: &mut StdRng, grid: bool) -> Vec<Vec<Point>> {
    let count = rng.gen_range(1..=3);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(3..=7);
            (0..len)
                .map(|_| {
                    if grid {
                        Point::new(rng.gen_range(0..=8) as f64, rng.gen_range(0..=8) as f64)
                    } else {
                        Point::new(rng.gen_range(0.0..8.0), rng.gen_range(0.0..8.0))
                    }
                })
                .collect()
        })
        .collect()
}

/// Tessellated area, or zero when every contour collapsed away.
fn tessellated_area(contours: &[Vec<Point>], rule: WindingRule) -> f64 {
    let mut tess = Tessellator::with_options(TessellatorOptions::default().with_winding_rule(rule));
    for c in contours {
        tess.add_contour(c);
    }
    match tess.tessellate() {
        Ok(()) => {
            let out = tess.into_output();
            verify_valid_output(&out);
            out.area()
        }
        Err(TessellationError::DegenerateTopology { .. }) => 0.0,
        Err(e) => panic!("tessellation failed for {:?}: {}", contours, e),
    }
}

fn check_against_strips(seed: u64, grid: bool, rule: WindingRule) {
    let mut rng = StdRng::seed_from_u64(seed);
    let contours = random_contours(&mut rng, grid);
    let expected = strip_area(&contours, rule);
    let actual = tessellated_area(&contours, rule);
    let tol = 1e-6 * expected.max(1.0);
    assert!(
        (actual - expected).abs() <= tol,
        "seed {} {:?}: area {} vs strips {} for {:?}",
        seed,
        rule,
        actual,
        expected,
        contours
    );
}

#[test]
fn strip_area_of_square_with_hole() {
    let outer = vec![
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(4.0, 4.0),
        Point::new(0.0, 4.0),
    ];
    let hole = vec![
        Point::new(1.0, 1.0),
        Point::new(3.0, 1.0),
        Point::new(3.0, 3.0),
        Point::new(1.0, 3.0),
    ];
    let contours = [outer, hole];
    assert!((strip_area(&contours, WindingRule::Odd) - 12.0).abs() < 1e-12);
    assert!((strip_area(&contours, WindingRule::NonZero) - 16.0).abs() < 1e-12);
    assert!((strip_area(&contours, WindingRule::AbsGeqTwo) - 4.0).abs() < 1e-12);
}

#[test]
fn odd_rule_matches_strips_on_integer_grid() {
    for seed in 0..300 {
        check_against_strips(seed, true, WindingRule::Odd);
    }
}

#[test]
fn odd_rule_matches_strips_on_real_coordinates() {
    for seed in 0..300 {
        check_against_strips(seed, false, WindingRule::Odd);
    }
}

#[test]
fn other_rules_match_strips() {
    for rule in [WindingRule::NonZero, WindingRule::Positive, WindingRule::AbsGeqTwo] {
        for seed in 1000..1150 {
            check_against_strips(seed, true, rule);
        }
    }
}
