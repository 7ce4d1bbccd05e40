use std::cmp::Ordering;

use geo::{Coord, LineString, Polygon};

/// Z component of `(a - o) x (b - o)`; positive for a counter-clockwise turn.
#[inline]
fn cross(o: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Lexicographic order on (x, then y).
#[inline]
fn lex(a: &Coord<f64>, b: &Coord<f64>) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

/// Push `point` onto a half hull, first popping every vertex that would not
/// make a strict left turn.
#[inline]
fn push_left_turn(chain: &mut Vec<Coord<f64>>, point: Coord<f64>) {
    while chain.len() >= 2 && cross(chain[chain.len() - 2], chain[chain.len() - 1], point) <= 0.0 {
        chain.pop();
    }
    chain.push(point);
}

/// Monotone-chain convex hull (Andrew's variant of the Graham scan).
///
/// Returns the hull vertices in counter-clockwise order without a closing
/// duplicate. Inputs of three points or fewer are their own hull and come
/// back unchanged. If fewer than three distinct points remain after removing
/// duplicates, the hull is empty.
pub fn convex_hull(points: &[Coord<f64>]) -> Vec<Coord<f64>> {
    if points.len() <= 3 { return points.to_vec() }

    let mut sorted = points.to_vec();
    sorted.sort_by(lex);
    sorted.dedup();
    if sorted.len() < 3 { return Vec::new() }

    let mut lower = Vec::with_capacity(sorted.len());
    for &point in &sorted {
        push_left_turn(&mut lower, point);
    }

    let mut upper = Vec::with_capacity(sorted.len());
    for &point in sorted.iter().rev() {
        push_left_turn(&mut upper, point);
    }

    // The last point of each half is the first point of the other.
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Close a list of hull vertices into a polygon by repeating the first
/// vertex. Returns `None` for fewer than three vertices.
pub fn close_ring(vertices: &[Coord<f64>]) -> Option<Polygon<f64>> {
    if vertices.len() < 3 { return None }

    let mut ring = Vec::with_capacity(vertices.len() + 1);
    ring.extend_from_slice(vertices);
    ring.push(vertices[0]);
    Some(Polygon::new(LineString(ring), vec![]))
}
