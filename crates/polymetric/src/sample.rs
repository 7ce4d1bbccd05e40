use geo::{Coord, LineString, MultiPolygon};

/// Maximum number of ring vertices handed to the hull calculator.
pub const DEFAULT_SAMPLE_CAP: usize = 500;

/// Pick the ring that stands in for the whole shape when building its hull.
///
/// This is the exterior ring of the constituent polygon with the most
/// vertices; ties go to the earlier polygon. Every other ring, including all
/// interior holes, is left out.
pub fn hull_ring(shape: &MultiPolygon<f64>) -> Option<&LineString<f64>> {
    let mut largest: Option<&LineString<f64>> = None;
    for polygon in &shape.0 {
        let ring = polygon.exterior();
        match largest {
            Some(best) if ring.0.len() <= best.0.len() => {}
            _ => largest = Some(ring),
        }
    }
    largest
}

/// Downsample `ring` to at most `cap` points by keeping every Nth vertex,
/// with `N = ceil(len / cap)`. Rings at or below the cap are returned whole.
pub fn sample_ring(ring: &LineString<f64>, cap: usize) -> Vec<Coord<f64>> {
    let len = ring.0.len();
    if cap == 0 || len <= cap { return ring.0.clone() }

    let step = len.div_ceil(cap);
    ring.0.iter().step_by(step).copied().collect()
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};

    use super::*;

    fn ring_of(n: usize) -> LineString<f64> {
        (0..n).map(|i| Coord { x: i as f64, y: (i % 7) as f64 }).collect()
    }

    #[test]
    fn small_ring_is_untouched() {
        let ring = ring_of(120);
        assert_eq!(sample_ring(&ring, DEFAULT_SAMPLE_CAP), ring.0);
    }

    #[test]
    fn large_ring_is_capped() {
        let ring = ring_of(1_234);
        let sampled = sample_ring(&ring, DEFAULT_SAMPLE_CAP);
        // ceil(1234 / 500) = 3 -> indices 0, 3, ..., 1233
        assert_eq!(sampled.len(), 412);
        assert!(sampled.len() <= DEFAULT_SAMPLE_CAP);
        assert_eq!(sampled[0], ring.0[0]);
        assert_eq!(sampled[1], ring.0[3]);
    }

    #[test]
    fn ring_just_over_cap_takes_every_other() {
        let ring = ring_of(501);
        let sampled = sample_ring(&ring, 500);
        assert_eq!(sampled.len(), 251);
    }

    #[test]
    fn largest_exterior_wins() {
        let small = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
        let large = polygon![
            (x: 10.0, y: 10.0), (x: 12.0, y: 10.0), (x: 12.0, y: 12.0), (x: 11.0, y: 13.0), (x: 10.0, y: 12.0)
        ];
        let shape = MultiPolygon(vec![small, large.clone()]);
        assert_eq!(hull_ring(&shape), Some(large.exterior()));
    }

    #[test]
    fn ties_keep_first_polygon() {
        let a = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
        let b = polygon![(x: 5.0, y: 5.0), (x: 6.0, y: 5.0), (x: 5.0, y: 6.0)];
        let shape = MultiPolygon(vec![a.clone(), b]);
        assert_eq!(hull_ring(&shape), Some(a.exterior()));
    }

    #[test]
    fn empty_shape_has_no_ring() {
        assert!(hull_ring(&MultiPolygon::<f64>(vec![])).is_none());
    }
}
