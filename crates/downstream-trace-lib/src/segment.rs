//! Nearest segment resolution along a feature's vertex sequence

use geo::{Coord, Distance, Euclidean, Line, Point};

/// Find the segment `[i, i + 1]` closest to `point`
///
/// Uses point-to-segment distance (not point-to-infinite-line). The lowest
/// index wins ties. Returns `None` when there are fewer than 2 vertices.
pub fn nearest_segment(vertices: &[Coord<f64>], point: Point<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, pair) in vertices.windows(2).enumerate() {
        let distance = Euclidean.distance(&point, &Line::new(pair[0], pair[1]));
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            // NaN distances never become the best candidate
            _ if distance.is_nan() => {}
            _ => best = Some((i, distance)),
        }
    }

    best.map(|(i, _)| i)
}

/// Vertex a trace starts from after clicking near `segment`
///
/// The downstream end of the segment, clamped to the last vertex.
#[inline]
pub fn start_vertex(segment: usize, vertex_count: usize) -> usize {
    (segment + 1).min(vertex_count.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(points: &[(f64, f64)]) -> Vec<Coord<f64>> {
        points.iter().map(|&(x, y)| Coord { x, y }).collect()
    }

    #[test]
    fn test_nearest_segment_basic() {
        let vertices = coords(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (20.0, 10.0)]);

        assert_eq!(nearest_segment(&vertices, Point::new(5.0, 1.0)), Some(0));
        assert_eq!(nearest_segment(&vertices, Point::new(11.0, 5.0)), Some(1));
        assert_eq!(nearest_segment(&vertices, Point::new(15.0, 11.0)), Some(2));
    }

    #[test]
    fn test_segment_not_infinite_line() {
        // Close to the extension of segment 0, but nearest to segment 1 itself
        let vertices = coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 5.0)]);
        assert_eq!(nearest_segment(&vertices, Point::new(3.0, 0.5)), Some(1));
    }

    #[test]
    fn test_tie_prefers_lowest_index() {
        // Clicking exactly on the shared vertex is equidistant to both segments
        let vertices = coords(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(nearest_segment(&vertices, Point::new(1.0, 0.0)), Some(0));
    }

    #[test]
    fn test_too_few_vertices() {
        assert_eq!(nearest_segment(&[], Point::new(0.0, 0.0)), None);
        assert_eq!(nearest_segment(&coords(&[(1.0, 1.0)]), Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_far_point_still_resolves() {
        let vertices = coords(&[(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(nearest_segment(&vertices, Point::new(1.0e9, -1.0e9)), Some(0));
    }

    #[test]
    fn test_start_vertex_clamps() {
        assert_eq!(start_vertex(0, 3), 1);
        assert_eq!(start_vertex(1, 3), 2);
        assert_eq!(start_vertex(5, 3), 2);
        assert_eq!(start_vertex(0, 0), 0);
    }
}
