//! Convex-polygon collision predicates.
//!
//! Supports the any-angle planner's line-of-sight checks: a candidate
//! shortcut is rejected when the segment between the two waypoints passes
//! through, or within a buffer radius of, any known obstacle polygon.
//!
//! Polygons are convex, with vertices listed in order (either winding).

use crate::core::WorldPoint;

/// A convex obstacle polygon (ordered vertices).
pub type Polygon = Vec<WorldPoint>;

/// The known map an any-angle planner checks line of sight against.
#[derive(Clone, Debug, Default)]
pub struct ObstacleMap {
    /// Convex obstacle polygons.
    pub obstacles: Vec<Polygon>,
    /// Map extent `[min, max]` along x, in meters.
    pub x_bounds: [f32; 2],
    /// Map extent `[min, max]` along y, in meters.
    pub y_bounds: [f32; 2],
}

impl ObstacleMap {
    /// Create a map from obstacle polygons and rectangular bounds.
    pub fn new(obstacles: Vec<Polygon>, x_bounds: [f32; 2], y_bounds: [f32; 2]) -> Self {
        Self {
            obstacles,
            x_bounds,
            y_bounds,
        }
    }
}

/// Shortest distance from `point` to the segment `a`-`b`.
///
/// Projects the point onto the segment's supporting line and clamps the
/// projection parameter to the segment.
pub fn point_segment_distance(point: WorldPoint, a: WorldPoint, b: WorldPoint) -> f32 {
    let d = b - a;
    let len_sq = d.dot(&d);

    if len_sq < 1e-12 {
        // Segment degenerates to a point
        return point.distance(&a);
    }

    let t = ((point - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    let proj = WorldPoint::new(a.x + t * d.x, a.y + t * d.y);
    point.distance(&proj)
}

/// Sign of the turn p -> q -> r: positive for counter-clockwise, negative
/// for clockwise, zero for collinear (within float noise).
#[inline]
fn orientation(p: WorldPoint, q: WorldPoint, r: WorldPoint) -> f32 {
    (q - p).cross(&(r - p))
}

/// True if `q` lies on the axis-aligned bounding box of segment `p`-`r`.
#[inline]
fn on_segment_bbox(p: WorldPoint, q: WorldPoint, r: WorldPoint) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// True if segments `p1`-`p2` and `q1`-`q2` intersect (touching counts).
pub fn segments_intersect(p1: WorldPoint, p2: WorldPoint, q1: WorldPoint, q2: WorldPoint) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if o1 * o2 < 0.0 && o3 * o4 < 0.0 {
        return true;
    }

    // Collinear touching cases
    (o1 == 0.0 && on_segment_bbox(p1, q1, p2))
        || (o2 == 0.0 && on_segment_bbox(p1, q2, p2))
        || (o3 == 0.0 && on_segment_bbox(q1, p1, q2))
        || (o4 == 0.0 && on_segment_bbox(q1, p2, q2))
}

/// Shortest distance between two segments; zero when they intersect.
pub fn segment_segment_distance(
    p1: WorldPoint,
    p2: WorldPoint,
    q1: WorldPoint,
    q2: WorldPoint,
) -> f32 {
    if segments_intersect(p1, p2, q1, q2) {
        return 0.0;
    }

    point_segment_distance(p1, q1, q2)
        .min(point_segment_distance(p2, q1, q2))
        .min(point_segment_distance(q1, p1, p2))
        .min(point_segment_distance(q2, p1, p2))
}

/// True if `point` is inside the convex polygon or within `buffer` of its
/// boundary.
pub fn point_in_convex_polygon(point: WorldPoint, polygon: &[WorldPoint], buffer: f32) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut pos = 0usize;
    let mut neg = 0usize;
    let mut min_dist = f32::MAX;

    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];

        let side = orientation(a, b, point);
        if side > 0.0 {
            pos += 1;
        } else if side < 0.0 {
            neg += 1;
        }

        min_dist = min_dist.min(point_segment_distance(point, a, b));
    }

    // All edges on one side (or exactly on an edge) means containment; the
    // winding direction of the input does not matter.
    if pos == 0 || neg == 0 {
        return true;
    }

    min_dist <= buffer
}

/// True if the segment `a`-`b` passes through the polygon or within
/// `buffer` of it.
///
/// Three ways to collide: crossing an edge, starting or ending inside, or
/// skimming the inflated boundary.
pub fn line_shape_intersection(
    a: WorldPoint,
    b: WorldPoint,
    polygon: &[WorldPoint],
    buffer: f32,
) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    if point_in_convex_polygon(a, polygon, buffer) || point_in_convex_polygon(b, polygon, buffer) {
        return true;
    }

    for i in 0..n {
        let v1 = polygon[i];
        let v2 = polygon[(i + 1) % n];

        if segment_segment_distance(a, b, v1, v2) <= buffer {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        vec![
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(1.0, 0.0),
            WorldPoint::new(1.0, 1.0),
            WorldPoint::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_point_segment_distance() {
        let a = WorldPoint::new(0.0, 0.0);
        let b = WorldPoint::new(2.0, 0.0);

        // Perpendicular foot inside the segment
        assert!((point_segment_distance(WorldPoint::new(1.0, 1.0), a, b) - 1.0).abs() < 1e-6);
        // Beyond an endpoint
        assert!((point_segment_distance(WorldPoint::new(3.0, 0.0), a, b) - 1.0).abs() < 1e-6);
        // Degenerate segment
        assert!((point_segment_distance(WorldPoint::new(1.0, 0.0), a, a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_segments_intersect() {
        let o = WorldPoint::new(0.0, 0.0);
        assert!(segments_intersect(
            o,
            WorldPoint::new(2.0, 2.0),
            WorldPoint::new(0.0, 2.0),
            WorldPoint::new(2.0, 0.0),
        ));
        assert!(!segments_intersect(
            o,
            WorldPoint::new(1.0, 0.0),
            WorldPoint::new(0.0, 1.0),
            WorldPoint::new(1.0, 1.0),
        ));
        // Shared endpoint counts as touching
        assert!(segments_intersect(
            o,
            WorldPoint::new(1.0, 0.0),
            WorldPoint::new(1.0, 0.0),
            WorldPoint::new(2.0, 1.0),
        ));
    }

    #[test]
    fn test_point_in_convex_polygon() {
        let sq = unit_square();
        assert!(point_in_convex_polygon(WorldPoint::new(0.5, 0.5), &sq, 0.0));
        assert!(!point_in_convex_polygon(WorldPoint::new(1.5, 0.5), &sq, 0.0));
        // Inside the buffer zone only
        assert!(point_in_convex_polygon(WorldPoint::new(1.2, 0.5), &sq, 0.3));
        assert!(!point_in_convex_polygon(WorldPoint::new(1.2, 0.5), &sq, 0.1));
    }

    #[test]
    fn test_polygon_winding_does_not_matter() {
        let mut sq = unit_square();
        sq.reverse();
        assert!(point_in_convex_polygon(WorldPoint::new(0.5, 0.5), &sq, 0.0));
        assert!(!point_in_convex_polygon(WorldPoint::new(2.0, 2.0), &sq, 0.0));
    }

    #[test]
    fn test_line_shape_intersection_crossing() {
        let sq = unit_square();
        // Straight through the square
        assert!(line_shape_intersection(
            WorldPoint::new(-1.0, 0.5),
            WorldPoint::new(2.0, 0.5),
            &sq,
            0.0,
        ));
        // Clear miss
        assert!(!line_shape_intersection(
            WorldPoint::new(-1.0, 2.0),
            WorldPoint::new(2.0, 2.0),
            &sq,
            0.0,
        ));
    }

    #[test]
    fn test_line_shape_intersection_buffer() {
        let sq = unit_square();
        // Parallel pass 0.2m above the top edge: clear at zero buffer,
        // blocked once the obstacle is inflated past that clearance.
        let a = WorldPoint::new(-1.0, 1.2);
        let b = WorldPoint::new(2.0, 1.2);
        assert!(!line_shape_intersection(a, b, &sq, 0.0));
        assert!(!line_shape_intersection(a, b, &sq, 0.1));
        assert!(line_shape_intersection(a, b, &sq, 0.25));
    }

    #[test]
    fn test_line_shape_intersection_contained() {
        let sq = unit_square();
        // Entirely inside the polygon still collides
        assert!(line_shape_intersection(
            WorldPoint::new(0.3, 0.5),
            WorldPoint::new(0.7, 0.5),
            &sq,
            0.0,
        ));
    }
}
