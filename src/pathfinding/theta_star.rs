//! Theta*: any-angle A* with line-of-sight parent inheritance.
//!
//! Identical to A* except for the relaxation. When the expanding vertex has
//! a parent and the straight segment from that parent to the neighbor
//! clears every known obstacle (inflated by the buffer radius), the
//! neighbor inherits the grandparent directly, so paths cut corners
//! instead of hugging the grid.

use log::trace;

use crate::core::WorldPoint;
use crate::geometry::{line_shape_intersection, ObstacleMap};
use crate::grid::{Graph, NodeId};

use super::astar::AStarCost;
use super::node::SearchNode;
use super::search::{CostContext, CostPolicy, SearchCore, DEFAULT_MAX_ITERATIONS};

struct ThetaStarCost<'a> {
    map: &'a ObstacleMap,
    buffer_radius: f32,
}

impl ThetaStarCost<'_> {
    /// True when the segment `a`-`b` clears every known obstacle.
    fn line_of_sight(&self, a: WorldPoint, b: WorldPoint) -> bool {
        !self
            .map
            .obstacles
            .iter()
            .any(|poly| line_shape_intersection(a, b, poly, self.buffer_radius))
    }
}

impl CostPolicy for ThetaStarCost<'_> {
    fn compute_cost(&self, ctx: &CostContext<'_>, via: &SearchNode, neighbor: &mut SearchNode) {
        if let Some(pid) = via.parent {
            let parent_point = ctx.graph.node(pid).point;
            let neighbor_point = ctx.graph.node(neighbor.id).point;

            if self.line_of_sight(parent_point, neighbor_point) {
                if let Some(parent) = ctx.record(pid) {
                    // Line of sight: relax straight from the grandparent and
                    // skip the grid-constrained alternative entirely.
                    let (f, g, h) = ctx.f(parent, neighbor.id);
                    if f < neighbor.key.k1 {
                        neighbor.g = g;
                        neighbor.h = h;
                        neighbor.calc_key(0.0);
                        neighbor.parent = Some(pid);
                    }
                    return;
                }
            }
        }

        AStarCost.compute_cost(ctx, via, neighbor);
    }
}

/// Any-angle planner over a borrowed graph and a known obstacle map.
pub struct ThetaStarPlanner<'g> {
    core: SearchCore<'g>,
    map: ObstacleMap,
    buffer_radius: f32,
    max_iterations: usize,
}

impl<'g> ThetaStarPlanner<'g> {
    /// Create a planner over a prebuilt graph and the obstacle polygons its
    /// line-of-sight checks run against.
    pub fn new(graph: &'g Graph, map: ObstacleMap, buffer_radius: f32) -> Self {
        Self {
            core: SearchCore::new(graph),
            map,
            buffer_radius,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Cap the number of expansions before the search gives up.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Search for a path between two graph nodes. Returns whether one was
    /// found.
    pub fn compute_shortest_path(&mut self, start: NodeId, goal: NodeId) -> bool {
        trace!("[ThetaStar] compute_shortest_path: start={start} goal={goal}");
        let policy = ThetaStarCost {
            map: &self.map,
            buffer_radius: self.buffer_radius,
        };
        self.core
            .run(start, goal, &policy, self.max_iterations, "ThetaStar")
    }

    /// Waypoints of the last found path, goal first. Empty if the last
    /// search failed.
    pub fn path(&self) -> &[WorldPoint] {
        self.core.path()
    }

    /// Diagnostic trace of the vertices expanded by the last search.
    pub fn expanded_nodes(&self) -> &[WorldPoint] {
        self.core.expanded_nodes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::OccupancyGrid;
    use crate::pathfinding::AStarPlanner;

    fn path_cost(path: &[WorldPoint]) -> f32 {
        path.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<WorldPoint> {
        vec![
            WorldPoint::new(x0, y0),
            WorldPoint::new(x1, y0),
            WorldPoint::new(x1, y1),
            WorldPoint::new(x0, y1),
        ]
    }

    #[test]
    fn test_open_map_goes_straight() {
        let grid = OccupancyGrid::new(10, 10, 1.0, WorldPoint::ZERO);
        let graph = Graph::lattice(&grid);
        let map = ObstacleMap::new(vec![], [0.0, 10.0], [0.0, 10.0]);

        let mut planner = ThetaStarPlanner::new(&graph, map, 0.0);
        assert!(planner.compute_shortest_path(0, 99));

        // With nothing in the way every vertex sees the start: the path
        // collapses to the two endpoints.
        assert_eq!(planner.path().len(), 2);
        let direct = graph.node(0).point.distance(&graph.node(99).point);
        assert!((path_cost(planner.path()) - direct).abs() < 1e-4);
    }

    #[test]
    fn test_cuts_corner_around_obstacle() {
        // One rectangular obstacle in the middle of a 10x10 map
        let obstacle = square(3.0, 3.0, 7.0, 7.0);
        let grid =
            OccupancyGrid::from_polygons(&[obstacle.clone()], [0.0, 10.0], [0.0, 10.0], 1.0, 0.0)
                .unwrap();
        let graph = Graph::lattice_free(&grid);
        let map = ObstacleMap::new(vec![obstacle], [0.0, 10.0], [0.0, 10.0]);

        let mut theta = ThetaStarPlanner::new(&graph, map, 0.0);
        assert!(theta.compute_shortest_path(0, 99));

        // Endpoints plus at most two obstacle corners
        assert!(theta.path().len() <= 4, "path: {:?}", theta.path());

        // Any-angle dominance over the grid-constrained path
        let mut astar = AStarPlanner::new(&graph);
        assert!(astar.compute_shortest_path(0, 99));
        assert!(path_cost(theta.path()) <= path_cost(astar.path()) + 1e-4);
        assert!(theta.path().len() < astar.path().len());
    }

    #[test]
    fn test_buffer_radius_respected() {
        // A thin wall; with a large buffer the shortcut over its tip is
        // rejected and the path keeps its clearance.
        let wall = square(4.0, 0.0, 5.0, 8.0);
        let map = ObstacleMap::new(vec![wall.clone()], [0.0, 10.0], [0.0, 10.0]);

        let grid = OccupancyGrid::from_polygons(&[wall], [0.0, 10.0], [0.0, 10.0], 1.0, 0.0).unwrap();
        let graph = Graph::lattice_free(&grid);

        let start = 4 * 10; // (0, 4)
        let goal = 4 * 10 + 9; // (9, 4)

        let mut tight = ThetaStarPlanner::new(&graph, map.clone(), 0.0);
        let mut buffered = ThetaStarPlanner::new(&graph, map, 0.6);
        assert!(tight.compute_shortest_path(start, goal));
        assert!(buffered.compute_shortest_path(start, goal));

        // The buffered planner cannot shave as close to the wall tip
        assert!(path_cost(buffered.path()) >= path_cost(tight.path()) - 1e-4);
    }

    #[test]
    fn test_degenerate_start_goal() {
        let grid = OccupancyGrid::new(5, 5, 1.0, WorldPoint::ZERO);
        let graph = Graph::lattice(&grid);
        let map = ObstacleMap::new(vec![], [0.0, 5.0], [0.0, 5.0]);

        let mut planner = ThetaStarPlanner::new(&graph, map, 0.0);
        assert!(planner.compute_shortest_path(12, 12));
        assert_eq!(planner.path().len(), 1);
    }
}
