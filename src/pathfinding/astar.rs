//! A* search over a prebuilt graph.

use log::trace;

use crate::core::WorldPoint;
use crate::grid::{Graph, NodeId};

use super::node::SearchNode;
use super::search::{CostContext, CostPolicy, SearchCore, DEFAULT_MAX_ITERATIONS};

/// Classic A* relaxation: the only candidate path to a neighbor runs
/// through the vertex being expanded.
pub(crate) struct AStarCost;

impl CostPolicy for AStarCost {
    fn compute_cost(&self, ctx: &CostContext<'_>, via: &SearchNode, neighbor: &mut SearchNode) {
        let (f, g, h) = ctx.f(via, neighbor.id);
        if f < neighbor.key.k1 {
            neighbor.g = g;
            neighbor.h = h;
            neighbor.calc_key(0.0);
            neighbor.parent = Some(via.id);
        }
    }
}

/// One-shot A* planner over a borrowed graph.
///
/// ```rust
/// use marga::core::WorldPoint;
/// use marga::grid::{Graph, OccupancyGrid};
/// use marga::pathfinding::AStarPlanner;
///
/// let grid = OccupancyGrid::new(3, 3, 1.0, WorldPoint::ZERO);
/// let graph = Graph::lattice(&grid);
/// let mut planner = AStarPlanner::new(&graph);
///
/// assert!(planner.compute_shortest_path(0, 8));
/// assert_eq!(planner.path().len(), 3);
/// ```
pub struct AStarPlanner<'g> {
    core: SearchCore<'g>,
    max_iterations: usize,
}

impl<'g> AStarPlanner<'g> {
    /// Create a planner over a prebuilt graph.
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            core: SearchCore::new(graph),
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
        trace!("[AStar] compute_shortest_path: start={start} goal={goal}");
        self.core
            .run(start, goal, &AStarCost, self.max_iterations, "AStar")
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
