//! D* Lite: incremental replanning anchored at a moving robot.
//!
//! Structurally this is Lifelong Planning A* run backwards: the search
//! source (pinned lookahead of zero) is the physical goal, and the
//! heuristic anchor is the robot's cell. As the robot advances, the anchor
//! shifts and the accumulated `km` offset keeps every stale queue key a
//! lower bound, so the queue survives the move without a rebuild.

use log::trace;

use crate::core::{GridCoord, WorldPoint};
use crate::grid::{Graph, OccupancyGrid};

use super::lpa_star::LpaStarPlanner;

/// Incremental planner for a robot moving through an evolving grid.
///
/// Call order per step: [`Self::update_robot_loc`] when the robot has
/// moved, [`Self::map_change`] with fresh sensor readings, then
/// [`Self::compute_shortest_path`] to repair the plan.
pub struct DStarLitePlanner<'g> {
    inner: LpaStarPlanner<'g>,
}

impl<'g> DStarLitePlanner<'g> {
    /// Create a planner for a robot at `start_cell` heading for
    /// `goal_cell`.
    pub fn new(
        graph: &'g Graph,
        grid: OccupancyGrid,
        start_cell: GridCoord,
        goal_cell: GridCoord,
    ) -> Self {
        // Roles swapped relative to LPA*: the search grows out of the goal,
        // and the moving anchor is the robot.
        Self {
            inner: LpaStarPlanner::new(graph, grid, goal_cell, start_cell),
        }
    }

    /// Repair the plan from the robot's current cell. Returns whether a
    /// path exists under the current occupancy.
    pub fn compute_shortest_path(&mut self) -> bool {
        self.inner.compute_shortest_path()
    }

    /// Feed a batch of occupancy readings; see
    /// [`LpaStarPlanner::map_change`].
    pub fn map_change(&mut self, updates: &[(GridCoord, i8)]) -> bool {
        self.inner.map_change(updates)
    }

    /// Tell the planner the robot has moved.
    ///
    /// Accumulates the heuristic drift between the old and new anchor into
    /// `km`; queued keys computed before the move stay valid lower bounds
    /// and are reconciled lazily as they surface.
    pub fn update_robot_loc(&mut self, new_cell: GridCoord) {
        self.inner.shift_anchor(new_cell);
        trace!(
            "[DStarLite] robot at ({}, {}), km={:.3}",
            new_cell.x,
            new_cell.y,
            self.inner.km()
        );
    }

    /// Accumulated key offset from anchor moves. Non-decreasing.
    pub fn km(&self) -> f32 {
        self.inner.km()
    }

    /// The occupancy grid the planner costs edges against.
    pub fn grid(&self) -> &OccupancyGrid {
        self.inner.grid()
    }

    /// Waypoints of the last found path, robot first, goal last. Empty if
    /// the last search failed.
    pub fn path(&self) -> &[WorldPoint] {
        self.inner.path()
    }

    /// Vertices touched by consistency updates during the last search.
    pub fn expanded_nodes(&self) -> &[WorldPoint] {
        self.inner.expanded_nodes()
    }
}

impl std::fmt::Debug for DStarLitePlanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DStarLitePlanner")
            .field("km", &self.km())
            .finish()
    }
}
