//! Lifelong Planning A*: incremental replanning under edge-cost changes.
//!
//! Every graph vertex gets a search record up front. Records live in one
//! dense slab; the open queue is an index over record ids, so a vertex is
//! always in exactly one place and residency is a single state tag. The
//! planner reacts to occupancy changes by re-establishing local consistency
//! around the affected cells and only re-expands what those changes
//! actually invalidated.

use log::{debug, trace};

use crate::core::math::{approx_eq, COST_INFINITY};
use crate::core::{GridCoord, WorldPoint};
use crate::grid::{Graph, NodeId, OccupancyGrid};

use super::key::Key;
use super::node::{NodeState, SearchNode};
use super::queue::OpenQueue;

/// Incremental planner over a grid lattice graph and its occupancy data.
///
/// The graph must be the full lattice of the grid ([`Graph::lattice`]):
/// connectivity is static, occupancy enters through edge costs. The planner
/// owns the grid; the only way occupancy changes is [`Self::map_change`],
/// which keeps grid mutation serialized with planning by construction.
pub struct LpaStarPlanner<'g> {
    graph: &'g Graph,
    grid: OccupancyGrid,
    vertices: Vec<SearchNode>,
    open: OpenQueue,
    start_id: NodeId,
    goal_id: NodeId,
    goal_point: WorldPoint,
    km: f32,
    expanded: Vec<WorldPoint>,
    path: Vec<WorldPoint>,
}

impl<'g> LpaStarPlanner<'g> {
    /// Create a planner with the search rooted at `start_cell` and the
    /// heuristic anchored at `goal_cell`.
    ///
    /// Panics if the graph is not the grid's lattice or either cell lies
    /// outside the grid; both are caller bugs.
    pub fn new(
        graph: &'g Graph,
        grid: OccupancyGrid,
        start_cell: GridCoord,
        goal_cell: GridCoord,
    ) -> Self {
        assert_eq!(
            graph.len(),
            grid.width() * grid.height(),
            "graph must be the lattice of the grid"
        );
        let start_id = grid
            .coord_to_index(start_cell)
            .expect("start cell outside the grid");
        let goal_id = grid
            .coord_to_index(goal_cell)
            .expect("goal cell outside the grid");
        let goal_point = graph.node(goal_id).point;

        let mut vertices: Vec<SearchNode> = (0..graph.len()).map(SearchNode::untouched).collect();
        let mut open = OpenQueue::new();

        // Only the start is inconsistent at rest: rhs pinned to zero.
        vertices[start_id].rhs = 0.0;
        vertices[start_id].h = graph.node(start_id).point.distance(&goal_point);
        vertices[start_id].calc_key(0.0);
        vertices[start_id].state = NodeState::Open;
        open.push(start_id, vertices[start_id].key);

        Self {
            graph,
            grid,
            vertices,
            open,
            start_id,
            goal_id,
            goal_point,
            km: 0.0,
            expanded: Vec::new(),
            path: Vec::new(),
        }
    }

    /// The occupancy grid the planner costs edges against.
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Waypoints of the last found path, goal first. Empty if the last
    /// search failed.
    pub fn path(&self) -> &[WorldPoint] {
        &self.path
    }

    /// Vertices touched by consistency updates during the last search.
    pub fn expanded_nodes(&self) -> &[WorldPoint] {
        &self.expanded
    }

    /// Traversal cost of the edge between two adjacent vertices: the
    /// distance between their points when both cells are free, otherwise
    /// saturated.
    fn edge_cost(&self, from: NodeId, to: NodeId) -> f32 {
        let a = self.grid.index_to_coord(from);
        let b = self.grid.index_to_coord(to);
        if self.grid.is_free(a) && self.grid.is_free(b) {
            self.graph
                .node(from)
                .point
                .distance(&self.graph.node(to).point)
        } else {
            COST_INFINITY
        }
    }

    /// Current key of the goal anchor, computed fresh (read-only).
    fn goal_key(&self) -> Key {
        let v = &self.vertices[self.goal_id];
        let h = self
            .graph
            .node(self.goal_id)
            .point
            .distance(&self.goal_point);
        let lookahead = v.g.min(v.rhs);
        Key::new(lookahead + h + self.km, lookahead)
    }

    fn goal_is_consistent(&self) -> bool {
        self.vertices[self.goal_id].is_consistent()
    }

    /// One-step lookahead relaxation: adopt `sp` as `u`'s predecessor when
    /// the route through it beats the current lookahead. Touches only
    /// `u.rhs` and `u.parent`.
    fn relax_from(&self, u: &mut SearchNode, sp: NodeId) {
        let c = self.vertices[sp].g + self.edge_cost(sp, u.id);
        if c < u.rhs {
            u.rhs = c;
            u.parent = Some(sp);
        }
    }

    /// Re-establish consistency bookkeeping for one vertex: recompute its
    /// lookahead from its predecessors, refresh the key, and put it where
    /// it now belongs (queue iff locally inconsistent).
    fn update_vertex(&mut self, uid: NodeId) {
        let graph = self.graph;
        self.expanded.push(graph.node(uid).point);

        let mut u = self.vertices[uid];

        // The start's lookahead is pinned at zero; everything else derives
        // its rhs from the best predecessor.
        if uid != self.start_id {
            u.rhs = COST_INFINITY;
            u.parent = None;
            for &sp in &graph.node(uid).neighbors {
                self.relax_from(&mut u, sp);
            }
        }

        u.h = graph.node(uid).point.distance(&self.goal_point);
        u.calc_key(self.km);

        if u.is_consistent() {
            if u.state == NodeState::Open {
                self.open.remove(uid);
                u.state = NodeState::Closed;
            }
        } else if u.state == NodeState::Open {
            self.open.update(uid, u.key);
        } else {
            u.state = NodeState::Open;
            self.open.push(uid, u.key);
        }

        self.vertices[uid] = u;
    }

    /// Expand until the goal anchor is settled. Returns whether a path
    /// exists under the current occupancy.
    pub fn compute_shortest_path(&mut self) -> bool {
        self.expanded.clear();
        self.path.clear();

        let graph = self.graph;
        let mut pops = 0usize;

        while let Some((k_old, uid)) = {
            // Keep expanding while the queue holds anything that could
            // still improve or invalidate the goal.
            match self.open.peek() {
                Some((top_key, _))
                    if !(top_key.is_greater(&self.goal_key()) && self.goal_is_consistent()) =>
                {
                    self.open.pop()
                }
                _ => None,
            }
        } {
            pops += 1;

            let mut u = self.vertices[uid];
            u.state = NodeState::Closed;

            // The key may be stale: the anchor can have moved (km, h) since
            // this vertex was queued.
            u.h = graph.node(uid).point.distance(&self.goal_point);
            u.calc_key(self.km);

            if k_old.is_less(&u.key) {
                // Grew while queued: reinsert under the fresh key.
                u.state = NodeState::Open;
                self.vertices[uid] = u;
                self.open.push(uid, u.key);
                continue;
            }

            if u.g > u.rhs {
                // Overconsistent: the lookahead found a better route.
                u.g = u.rhs;
                self.vertices[uid] = u;
                for &sp in &graph.node(uid).neighbors {
                    self.update_vertex(sp);
                }
            } else {
                // Underconsistent: this vertex's old value is no longer
                // backed by its predecessors.
                u.g = COST_INFINITY;
                self.vertices[uid] = u;
                for &sp in &graph.node(uid).neighbors {
                    self.update_vertex(sp);
                }
                self.update_vertex(uid);
            }
        }

        let goal = &self.vertices[self.goal_id];
        let reachable = goal.is_consistent() && !approx_eq(goal.rhs, COST_INFINITY);

        if reachable {
            self.assemble_path();
            trace!(
                "[LPAStar] settled after {pops} pops: cost {:.3}, {} waypoints",
                self.vertices[self.goal_id].rhs,
                self.path.len()
            );
        } else {
            debug!("[LPAStar] no path to the goal anchor after {pops} pops");
        }
        reachable
    }

    /// Feed a batch of occupancy readings. Returns true iff any cell
    /// actually flipped between free and not-free, in which case the
    /// affected vertices have been re-evaluated and the next
    /// [`Self::compute_shortest_path`] repairs the plan.
    pub fn map_change(&mut self, updates: &[(GridCoord, i8)]) -> bool {
        let flags = self.grid.update_cells(updates);
        let graph = self.graph;
        let mut any = false;

        for (&(coord, _), flipped) in updates.iter().zip(flags) {
            if !flipped {
                continue;
            }
            any = true;

            // Both directions of every incident edge changed cost: the
            // cell's own lookahead and each neighbor's must be rebuilt.
            let uid = self
                .grid
                .coord_to_index(coord)
                .expect("update_cells validated the coordinate");
            self.update_vertex(uid);
            for &sp in &graph.node(uid).neighbors {
                self.update_vertex(sp);
            }
        }

        debug!("[LPAStar] map_change: {} cells, changed={any}", updates.len());
        any
    }

    /// Shift the heuristic anchor to a new cell, absorbing the move into
    /// km so stale queue keys stay lower bounds.
    pub(crate) fn shift_anchor(&mut self, new_cell: GridCoord) {
        let new_id = self
            .grid
            .coord_to_index(new_cell)
            .expect("anchor cell outside the grid");
        let old_point = self.goal_point;

        self.goal_id = new_id;
        self.goal_point = self.graph.node(new_id).point;
        self.km += old_point.distance(&self.goal_point);
    }

    /// Accumulated heuristic drift of the moving anchor.
    pub(crate) fn km(&self) -> f32 {
        self.km
    }

    /// Extract the path by walking best predecessors from the goal anchor.
    ///
    /// Re-selects each hop's predecessor with a fresh relaxation over a
    /// scratch record instead of trusting parents frozen mid-propagation;
    /// the stored vertex state is left untouched, so the post-search
    /// invariants survive extraction.
    fn assemble_path(&mut self) {
        self.path.clear();
        self.path.push(self.graph.node(self.goal_id).point);

        let mut current = self.goal_id;
        let mut hops = self.graph.len();

        while current != self.start_id {
            let mut probe = SearchNode::untouched(current);
            for &sp in &self.graph.node(current).neighbors {
                self.relax_from(&mut probe, sp);
            }

            // A finite lookahead always names a predecessor; hitting either
            // guard means the caller extracted from an unsettled search.
            let Some(next) = probe.parent else {
                debug!("[LPAStar] path extraction hit an unreachable hop");
                self.path.clear();
                return;
            };
            if hops == 0 {
                debug!("[LPAStar] path extraction cycled");
                self.path.clear();
                return;
            }

            self.path.push(self.graph.node(next).point);
            current = next;
            hops -= 1;
        }
    }

    /// Check the residency and ordering invariants; test builds only.
    #[cfg(test)]
    pub(crate) fn audit_invariants(&self) {
        for v in &self.vertices {
            let queued = self.open.contains(v.id);
            assert_eq!(
                queued,
                v.state == NodeState::Open,
                "vertex {} state tag disagrees with queue residency",
                v.id
            );
            assert_eq!(
                queued,
                !v.is_consistent(),
                "vertex {} residency disagrees with its consistency",
                v.id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::occupancy;
    use crate::pathfinding::AStarPlanner;
    use approx::assert_relative_eq;

    const SQRT_2: f32 = std::f32::consts::SQRT_2;

    fn path_cost(path: &[WorldPoint]) -> f32 {
        path.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    fn free_grid(side: usize) -> (OccupancyGrid, Graph) {
        let grid = OccupancyGrid::new(side, side, 1.0, WorldPoint::ZERO);
        let graph = Graph::lattice(&grid);
        (grid, graph)
    }

    #[test]
    fn test_initial_plan_on_empty_5x5() {
        let (grid, graph) = free_grid(5);
        let mut planner =
            LpaStarPlanner::new(&graph, grid, GridCoord::new(0, 0), GridCoord::new(4, 4));

        assert!(planner.compute_shortest_path());
        assert_relative_eq!(path_cost(planner.path()), 4.0 * SQRT_2, epsilon = 1e-4);

        // Goal first, start last
        assert!(planner.path()[0].approx_eq(&graph.node(24).point));
        assert!(planner.path().last().unwrap().approx_eq(&graph.node(0).point));

        planner.audit_invariants();
    }

    #[test]
    fn test_start_equals_goal() {
        let (grid, graph) = free_grid(5);
        let cell = GridCoord::new(2, 2);
        let mut planner = LpaStarPlanner::new(&graph, grid, cell, cell);

        assert!(planner.compute_shortest_path());
        assert_eq!(planner.path().len(), 1);
        planner.audit_invariants();
    }

    #[test]
    fn test_wall_replan_detours() {
        let (grid, graph) = free_grid(5);
        let mut planner =
            LpaStarPlanner::new(&graph, grid, GridCoord::new(0, 0), GridCoord::new(4, 4));
        assert!(planner.compute_shortest_path());
        let initial_cost = path_cost(planner.path());

        // Wall across row y=2, with a gap at x=0
        let wall: Vec<(GridCoord, i8)> = (1..5)
            .map(|x| (GridCoord::new(x, 2), occupancy::OCCUPIED))
            .collect();
        assert!(planner.map_change(&wall));
        planner.audit_invariants();

        assert!(planner.compute_shortest_path());
        planner.audit_invariants();

        let detour_cost = path_cost(planner.path());
        // Through the gap: two straight legs down the left edge, then the
        // diagonal run to the far corner
        assert_relative_eq!(detour_cost, 4.0 + 2.0 * SQRT_2, epsilon = 1e-4);
        assert!(detour_cost > initial_cost + 0.5);

        // The wall never appears on the path
        for x in 1..5 {
            let p = graph.node(2 * 5 + x).point;
            assert!(planner.path().iter().all(|w| !w.approx_eq(&p)));
        }
    }

    #[test]
    fn test_replan_matches_fresh_run_and_expands_less() {
        let (grid, graph) = free_grid(5);
        let mut incremental =
            LpaStarPlanner::new(&graph, grid.clone(), GridCoord::new(0, 0), GridCoord::new(4, 4));
        assert!(incremental.compute_shortest_path());

        let wall: Vec<(GridCoord, i8)> = (1..5)
            .map(|x| (GridCoord::new(x, 2), occupancy::OCCUPIED))
            .collect();
        assert!(incremental.map_change(&wall));
        assert!(incremental.compute_shortest_path());
        let replan_expansions = incremental.expanded_nodes().len();

        // From-scratch run on the final occupancy
        let mut final_grid = grid;
        final_grid.update_cells(&wall);
        let mut fresh =
            LpaStarPlanner::new(&graph, final_grid, GridCoord::new(0, 0), GridCoord::new(4, 4));
        assert!(fresh.compute_shortest_path());

        assert_relative_eq!(
            path_cost(incremental.path()),
            path_cost(fresh.path()),
            epsilon = 1e-4
        );
        assert!(
            replan_expansions < fresh.expanded_nodes().len(),
            "replan touched {replan_expansions} vertices, fresh run {}",
            fresh.expanded_nodes().len()
        );
    }

    #[test]
    fn test_map_change_is_idempotent() {
        let (grid, graph) = free_grid(5);
        let mut planner =
            LpaStarPlanner::new(&graph, grid, GridCoord::new(0, 0), GridCoord::new(4, 4));
        assert!(planner.compute_shortest_path());

        let batch = [(GridCoord::new(2, 2), occupancy::OCCUPIED)];
        assert!(planner.map_change(&batch));
        assert!(!planner.map_change(&batch));
        planner.audit_invariants();

        assert!(planner.compute_shortest_path());
        planner.audit_invariants();
    }

    #[test]
    fn test_disconnecting_wall_fails_then_reopens() {
        let (grid, graph) = free_grid(5);
        let mut planner =
            LpaStarPlanner::new(&graph, grid, GridCoord::new(0, 0), GridCoord::new(4, 4));
        assert!(planner.compute_shortest_path());

        // Full wall across row y=2: the goal half is unreachable
        let wall: Vec<(GridCoord, i8)> = (0..5)
            .map(|x| (GridCoord::new(x, 2), occupancy::OCCUPIED))
            .collect();
        assert!(planner.map_change(&wall));
        assert!(!planner.compute_shortest_path());
        assert!(planner.path().is_empty());
        planner.audit_invariants();

        // Free one cell of the wall: the plan comes back through it
        assert!(planner.map_change(&[(GridCoord::new(2, 2), occupancy::FREE)]));
        assert!(planner.compute_shortest_path());
        planner.audit_invariants();

        let gap = graph.node(2 * 5 + 2).point;
        assert!(planner.path().iter().any(|w| w.approx_eq(&gap)));
    }

    #[test]
    fn test_matches_astar_on_random_grids() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);

        for trial in 0..20 {
            let side = 8usize;
            let mut grid = OccupancyGrid::new(side, side, 1.0, WorldPoint::ZERO);
            for y in 0..side as i32 {
                for x in 0..side as i32 {
                    let corner = (x <= 0 && y <= 0)
                        || (x >= side as i32 - 1 && y >= side as i32 - 1);
                    if !corner && rng.gen_bool(0.25) {
                        grid.set_occupancy(GridCoord::new(x, y), occupancy::OCCUPIED);
                    }
                }
            }

            let lattice = Graph::lattice(&grid);
            let mut lpa = LpaStarPlanner::new(
                &lattice,
                grid.clone(),
                GridCoord::new(0, 0),
                GridCoord::new(side as i32 - 1, side as i32 - 1),
            );
            let lpa_found = lpa.compute_shortest_path();
            lpa.audit_invariants();

            let free = Graph::lattice_free(&grid);
            let mut astar = AStarPlanner::new(&free);
            let astar_found = astar.compute_shortest_path(0, side * side - 1);

            assert_eq!(lpa_found, astar_found, "trial {trial} disagrees on reachability");
            if lpa_found {
                assert_relative_eq!(
                    path_cost(lpa.path()),
                    path_cost(astar.path()),
                    epsilon = 1e-3
                );
            }
        }
    }
}
