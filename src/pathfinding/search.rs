//! Shared scaffolding for the one-shot planners.
//!
//! A* and its any-angle variant run the same expansion loop over the same
//! vertex bookkeeping; the only thing that differs is how a neighbor is
//! relaxed when its expanding vertex is popped. That hook is the
//! [`CostPolicy`] trait: a strategy supplied at the call site, not an
//! inheritance hierarchy.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::core::WorldPoint;
use crate::grid::{Graph, NodeId};

use super::node::{NodeState, SearchNode};
use super::queue::OpenQueue;

/// Expansion cap before a search gives up (also the default for the
/// planners' `with_max_iterations` builders).
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// Read-only view handed to a [`CostPolicy`] while a neighbor record is
/// checked out for relaxation.
pub(crate) struct CostContext<'a> {
    pub graph: &'a Graph,
    pub goal_point: WorldPoint,
    records: &'a HashMap<NodeId, SearchNode>,
}

impl<'a> CostContext<'a> {
    /// Heuristic estimate from a vertex to the goal (Euclidean, admissible
    /// and consistent on a metric graph).
    #[inline]
    pub fn h(&self, id: NodeId) -> f32 {
        self.graph.node(id).point.distance(&self.goal_point)
    }

    /// Path cost to `to` when reached through `via`.
    #[inline]
    pub fn g(&self, via: &SearchNode, to: NodeId) -> f32 {
        let a = self.graph.node(via.id).point;
        let b = self.graph.node(to).point;
        via.g + a.distance(&b)
    }

    /// `(f, g, h)` of `to` when reached through `via`.
    #[inline]
    pub fn f(&self, via: &SearchNode, to: NodeId) -> (f32, f32, f32) {
        let g = self.g(via, to);
        let h = self.h(to);
        (g + h, g, h)
    }

    /// Current record of a touched vertex (open or closed).
    #[inline]
    pub fn record(&self, id: NodeId) -> Option<&SearchNode> {
        self.records.get(&id)
    }
}

/// The algorithm-specific relaxation hook.
///
/// Called once per (expanded vertex, neighbor) pair. Implementations
/// inspect the candidate paths available through `via` and update the
/// neighbor's g/h/key/parent in place when they find a cheaper one.
pub(crate) trait CostPolicy {
    fn compute_cost(&self, ctx: &CostContext<'_>, via: &SearchNode, neighbor: &mut SearchNode);
}

/// Vertex bookkeeping and expansion loop shared by the one-shot planners.
pub(crate) struct SearchCore<'g> {
    graph: &'g Graph,
    goal_point: WorldPoint,
    records: HashMap<NodeId, SearchNode>,
    open: OpenQueue,
    closed: HashSet<NodeId>,
    expanded: Vec<WorldPoint>,
    path: Vec<WorldPoint>,
}

impl<'g> SearchCore<'g> {
    pub(crate) fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            goal_point: WorldPoint::ZERO,
            records: HashMap::new(),
            open: OpenQueue::new(),
            closed: HashSet::new(),
            expanded: Vec::new(),
            path: Vec::new(),
        }
    }

    /// Waypoints of the last found path, goal first. Empty if the last
    /// search failed.
    pub(crate) fn path(&self) -> &[WorldPoint] {
        &self.path
    }

    /// Points popped off the open queue during the last search.
    pub(crate) fn expanded_nodes(&self) -> &[WorldPoint] {
        &self.expanded
    }

    /// Run the search. Returns true when the goal was reached; the path is
    /// then available from [`Self::path`].
    pub(crate) fn run(
        &mut self,
        start: NodeId,
        goal: NodeId,
        policy: &dyn CostPolicy,
        max_iterations: usize,
        tag: &str,
    ) -> bool {
        assert!(start < self.graph.len(), "start node outside the graph");
        assert!(goal < self.graph.len(), "goal node outside the graph");

        self.records.clear();
        self.open = OpenQueue::new();
        self.closed.clear();
        self.expanded.clear();
        self.path.clear();
        self.goal_point = self.graph.node(goal).point;

        let mut s = SearchNode::untouched(start);
        s.g = 0.0;
        s.h = self.graph.node(start).point.distance(&self.goal_point);
        s.calc_key(0.0);
        s.state = NodeState::Open;
        self.records.insert(start, s);
        self.open.push(start, s.key);

        let mut iterations = 0usize;

        while let Some((_, uid)) = self.open.pop() {
            iterations += 1;
            if iterations > max_iterations {
                debug!("[{tag}] giving up after {iterations} expansions");
                return false;
            }

            let u = self.records[&uid];
            self.expanded.push(self.graph.node(uid).point);

            if uid == goal {
                self.assemble_path(u);
                trace!(
                    "[{tag}] path found: {} waypoints, cost {:.3}, {} expansions",
                    self.path.len(),
                    u.g,
                    iterations
                );
                return true;
            }

            self.closed.insert(uid);
            if let Some(rec) = self.records.get_mut(&uid) {
                rec.state = NodeState::Closed;
            }

            let graph = self.graph;
            for &nid in &graph.node(uid).neighbors {
                if self.closed.contains(&nid) {
                    continue;
                }

                let mut neighbor = self
                    .records
                    .get(&nid)
                    .copied()
                    .unwrap_or_else(|| SearchNode::untouched(nid));
                let was_new = neighbor.state == NodeState::New;

                let ctx = CostContext {
                    graph,
                    goal_point: self.goal_point,
                    records: &self.records,
                };
                policy.compute_cost(&ctx, &u, &mut neighbor);

                if was_new {
                    neighbor.state = NodeState::Open;
                    self.records.insert(nid, neighbor);
                    self.open.push(nid, neighbor.key);
                } else {
                    self.records.insert(nid, neighbor);
                    self.open.update(nid, neighbor.key);
                }
            }
        }

        debug!("[{tag}] open queue exhausted after {iterations} expansions, no path");
        false
    }

    /// Walk the parent back-links from the reached goal, collecting points
    /// goal → start.
    fn assemble_path(&mut self, goal: SearchNode) {
        self.path.clear();
        self.path.push(self.graph.node(goal.id).point);

        let mut current = goal;
        while let Some(pid) = current.parent {
            self.path.push(self.graph.node(pid).point);
            current = self.records[&pid];
        }
    }
}
