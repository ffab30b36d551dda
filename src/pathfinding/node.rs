//! Per-vertex search state.

use crate::core::math::{approx_eq, COST_INFINITY};
use crate::grid::NodeId;

use super::key::Key;

/// Where a vertex currently lives in the search.
///
/// `New` is the implicit pre-touched state; `Open` means the vertex is on
/// the priority queue; `Closed` means it has been expanded (one-shot
/// planners) or rests in the standby pool (incremental planners).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    /// Never touched by the search
    New,
    /// Resident on the open queue
    Open,
    /// Expanded / resting in standby
    Closed,
}

/// Search bookkeeping for one graph vertex.
///
/// Deliberately `Copy`: records move freely between the slab, the queue
/// snapshotting and local relaxation without reference juggling. The parent
/// back-link is a stable node id, never a reference into the graph.
#[derive(Clone, Copy, Debug)]
pub struct SearchNode {
    /// Graph node this record tracks (also its slab index)
    pub id: NodeId,
    /// Best known cost from the search source
    pub g: f32,
    /// One-step lookahead cost (incremental planners only; stays at
    /// [`COST_INFINITY`] for the one-shot planners)
    pub rhs: f32,
    /// Heuristic estimate to the current goal anchor
    pub h: f32,
    /// Cached queue priority
    pub key: Key,
    /// Predecessor used for path extraction
    pub parent: Option<NodeId>,
    /// Lifecycle state
    pub state: NodeState,
}

impl SearchNode {
    /// A vertex the search has not touched yet.
    pub fn untouched(id: NodeId) -> Self {
        Self {
            id,
            g: COST_INFINITY,
            rhs: COST_INFINITY,
            h: COST_INFINITY,
            key: Key::INFINITE,
            parent: None,
            state: NodeState::New,
        }
    }

    /// Refresh the cached key from the current g/rhs/h values.
    ///
    /// With `rhs` untouched this reduces to the one-shot `(g + h, g)`.
    #[inline]
    pub fn calc_key(&mut self, km: f32) {
        let lookahead = self.g.min(self.rhs);
        self.key = Key::new(lookahead + self.h + km, lookahead);
    }

    /// Local consistency: `g ≈ rhs` under the project tolerance.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        approx_eq(self.g, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_defaults() {
        let n = SearchNode::untouched(7);
        assert_eq!(n.id, 7);
        assert_eq!(n.g, COST_INFINITY);
        assert_eq!(n.rhs, COST_INFINITY);
        assert_eq!(n.state, NodeState::New);
        assert!(n.parent.is_none());
        // g == rhs == infinity counts as consistent
        assert!(n.is_consistent());
    }

    #[test]
    fn test_calc_key_one_shot_shape() {
        let mut n = SearchNode::untouched(0);
        n.g = 3.0;
        n.h = 4.0;
        n.calc_key(0.0);
        // rhs is still infinite, so min(g, rhs) = g
        assert!((n.key.k1 - 7.0).abs() < 1e-6);
        assert!((n.key.k2 - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_calc_key_uses_lookahead_and_km() {
        let mut n = SearchNode::untouched(0);
        n.g = 10.0;
        n.rhs = 2.0;
        n.h = 1.0;
        n.calc_key(0.5);
        assert!((n.key.k1 - 3.5).abs() < 1e-6);
        assert!((n.key.k2 - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_consistency_predicate() {
        let mut n = SearchNode::untouched(0);
        n.g = 5.0;
        n.rhs = 5.0 + 1e-7;
        assert!(n.is_consistent());
        n.rhs = 4.0;
        assert!(!n.is_consistent());
    }
}
