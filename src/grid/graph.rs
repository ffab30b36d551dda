//! Search graph consumed by the planners.
//!
//! Nodes carry a dense integer id, a world point, and the ids of their
//! neighbors. Ids rather than references keep the structure copy-safe and
//! let search records point back at their parents without ownership.

use thiserror::Error;

use crate::core::{GridCoord, WorldPoint};
use crate::grid::OccupancyGrid;

/// Dense node index into a [`Graph`].
pub type NodeId = usize;

/// A single graph vertex (read-only to the planners).
#[derive(Clone, Debug)]
pub struct GraphNode {
    /// Dense id; equals the node's index in the graph.
    pub id: NodeId,
    /// World location of the vertex.
    pub point: WorldPoint,
    /// Ids of connected vertices.
    pub neighbors: Vec<NodeId>,
}

/// Error validating a caller-built graph.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("node at index {index} carries id {id}; ids must equal their index")]
    IdMismatch { index: usize, id: NodeId },

    #[error("node {node} lists neighbor {neighbor}, but the graph has {len} nodes")]
    NeighborOutOfRange {
        node: NodeId,
        neighbor: NodeId,
        len: usize,
    },
}

/// An array-indexed graph of [`GraphNode`]s.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<GraphNode>,
}

impl Graph {
    /// Build a graph from caller-supplied nodes, validating the id scheme
    /// and every neighbor reference.
    pub fn new(nodes: Vec<GraphNode>) -> Result<Self, GraphError> {
        let len = nodes.len();
        for (index, node) in nodes.iter().enumerate() {
            if node.id != index {
                return Err(GraphError::IdMismatch { index, id: node.id });
            }
            for &neighbor in &node.neighbors {
                if neighbor >= len {
                    return Err(GraphError::NeighborOutOfRange {
                        node: node.id,
                        neighbor,
                        len,
                    });
                }
            }
        }
        Ok(Self { nodes })
    }

    /// Build the 8-connected lattice over a grid's cell centers.
    ///
    /// Node id is `y * width + x`. Connectivity is unconditional; occupancy
    /// only enters through the planners' edge costs, so the same graph
    /// serves every occupancy state of the grid.
    pub fn lattice(grid: &OccupancyGrid) -> Self {
        let (width, height) = grid.dimensions();
        let mut nodes = Vec::with_capacity(width * height);

        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let coord = GridCoord::new(x, y);
                let id = y as usize * width + x as usize;

                let mut neighbors = Vec::with_capacity(8);
                for n in coord.neighbors_8() {
                    if grid.is_valid_coord(n) {
                        neighbors.push(n.y as usize * width + n.x as usize);
                    }
                }

                nodes.push(GraphNode {
                    id,
                    point: grid.grid_to_world(coord),
                    neighbors,
                });
            }
        }

        Self { nodes }
    }

    /// Build the 8-connected lattice over a grid's currently free cells.
    ///
    /// Same id scheme as [`Graph::lattice`], but an edge exists only
    /// between two free cells. This is the graph shape the one-shot
    /// planners expect: they carry no occupancy query of their own, so
    /// blocked cells must already be disconnected.
    pub fn lattice_free(grid: &OccupancyGrid) -> Self {
        let (width, height) = grid.dimensions();
        let mut nodes = Vec::with_capacity(width * height);

        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let coord = GridCoord::new(x, y);
                let id = y as usize * width + x as usize;

                let mut neighbors = Vec::new();
                if grid.is_free(coord) {
                    for n in coord.neighbors_8() {
                        if grid.is_valid_coord(n) && grid.is_free(n) {
                            neighbors.push(n.y as usize * width + n.x as usize);
                        }
                    }
                }

                nodes.push(GraphNode {
                    id,
                    point: grid.grid_to_world(coord),
                    neighbors,
                });
            }
        }

        Self { nodes }
    }

    /// Number of nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id.
    ///
    /// Panics on an id outside the graph; passing one is a caller bug.
    #[inline]
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id]
    }

    /// Iterate over all nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }
}
