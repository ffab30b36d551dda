//! Occupancy grid storage and the search graph built over it.

pub mod graph;
pub mod storage;

pub use graph::{Graph, GraphError, GraphNode, NodeId};
pub use storage::{occupancy, GridError, OccupancyGrid};
