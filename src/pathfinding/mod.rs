//! Heuristic graph-search planners.
//!
//! Four planners over one search substrate:
//!
//! - **A***: one-shot shortest path on a prebuilt graph
//! - **Theta***: A* with line-of-sight parent inheritance (any-angle paths)
//! - **LPA***: incremental replanning as occupancy changes
//! - **D* Lite**: LPA* re-anchored at a moving robot
//!
//! The shared substrate is a lexicographic [`Key`] order, a per-vertex
//! [`SearchNode`] record, and a handle-based open queue; the planners
//! differ only in how vertices are relaxed and when the loop stops.
//!
//! ## One-shot planning
//!
//! ```rust
//! use marga::core::WorldPoint;
//! use marga::grid::{Graph, OccupancyGrid};
//! use marga::pathfinding::AStarPlanner;
//!
//! let grid = OccupancyGrid::new(10, 10, 0.5, WorldPoint::ZERO);
//! let graph = Graph::lattice_free(&grid);
//!
//! let mut planner = AStarPlanner::new(&graph);
//! if planner.compute_shortest_path(0, 99) {
//!     println!("{} waypoints", planner.path().len());
//! }
//! ```
//!
//! ## Incremental replanning
//!
//! ```rust
//! use marga::core::{GridCoord, WorldPoint};
//! use marga::grid::{occupancy, Graph, OccupancyGrid};
//! use marga::pathfinding::DStarLitePlanner;
//!
//! let grid = OccupancyGrid::new(10, 10, 0.5, WorldPoint::ZERO);
//! let graph = Graph::lattice(&grid);
//!
//! let mut planner =
//!     DStarLitePlanner::new(&graph, grid, GridCoord::new(0, 0), GridCoord::new(9, 9));
//! assert!(planner.compute_shortest_path());
//!
//! // The robot advances and senses a wall
//! planner.update_robot_loc(GridCoord::new(1, 1));
//! planner.map_change(&[(GridCoord::new(3, 3), occupancy::OCCUPIED)]);
//! assert!(planner.compute_shortest_path());
//! ```

pub mod astar;
pub mod dstar_lite;
pub mod key;
pub mod lpa_star;
pub mod node;
mod queue;
mod search;
pub mod theta_star;

pub use astar::AStarPlanner;
pub use dstar_lite::DStarLitePlanner;
pub use key::Key;
pub use lpa_star::LpaStarPlanner;
pub use node::{NodeState, SearchNode};
pub use search::DEFAULT_MAX_ITERATIONS;
pub use theta_star::ThetaStarPlanner;
