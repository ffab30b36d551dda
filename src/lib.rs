//! # Marga: Heuristic Path Planners for 2D Occupancy Grids
//!
//! A library of graph-search planners for indoor robot navigation:
//! one-shot A* and any-angle Theta*, plus the incremental pair (Lifelong
//! Planning A* and D* Lite) that repairs an existing plan as the occupancy
//! grid evolves instead of searching from scratch.
//!
//! ## Quick Start
//!
//! ```rust
//! use marga::core::{GridCoord, WorldPoint};
//! use marga::grid::{occupancy, Graph, OccupancyGrid};
//! use marga::pathfinding::LpaStarPlanner;
//!
//! // A 10m x 10m grid at 1m resolution, all free
//! let grid = OccupancyGrid::new(10, 10, 1.0, WorldPoint::ZERO);
//! let graph = Graph::lattice(&grid);
//!
//! let mut planner =
//!     LpaStarPlanner::new(&graph, grid, GridCoord::new(0, 0), GridCoord::new(9, 9));
//! assert!(planner.compute_shortest_path());
//!
//! // A wall appears; only the invalidated region is re-expanded
//! let wall: Vec<_> = (2..10)
//!     .map(|x| (GridCoord::new(x, 5), occupancy::OCCUPIED))
//!     .collect();
//! planner.map_change(&wall);
//! assert!(planner.compute_shortest_path());
//! ```
//!
//! ## Coordinate Frame
//!
//! All world coordinates follow the ROS REP-103 convention (X-forward,
//! Y-left, meters); grid cells are integer (x, y) indices with
//! `grid_to_world` mapping to cell centers.
//!
//! ## Architecture
//!
//! - [`core`]: fundamental types (GridCoord, WorldPoint, float tolerance)
//! - [`grid`]: occupancy storage and the lattice search graph
//! - [`geometry`]: convex-polygon collision predicates for line of sight
//! - [`pathfinding`]: the four planners and their shared search substrate
//!
//! ## Execution Model
//!
//! Everything is single-threaded and synchronous: each planner call runs
//! to completion on the caller's thread, and the incremental planners own
//! their grid so occupancy can only change between searches, never during
//! one.

pub mod core;
pub mod geometry;
pub mod grid;
pub mod pathfinding;

// Re-export main types at crate root
pub use crate::core::{GridCoord, WorldPoint};
pub use crate::grid::{Graph, GraphNode, NodeId, OccupancyGrid};
pub use crate::pathfinding::{AStarPlanner, DStarLitePlanner, LpaStarPlanner, ThetaStarPlanner};
