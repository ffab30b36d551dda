//! Occupancy grid storage.
//!
//! Dense row-major signed 8-bit occupancy, the representation the
//! incremental planners consume: only the free / not-free distinction
//! drives edge costs, the raw values are kept for callers that render or
//! republish the grid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{GridCoord, WorldPoint};
use crate::geometry::{point_in_convex_polygon, Polygon};

/// Occupancy values stored per cell.
pub mod occupancy {
    /// Traversable cell.
    pub const FREE: i8 = 0;
    /// Free cell inside an obstacle's inflation zone.
    pub const BUFFER: i8 = 50;
    /// Cell covered by an obstacle.
    pub const OCCUPIED: i8 = 100;
}

/// Error building a grid from caller-supplied geometry.
#[derive(Error, Debug, PartialEq)]
pub enum GridError {
    #[error("map bounds are empty or inverted: x={x:?} y={y:?}")]
    EmptyBounds { x: [f32; 2], y: [f32; 2] },

    #[error("obstacle {index} has {vertices} vertices, a polygon needs at least 3")]
    DegeneratePolygon { index: usize, vertices: usize },
}

/// 2D occupancy grid over a rectangular world region.
///
/// Cell (x, y) covers `origin + (x, y) * resolution`; `grid_to_world`
/// returns cell centers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    occupancy: Vec<i8>,
    width: usize,
    height: usize,
    resolution: f32,
    origin: WorldPoint,
}

impl OccupancyGrid {
    /// Create a grid with every cell free.
    ///
    /// Panics if either dimension is zero.
    pub fn new(width: usize, height: usize, resolution: f32, origin: WorldPoint) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        Self {
            occupancy: vec![occupancy::FREE; width * height],
            width,
            height,
            resolution,
            origin,
        }
    }

    /// Rasterize convex obstacle polygons into a grid covering
    /// `x_bounds` x `y_bounds`.
    ///
    /// A cell becomes [`occupancy::OCCUPIED`] when its center lies inside an
    /// obstacle, and [`occupancy::BUFFER`] when the center is within
    /// `buffer_radius` of one.
    pub fn from_polygons(
        obstacles: &[Polygon],
        x_bounds: [f32; 2],
        y_bounds: [f32; 2],
        resolution: f32,
        buffer_radius: f32,
    ) -> Result<Self, GridError> {
        if x_bounds[1] <= x_bounds[0] || y_bounds[1] <= y_bounds[0] || resolution <= 0.0 {
            return Err(GridError::EmptyBounds {
                x: x_bounds,
                y: y_bounds,
            });
        }
        for (index, poly) in obstacles.iter().enumerate() {
            if poly.len() < 3 {
                return Err(GridError::DegeneratePolygon {
                    index,
                    vertices: poly.len(),
                });
            }
        }

        let width = ((x_bounds[1] - x_bounds[0]) / resolution).round() as usize;
        let height = ((y_bounds[1] - y_bounds[0]) / resolution).round() as usize;
        let origin = WorldPoint::new(x_bounds[0], y_bounds[0]);
        let mut grid = Self::new(width.max(1), height.max(1), resolution, origin);

        for y in 0..grid.height as i32 {
            for x in 0..grid.width as i32 {
                let coord = GridCoord::new(x, y);
                let center = grid.grid_to_world(coord);

                for poly in obstacles {
                    if point_in_convex_polygon(center, poly, 0.0) {
                        grid.set_occupancy(coord, occupancy::OCCUPIED);
                        break;
                    }
                    if buffer_radius > 0.0 && point_in_convex_polygon(center, poly, buffer_radius) {
                        grid.set_occupancy(coord, occupancy::BUFFER);
                        // keep scanning: a later polygon may cover the center
                    }
                }
            }
        }

        Ok(grid)
    }

    /// Grid width in cells
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)` in cells
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Resolution in meters per cell
    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// World coordinates of the grid's minimum corner
    #[inline]
    pub fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Check if grid coordinates are within bounds
    #[inline]
    pub fn is_valid_coord(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    /// Convert grid coordinates to flat array index
    #[inline]
    pub fn coord_to_index(&self, coord: GridCoord) -> Option<usize> {
        if self.is_valid_coord(coord) {
            Some(coord.y as usize * self.width + coord.x as usize)
        } else {
            None
        }
    }

    /// Convert flat array index to grid coordinates
    #[inline]
    pub fn index_to_coord(&self, index: usize) -> GridCoord {
        GridCoord::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Convert world coordinates to grid coordinates
    #[inline]
    pub fn world_to_grid(&self, point: WorldPoint) -> GridCoord {
        let x = ((point.x - self.origin.x) / self.resolution).floor() as i32;
        let y = ((point.y - self.origin.y) / self.resolution).floor() as i32;
        GridCoord::new(x, y)
    }

    /// Convert grid coordinates to world coordinates (cell center)
    #[inline]
    pub fn grid_to_world(&self, coord: GridCoord) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + (coord.x as f32 + 0.5) * self.resolution,
            self.origin.y + (coord.y as f32 + 0.5) * self.resolution,
        )
    }

    /// Occupancy value at `coord`; out-of-bounds reads as occupied.
    #[inline]
    pub fn occupancy_at(&self, coord: GridCoord) -> i8 {
        self.coord_to_index(coord)
            .map(|i| self.occupancy[i])
            .unwrap_or(occupancy::OCCUPIED)
    }

    /// The only distinction the planners consume.
    #[inline]
    pub fn is_free(&self, coord: GridCoord) -> bool {
        self.occupancy_at(coord) == occupancy::FREE
    }

    /// Overwrite a single cell.
    ///
    /// Panics on out-of-bounds coordinates.
    #[inline]
    pub fn set_occupancy(&mut self, coord: GridCoord, value: i8) {
        let index = self
            .coord_to_index(coord)
            .expect("cell coordinate outside the grid");
        self.occupancy[index] = value;
    }

    /// Apply a batch of occupancy readings.
    ///
    /// Returns one flag per input cell: true iff the update flipped the
    /// cell's free / not-free status. A cell rewritten with a different
    /// non-free value (say buffer to occupied) is stored but not flagged,
    /// since no edge cost changes.
    ///
    /// Panics on out-of-bounds coordinates.
    pub fn update_cells(&mut self, updates: &[(GridCoord, i8)]) -> Vec<bool> {
        let mut changed = Vec::with_capacity(updates.len());

        for &(coord, value) in updates {
            let index = self
                .coord_to_index(coord)
                .expect("cell update outside the grid");
            let current = self.occupancy[index];

            let flipped = (current == occupancy::FREE) != (value == occupancy::FREE);
            if current != value {
                self.occupancy[index] = value;
            }
            changed.push(flipped);
        }

        changed
    }

    /// Raw occupancy slice, row-major
    #[inline]
    pub fn raw(&self) -> &[i8] {
        &self.occupancy
    }
}
