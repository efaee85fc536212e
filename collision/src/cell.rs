//! Outdoor grid cell helpers.
//!
//! Outdoor candidate geometry is bucketed in a square grid so a collision query only looks at
//! its local neighborhood.
//!
//! # Model
//! - The grid is `GRID_SIDE x GRID_SIDE` cells, each `CELL_SIZE` world units wide.
//! - World-to-cell mapping uses `WORLD_OFFSET` to shift negative coordinates into the
//!   `[0, GRID_SIDE)` range.
//!
//! # Encoding
//! - `grid_x = floor((x + WORLD_OFFSET) / CELL_SIZE)`
//! - `grid_y = floor((y + WORLD_OFFSET) / CELL_SIZE)`
//!
//! Coordinates are clamped into `[0, GRID_SIDE-1]`. Cells are linearized in X-major order
//! (`id = grid_x * GRID_SIDE + grid_y`) for storage.

use crate::constants::{CELL_SIZE, GRID_SIDE, INV_CELL_SIZE, WORLD_OFFSET};

/// Coordinates of one outdoor grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub x: u16,
    pub y: u16,
}

impl GridCell {
    /// Cell at signed grid coordinates, or `None` outside the grid.
    #[inline]
    pub fn new(x: i32, y: i32) -> Option<Self> {
        let side = GRID_SIDE as i32;
        if (0..side).contains(&x) && (0..side).contains(&y) {
            return Some(Self {
                x: x as u16,
                y: y as u16,
            });
        }
        None
    }

    /// Linear index of this cell, in `[0, GRID_SIDE^2)`.
    #[inline]
    pub fn index(self) -> usize {
        self.x as usize * GRID_SIDE as usize + self.y as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self {
            x: (index / GRID_SIDE as usize) as u16,
            y: (index % GRID_SIDE as usize) as u16,
        }
    }
}

/// Grid coordinate of a world coordinate along one axis, clamped to the grid.
#[inline]
fn axis_to_grid(v: f32) -> u16 {
    let g = ((v + WORLD_OFFSET) * INV_CELL_SIZE).floor();
    g.clamp(0.0, (GRID_SIDE - 1) as f32) as u16
}

/// Cell containing the world position `(x, y)`; positions outside the grid clamp to the edge.
#[inline]
pub fn grid_cell_for(x: f32, y: f32) -> GridCell {
    GridCell {
        x: axis_to_grid(x),
        y: axis_to_grid(y),
    }
}

/// World position `(x, y)` of the cell's minimum corner.
#[inline]
pub fn cell_min_corner(cell: GridCell) -> (f32, f32) {
    (
        (cell.x as f32) * CELL_SIZE - WORLD_OFFSET,
        (cell.y as f32) * CELL_SIZE - WORLD_OFFSET,
    )
}

/// All cells overlapped by the world-space rectangle `[min, max]` (inclusive), clamped to
/// the grid.
pub fn cells_in_rect(min: (f32, f32), max: (f32, f32)) -> impl Iterator<Item = GridCell> {
    let (x0, y0) = (axis_to_grid(min.0), axis_to_grid(min.1));
    let (x1, y1) = (axis_to_grid(max.0), axis_to_grid(max.1));
    (x0..=x1).flat_map(move |x| (y0..=y1).map(move |y| GridCell { x, y }))
}
