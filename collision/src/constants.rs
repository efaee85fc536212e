/// Number of outdoor grid cells per axis. The grid is `GRID_SIDE x GRID_SIDE` cells.
pub const GRID_SIDE: u16 = 128;

/// Size of one outdoor grid cell in world units.
/// All cells are square.
pub const CELL_SIZE: f32 = 512.0;

/// Precomputed `1.0 / CELL_SIZE`.
pub const INV_CELL_SIZE: f32 = 1.0 / CELL_SIZE;

/// Offset applied when converting world positions to grid coordinates.
///
/// This is used by `grid_cell_for()` / `cell_min_corner()`:
/// - Encoding: `grid = floor((pos + WORLD_OFFSET) / CELL_SIZE)`
/// - Decoding: `pos_min = grid * CELL_SIZE - WORLD_OFFSET`
///
/// With `GRID_SIDE = 128` and `CELL_SIZE = 512`, the representable world span per axis is
/// `65536` units, centered on the origin.
pub const WORLD_OFFSET: f32 = 32768.0;

/// Number of angle units in a full turn, as used by the trig lookup table.
pub const ANGLE_UNITS_PER_TURN: i32 = 2048;

/// Number of fractional bits in a 16.16 fixpoint number.
pub const FIXPOINT_SHIFT: u32 = 16;
