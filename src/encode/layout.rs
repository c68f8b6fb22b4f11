//! Placement geometry and custom-data payloads for generated components.
//!
//! Every pixel row gets its own circuit board. On a board, x runs across the
//! pixel columns, z runs along the timing chain, and everything sits at peg
//! height on the board surface. Distances are in world units.

/// Vertical gap between adjacent row boards.
pub const ROW_SPACING: f32 = 0.90;
/// Gap between adjacent pixel columns on a board.
pub const COLUMN_SPACING: f32 = 0.90;
/// Gap between adjacent timing steps along a board.
pub const STEP_SPACING: f32 = 0.60;
/// Height of a component standing on the board surface.
pub const SURFACE: f32 = 0.15;

/// No rotation.
pub const IDENTITY: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
/// Half-turn around the vertical axis.
pub const ABOUT_FACE: [f32; 4] = [0.0, 1.0, 0.0, 0.0];

/// World position of a row board.
pub fn board_position(row: usize) -> [f32; 3] {
    [0.0, row as f32 * ROW_SPACING, 0.0]
}

/// Board-relative position of a timing-chain delayer.
pub fn timing_delayer_position(step: usize) -> [f32; 3] {
    [SURFACE, SURFACE, step as f32 * STEP_SPACING + SURFACE]
}

/// Board-relative position of a pixel's output socket.
pub fn socket_position(column: usize) -> [f32; 3] {
    [column as f32 * COLUMN_SPACING + 0.75, SURFACE, SURFACE]
}

/// Board-relative position of a pixel toggle delayer at a timing step.
pub fn pixel_delayer_position(column: usize, step: usize) -> [f32; 3] {
    [
        column as f32 * COLUMN_SPACING + 0.45,
        SURFACE,
        step as f32 * STEP_SPACING - 0.15,
    ]
}

/// Board-relative position of a column net peg (or chunking delayer) at a
/// timing step.
pub fn column_peg_position(column: usize, step: usize) -> [f32; 3] {
    [
        column as f32 * COLUMN_SPACING + 0.75,
        SURFACE,
        step as f32 * STEP_SPACING - 0.45,
    ]
}

/// Custom data of a circuit board: RGB color, then width and depth in cells.
pub fn board_custom_data(color: [u8; 3], width_cells: i32, depth_cells: i32) -> Vec<u8> {
    let mut data = Vec::with_capacity(11);
    data.extend_from_slice(&color);
    data.extend_from_slice(&width_cells.to_le_bytes());
    data.extend_from_slice(&depth_cells.to_le_bytes());
    data
}

/// Custom data of a delayer: elapsed ticks, then hold duration in ticks.
pub fn delayer_custom_data(elapsed_ticks: u32, duration_ticks: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(8);
    data.extend_from_slice(&elapsed_ticks.to_le_bytes());
    data.extend_from_slice(&duration_ticks.to_le_bytes());
    data
}
