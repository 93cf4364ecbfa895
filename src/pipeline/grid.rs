// Notes run left to right, then bottom to top: the bottom-left cell is the
// lowest note, so a controller's pad layout lines up with the screen.

use crate::pipeline::project::Pad;
use crate::shared::{ColorScheme, GridSize, PadId, LOWEST_NOTE};

pub fn build_grid(size: GridSize, scheme: ColorScheme) -> Vec<Pad> {
    let (rows, cols) = size.dims();
    let mut pads: Vec<Pad> = (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (row, col)))
        .map(|(row, col)| {
            let index = trigger_index(rows, cols, row, col);
            Pad::new(PadId(index), LOWEST_NOTE + index as u8, row, col, scheme)
        })
        .collect();
    pads.sort_by_key(|p| p.id);
    debug_assert_eq!(pads.len(), size.pad_count());
    pads
}

// visual (row, col) -> linear trigger index
pub fn trigger_index(rows: u16, cols: u16, row: u16, col: u16) -> u16 {
    (rows - 1 - row) * cols + col
}
