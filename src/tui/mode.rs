use ratatui::layout::Rect;

use crate::shared::{DisplayState, PadId};

// state local to tui: where things were drawn last frame, and what the
// terminal can report. rows/cols and assign_open are synced from
// DisplayState per loop
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub pad_areas: Vec<(Rect, PadId)>, // hit targets from the last draw
    pub rows: u16,
    pub cols: u16,
    pub assign_open: bool,
    // terminals without the kitty protocol never send key releases
    pub key_release: bool,
}

impl TuiState {
    pub fn sync(&mut self, ds: &DisplayState) {
        self.rows = ds.rows;
        self.cols = ds.cols;
        self.assign_open = ds.assign.is_some();
    }

    pub fn pad_at(&self, column: u16, row: u16) -> Option<PadId> {
        self.pad_areas
            .iter()
            .find(|(area, _)| {
                column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
            })
            .map(|(_, pad)| *pad)
    }
}
